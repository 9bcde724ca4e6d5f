//! Repository seam for the remote content store
//!
//! The content database (CRUD screens, sync, auth) lives outside this
//! workspace. The performance subsystem only ever *reads* content records, so
//! the seam is a small async trait the host wires to its own repository
//! implementation.

use crate::error::Result;
use crate::models::{ContentId, ContentItem, Setlist, SetlistId};

/// Read-only access to the content repository.
#[async_trait::async_trait]
pub trait ContentRepository: Send + Sync {
    /// Find a content item by ID.
    async fn find_by_id(&self, id: &ContentId) -> Result<Option<ContentItem>>;

    /// Find a setlist (with its items, in performance order) by ID.
    async fn find_setlist(&self, id: &SetlistId) -> Result<Option<Setlist>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct FixtureRepository {
        items: HashMap<ContentId, ContentItem>,
        setlists: HashMap<SetlistId, Setlist>,
    }

    #[async_trait::async_trait]
    impl ContentRepository for FixtureRepository {
        async fn find_by_id(&self, id: &ContentId) -> Result<Option<ContentItem>> {
            Ok(self.items.get(id).cloned())
        }

        async fn find_setlist(&self, id: &SetlistId) -> Result<Option<Setlist>> {
            Ok(self.setlists.get(id).cloned())
        }
    }

    #[tokio::test]
    async fn test_repository_lookup() {
        let item = ContentItem::new_chart("Song A", "la la la");
        let setlist = Setlist::new("Friday gig", vec![item.clone()]);

        let repo = FixtureRepository {
            items: HashMap::from([(item.id, item.clone())]),
            setlists: HashMap::from([(setlist.id, setlist.clone())]),
        };

        let found = repo.find_by_id(&item.id).await.unwrap();
        assert_eq!(found, Some(item));

        let missing = repo.find_by_id(&ContentId::new()).await.unwrap();
        assert!(missing.is_none());

        let found_setlist = repo.find_setlist(&setlist.id).await.unwrap();
        assert_eq!(found_setlist.unwrap().name, "Friday gig");
    }
}
