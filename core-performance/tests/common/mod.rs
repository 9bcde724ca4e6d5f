//! Shared test doubles for the performance engine tests.
//!
//! `FakeHttpClient` serves scripted per-URL outcomes (success, HTTP status,
//! connection error, flakiness, slowness) and counts requests;
//! `FakeFileSystem` is an in-memory file map. Together they let the warm →
//! resolve → navigate scenarios run end to end without network or disk.

#![allow(dead_code)]

use async_trait::async_trait;
use bridge_traits::error::{BridgeError, Result as BridgeResult};
use bridge_traits::http::{HttpClient, HttpRequest, HttpResponse};
use bridge_traits::storage::{FileMetadata, FileSystemAccess};
use bytes::Bytes;
use core_content::{ContentItem, RemoteFile};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

// ============================================================================
// Fake HTTP client
// ============================================================================

/// Scripted outcome for one URL.
enum Script {
    /// Respond 200 with body and content type.
    Ok { body: Bytes, content_type: String },
    /// Respond with the given HTTP status and an empty body.
    Status(u16),
    /// Fail with a connection error.
    ConnectionError,
    /// Fail with connection errors `remaining` times, then respond 200.
    Flaky {
        remaining: usize,
        body: Bytes,
        content_type: String,
    },
    /// Respond 200 after a delay (longer than a test timeout to simulate a
    /// hanging fetch, shorter to simulate a slow server).
    Slow {
        delay: Duration,
        body: Bytes,
        content_type: String,
    },
}

enum Action {
    Respond {
        status: u16,
        content_type: Option<String>,
        body: Bytes,
    },
    Error(String),
    Delay {
        delay: Duration,
        body: Bytes,
        content_type: String,
    },
}

/// HTTP client whose responses are scripted per URL.
pub struct FakeHttpClient {
    scripts: Mutex<HashMap<String, Script>>,
    counts: Mutex<HashMap<String, usize>>,
    connected: AtomicBool,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl FakeHttpClient {
    pub fn new() -> Self {
        Self {
            scripts: Mutex::new(HashMap::new()),
            counts: Mutex::new(HashMap::new()),
            connected: AtomicBool::new(true),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn serve(&self, url: &str, body: &[u8], content_type: &str) {
        self.scripts.lock().insert(
            url.to_string(),
            Script::Ok {
                body: Bytes::copy_from_slice(body),
                content_type: content_type.to_string(),
            },
        );
    }

    pub fn status(&self, url: &str, status: u16) {
        self.scripts
            .lock()
            .insert(url.to_string(), Script::Status(status));
    }

    pub fn fail(&self, url: &str) {
        self.scripts
            .lock()
            .insert(url.to_string(), Script::ConnectionError);
    }

    pub fn flaky(&self, url: &str, failures: usize, body: &[u8], content_type: &str) {
        self.scripts.lock().insert(
            url.to_string(),
            Script::Flaky {
                remaining: failures,
                body: Bytes::copy_from_slice(body),
                content_type: content_type.to_string(),
            },
        );
    }

    pub fn slow(&self, url: &str, delay: Duration, body: &[u8], content_type: &str) {
        self.scripts.lock().insert(
            url.to_string(),
            Script::Slow {
                delay,
                body: Bytes::copy_from_slice(body),
                content_type: content_type.to_string(),
            },
        );
    }

    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    /// Number of times a URL was requested.
    pub fn request_count(&self, url: &str) -> usize {
        self.counts.lock().get(url).copied().unwrap_or(0)
    }

    /// Highest number of concurrently executing requests observed.
    pub fn peak_concurrency(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    fn decide(&self, url: &str) -> Action {
        *self.counts.lock().entry(url.to_string()).or_insert(0) += 1;

        let mut scripts = self.scripts.lock();
        match scripts.get_mut(url) {
            None => Action::Respond {
                status: 404,
                content_type: None,
                body: Bytes::new(),
            },
            Some(Script::Ok { body, content_type }) => Action::Respond {
                status: 200,
                content_type: Some(content_type.clone()),
                body: body.clone(),
            },
            Some(Script::Status(status)) => Action::Respond {
                status: *status,
                content_type: None,
                body: Bytes::new(),
            },
            Some(Script::ConnectionError) => {
                Action::Error(format!("connection refused: {}", url))
            }
            Some(Script::Flaky {
                remaining,
                body,
                content_type,
            }) => {
                if *remaining > 0 {
                    *remaining -= 1;
                    Action::Error(format!("connection reset: {}", url))
                } else {
                    Action::Respond {
                        status: 200,
                        content_type: Some(content_type.clone()),
                        body: body.clone(),
                    }
                }
            }
            Some(Script::Slow {
                delay,
                body,
                content_type,
            }) => Action::Delay {
                delay: *delay,
                body: body.clone(),
                content_type: content_type.clone(),
            },
        }
    }
}

#[async_trait]
impl HttpClient for FakeHttpClient {
    async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse> {
        let in_flight = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(in_flight, Ordering::SeqCst);

        let action = self.decide(&request.url);
        let result = match action {
            Action::Respond {
                status,
                content_type,
                body,
            } => {
                let mut headers = HashMap::new();
                if let Some(content_type) = content_type {
                    headers.insert("Content-Type".to_string(), content_type);
                }
                Ok(HttpResponse {
                    status,
                    headers,
                    body,
                })
            }
            Action::Error(message) => Err(BridgeError::OperationFailed(message)),
            Action::Delay {
                delay,
                body,
                content_type,
            } => {
                tokio::time::sleep(delay).await;
                let mut headers = HashMap::new();
                headers.insert("Content-Type".to_string(), content_type);
                Ok(HttpResponse {
                    status: 200,
                    headers,
                    body,
                })
            }
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }

    async fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

// ============================================================================
// Fake file system
// ============================================================================

/// In-memory file system rooted at `/fake-cache`.
#[derive(Default)]
pub struct FakeFileSystem {
    files: Mutex<HashMap<PathBuf, Bytes>>,
}

impl FakeFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root() -> PathBuf {
        PathBuf::from("/fake-cache")
    }

    pub fn file_count(&self) -> usize {
        self.files.lock().len()
    }

    pub fn has_file(&self, path: &Path) -> bool {
        self.files.lock().contains_key(path)
    }

    fn not_found(path: &Path) -> BridgeError {
        BridgeError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("no such file: {}", path.display()),
        ))
    }
}

#[async_trait]
impl FileSystemAccess for FakeFileSystem {
    async fn get_cache_directory(&self) -> BridgeResult<PathBuf> {
        Ok(Self::root())
    }

    async fn exists(&self, path: &Path) -> BridgeResult<bool> {
        let files = self.files.lock();
        Ok(files.contains_key(path) || files.keys().any(|p| p.starts_with(path)))
    }

    async fn metadata(&self, path: &Path) -> BridgeResult<FileMetadata> {
        let files = self.files.lock();
        if let Some(data) = files.get(path) {
            return Ok(FileMetadata {
                size: data.len() as u64,
                created_at: None,
                modified_at: None,
                is_directory: false,
            });
        }
        if files.keys().any(|p| p.starts_with(path)) {
            return Ok(FileMetadata {
                size: 0,
                created_at: None,
                modified_at: None,
                is_directory: true,
            });
        }
        Err(Self::not_found(path))
    }

    async fn create_dir_all(&self, _path: &Path) -> BridgeResult<()> {
        // Directories are implicit in the in-memory map.
        Ok(())
    }

    async fn read_file(&self, path: &Path) -> BridgeResult<Bytes> {
        self.files
            .lock()
            .get(path)
            .cloned()
            .ok_or_else(|| Self::not_found(path))
    }

    async fn write_file(&self, path: &Path, data: Bytes) -> BridgeResult<()> {
        self.files.lock().insert(path.to_path_buf(), data);
        Ok(())
    }

    async fn delete_file(&self, path: &Path) -> BridgeResult<()> {
        self.files
            .lock()
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| Self::not_found(path))
    }

    async fn delete_dir_all(&self, path: &Path) -> BridgeResult<()> {
        self.files.lock().retain(|p, _| !p.starts_with(path));
        Ok(())
    }

    async fn list_directory(&self, path: &Path) -> BridgeResult<Vec<PathBuf>> {
        Ok(self
            .files
            .lock()
            .keys()
            .filter(|p| p.parent() == Some(path))
            .cloned()
            .collect())
    }
}

// ============================================================================
// Fixture helpers
// ============================================================================

/// A file-backed item pointing at `url`.
pub fn media_item(title: &str, url: &str, media_type: &str) -> ContentItem {
    ContentItem::new_media(
        title,
        Some(RemoteFile::new(url).with_media_type(media_type)),
    )
}

/// A file-backed item with no remote reference at all.
pub fn orphan_media_item(title: &str) -> ContentItem {
    ContentItem::new_media(title, None)
}
