//! Persistence adapter for the content API
//!
//! The backend is a file-backed JSON store with list/save/restore
//! endpoints; each save of changed content also leaves a timestamped
//! backup on the server side, which `restore_backup` can bring back.
//!
//! Saves are two-phase: the collection is written ahead to the local
//! cache with a pending-sync marker, then pushed to the remote API. A
//! failed remote push is reported to the caller as an unsynced save, not
//! an error, and the marker survives until a later push succeeds. Loads
//! degrade from the admin API to the public static mirror to the local
//! cache to an empty list; the UI must handle the empty state.

use crate::bilingual;
use crate::core::{ApiConfig, Error, Record, RecordSchema, Result};
use crate::db::CacheDb;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Outcome of a save. `remote_ok == false` means the edits only reached
/// the local cache; the operator must be told the backend does not have
/// them yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveReport {
    pub remote_ok: bool,
    pub pending_sync: bool,
}

/// Where a load actually got its records from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    Remote,
    StaticMirror,
    Cache,
    Empty,
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    ok: bool,
    #[serde(default)]
    data: Vec<serde_json::Value>,
}

#[derive(Debug, Serialize)]
struct SavePayload<'a> {
    data: &'a [Record],
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct SaveResponse {
    #[serde(default)]
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RestoreResponse {
    #[serde(default)]
    ok: bool,
    #[serde(default)]
    restored: Option<String>,
}

/// Client for the content API with local write-ahead caching
pub struct ContentStore {
    client: reqwest::Client,
    config: ApiConfig,
    cache: CacheDb,
}

impl ContentStore {
    pub fn new(config: ApiConfig, cache: CacheDb) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            config,
            cache,
        })
    }

    /// Load a resource's records, migrated to the normalized bilingual
    /// shape. Never fails: unreachable backends degrade through the
    /// static mirror and the local cache down to an empty list.
    pub async fn load(&self, resource: &str) -> Vec<Record> {
        self.load_with_source(resource).await.0
    }

    /// Like [`load`](Self::load), but also reports where the records came
    /// from so the caller can warn the operator about a cache fallback.
    pub async fn load_with_source(&self, resource: &str) -> (Vec<Record>, LoadSource) {
        let schema = match RecordSchema::for_resource(resource) {
            Some(s) => s,
            None => {
                log::warn!("unknown resource '{}', returning empty list", resource);
                return (Vec::new(), LoadSource::Empty);
            }
        };

        match self.load_remote(resource).await {
            Ok(raw) => return (schema.migrate_all(&raw), LoadSource::Remote),
            Err(e) => log::warn!("content API load failed for '{}': {}", resource, e),
        }

        match self.load_static(resource).await {
            Ok(raw) => return (schema.migrate_all(&raw), LoadSource::StaticMirror),
            Err(e) => log::warn!("static mirror load failed for '{}': {}", resource, e),
        }

        match self.cache.get(resource) {
            Ok(Some(cached)) => {
                log::info!(
                    "serving '{}' from local cache (saved_at={})",
                    resource,
                    cached.saved_at
                );
                (cached.records, LoadSource::Cache)
            }
            Ok(None) => (Vec::new(), LoadSource::Empty),
            Err(e) => {
                log::warn!("cache read failed for '{}': {}", resource, e);
                (Vec::new(), LoadSource::Empty)
            }
        }
    }

    async fn load_remote(&self, resource: &str) -> Result<Vec<serde_json::Value>> {
        let url = format!("{}/api/content/{}/list", self.config.base_url, resource);
        let response = self
            .client
            .get(&url)
            .header("x-admin-token", &self.config.admin_token)
            .send()
            .await?
            .error_for_status()?;

        let body: ListResponse = response.json().await?;
        if !body.ok {
            return Err(Error::Api(format!("list endpoint returned ok=false for '{}'", resource)));
        }
        Ok(body.data)
    }

    async fn load_static(&self, resource: &str) -> Result<Vec<serde_json::Value>> {
        let url = format!("{}/{}.json", self.config.static_url, resource);
        let response = self.client.get(&url).send().await?.error_for_status()?;
        Ok(response.json().await?)
    }

    /// Save a full collection.
    ///
    /// An empty collection is rejected before any write unless
    /// `allow_empty` is set; a collection wipe must be deliberate. The
    /// save-time bilingual fallback runs here, on every save path, so a
    /// record never persists with an empty English slot next to Spanish
    /// content. The records are cached locally first, then pushed to the
    /// API; a failed push returns an Ok report with `remote_ok == false`
    /// so the caller can warn the operator without losing the edits.
    pub async fn save(
        &self,
        resource: &str,
        records: &[Record],
        allow_empty: bool,
        message: Option<&str>,
    ) -> Result<SaveReport> {
        if records.is_empty() && !allow_empty {
            return Err(Error::EmptyCollection(resource.to_string()));
        }

        let prepared: Vec<Record> = records.iter().map(bilingual::prepare_for_save).collect();

        self.cache.put(resource, &prepared, true)?;

        match self.save_remote(resource, &prepared, allow_empty, message).await {
            Ok(()) => {
                self.cache.mark_synced(resource)?;
                Ok(SaveReport {
                    remote_ok: true,
                    pending_sync: false,
                })
            }
            Err(Error::Api(msg)) => {
                // A rejection is a verdict, not an outage: keep the edits
                // cached but do not queue them for blind re-push.
                self.cache.put(resource, &prepared, false)?;
                Err(Error::Api(msg))
            }
            Err(e) => {
                log::warn!("remote save failed for '{}', edits kept in local cache: {}", resource, e);
                Ok(SaveReport {
                    remote_ok: false,
                    pending_sync: true,
                })
            }
        }
    }

    async fn save_remote(
        &self,
        resource: &str,
        records: &[Record],
        allow_empty: bool,
        message: Option<&str>,
    ) -> Result<()> {
        let mut url = format!("{}/api/content/{}/save", self.config.base_url, resource);
        if allow_empty {
            url.push_str("?allow_empty=true");
        }

        let payload = SavePayload {
            data: records,
            message,
        };
        let response = self
            .client
            .post(&url)
            .header("x-admin-token", &self.config.admin_token)
            .json(&payload)
            .send()
            .await?;

        // A response we actually received is a verdict, not an outage:
        // semantic rejections surface as Api errors instead of the
        // pending-sync path.
        if !response.status().is_success() {
            let status = response.status();
            let body: SaveResponse = response.json().await.unwrap_or(SaveResponse {
                ok: false,
                error: None,
            });
            return Err(Error::Api(
                body.error
                    .unwrap_or_else(|| format!("save rejected with status {}", status)),
            ));
        }

        let body: SaveResponse = response.json().await?;
        if !body.ok {
            return Err(Error::Api(
                body.error.unwrap_or_else(|| "save returned ok=false".to_string()),
            ));
        }

        Ok(())
    }

    /// Ask the backend to restore a previous timestamped backup of a
    /// resource. Returns the name of the restored backup.
    pub async fn restore_backup(&self, resource: &str, backup_file: &str) -> Result<String> {
        let url = format!("{}/api/content/{}/restore", self.config.base_url, resource);
        let body = serde_json::json!({ "file": backup_file });

        let response = self
            .client
            .post(&url)
            .header("x-admin-token", &self.config.admin_token)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        let body: RestoreResponse = response.json().await?;
        if !body.ok {
            return Err(Error::Api(format!("restore rejected for '{}'", resource)));
        }

        body.restored
            .ok_or_else(|| Error::Api("restore response missing filename".to_string()))
    }

    /// Retry the remote push for every collection the cache still holds
    /// as pending. Returns the resources that synced this round.
    pub async fn sync_pending(&self) -> Result<Vec<String>> {
        let mut synced = Vec::new();

        for resource in self.cache.pending_resources()? {
            let cached = match self.cache.get(&resource)? {
                Some(c) => c,
                None => continue,
            };

            // An empty pending payload can only exist if the original
            // save was explicitly allowed to be empty.
            match self
                .save_remote(&resource, &cached.records, cached.records.is_empty(), None)
                .await
            {
                Ok(()) => {
                    self.cache.mark_synced(&resource)?;
                    synced.push(resource);
                }
                Err(Error::Api(msg)) => {
                    log::warn!(
                        "sync rejected for '{}', dropping from retry queue: {}",
                        resource,
                        msg
                    );
                    self.cache.put(&resource, &cached.records, false)?;
                }
                Err(e) => {
                    log::warn!("sync retry failed for '{}': {}", resource, e);
                }
            }
        }

        Ok(synced)
    }

    /// Read-only view of the local cache
    pub fn cache(&self) -> &CacheDb {
        &self.cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    fn store_with(base_url: &str) -> ContentStore {
        let config = ApiConfig {
            base_url: base_url.to_string(),
            static_url: format!("{}/content", base_url),
            admin_token: String::new(),
            timeout_secs: 2,
        };
        let conn = Connection::open_in_memory().unwrap();
        let cache = CacheDb::from_connection(conn).unwrap();
        ContentStore::new(config, cache).unwrap()
    }

    fn unreachable_store() -> ContentStore {
        // Port 9 (discard) refuses connections immediately on loopback
        store_with("http://127.0.0.1:9")
    }

    /// Minimal HTTP server answering exactly one request, for exercising
    /// paths that need a real response rather than a connection failure.
    fn one_shot_server(status: &str, body: &str) -> String {
        use std::io::{Read, Write};

        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );

        std::thread::spawn(move || {
            let (mut stream, _) = match listener.accept() {
                Ok(s) => s,
                Err(_) => return,
            };

            // Drain the full request before answering so the client
            // never sees a reset mid-write.
            let mut data = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = match stream.read(&mut buf) {
                    Ok(0) | Err(_) => break,
                    Ok(n) => n,
                };
                data.extend_from_slice(&buf[..n]);
                if let Some(end) = data.windows(4).position(|w| w == b"\r\n\r\n") {
                    let headers = String::from_utf8_lossy(&data[..end]).to_ascii_lowercase();
                    let body_len = headers
                        .lines()
                        .find_map(|l| l.strip_prefix("content-length:"))
                        .and_then(|v| v.trim().parse::<usize>().ok())
                        .unwrap_or(0);
                    if data.len() >= end + 4 + body_len {
                        break;
                    }
                }
            }

            let _ = stream.write_all(response.as_bytes());
        });

        format!("http://{}", addr)
    }

    fn records(ids: &[&str]) -> Vec<Record> {
        ids.iter()
            .enumerate()
            .map(|(i, id)| {
                let mut r = Record::new(*id);
                r.order = i as u32 + 1;
                r
            })
            .collect()
    }

    #[tokio::test]
    async fn test_empty_save_rejected_without_override() {
        let store = unreachable_store();

        let result = store.save("products", &[], false, None).await;
        assert!(matches!(result, Err(Error::EmptyCollection(_))));
        // guard fires before any write
        assert!(store.cache().get("products").unwrap().is_none());
    }

    #[tokio::test]
    async fn test_empty_save_accepted_with_override() {
        let store = unreachable_store();

        let report = store.save("products", &[], true, None).await.unwrap();
        // remote is down, but the deliberate wipe reached the cache
        assert!(!report.remote_ok);
        assert!(report.pending_sync);
        let cached = store.cache().get("products").unwrap().unwrap();
        assert!(cached.records.is_empty());
        assert!(cached.pending_sync);
    }

    #[tokio::test]
    async fn test_failed_remote_save_keeps_edits_pending() {
        let store = unreachable_store();

        let report = store
            .save("team", &records(&["t1", "t2"]), false, Some("edit"))
            .await
            .unwrap();
        assert!(!report.remote_ok);
        assert!(report.pending_sync);

        let cached = store.cache().get("team").unwrap().unwrap();
        assert_eq!(cached.records.len(), 2);
        assert!(cached.pending_sync);
        assert_eq!(store.cache().pending_resources().unwrap(), vec!["team"]);
    }

    #[tokio::test]
    async fn test_load_falls_back_to_cache_then_empty() {
        let store = unreachable_store();

        // nothing cached: empty list, no error
        let (loaded, source) = store.load_with_source("products").await;
        assert!(loaded.is_empty());
        assert_eq!(source, LoadSource::Empty);

        store.cache().put("products", &records(&["p1"]), true).unwrap();
        let (loaded, source) = store.load_with_source("products").await;
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, "p1");
        assert_eq!(source, LoadSource::Cache);
    }

    #[tokio::test]
    async fn test_unknown_resource_loads_empty() {
        let store = unreachable_store();
        assert!(store.load("unknown").await.is_empty());
    }

    #[tokio::test]
    async fn test_save_fills_empty_english_slots() {
        let store = unreachable_store();

        // a migrated legacy record archived without further editing
        let schema = RecordSchema::products();
        let raw = serde_json::json!({"id": "p1", "order": 1, "name": "Analizador"});
        let migrated = vec![schema.migrate_record(&raw)];
        let archived = crate::order::archive(&migrated, "p1");

        let _ = store.save("products", &archived, false, None).await.unwrap();

        let cached = store.cache().get("products").unwrap().unwrap();
        let name = cached.records[0]
            .field("name")
            .and_then(|f| f.as_text())
            .unwrap();
        assert_eq!(name.es, "Analizador");
        assert_eq!(name.en, "Analizador");
    }

    #[tokio::test]
    async fn test_rejected_save_is_not_queued_for_retry() {
        let base = one_shot_server("400 Bad Request", r#"{"ok":false,"error":"bad payload"}"#);
        let store = store_with(&base);

        let result = store.save("products", &records(&["p1"]), false, None).await;
        assert!(matches!(result, Err(Error::Api(_))));

        // the edits stay cached, but a rejection is final: no retry queue
        let cached = store.cache().get("products").unwrap().unwrap();
        assert_eq!(cached.records.len(), 1);
        assert!(!cached.pending_sync);
        assert!(store.cache().pending_resources().unwrap().is_empty());
    }
}
