//! Mock EFA client for running without the live provider.
//!
//! Serves canned response bodies, either loaded from a directory or
//! supplied in memory. Bodies are decoded per request with the same rules
//! as the live client, so a malformed canned body produces a decode error
//! just like a malformed upstream response.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::Value;
use tokio::sync::RwLock;

use super::api::{EfaApi, StopFinderRequest};
use super::client::decode_object;
use super::error::EfaError;

/// File name of the canned stop-finder response inside a mock directory.
const STOP_FINDER_FILE: &str = "stopfinder.json";

/// Mock EFA client that serves canned JSON bodies.
///
/// Departure boards are keyed by stop id. Unknown stops answer with a
/// 404 upstream error.
#[derive(Clone, Default)]
pub struct MockEfaClient {
    boards: Arc<RwLock<HashMap<String, String>>>,
    stop_finder: Arc<RwLock<Option<String>>>,
    board_requests: Arc<AtomicUsize>,
    last_stop_finder: Arc<Mutex<Option<StopFinderRequest>>>,
}

impl MockEfaClient {
    /// Create an empty mock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a mock from a directory.
    ///
    /// Every `{stopId}.json` file becomes a departure board, except
    /// `stopfinder.json`, which answers every stop search.
    pub fn from_dir(data_dir: impl AsRef<Path>) -> Result<Self, EfaError> {
        let data_dir = data_dir.as_ref();
        let mut boards = HashMap::new();
        let mut stop_finder = None;

        let entries = std::fs::read_dir(data_dir).map_err(|e| {
            EfaError::NotConfigured(format!("failed to read mock data directory: {e}"))
        })?;

        for entry in entries {
            let entry = entry.map_err(|e| {
                EfaError::NotConfigured(format!("failed to read directory entry: {e}"))
            })?;

            let path = entry.path();
            if !path.is_file() || path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }

            let body = std::fs::read_to_string(&path)
                .map_err(|e| EfaError::NotConfigured(format!("failed to read {path:?}: {e}")))?;

            if path.file_name().and_then(|s| s.to_str()) == Some(STOP_FINDER_FILE) {
                stop_finder = Some(body);
                continue;
            }

            let stop_id = path
                .file_stem()
                .and_then(|s| s.to_str())
                .ok_or_else(|| EfaError::NotConfigured(format!("invalid filename: {path:?}")))?;

            boards.insert(stop_id.to_string(), body);
        }

        if boards.is_empty() && stop_finder.is_none() {
            return Err(EfaError::NotConfigured(format!(
                "no mock files found in {data_dir:?}"
            )));
        }

        Ok(Self {
            boards: Arc::new(RwLock::new(boards)),
            stop_finder: Arc::new(RwLock::new(stop_finder)),
            ..Self::default()
        })
    }

    /// Serve `board` for `stop_id`.
    pub fn with_board(self, stop_id: impl Into<String>, board: &Value) -> Self {
        self.with_raw_board(stop_id, board.to_string())
    }

    /// Serve a raw, possibly malformed, body for `stop_id`.
    pub fn with_raw_board(self, stop_id: impl Into<String>, body: impl Into<String>) -> Self {
        // Builder use happens before the mock is shared.
        if let Ok(mut boards) = self.boards.try_write() {
            boards.insert(stop_id.into(), body.into());
        }
        self
    }

    /// Serve `response` for every stop search.
    pub fn with_stop_finder(self, response: &Value) -> Self {
        if let Ok(mut slot) = self.stop_finder.try_write() {
            *slot = Some(response.to_string());
        }
        self
    }

    /// Number of departure boards fetched so far.
    pub fn board_requests(&self) -> usize {
        self.board_requests.load(Ordering::SeqCst)
    }

    /// The most recent stop-finder request, if any.
    pub fn last_stop_finder_request(&self) -> Option<StopFinderRequest> {
        self.last_stop_finder
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or(None)
    }

    /// Stop ids with a canned board.
    pub async fn available_stops(&self) -> Vec<String> {
        let boards = self.boards.read().await;
        let mut ids: Vec<String> = boards.keys().cloned().collect();
        ids.sort();
        ids
    }
}

impl EfaApi for MockEfaClient {
    async fn stop_finder(&self, request: &StopFinderRequest) -> Result<Value, EfaError> {
        if let Ok(mut last) = self.last_stop_finder.lock() {
            *last = Some(request.clone());
        }

        let body = self.stop_finder.read().await.clone();
        match body {
            Some(body) => decode_object(&body),
            None => Err(EfaError::NotConfigured(
                "no mock stop finder response".to_string(),
            )),
        }
    }

    async fn departure_board(&self, stop_id: &str) -> Result<Value, EfaError> {
        self.board_requests.fetch_add(1, Ordering::SeqCst);

        let boards = self.boards.read().await;
        let body = boards.get(stop_id).ok_or_else(|| EfaError::Upstream {
            status: 404,
            message: format!("no mock board for stop {stop_id}"),
        })?;

        decode_object(body)
    }
}
