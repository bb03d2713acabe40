//! Per-image fetch status for graph records.
//!
//! Each image id is fetched at most once. A failed fetch stays failed and
//! its record shows the fixed notice in place of the image.

use std::collections::HashMap;

use graphbot_engine::{BackendError, DisplayRecord, ImagePayload};

/// Fetch status of one graph image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageStatus {
    /// Fetch requested, no answer yet.
    Loading,
    /// Image retrieved.
    Loaded { content_type: String, size: usize },
    /// Retrieval failed.
    Failed,
}

/// Image statuses keyed by image id.
#[derive(Debug, Default)]
pub struct ImageCache {
    entries: HashMap<String, ImageStatus>,
}

impl ImageCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Status for `image_id`, if a fetch was ever started.
    pub fn status(&self, image_id: &str) -> Option<&ImageStatus> {
        self.entries.get(image_id)
    }

    /// Image ids referenced by `records` that have never been fetched.
    ///
    /// Returned ids are marked [`ImageStatus::Loading`], so each is handed out once.
    pub fn claim_unfetched(&mut self, records: &[DisplayRecord]) -> Vec<String> {
        let mut claimed = Vec::new();
        for id in records.iter().filter_map(DisplayRecord::image_id) {
            if !self.entries.contains_key(id) {
                self.entries.insert(id.to_string(), ImageStatus::Loading);
                claimed.push(id.to_string());
            }
        }
        claimed
    }

    /// Record the outcome of a fetch.
    ///
    /// Outcomes for ids no longer tracked (dropped by a clear) are ignored.
    pub fn resolve(&mut self, image_id: &str, outcome: Result<ImagePayload, BackendError>) {
        let Some(entry) = self.entries.get_mut(image_id) else {
            tracing::debug!(image_id, "graph image no longer shown, result dropped");
            return;
        };
        *entry = match outcome {
            Ok(payload) => {
                tracing::debug!(image_id, bytes = payload.len(), "graph image loaded");
                ImageStatus::Loaded {
                    size: payload.len(),
                    content_type: payload.content_type,
                }
            }
            Err(e) => {
                tracing::warn!(image_id, error = %e, "graph image failed to load");
                ImageStatus::Failed
            }
        };
    }

    /// Forget every image not referenced by `records`.
    pub fn retain_referenced(&mut self, records: &[DisplayRecord]) {
        self.entries
            .retain(|id, _| records.iter().any(|r| r.image_id() == Some(id.as_str())));
    }
}

/// Human-readable byte size (`812 B`, `12.3 KiB`).
#[allow(clippy::cast_precision_loss)]
pub fn format_size(bytes: usize) -> String {
    const KIB: f64 = 1024.0;
    let b = bytes as f64;
    if b < KIB {
        format!("{bytes} B")
    } else if b < KIB * KIB {
        format!("{:.1} KiB", b / KIB)
    } else {
        format!("{:.1} MiB", b / (KIB * KIB))
    }
}
