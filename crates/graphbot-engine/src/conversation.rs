//! Conversation state: the append-only record list and the submission lifecycle.
//!
//! A submission is split in two so the network call can run elsewhere:
//! [`Conversation::begin_submit`] appends the user record and hands out a
//! [`PendingRequest`]; [`Conversation::complete`] applies the backend result
//! for that request's token. [`Conversation::submit`] does both in one call.

use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::backend::{BackendError, ChatBackend};
use crate::config::StaleResponsePolicy;
use crate::protocol::{
    GenerateRequest, GenerateResponse, MessagePart, PartKind, FALLBACK_ERROR_TEXT,
    TRANSPORT_ERROR_TEXT,
};
use crate::record::{DisplayRecord, RecordKind};

/// Identifies one submission.
///
/// `epoch` is bumped by every [`Conversation::clear`], so a token from before
/// a clear can be recognized when its response arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct RequestToken {
    pub seq: u64,
    pub epoch: u64,
}

/// A submission waiting for its response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRequest {
    pub token: RequestToken,
    /// Trimmed user text.
    pub query: String,
}

impl PendingRequest {
    /// Request body for this submission.
    pub fn request(&self) -> GenerateRequest {
        GenerateRequest::new(self.query.clone())
    }
}

/// Lifecycle of the most recent submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmissionPhase {
    /// Nothing submitted yet, or the last response was discarded.
    #[default]
    Idle,
    /// A request is in flight.
    Pending { token: RequestToken },
    /// The last turn produced bot records (possibly none).
    Succeeded { token: RequestToken },
    /// The last turn produced an error record.
    Failed { token: RequestToken },
}

/// How a completed request was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionStatus {
    /// `success: true`; bot records appended.
    Answered,
    /// `success: false`; one error record appended.
    Rejected,
    /// Transport, status or decode failure; one error record appended.
    TransportFailed,
    /// Response predates the latest clear and was dropped.
    Stale,
    /// Token is not the pending one; nothing changed.
    Superseded,
}

/// Result of [`Conversation::complete`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub status: CompletionStatus,
    /// Number of records appended.
    pub appended: usize,
    /// Part tags that were not recognized and therefore not rendered.
    pub ignored_parts: Vec<String>,
}

impl Completion {
    fn nothing(status: CompletionStatus) -> Self {
        Self {
            status,
            appended: 0,
            ignored_parts: Vec::new(),
        }
    }
}

/// The conversation owned by one view.
#[derive(Debug)]
pub struct Conversation {
    session_id: String,
    records: Vec<DisplayRecord>,
    phase: SubmissionPhase,
    stale_policy: StaleResponsePolicy,
    next_record_id: u64,
    next_seq: u64,
    epoch: u64,
    /// Bumped on every change to `records`.
    revision: u64,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new(StaleResponsePolicy::default())
    }
}

impl Conversation {
    /// Create an empty conversation.
    pub fn new(stale_policy: StaleResponsePolicy) -> Self {
        Self {
            session_id: Uuid::new_v4().to_string(),
            records: Vec::new(),
            phase: SubmissionPhase::Idle,
            stale_policy,
            next_record_id: 1,
            next_seq: 1,
            epoch: 0,
            revision: 0,
        }
    }

    /// Records in arrival order.
    pub fn records(&self) -> &[DisplayRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn phase(&self) -> SubmissionPhase {
        self.phase
    }

    /// Whether a request is in flight.
    pub fn awaiting_response(&self) -> bool {
        matches!(self.phase, SubmissionPhase::Pending { .. })
    }

    /// Counter that changes whenever the record list changes.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Whether `text` would be accepted by [`Self::begin_submit`].
    pub fn can_submit(&self, text: &str) -> bool {
        !self.awaiting_response() && !text.trim().is_empty()
    }

    /// The most recent bot record, if any.
    pub fn last_bot_record(&self) -> Option<&DisplayRecord> {
        self.records.iter().rev().find(|r| r.kind().is_bot())
    }

    /// Start a submission.
    ///
    /// Returns `None` without touching any state when the trimmed text is
    /// empty or a request is already pending. Otherwise appends the user
    /// record and moves to `Pending`.
    pub fn begin_submit(&mut self, text: &str) -> Option<PendingRequest> {
        if !self.can_submit(text) {
            return None;
        }

        let query = text.trim().to_string();
        let token = RequestToken {
            seq: self.next_seq,
            epoch: self.epoch,
        };
        self.next_seq += 1;

        self.append(RecordKind::User, query.clone());
        self.phase = SubmissionPhase::Pending { token };

        info!(
            session = %self.session_id,
            seq = token.seq,
            chars = query.chars().count(),
            "Submitting query"
        );

        Some(PendingRequest { token, query })
    }

    /// Apply the backend result for `token`.
    ///
    /// Always releases the in-flight gate when `token` is the pending one.
    pub fn complete(
        &mut self,
        token: RequestToken,
        outcome: Result<GenerateResponse, BackendError>,
    ) -> Completion {
        if self.phase != (SubmissionPhase::Pending { token }) {
            debug!(seq = token.seq, "Ignoring response for superseded request");
            return Completion::nothing(CompletionStatus::Superseded);
        }

        if token.epoch != self.epoch && self.stale_policy == StaleResponsePolicy::Discard {
            debug!(seq = token.seq, "Discarding response for cleared conversation");
            self.phase = SubmissionPhase::Idle;
            return Completion::nothing(CompletionStatus::Stale);
        }

        let completion = match outcome {
            Ok(GenerateResponse {
                success: true,
                messages: Some(parts),
                ..
            }) => self.apply_parts(parts),
            Ok(GenerateResponse { success: true, .. }) => {
                warn!(session = %self.session_id, seq = token.seq, "Successful response has no message list");
                self.transport_failure()
            }
            Ok(response) => {
                let text = response
                    .error
                    .filter(|e| !e.is_empty())
                    .unwrap_or_else(|| FALLBACK_ERROR_TEXT.to_string());
                warn!(session = %self.session_id, seq = token.seq, error = %text, "Server reported failure");
                self.append(RecordKind::Error, text);
                Completion {
                    status: CompletionStatus::Rejected,
                    appended: 1,
                    ignored_parts: Vec::new(),
                }
            }
            Err(e) => {
                warn!(session = %self.session_id, seq = token.seq, error = %e, "Request failed");
                self.transport_failure()
            }
        };

        self.phase = match completion.status {
            CompletionStatus::Answered => SubmissionPhase::Succeeded { token },
            _ => SubmissionPhase::Failed { token },
        };

        info!(
            session = %self.session_id,
            seq = token.seq,
            status = ?completion.status,
            appended = completion.appended,
            "Turn completed"
        );

        completion
    }

    /// Remove every record. Does not affect a pending request.
    pub fn clear(&mut self) {
        self.records.clear();
        self.epoch += 1;
        self.revision += 1;
        debug!(session = %self.session_id, epoch = self.epoch, "Conversation cleared");
    }

    /// Run a whole submission against `backend`.
    ///
    /// Returns `None` if the text was not accepted.
    pub async fn submit(&mut self, backend: &dyn ChatBackend, text: &str) -> Option<Completion> {
        let pending = self.begin_submit(text)?;
        let outcome = backend.generate(&pending.request()).await;
        Some(self.complete(pending.token, outcome))
    }

    fn transport_failure(&mut self) -> Completion {
        self.append(RecordKind::Error, TRANSPORT_ERROR_TEXT.to_string());
        Completion {
            status: CompletionStatus::TransportFailed,
            appended: 1,
            ignored_parts: Vec::new(),
        }
    }

    fn apply_parts(&mut self, parts: Vec<MessagePart>) -> Completion {
        let mut appended = 0;
        let mut ignored_parts = Vec::new();

        for part in parts {
            match part.part_kind() {
                PartKind::Text => self.append(RecordKind::BotText, part.content),
                PartKind::Graph => self.append(RecordKind::BotImage, part.content),
                PartKind::Unknown(tag) => {
                    warn!(session = %self.session_id, part_type = %tag, "Dropping response part with unknown type");
                    ignored_parts.push(tag);
                    continue;
                }
            }
            appended += 1;
        }

        Completion {
            status: CompletionStatus::Answered,
            appended,
            ignored_parts,
        }
    }

    fn append(&mut self, kind: RecordKind, content: String) {
        let id = self.next_record_id;
        self.next_record_id += 1;
        let record = match kind {
            RecordKind::User => DisplayRecord::user(id, content),
            RecordKind::BotText => DisplayRecord::bot_text(id, content),
            RecordKind::BotImage => DisplayRecord::bot_image(id, content),
            RecordKind::Error => DisplayRecord::error(id, content),
        };
        self.records.push(record);
        self.revision += 1;
    }
}
