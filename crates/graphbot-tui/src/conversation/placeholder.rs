//! Phase-aware placeholder text for the input bar.

use graphbot_engine::SubmissionPhase;

/// Placeholder text for the input bar in the given submission phase.
#[must_use]
pub fn input_placeholder(phase: SubmissionPhase) -> &'static str {
    match phase {
        SubmissionPhase::Idle | SubmissionPhase::Succeeded { .. } => "Type your message...",
        SubmissionPhase::Pending { .. } => "Waiting for response...",
        SubmissionPhase::Failed { .. } => "Type your message, or press Up to edit the last one...",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphbot_engine::RequestToken;

    const TOKEN: RequestToken = RequestToken { seq: 1, epoch: 0 };

    #[test]
    fn test_idle_placeholder() {
        assert_eq!(input_placeholder(SubmissionPhase::Idle), "Type your message...");
        assert_eq!(
            input_placeholder(SubmissionPhase::Succeeded { token: TOKEN }),
            "Type your message..."
        );
    }

    #[test]
    fn test_pending_placeholder() {
        assert_eq!(
            input_placeholder(SubmissionPhase::Pending { token: TOKEN }),
            "Waiting for response..."
        );
    }

    #[test]
    fn test_failed_placeholder_mentions_history() {
        assert!(input_placeholder(SubmissionPhase::Failed { token: TOKEN }).contains("Up"));
    }
}
