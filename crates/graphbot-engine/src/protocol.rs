//! Wire types for the response-generation service.

use serde::{Deserialize, Serialize};

/// Path of the response-generation endpoint, relative to the API base URL.
pub const GENERATE_PATH: &str = "/generate_response";

/// Path prefix under which generated graph images are served.
pub const GRAPH_PATH_PREFIX: &str = "/generated_graphs/";

/// File extension of generated graph images.
pub const GRAPH_EXTENSION: &str = "png";

/// Shown when the server reports a failure without a message.
pub const FALLBACK_ERROR_TEXT: &str = "An error occurred while generating the response.";

/// Shown when the request could not be completed at all.
pub const TRANSPORT_ERROR_TEXT: &str = "Failed to communicate with the server. Please try again.";

/// Shown in place of a graph image that failed to load.
pub const IMAGE_FAILED_TEXT: &str = "Failed to load graph image.";

/// Request body for [`GENERATE_PATH`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub query: String,
}

impl GenerateRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
        }
    }
}

/// Response body from [`GENERATE_PATH`].
///
/// A missing `success` reads as `false`. `messages` stays optional so a
/// success without a message list can be told apart from an empty one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub success: bool,
    /// Ordered response parts. Absent on most failure responses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub messages: Option<Vec<MessagePart>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GenerateResponse {
    /// A successful response with the given parts.
    pub fn ok(messages: Vec<MessagePart>) -> Self {
        Self {
            success: true,
            messages: Some(messages),
            error: None,
        }
    }

    /// An application-reported failure.
    pub fn failed(error: Option<String>) -> Self {
        Self {
            success: false,
            messages: None,
            error,
        }
    }
}

/// One entry in a response's ordered message list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessagePart {
    /// Part tag as sent by the server (`text` or `graph`).
    #[serde(rename = "type")]
    pub kind: String,
    /// Markdown text, or an image id for graphs.
    pub content: String,
}

impl MessagePart {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            kind: "text".into(),
            content: content.into(),
        }
    }

    pub fn graph(image_id: impl Into<String>) -> Self {
        Self {
            kind: "graph".into(),
            content: image_id.into(),
        }
    }

    /// Classify the part tag.
    pub fn part_kind(&self) -> PartKind {
        PartKind::classify(&self.kind)
    }
}

/// Recognized part tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartKind {
    Text,
    Graph,
    /// Any other tag; carried so it can be reported.
    Unknown(String),
}

impl PartKind {
    pub fn classify(tag: &str) -> Self {
        match tag {
            "text" => Self::Text,
            "graph" => Self::Graph,
            other => Self::Unknown(other.to_string()),
        }
    }
}

/// Relative path of the image for `image_id`.
pub fn image_path(image_id: &str) -> String {
    format!("{GRAPH_PATH_PREFIX}{image_id}.{GRAPH_EXTENSION}")
}

/// Absolute retrieval URL of the image for `image_id`.
pub fn image_url(api_base_url: &str, image_id: &str) -> String {
    format!("{}{}", api_base_url.trim_end_matches('/'), image_path(image_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let json = serde_json::to_string(&GenerateRequest::new("plot sin(x)")).unwrap();
        insta::assert_snapshot!(json, @r#"{"query":"plot sin(x)"}"#);
    }

    #[test]
    fn test_parse_success_response() {
        let body = r#"{"success":true,"messages":[{"type":"text","content":"A"},{"type":"graph","content":"42"}]}"#;
        let parsed: GenerateResponse = serde_json::from_str(body).unwrap();
        assert!(parsed.success);
        assert_eq!(
            parsed.messages,
            Some(vec![MessagePart::text("A"), MessagePart::graph("42")])
        );
        assert!(parsed.error.is_none());
    }

    #[test]
    fn test_parse_failure_without_messages() {
        let parsed: GenerateResponse = serde_json::from_str(r#"{"success":false}"#).unwrap();
        assert!(!parsed.success);
        assert!(parsed.messages.is_none());
        assert!(parsed.error.is_none());
    }

    #[test]
    fn test_parse_failure_with_error_and_messages() {
        // The server sends both on internal errors.
        let body = r#"{"success":false,"messages":[{"type":"text","content":"Error processing request: x"}],"error":"x"}"#;
        let parsed: GenerateResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.error.as_deref(), Some("x"));
        assert_eq!(parsed.messages.map(|m| m.len()), Some(1));
    }

    #[test]
    fn test_missing_success_reads_as_failure() {
        let parsed: GenerateResponse =
            serde_json::from_str(r#"{"error":"rate limited"}"#).unwrap();
        assert_eq!(parsed, GenerateResponse::failed(Some("rate limited".into())));
    }

    #[test]
    fn test_success_without_messages_keeps_list_absent() {
        let parsed: GenerateResponse = serde_json::from_str(r#"{"success":true}"#).unwrap();
        assert!(parsed.success);
        assert!(parsed.messages.is_none());

        let empty: GenerateResponse =
            serde_json::from_str(r#"{"success":true,"messages":[]}"#).unwrap();
        assert_eq!(empty.messages, Some(Vec::new()));
    }

    #[test]
    fn test_classify_part_kinds() {
        assert_eq!(PartKind::classify("text"), PartKind::Text);
        assert_eq!(PartKind::classify("graph"), PartKind::Graph);
        assert_eq!(
            PartKind::classify("table"),
            PartKind::Unknown("table".into())
        );
        // Tags are case-sensitive.
        assert_eq!(PartKind::classify("Text"), PartKind::Unknown("Text".into()));
    }

    #[test]
    fn test_image_path() {
        assert_eq!(image_path("42"), "/generated_graphs/42.png");
    }

    #[test]
    fn test_image_url() {
        assert_eq!(
            image_url("http://localhost:5001/", "42"),
            "http://localhost:5001/generated_graphs/42.png"
        );
    }
}
