//! Stream Model

use serde::Serialize;

/// A live stream, or the details subset of a Twitch user.
///
/// User details only carry `user_id` and `login`; the remaining fields are
/// omitted from JSON when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stream {
    /// Broadcaster user ID.
    pub user_id: u64,
    /// Broadcaster login name.
    pub login: String,
    /// Game being streamed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game_id: Option<u64>,
    /// Broadcast language (ISO 639-1).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Current viewer count.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub viewer_count: Option<u64>,
}

impl Stream {
    /// Create the details subset for a user.
    #[must_use]
    pub fn details(user_id: u64, login: impl Into<String>) -> Self {
        Self {
            user_id,
            login: login.into(),
            game_id: None,
            language: None,
            viewer_count: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn details_omit_stream_fields() {
        let json = serde_json::to_value(Stream::details(12_826, "twitch")).unwrap();
        let object = json.as_object().unwrap();

        assert_eq!(object.len(), 2);
        assert_eq!(json["user_id"], 12_826);
        assert_eq!(json["login"], "twitch");
    }

    #[test]
    fn live_stream_serializes_all_fields() {
        let stream = Stream {
            user_id: 1,
            login: "someone".to_string(),
            game_id: Some(499_973),
            language: Some("en".to_string()),
            viewer_count: Some(42),
        };
        let json = serde_json::to_value(&stream).unwrap();

        assert_eq!(json["game_id"], 499_973);
        assert_eq!(json["language"], "en");
        assert_eq!(json["viewer_count"], 42);
    }
}
