//! Classification of chunks returned by the engine's poll call.

use serde::Deserialize;

/// Prefix of every streamed delta.
pub const STREAM_PREFIX: &str = "data:";

/// End-of-stream sentinel.
pub const STREAM_END: &str = "data: [DONE]";

/// Out-of-band error reported by the engine instead of a delta.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EngineErrorFrame {
    pub code: i64,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// One polled chunk, classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame<'a> {
    /// No output ready yet.
    Pending,
    /// The task finished.
    Done,
    /// A delta payload with the stream prefix removed.
    Data(&'a str),
    /// The engine reported an error.
    Error(EngineErrorFrame),
    /// Neither a delta nor a decodable error.
    Unrecognized(&'a str),
}

impl<'a> Frame<'a> {
    pub fn parse(chunk: &'a str) -> Self {
        if chunk.is_empty() {
            return Self::Pending;
        }
        if chunk.starts_with(STREAM_END) {
            return Self::Done;
        }
        if let Some(payload) = chunk.strip_prefix(STREAM_PREFIX) {
            return Self::Data(payload);
        }
        serde_json::from_str::<EngineErrorFrame>(chunk)
            .map_or(Self::Unrecognized(chunk), Self::Error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_chunks() {
        assert_eq!(Frame::parse(""), Frame::Pending);
        assert_eq!(Frame::parse("data: [DONE]"), Frame::Done);
        assert_eq!(Frame::parse("data: [DONE]\n\n"), Frame::Done);
        assert_eq!(Frame::parse("data:{\"x\":1}"), Frame::Data("{\"x\":1}"));
        assert_eq!(Frame::parse("data: {\"x\":1}"), Frame::Data(" {\"x\":1}"));
        assert_eq!(Frame::parse("garbage"), Frame::Unrecognized("garbage"));
    }

    #[test]
    fn decodes_error_frame() {
        let frame = Frame::parse(r#"{"code":500,"message":"oom","type":"server_error","extra":1}"#);
        assert_eq!(
            frame,
            Frame::Error(EngineErrorFrame {
                code: 500,
                message: "oom".into(),
                kind: "server_error".into(),
            })
        );
    }

    #[test]
    fn incomplete_error_is_unrecognized() {
        let chunk = r#"{"message":"oom"}"#;
        assert_eq!(Frame::parse(chunk), Frame::Unrecognized(chunk));
    }
}
