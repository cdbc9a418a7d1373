//! Inbound frame decoding.
//!
//! Every frame from the relay is one JSON object
//! `{"type": "<kind>", "payload": <any>}`. Decoding classifies a frame as a
//! known envelope, a frame of a type this client does not know, or garbage.
//! Only the first reaches subscribers.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The closed set of message types the relay sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    /// Account summary.
    AccountInfo,
    /// Open positions.
    Positions,
    /// Profit and loss snapshot.
    Pnl,
}

impl MessageType {
    /// Every known message type.
    pub const ALL: [Self; 3] = [Self::AccountInfo, Self::Positions, Self::Pnl];

    /// Returns the wire name of the type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AccountInfo => "account_info",
            Self::Positions => "positions",
            Self::Pnl => "pnl",
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing a wire name that is not a known type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown message type '{0}'")]
pub struct UnknownMessageType(pub String);

impl FromStr for MessageType {
    type Err = UnknownMessageType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownMessageType(s.to_string()))
    }
}

/// One decoded inbound frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    /// Declared message type.
    pub kind: MessageType,
    /// Payload, passed through untouched. `Null` when the frame had none.
    pub payload: Value,
}

impl Envelope {
    /// Creates an envelope.
    #[must_use]
    pub fn new(kind: MessageType, payload: Value) -> Self {
        Self { kind, payload }
    }
}

/// Why a frame could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The frame is not valid JSON.
    #[error("invalid JSON: {reason}")]
    InvalidJson {
        /// Parser message.
        reason: String,
    },

    /// The frame is valid JSON but not an object.
    #[error("frame is not a JSON object")]
    NotAnObject,

    /// The object has no `type` member.
    #[error("frame has no 'type' field")]
    MissingType,

    /// The `type` member is not a string.
    #[error("frame 'type' field is not a string")]
    NonStringType,

    /// A binary frame that is not UTF-8 text.
    #[error("binary frame is not UTF-8 text")]
    NotUtf8,
}

/// Classification of one inbound frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    /// A frame of a known type.
    Envelope(Envelope),
    /// A well-formed frame whose type this client does not know.
    UnknownType(String),
    /// A frame that could not be decoded.
    Malformed(DecodeError),
}

/// Decodes one text frame.
///
/// ```
/// use serde_json::json;
/// use vigil_gateway::relay::{decode, Decoded, MessageType};
///
/// match decode(r#"{"type":"pnl","payload":{"netPnl":150.25}}"#) {
///     Decoded::Envelope(envelope) => {
///         assert_eq!(envelope.kind, MessageType::Pnl);
///         assert_eq!(envelope.payload, json!({"netPnl": 150.25}));
///     }
///     other => panic!("unexpected {other:?}"),
/// }
/// ```
#[must_use]
pub fn decode(text: &str) -> Decoded {
    let value: Value = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(e) => {
            return Decoded::Malformed(DecodeError::InvalidJson {
                reason: e.to_string(),
            });
        }
    };

    let Value::Object(mut object) = value else {
        return Decoded::Malformed(DecodeError::NotAnObject);
    };

    let name = match object.remove("type") {
        Some(Value::String(name)) => name,
        Some(_) => return Decoded::Malformed(DecodeError::NonStringType),
        None => return Decoded::Malformed(DecodeError::MissingType),
    };

    let payload = object.remove("payload").unwrap_or(Value::Null);

    match name.parse::<MessageType>() {
        Ok(kind) => Decoded::Envelope(Envelope::new(kind, payload)),
        Err(UnknownMessageType(name)) => Decoded::UnknownType(name),
    }
}

/// Decodes one binary frame; UTF-8 content is treated like a text frame.
#[must_use]
pub fn decode_bytes(bytes: &[u8]) -> Decoded {
    match std::str::from_utf8(bytes) {
        Ok(text) => decode(text),
        Err(_) => Decoded::Malformed(DecodeError::NotUtf8),
    }
}
