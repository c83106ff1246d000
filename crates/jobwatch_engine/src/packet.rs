//! Engine.IO v4 / Socket.IO v5 text framing, as used over the WebSocket transport.
//!
//! An Engine.IO packet is a type digit followed by data. Message packets
//! (`4`) carry a Socket.IO packet: a type digit, an optional `/namespace,`,
//! an optional ack id and a JSON body. Binary attachments are not supported.

use serde_json::Value;

pub const DEFAULT_NAMESPACE: &str = "/";
/// Socket.IO CONNECT to the default namespace, wrapped in an Engine.IO message.
pub const CONNECT_DEFAULT_NAMESPACE: &str = "40";

#[derive(Debug, Clone, PartialEq)]
pub enum EnginePacket {
    Open(Value),
    Close,
    Ping(String),
    Pong(String),
    Message(String),
    Upgrade,
    Noop,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SocketPacket {
    Connect {
        namespace: String,
    },
    Disconnect {
        namespace: String,
    },
    Event {
        namespace: String,
        ack_id: Option<u64>,
        name: String,
        args: Vec<Value>,
    },
    Ack {
        namespace: String,
        ack_id: Option<u64>,
    },
    ConnectError {
        namespace: String,
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    #[error("empty frame")]
    Empty,
    #[error("unknown packet type {0:?}")]
    UnknownType(char),
    #[error("unsupported packet: {0}")]
    Unsupported(&'static str),
    #[error("invalid json: {0}")]
    Json(String),
    #[error("event without a name")]
    MissingEventName,
}

pub fn decode_engine(text: &str) -> Result<EnginePacket, FrameError> {
    let mut chars = text.chars();
    let kind = chars.next().ok_or(FrameError::Empty)?;
    let data = chars.as_str();
    match kind {
        '0' => serde_json::from_str(data)
            .map(EnginePacket::Open)
            .map_err(|err| FrameError::Json(err.to_string())),
        '1' => Ok(EnginePacket::Close),
        '2' => Ok(EnginePacket::Ping(data.to_string())),
        '3' => Ok(EnginePacket::Pong(data.to_string())),
        '4' => Ok(EnginePacket::Message(data.to_string())),
        '5' => Ok(EnginePacket::Upgrade),
        '6' => Ok(EnginePacket::Noop),
        other => Err(FrameError::UnknownType(other)),
    }
}

/// Pong answering a ping, echoing its probe data.
pub fn encode_pong(data: &str) -> String {
    format!("3{data}")
}

pub fn decode_socket(text: &str) -> Result<SocketPacket, FrameError> {
    let mut chars = text.chars();
    let kind = chars.next().ok_or(FrameError::Empty)?;
    let mut rest = chars.as_str();

    if matches!(kind, '5' | '6') {
        return Err(FrameError::Unsupported("binary attachments"));
    }

    let namespace = match rest.strip_prefix('/') {
        Some(_) => match rest.split_once(',') {
            Some((namespace, tail)) => {
                rest = tail;
                namespace.to_string()
            }
            None => {
                let namespace = rest.to_string();
                rest = "";
                namespace
            }
        },
        None => DEFAULT_NAMESPACE.to_string(),
    };

    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    let ack_id = rest[..digits].parse::<u64>().ok();
    let body = &rest[digits..];

    match kind {
        '0' => Ok(SocketPacket::Connect { namespace }),
        '1' => Ok(SocketPacket::Disconnect { namespace }),
        '2' => {
            let mut args = match parse_body(body)? {
                Some(Value::Array(args)) => args,
                _ => return Err(FrameError::MissingEventName),
            };
            if args.is_empty() {
                return Err(FrameError::MissingEventName);
            }
            let name = match args.remove(0) {
                Value::String(name) => name,
                _ => return Err(FrameError::MissingEventName),
            };
            Ok(SocketPacket::Event {
                namespace,
                ack_id,
                name,
                args,
            })
        }
        '3' => Ok(SocketPacket::Ack { namespace, ack_id }),
        '4' => {
            let message = match parse_body(body)? {
                Some(Value::Object(map)) => map
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                Some(Value::String(message)) => message,
                _ => String::new(),
            };
            Ok(SocketPacket::ConnectError { namespace, message })
        }
        other => Err(FrameError::UnknownType(other)),
    }
}

fn parse_body(body: &str) -> Result<Option<Value>, FrameError> {
    if body.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str(body)
        .map(Some)
        .map_err(|err| FrameError::Json(err.to_string()))
}
