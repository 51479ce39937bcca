//! Phoenix channel frames spoken by the realtime service.
//!
//! Every frame is a JSON object `{topic, event, payload, ref, join_ref}`.
//! The client joins a topic with a `postgres_changes` config and then
//! receives one `postgres_changes` frame per matching row change.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

pub const PROTOCOL_VSN: &str = "1.0.0";

pub const EVENT_JOIN: &str = "phx_join";
pub const EVENT_LEAVE: &str = "phx_leave";
pub const EVENT_REPLY: &str = "phx_reply";
pub const EVENT_ERROR: &str = "phx_error";
pub const EVENT_CLOSE: &str = "phx_close";
pub const EVENT_HEARTBEAT: &str = "heartbeat";
pub const EVENT_CHANGES: &str = "postgres_changes";
pub const EVENT_SYSTEM: &str = "system";

const HEARTBEAT_TOPIC: &str = "phoenix";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub topic: String,
    pub event: String,
    #[serde(default)]
    pub payload: Value,
    #[serde(rename = "ref", default)]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join_ref: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeEvent {
    #[serde(rename = "INSERT")]
    Insert,
    #[serde(rename = "UPDATE")]
    Update,
    #[serde(rename = "DELETE")]
    Delete,
    #[serde(rename = "*")]
    All,
}

/// Which row changes a channel receives. The backend applies the filter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeFilter {
    pub event: ChangeEvent,
    pub schema: String,
    pub table: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

impl ChangeFilter {
    /// Row inserts on `schema.table`.
    pub fn inserts(schema: &str, table: &str) -> Self {
        Self {
            event: ChangeEvent::Insert,
            schema: schema.to_string(),
            table: table.to_string(),
            filter: None,
        }
    }

    /// Narrow to rows whose `column` equals `value`.
    pub fn eq(mut self, column: &str, value: &str) -> Self {
        self.filter = Some(format!("{}=eq.{}", column, value));
        self
    }
}

/// A decoded `postgres_changes` payload.
#[derive(Debug, Clone, PartialEq)]
pub struct RowChange {
    pub event: ChangeEvent,
    pub table: String,
    pub record: Value,
    pub old_record: Value,
}

/// What the client should do with an incoming frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Incoming {
    /// Reply to one of our pushes (join, heartbeat).
    Reply { reference: Option<String>, ok: bool, response: Value },
    Change(RowChange),
    /// The server closed or errored the channel.
    Closed { reason: String },
    /// Status and presence traffic we do not act on.
    Ignored,
}

pub fn join_frame(topic: &str, filters: &[ChangeFilter], access_token: Option<&str>, reference: u64) -> Frame {
    let mut payload = json!({
        "config": {
            "broadcast": { "ack": false, "self": false },
            "presence": { "key": "" },
            "postgres_changes": filters,
        }
    });
    if let Some(token) = access_token {
        payload["access_token"] = Value::String(token.to_string());
    }
    Frame {
        topic: topic.to_string(),
        event: EVENT_JOIN.to_string(),
        payload,
        reference: Some(reference.to_string()),
        join_ref: Some(reference.to_string()),
    }
}

pub fn heartbeat_frame(reference: u64) -> Frame {
    Frame {
        topic: HEARTBEAT_TOPIC.to_string(),
        event: EVENT_HEARTBEAT.to_string(),
        payload: json!({}),
        reference: Some(reference.to_string()),
        join_ref: None,
    }
}

pub fn leave_frame(topic: &str, reference: u64) -> Frame {
    Frame {
        topic: topic.to_string(),
        event: EVENT_LEAVE.to_string(),
        payload: json!({}),
        reference: Some(reference.to_string()),
        join_ref: None,
    }
}

/// Channel topic for a channel name, e.g. `public:notifications`.
pub fn topic_for(channel: &str) -> String {
    format!("realtime:{}", channel)
}

/// Interpret a frame received on `topic`. Frames for other topics are ignored.
pub fn classify(frame: Frame, topic: &str) -> Incoming {
    if frame.topic != topic && frame.topic != HEARTBEAT_TOPIC {
        return Incoming::Ignored;
    }
    match frame.event.as_str() {
        EVENT_REPLY => {
            let ok = frame.payload.get("status").and_then(Value::as_str) == Some("ok");
            let response = frame.payload.get("response").cloned().unwrap_or(Value::Null);
            Incoming::Reply {
                reference: frame.reference,
                ok,
                response,
            }
        }
        EVENT_CHANGES => match decode_change(&frame.payload) {
            Some(change) => Incoming::Change(change),
            None => Incoming::Ignored,
        },
        EVENT_CLOSE => Incoming::Closed {
            reason: "channel closed by server".to_string(),
        },
        EVENT_ERROR => Incoming::Closed {
            reason: frame.payload.to_string(),
        },
        _ => Incoming::Ignored,
    }
}

fn decode_change(payload: &Value) -> Option<RowChange> {
    let data = payload.get("data")?;
    let event: ChangeEvent = serde_json::from_value(data.get("type")?.clone()).ok()?;
    Some(RowChange {
        event,
        table: data.get("table").and_then(Value::as_str).unwrap_or_default().to_string(),
        record: data.get("record").cloned().unwrap_or(Value::Null),
        old_record: data.get("old_record").cloned().unwrap_or(Value::Null),
    })
}
