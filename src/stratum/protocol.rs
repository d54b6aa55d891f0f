//! Stratum protocol message definitions
//!
//! Only the fixed method set of the ZelHash pool dialect is modelled. Requests
//! carry numeric ids: 1 subscribe, 2 authorize, 4 submit.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Request id of `mining.subscribe`
pub const SUBSCRIBE_ID: u64 = 1;
/// Request id of `mining.authorize`
pub const AUTHORIZE_ID: u64 = 2;
/// Request id of `mining.submit`
pub const SUBMIT_ID: u64 = 4;

/// Stratum protocol methods
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StratumMethod {
    /// Client subscribes to mining notifications
    Subscribe,
    /// Client authorizes with credentials
    Authorize,
    /// Server notifies client of new work
    Notify,
    /// Client submits a share
    Submit,
    /// Server sets the share target
    SetTarget,
    /// Unknown method
    Unknown(String),
}

impl StratumMethod {
    /// Parse method from string
    pub fn parse_method(s: &str) -> Self {
        match s {
            "mining.subscribe" => Self::Subscribe,
            "mining.authorize" => Self::Authorize,
            "mining.notify" => Self::Notify,
            "mining.submit" => Self::Submit,
            "mining.set_target" => Self::SetTarget,
            _ => Self::Unknown(s.to_string()),
        }
    }

    /// Convert to string representation
    pub fn as_str(&self) -> &str {
        match self {
            Self::Subscribe => "mining.subscribe",
            Self::Authorize => "mining.authorize",
            Self::Notify => "mining.notify",
            Self::Submit => "mining.submit",
            Self::SetTarget => "mining.set_target",
            Self::Unknown(s) => s,
        }
    }
}

/// Outbound request. Field order is the wire order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StratumRequest {
    /// Request ID
    pub id: u64,
    /// Method name
    pub method: String,
    /// Method parameters
    pub params: Vec<Value>,
}

impl StratumRequest {
    /// Create a new request
    pub fn new(id: u64, method: StratumMethod, params: Vec<Value>) -> Self {
        Self {
            id,
            method: method.as_str().to_string(),
            params,
        }
    }

    /// `mining.subscribe` with client identifier, user and port
    pub fn subscribe(client_id: &str, user: &str, port: &str) -> Self {
        Self::new(
            SUBSCRIBE_ID,
            StratumMethod::Subscribe,
            vec![client_id.into(), user.into(), port.into(), Value::Null],
        )
    }

    /// `mining.authorize` with worker credentials
    pub fn authorize(user: &str, pass: &str) -> Self {
        Self::new(
            AUTHORIZE_ID,
            StratumMethod::Authorize,
            vec![user.into(), pass.into()],
        )
    }

    /// `mining.submit` for a verified share
    pub fn submit(user: &str, job_id: &str, time: &str, nonce_hex: &str, solution_hex: &str) -> Self {
        Self::new(
            SUBMIT_ID,
            StratumMethod::Submit,
            vec![
                user.into(),
                job_id.into(),
                time.into(),
                nonce_hex.into(),
                solution_hex.into(),
            ],
        )
    }

    /// Serialize to single-line JSON, without the line terminator
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Reply to one of our requests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StratumResponse {
    /// Request ID this responds to
    pub id: Value,
    /// Result if present
    #[serde(default)]
    pub result: Option<Value>,
    /// Error payload if present
    #[serde(default)]
    pub error: Option<Value>,
}

impl StratumResponse {
    /// Numeric request id; accepts a number or a numeric string
    pub fn id(&self) -> Option<u64> {
        match &self.id {
            Value::String(id) => id.trim().parse().ok(),
            id => id.as_u64(),
        }
    }

    /// Result as a boolean; absent, null or non-boolean results are `None`
    pub fn result_bool(&self) -> Option<bool> {
        self.result.as_ref().and_then(Value::as_bool)
    }

    /// Whether the error payload carries anything
    pub fn has_error(&self) -> bool {
        self.error.as_ref().is_some_and(|e| !e.is_null())
    }
}

/// Server push (`mining.notify`, `mining.set_target`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StratumNotification {
    /// Method name
    pub method: String,
    /// Method parameters
    #[serde(default)]
    pub params: Vec<Value>,
}

impl StratumNotification {
    /// Get the method as enum
    pub fn method_enum(&self) -> StratumMethod {
        StratumMethod::parse_method(&self.method)
    }

    /// String parameter at `index`
    pub fn str_param(&self, index: usize) -> Option<&str> {
        self.params.get(index).and_then(Value::as_str)
    }
}

/// Inbound Stratum message
#[derive(Debug, Clone, PartialEq)]
pub enum StratumMessage {
    /// Reply to a request, dispatched by id
    Response(StratumResponse),
    /// Push from the pool, dispatched by method
    Notification(StratumNotification),
}

impl StratumMessage {
    /// Parse one line of JSON
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_str(json)?;

        if value.get("method").is_some_and(Value::is_string) {
            let notification: StratumNotification = serde_json::from_value(value)?;
            Ok(StratumMessage::Notification(notification))
        } else {
            let response: StratumResponse = serde_json::from_value(value)?;
            Ok(StratumMessage::Response(response))
        }
    }
}

/// Fields of a `mining.notify` push
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifyParams<'a> {
    /// Job ID
    pub job_id: &'a str,
    /// Six hex fragments that form the header prefix, in order
    pub header_fragments: [&'a str; 6],
    /// Time field (fragment 5), echoed on submit
    pub time: &'a str,
}

impl<'a> NotifyParams<'a> {
    /// Extract the job fields; `None` if any of params[0..=6] is missing or
    /// not a string
    pub fn parse(notification: &'a StratumNotification) -> Option<Self> {
        let job_id = notification.str_param(0)?;
        let mut header_fragments = [""; 6];
        for (i, fragment) in header_fragments.iter_mut().enumerate() {
            *fragment = notification.str_param(i + 1)?;
        }
        Some(Self {
            job_id,
            header_fragments,
            time: header_fragments[4],
        })
    }
}
