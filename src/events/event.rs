//! # Events routed by the broker.
//!
//! An [`Event`] is an immutable record with an identifier, a type string, a
//! source and an optional payload. The broker routes purely on
//! [`Event::event_type`]; the payload is never inspected.
//!
//! The shape follows the CloudEvents attribute names, so an event serializes to
//! the structured JSON form (`id`, `type`, `source`, `time`, `datacontenttype`, `data`).
//!
//! ## Example
//! ```rust
//! use evbroker::Event;
//!
//! let ev = Event::new("user.created", "accounts")
//!     .with_id("e1")
//!     .with_data("text/plain", &"alice")
//!     .unwrap();
//!
//! assert_eq!(ev.id(), "e1");
//! assert_eq!(ev.event_type(), "user.created");
//! assert_eq!(ev.data_as::<String>().unwrap(), "alice");
//! ```

use std::sync::Arc;
use std::time::SystemTime;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::BrokerError;

/// Immutable typed event.
///
/// Cloning is cheap for the string attributes (`Arc<str>`); the payload is deep-copied.
/// The broker itself never clones events: each matching queue receives the same `Arc<Event>`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Unique identifier (a v4 UUID unless overridden).
    pub id: Arc<str>,
    /// Routing key.
    #[serde(rename = "type")]
    pub event_type: Arc<str>,
    /// Producer of the event.
    pub source: Arc<str>,
    /// Wall-clock creation timestamp.
    pub time: SystemTime,
    /// Media type of `data`, if any.
    #[serde(
        rename = "datacontenttype",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub data_content_type: Option<Arc<str>>,
    /// Opaque payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl Event {
    /// Creates a new event with a fresh UUID, the current time and no payload.
    pub fn new(event_type: impl Into<Arc<str>>, source: impl Into<Arc<str>>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string().into(),
            event_type: event_type.into(),
            source: source.into(),
            time: SystemTime::now(),
            data_content_type: None,
            data: None,
        }
    }

    /// Overrides the identifier.
    #[inline]
    pub fn with_id(mut self, id: impl Into<Arc<str>>) -> Self {
        self.id = id.into();
        self
    }

    /// Overrides the timestamp.
    #[inline]
    pub fn with_time(mut self, time: SystemTime) -> Self {
        self.time = time;
        self
    }

    /// Attaches an already-built JSON payload.
    #[inline]
    pub fn with_json(mut self, data: serde_json::Value) -> Self {
        self.data_content_type = Some(Arc::from("application/json"));
        self.data = Some(data);
        self
    }

    /// Serializes `data` into the payload and records its content type.
    ///
    /// Returns [`BrokerError::Encode`] if `data` cannot be represented as JSON.
    pub fn with_data<T>(
        mut self,
        content_type: impl Into<Arc<str>>,
        data: &T,
    ) -> Result<Self, BrokerError>
    where
        T: Serialize + ?Sized,
    {
        let value = serde_json::to_value(data).map_err(|e| BrokerError::Encode {
            error: e.to_string(),
        })?;
        self.data_content_type = Some(content_type.into());
        self.data = Some(value);
        Ok(self)
    }

    /// Deserializes the payload into `T`.
    ///
    /// Returns [`BrokerError::Decode`] if there is no payload or it does not match `T`.
    pub fn data_as<T: DeserializeOwned>(&self) -> Result<T, BrokerError> {
        let value = self.data.as_ref().ok_or_else(|| BrokerError::Decode {
            error: format!("event {} carries no data", self.id),
        })?;
        T::deserialize(value).map_err(|e| BrokerError::Decode {
            error: e.to_string(),
        })
    }

    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[inline]
    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    #[inline]
    pub fn source(&self) -> &str {
        &self.source
    }
}
