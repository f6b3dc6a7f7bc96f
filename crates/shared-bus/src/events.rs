//! # Chain Events
//!
//! Events arrive from the chain as a type plus flattened attributes keyed
//! by `"<event type>.<attribute key>"`, each with one or more values.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A structured chain event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainEvent {
    /// Event type, e.g. `register_oracle`.
    pub event_type: String,
    /// Height of the block that emitted the event.
    pub height: i64,
    /// `"type.key" -> [values]`.
    pub attributes: BTreeMap<String, Vec<String>>,
}

impl ChainEvent {
    /// Create an event with no attributes.
    pub fn new(event_type: impl Into<String>, height: i64) -> Self {
        Self {
            event_type: event_type.into(),
            height,
            attributes: BTreeMap::new(),
        }
    }

    /// Builder-style attribute insertion. `key` is the bare attribute key;
    /// it is stored under `"<event type>.<key>"`.
    #[must_use]
    pub fn with_attribute(mut self, key: &str, value: impl Into<String>) -> Self {
        let composite = format!("{}.{}", self.event_type, key);
        self.attributes
            .entry(composite)
            .or_default()
            .push(value.into());
        self
    }

    /// All values for a bare attribute key of this event's type.
    pub fn values(&self, key: &str) -> &[String] {
        self.attributes
            .get(&format!("{}.{}", self.event_type, key))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// First value for a bare attribute key of this event's type.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.values(key).first().map(String::as_str)
    }
}

/// Subscription filter: `(type, attribute key, attribute value)`.
///
/// A `None` value matches any event of the type carrying the key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventFilter {
    /// Event type to match.
    pub event_type: String,
    /// Attribute key that must be present.
    pub attribute_key: String,
    /// Required attribute value, if any.
    pub attribute_value: Option<String>,
}

impl EventFilter {
    /// Filter requiring an exact attribute value.
    pub fn new(
        event_type: impl Into<String>,
        attribute_key: impl Into<String>,
        attribute_value: impl Into<String>,
    ) -> Self {
        Self {
            event_type: event_type.into(),
            attribute_key: attribute_key.into(),
            attribute_value: Some(attribute_value.into()),
        }
    }

    /// Filter requiring only that the attribute is present.
    pub fn with_key(event_type: impl Into<String>, attribute_key: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            attribute_key: attribute_key.into(),
            attribute_value: None,
        }
    }

    /// Check whether an event matches this filter.
    pub fn matches(&self, event: &ChainEvent) -> bool {
        if event.event_type != self.event_type {
            return false;
        }
        let values = event.values(&self.attribute_key);
        match &self.attribute_value {
            Some(expected) => values.iter().any(|v| v == expected),
            None => !values.is_empty(),
        }
    }

    /// Render as a chain subscription query string.
    pub fn to_query(&self) -> String {
        match &self.attribute_value {
            Some(value) => format!(
                "{}.{} = '{}'",
                self.event_type, self.attribute_key, value
            ),
            None => format!("{}.{} EXISTS", self.event_type, self.attribute_key),
        }
    }
}
