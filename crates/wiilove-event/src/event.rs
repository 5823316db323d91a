//! Events delivered to scripts
//!
//! Built-in events carry typed payloads; anything a script pushes under
//! another name is kept as [`Event::Custom`] with up to [`MAX_VALUES`] values.
//! On the script side every event flattens to `(name, v1, ..., v6)`.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use wiilove_hal::Slot;

/// Payload slots available to a script-visible event
pub const MAX_VALUES: usize = 6;

#[derive(Debug, Error, PartialEq)]
pub enum EventError {
    #[error("Event name must not be empty")]
    EmptyName,

    #[error("Too many event values: {0} (at most {max})", max = MAX_VALUES)]
    TooManyValues(usize),
}

/// A loosely typed payload value
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Nil,
    Boolean(bool),
    Integer(i64),
    Number(f64),
    String(String),
}

impl Value {
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// Interpret as a controller slot, accepting integral numbers
    pub fn as_slot(&self) -> Option<Slot> {
        let id = match self {
            Value::Integer(i) => *i,
            Value::Number(n) if n.fract() == 0.0 => *n as i64,
            _ => return None,
        };
        Slot::new(id).ok()
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Slot> for Value {
    fn from(slot: Slot) -> Self {
        Value::Integer(i64::from(slot.id()))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "{:?}", s),
        }
    }
}

/// An application event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "EventRecord", try_from = "EventRecord")]
pub enum Event {
    Quit,
    HomePressed { slot: Slot },
    WiimoteConnected { slot: Slot },
    WiimoteDisconnected { slot: Slot },
    Custom { name: String, values: Vec<Value> },
}

impl Event {
    /// Build an event from script arguments
    ///
    /// Trailing nils are dropped. Names of built-in events with a matching
    /// payload produce the typed variant; everything else is `Custom`.
    pub fn from_parts(name: impl Into<String>, values: Vec<Value>) -> Result<Self, EventError> {
        let name = name.into();
        if name.is_empty() {
            return Err(EventError::EmptyName);
        }

        let mut values = values;
        while values.last().is_some_and(Value::is_nil) {
            values.pop();
        }
        if values.len() > MAX_VALUES {
            return Err(EventError::TooManyValues(values.len()));
        }

        let slot = match values.as_slice() {
            [v] => v.as_slot(),
            _ => None,
        };

        let event = match (name.as_str(), slot) {
            ("quit", _) if values.is_empty() => Event::Quit,
            ("homepressed", Some(slot)) => Event::HomePressed { slot },
            ("wiimoteconnected", Some(slot)) => Event::WiimoteConnected { slot },
            ("wiimotedisconnected", Some(slot)) => Event::WiimoteDisconnected { slot },
            _ => Event::Custom { name, values },
        };
        Ok(event)
    }

    /// Check an event built directly against the rules `from_parts` enforces
    pub fn validate(&self) -> Result<(), EventError> {
        if let Event::Custom { name, values } = self {
            if name.is_empty() {
                return Err(EventError::EmptyName);
            }
            if values.len() > MAX_VALUES {
                return Err(EventError::TooManyValues(values.len()));
            }
        }
        Ok(())
    }

    /// Event name as seen by scripts
    pub fn name(&self) -> &str {
        match self {
            Event::Quit => "quit",
            Event::HomePressed { .. } => "homepressed",
            Event::WiimoteConnected { .. } => "wiimoteconnected",
            Event::WiimoteDisconnected { .. } => "wiimotedisconnected",
            Event::Custom { name, .. } => name,
        }
    }

    /// Payload values, without padding
    pub fn values(&self) -> Vec<Value> {
        match self {
            Event::Quit => Vec::new(),
            Event::HomePressed { slot }
            | Event::WiimoteConnected { slot }
            | Event::WiimoteDisconnected { slot } => vec![Value::from(*slot)],
            Event::Custom { values, .. } => values.clone(),
        }
    }

    /// Flatten to the `(name, v1..v6)` shape handed to scripts
    pub fn to_parts(&self) -> (String, [Value; MAX_VALUES]) {
        let mut padded: [Value; MAX_VALUES] = Default::default();
        for (dst, src) in padded.iter_mut().zip(self.values()) {
            *dst = src;
        }
        (self.name().to_string(), padded)
    }

    /// Slot the event refers to, for controller events
    pub fn slot(&self) -> Option<Slot> {
        match self {
            Event::HomePressed { slot }
            | Event::WiimoteConnected { slot }
            | Event::WiimoteDisconnected { slot } => Some(*slot),
            _ => None,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())?;
        let values = self.values();
        if !values.is_empty() {
            let args: Vec<String> = values.iter().map(|v| v.to_string()).collect();
            write!(f, "({})", args.join(", "))?;
        }
        Ok(())
    }
}

/// Serialized form: the same `(name, values)` shape scripts see
#[derive(Debug, Clone, Serialize, Deserialize)]
struct EventRecord {
    name: String,
    #[serde(default)]
    values: Vec<Value>,
}

impl From<Event> for EventRecord {
    fn from(event: Event) -> Self {
        Self {
            name: event.name().to_string(),
            values: event.values(),
        }
    }
}

impl TryFrom<EventRecord> for Event {
    type Error = EventError;

    fn try_from(record: EventRecord) -> Result<Self, EventError> {
        Event::from_parts(record.name, record.values)
    }
}
