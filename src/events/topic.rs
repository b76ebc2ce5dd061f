//! # Subscription keys.
//!
//! A subscription key is either a concrete event type or the wildcard marker
//! [`WILDCARD`] (`"*"`). Exact keys are compared by string equality. There are no
//! prefix or segment patterns, so `"user.*"` is an ordinary type string that only
//! matches events whose type is literally `"user.*"`.

use std::fmt;
use std::sync::Arc;

/// Subscription key that receives every published event.
pub const WILDCARD: &str = "*";

/// Parsed subscription key.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Topic {
    /// Every event, regardless of type.
    Any,
    /// Events whose type equals this string.
    Exact(Arc<str>),
}

impl Topic {
    /// Parses a subscription key; [`WILDCARD`] becomes [`Topic::Any`].
    pub fn parse(key: &str) -> Self {
        if key == WILDCARD {
            Topic::Any
        } else {
            Topic::Exact(Arc::from(key))
        }
    }

    #[inline]
    pub fn is_wildcard(&self) -> bool {
        matches!(self, Topic::Any)
    }
}

impl From<&str> for Topic {
    fn from(key: &str) -> Self {
        Topic::parse(key)
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Topic::Any => f.write_str(WILDCARD),
            Topic::Exact(t) => f.write_str(t),
        }
    }
}
