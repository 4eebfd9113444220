//! Situational context and its canonical key.
//!
//! A `ContextKey` is the five context fields joined in a fixed order:
//! `mood|intent|sub_intent|weather|time_of_day`. An absent sub-intent
//! encodes as the empty string, so `Positive|Entertainment||Sunny|Evening`
//! is a well-formed key.

use crate::error::{DataLoadError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Separator between key fields
pub const KEY_DELIMITER: char = '|';

/// Number of fields in a well-formed key
pub const KEY_FIELD_COUNT: usize = 5;

/// The situation a recommendation is made for.
///
/// Produced by upstream resolution (sentiment, keywords, weather, clock)
/// and treated as immutable once it reaches the recommender. An empty
/// `sub_intent` string means the same thing as a missing one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Context {
    #[serde(default)]
    pub mood: String,
    #[serde(default)]
    pub intent: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_intent: Option<String>,
    #[serde(default)]
    pub weather: String,
    #[serde(default, alias = "timeOfDay")]
    pub time_of_day: String,
}

impl Context {
    /// Create a context without a sub-intent
    pub fn new(
        mood: impl Into<String>,
        intent: impl Into<String>,
        weather: impl Into<String>,
        time_of_day: impl Into<String>,
    ) -> Self {
        Self {
            mood: mood.into(),
            intent: intent.into(),
            sub_intent: None,
            weather: weather.into(),
            time_of_day: time_of_day.into(),
        }
    }

    /// Set the sub-intent (builder pattern). Empty strings are dropped.
    pub fn with_sub_intent(mut self, sub_intent: impl Into<String>) -> Self {
        let sub_intent = sub_intent.into();
        self.sub_intent = (!sub_intent.is_empty()).then_some(sub_intent);
        self
    }

    /// The sub-intent, if one is meaningfully set
    pub fn sub_intent(&self) -> Option<&str> {
        self.sub_intent.as_deref().filter(|s| !s.is_empty())
    }

    /// The intent, if one is meaningfully set
    pub fn intent(&self) -> Option<&str> {
        Some(self.intent.as_str()).filter(|s| !s.is_empty())
    }

    /// Canonical key for this context
    pub fn key(&self) -> ContextKey {
        ContextKey::encode(self)
    }
}

/// Canonical, comparable form of a [`Context`].
///
/// Keys read back from a statistics store are not guaranteed to be
/// well-formed; [`ContextKey::decode`] is where that gets checked.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContextKey(String);

impl ContextKey {
    /// Join the five context fields in their fixed order
    pub fn encode(context: &Context) -> Self {
        let fields = [
            context.mood.as_str(),
            context.intent.as_str(),
            context.sub_intent().unwrap_or(""),
            context.weather.as_str(),
            context.time_of_day.as_str(),
        ];
        let mut key = String::with_capacity(fields.iter().map(|f| f.len() + 1).sum());
        for (i, field) in fields.iter().enumerate() {
            if i > 0 {
                key.push(KEY_DELIMITER);
            }
            key.push_str(field);
        }
        Self(key)
    }

    /// Split the key back into its fields.
    ///
    /// Fails with `MalformedKey` unless the split yields exactly five parts.
    pub fn decode(&self) -> Result<ContextFields<'_>> {
        let parts: Vec<&str> = self.0.split(KEY_DELIMITER).collect();
        match parts[..] {
            [mood, intent, sub_intent, weather, time_of_day] => Ok(ContextFields {
                mood,
                intent,
                sub_intent,
                weather,
                time_of_day,
            }),
            _ => Err(DataLoadError::MalformedKey {
                key: self.0.clone(),
                expected: KEY_FIELD_COUNT,
                found: parts.len(),
            }),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ContextKey {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl From<&str> for ContextKey {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

impl fmt::Display for ContextKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Borrowed view of a decoded key. `sub_intent` is `""` when absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextFields<'a> {
    pub mood: &'a str,
    pub intent: &'a str,
    pub sub_intent: &'a str,
    pub weather: &'a str,
    pub time_of_day: &'a str,
}
