//! Client identity strings
//!
//! A userinfo string is a flat list of `\key\value` pairs that the engine
//! hands to its connect routine. Bots build one from scratch when they are
//! first spawned and carry it verbatim through level transitions.

use crate::error::{BotError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum encoded length of a userinfo string, terminator included
pub const MAX_INFO_STRING: usize = 1024;

/// Backslash-delimited key/value identity string
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserInfo(String);

impl UserInfo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw encoded form, as passed to the engine
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over `(key, value)` pairs in encoded order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        let mut parts = self.0.split('\\').skip(1);
        std::iter::from_fn(move || {
            let key = parts.next()?;
            let value = parts.next().unwrap_or("");
            Some((key, value))
        })
    }

    /// Look up a value; keys compare case-insensitively
    pub fn get(&self, key: &str) -> Option<&str> {
        self.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v)
    }

    /// Set a key, replacing any previous value. An empty value only removes
    /// the key.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        for (field, text) in [("key", key), ("value", value)] {
            if let Some(bad) = text.chars().find(|c| matches!(c, '\\' | ';' | '"')) {
                return Err(BotError::InvalidUserInfo {
                    key: key.to_string(),
                    reason: format!("{} may not contain '{}'", field, bad),
                }
                .into());
            }
        }

        self.remove(key);
        if value.is_empty() {
            return Ok(());
        }

        let added = key.len() + value.len() + 2;
        if self.0.len() + added >= MAX_INFO_STRING {
            return Err(BotError::InvalidUserInfo {
                key: key.to_string(),
                reason: "info string length exceeded".to_string(),
            }
            .into());
        }

        self.0.push('\\');
        self.0.push_str(key);
        self.0.push('\\');
        self.0.push_str(value);
        Ok(())
    }

    /// Remove a key if present
    pub fn remove(&mut self, key: &str) {
        if self.get(key).is_none() {
            return;
        }

        let mut rebuilt = String::with_capacity(self.0.len());
        for (k, v) in self.iter().filter(|(k, _)| !k.eq_ignore_ascii_case(key)) {
            rebuilt.push('\\');
            rebuilt.push_str(k);
            rebuilt.push('\\');
            rebuilt.push_str(v);
        }
        self.0 = rebuilt;
    }
}

impl From<String> for UserInfo {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl From<&str> for UserInfo {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

impl fmt::Display for UserInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
