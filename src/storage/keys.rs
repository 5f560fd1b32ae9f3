//! Storage object keys
//!
//! Keys are `<epoch-millis>-<original filename>`. Two uploads of the same
//! filename in the same millisecond collide and the later one overwrites the
//! earlier object. Enabling `unique_keys` inserts an 8 hex character token
//! after the timestamp; the filename always stays the suffix.

use std::fmt;

/// Source of upload timestamps.
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Clock pinned to one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now_millis(&self) -> i64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectKey(String);

impl ObjectKey {
    pub fn new(millis: i64, filename: &str) -> Self {
        Self(format!("{}-{}", millis, filename))
    }

    pub fn with_token(millis: i64, filename: &str) -> Self {
        let token = uuid::Uuid::new_v4().simple().to_string();
        Self(format!("{}-{}-{}", millis, &token[..8], filename))
    }

    pub fn generate(clock: &dyn Clock, filename: &str, unique: bool) -> Self {
        let millis = clock.now_millis();
        if unique {
            Self::with_token(millis, filename)
        } else {
            Self::new(millis, filename)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
