#![forbid(unsafe_code)]

pub mod cutoff;
pub mod kind;
pub mod model;
pub mod sync;

pub mod ids {
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct UserId(i64);

    impl UserId {
        pub fn new(value: i64) -> Self {
            Self(value)
        }

        pub fn get(self) -> i64 {
            self.0
        }
    }

    impl std::fmt::Display for UserId {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{}", self.0)
        }
    }

    /// Primary key of a stored row: server-assigned integers for most tables,
    /// client-assigned strings for graph nodes and edges.
    #[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
    #[serde(untagged)]
    pub enum RowKey {
        Int(i64),
        Text(String),
    }

    impl From<i64> for RowKey {
        fn from(value: i64) -> Self {
            Self::Int(value)
        }
    }

    impl From<String> for RowKey {
        fn from(value: String) -> Self {
            Self::Text(value)
        }
    }

    impl From<&str> for RowKey {
        fn from(value: &str) -> Self {
            Self::Text(value.to_string())
        }
    }

    impl std::fmt::Display for RowKey {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Self::Int(value) => write!(f, "{value}"),
                Self::Text(value) => f.write_str(value),
            }
        }
    }

    /// Identifier chosen by the client for nodes and edges, so the canvas can
    /// reference them before the first round-trip completes.
    #[derive(Clone, Debug, PartialEq, Eq, Hash)]
    pub struct ClientId(String);

    impl ClientId {
        pub fn as_str(&self) -> &str {
            &self.0
        }

        pub fn into_string(self) -> String {
            self.0
        }

        pub fn try_new(value: impl Into<String>) -> Result<Self, ClientIdError> {
            let value = value.into();
            validate_client_id(&value)?;
            Ok(Self(value))
        }
    }

    #[derive(Clone, Debug, PartialEq, Eq)]
    pub enum ClientIdError {
        Empty,
        TooLong,
        ContainsControl,
    }

    impl ClientIdError {
        pub fn message(&self) -> &'static str {
            match self {
                Self::Empty => "id must not be empty",
                Self::TooLong => "id is too long",
                Self::ContainsControl => "id contains control characters",
            }
        }
    }

    fn validate_client_id(value: &str) -> Result<(), ClientIdError> {
        if value.trim().is_empty() {
            return Err(ClientIdError::Empty);
        }
        if value.len() > 256 {
            return Err(ClientIdError::TooLong);
        }
        if value.chars().any(|c| c.is_control()) {
            return Err(ClientIdError::ContainsControl);
        }
        Ok(())
    }
}

pub mod clock {
    use time::OffsetDateTime;

    /// Wall-clock milliseconds since the Unix epoch, clamped to `0..=i64::MAX`.
    pub fn now_ms() -> i64 {
        let ms = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000i128;
        i64::try_from(ms.max(0)).unwrap_or(i64::MAX)
    }
}
