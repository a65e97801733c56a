#![forbid(unsafe_code)]

use thiserror::Error;

/// Exclusive lower bound of a sync call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cutoff {
    /// No previous sync: every live and tombstoned row qualifies.
    Initial,
    /// Milliseconds since the Unix epoch, as last returned in `serverTimestamp`.
    After(i64),
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CutoffError {
    #[error("since must be an integer count of milliseconds, got {0:?}")]
    NotAnInteger(String),
    #[error("since must not be negative, got {0}")]
    Negative(i64),
}

impl Cutoff {
    pub fn from_millis(value: Option<i64>) -> Result<Self, CutoffError> {
        match value {
            None => Ok(Self::Initial),
            Some(ms) if ms < 0 => Err(CutoffError::Negative(ms)),
            Some(ms) => Ok(Self::After(ms)),
        }
    }

    /// Parses the raw `since` query parameter. An absent or blank value means
    /// an initial sync.
    pub fn parse(raw: Option<&str>) -> Result<Self, CutoffError> {
        let Some(raw) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
            return Ok(Self::Initial);
        };
        let ms = raw
            .parse::<i64>()
            .map_err(|_| CutoffError::NotAnInteger(raw.to_string()))?;
        Self::from_millis(Some(ms))
    }

    /// Value compared with `>` against `updated_at` / `deleted_at`.
    pub fn exclusive_bound(self) -> i64 {
        match self {
            Self::Initial => i64::MIN,
            Self::After(ms) => ms,
        }
    }

    pub fn is_initial(self) -> bool {
        matches!(self, Self::Initial)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_or_blank_since_is_an_initial_sync() {
        assert_eq!(Cutoff::parse(None), Ok(Cutoff::Initial));
        assert_eq!(Cutoff::parse(Some("")), Ok(Cutoff::Initial));
        assert_eq!(Cutoff::parse(Some("  ")), Ok(Cutoff::Initial));
        assert!(Cutoff::Initial.is_initial());
    }

    #[test]
    fn since_parses_milliseconds() {
        assert_eq!(
            Cutoff::parse(Some("1712345678901")),
            Ok(Cutoff::After(1_712_345_678_901))
        );
        assert_eq!(Cutoff::parse(Some("0")), Ok(Cutoff::After(0)));
    }

    #[test]
    fn malformed_since_is_rejected() {
        assert_eq!(
            Cutoff::parse(Some("-5")),
            Err(CutoffError::Negative(-5))
        );
        assert!(matches!(
            Cutoff::parse(Some("12abc")),
            Err(CutoffError::NotAnInteger(_))
        ));
        assert!(matches!(
            Cutoff::parse(Some("1.5")),
            Err(CutoffError::NotAnInteger(_))
        ));
        assert!(matches!(
            Cutoff::parse(Some("2024-04-06T00:00:00Z")),
            Err(CutoffError::NotAnInteger(_))
        ));
    }

    #[test]
    fn initial_bound_precedes_every_timestamp() {
        assert!(Cutoff::Initial.exclusive_bound() < 0);
        assert_eq!(Cutoff::After(10).exclusive_bound(), 10);
    }
}
