use thiserror::Error;

/// Errors raised while decoding shares, doing exact arithmetic, or searching for
/// a consensus secret.
///
/// Only the input-level variants (`InsufficientShares`, `NoViableConsensus` and the
/// decoding errors) are expected to reach a caller. `DegenerateInterpolation` is
/// absorbed by [`crate::consensus::consensus`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ShardError {
    #[error("invalid fraction: zero denominator")]
    InvalidFraction,

    #[error("division by zero")]
    DivisionByZero,

    #[error("degenerate interpolation: duplicate x-coordinate {x}")]
    DegenerateInterpolation { x: String },

    #[error("insufficient shares: got {got}, need {need} (threshold must be at least 2)")]
    InsufficientShares { got: usize, need: usize },

    #[error("no viable consensus: every combination of {k} shares was degenerate")]
    NoViableConsensus { k: usize },

    #[error("search too large: {combinations} combinations exceeds the limit of {limit}")]
    SearchTooLarge { combinations: u128, limit: u64 },

    #[error("malformed share document: {0}")]
    Json(String),

    #[error("share document has no \"keys\" object with integer \"n\" and \"k\"")]
    MissingKeys,

    #[error("share {index}: invalid base {base:?}, expected 2..=36")]
    InvalidBase { index: u32, base: String },

    #[error("share {index}: value {value:?} is not a valid base-{base} integer")]
    InvalidValue { index: u32, base: u32, value: String },

    #[error("invalid share index {0:?}")]
    InvalidIndex(String),

    #[error("duplicate share index {0}")]
    DuplicateIndex(u32),

    #[error("configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for ShardError {
    fn from(err: serde_json::Error) -> Self {
        ShardError::Json(err.to_string())
    }
}

impl From<config::ConfigError> for ShardError {
    fn from(err: config::ConfigError) -> Self {
        ShardError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_are_human_readable() {
        let err = ShardError::InsufficientShares { got: 2, need: 3 };
        assert_eq!(
            err.to_string(),
            "insufficient shares: got 2, need 3 (threshold must be at least 2)"
        );

        let err = ShardError::NoViableConsensus { k: 2 };
        assert!(err.to_string().contains("every combination of 2 shares"));
    }

    #[test]
    fn test_json_errors_convert() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: ShardError = parse_err.into();
        assert!(matches!(err, ShardError::Json(_)));
    }
}
