use serde::Serialize;

use crate::consensus::ConsensusResult;
use crate::error::ShardError;
use crate::fraction::ExactFraction;

/// The constant term through an explicit set of shares, as printed by
/// `shard interpolate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterpolationReport {
    pub secret: ExactFraction,
    pub shares: Vec<u32>,
}

/// Renders a consensus result as JSON.
///
/// # Examples
///
/// ```rust
/// use shard_consensus::consensus::ConsensusResult;
/// use shard_consensus::fraction::ExactFraction;
/// use shard_consensus::report::render;
///
/// let result = ConsensusResult {
///     secret: ExactFraction::of(3),
///     inliers: vec![1, 2, 3],
///     outliers: vec![4],
/// };
/// assert_eq!(
///     render(&result, false).unwrap(),
///     r#"{"secret":"3","inliers":[1,2,3],"outliers":[4]}"#
/// );
/// ```
pub fn render(result: &ConsensusResult, pretty: bool) -> Result<String, ShardError> {
    to_json(result, pretty)
}

pub fn render_interpolation(
    report: &InterpolationReport,
    pretty: bool,
) -> Result<String, ShardError> {
    to_json(report, pretty)
}

fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String, ShardError> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(text)
}

#[cfg(test)]
mod tests {
    use num_bigint::BigInt;

    use super::*;

    #[test]
    fn test_render_pretty() {
        let result = ConsensusResult {
            secret: ExactFraction::new(BigInt::from(-7), BigInt::from(2)).unwrap(),
            inliers: vec![1, 3],
            outliers: vec![],
        };

        let text = render(&result, true).unwrap();
        assert_eq!(
            text,
            "{\n  \"secret\": \"-7/2\",\n  \"inliers\": [\n    1,\n    3\n  ],\n  \"outliers\": []\n}"
        );
    }

    #[test]
    fn test_rendered_result_parses_back() {
        let result = ConsensusResult {
            secret: ExactFraction::of(BigInt::parse_bytes(b"79836264049851", 10).unwrap()),
            inliers: vec![1, 3, 4, 5, 6, 7, 9, 10],
            outliers: vec![2, 8],
        };

        let text = render(&result, false).unwrap();
        let back: ConsensusResult = serde_json::from_str(&text).unwrap();
        assert_eq!(back, result);
    }

    #[test]
    fn test_render_interpolation() {
        let report = InterpolationReport {
            secret: ExactFraction::of(10),
            shares: vec![1, 2, 4, 7],
        };

        assert_eq!(
            render_interpolation(&report, false).unwrap(),
            r#"{"secret":"10","shares":[1,2,4,7]}"#
        );
    }
}
