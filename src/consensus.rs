use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::combination::Combinations;
use crate::error::ShardError;
use crate::fraction::ExactFraction;
use crate::interpolate::lagrange_constant;
use crate::share::Share;

/// The outcome of a consensus search.
///
/// `inliers` and `outliers` hold original share indices, each sorted ascending.
/// Together they cover every input share exactly once. Serializes as
/// `{"secret": "<n or n/d>", "inliers": [..], "outliers": [..]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusResult {
    pub secret: ExactFraction,
    pub inliers: Vec<u32>,
    pub outliers: Vec<u32>,
}

/// A combination that interpolated cleanly, with the positions that agree with it.
struct Candidate {
    secret: ExactFraction,
    inlier: Vec<bool>,
    inlier_count: usize,
}

/// Finds the secret agreed on by the largest self-consistent subset of `shares`.
///
/// Every `k`-combination of share positions is tried in lexicographic order.
/// Each combination yields a candidate secret, and every other share is then
/// checked by swapping it in for one member of the combination and seeing
/// whether the same secret comes out. The candidate with the most agreeing
/// shares wins; on ties the earliest combination is kept.
///
/// # Arguments
///
/// * `shares` - The decoded shares, in the order the search should see them.
/// * `k` - The threshold: the number of shares that determine the polynomial.
///
/// # Errors
///
/// * [`ShardError::InsufficientShares`] if `k < 2` or fewer than `k` shares are given.
/// * [`ShardError::NoViableConsensus`] if every combination contains a repeated
///   x-coordinate.
///
/// # Examples
///
/// ```rust
/// use shard_consensus::consensus::consensus;
/// use shard_consensus::share::Share;
///
/// // f(x) = 2x + 3, with share 4 corrupted
/// let shares = vec![
///     Share::new(1, 5),
///     Share::new(2, 7),
///     Share::new(3, 9),
///     Share::new(4, 100),
/// ];
/// let result = consensus(&shares, 2).unwrap();
///
/// assert_eq!(result.secret.to_string(), "3");
/// assert_eq!(result.inliers, vec![1, 2, 3]);
/// assert_eq!(result.outliers, vec![4]);
/// ```
pub fn consensus(shares: &[Share], k: usize) -> Result<ConsensusResult, ShardError> {
    let n = shares.len();
    if k < 2 || n < k {
        return Err(ShardError::InsufficientShares {
            got: n,
            need: k.max(2),
        });
    }

    let mut best: Option<Candidate> = None;
    let mut combinations = 0usize;
    let mut degenerate = 0usize;

    for combo in Combinations::new(n, k) {
        combinations += 1;
        let Some(candidate) = evaluate(shares, &combo)? else {
            degenerate += 1;
            continue;
        };

        let improves = best
            .as_ref()
            .map_or(true, |b| candidate.inlier_count > b.inlier_count);
        if improves {
            debug!(
                "New best candidate {:?}: secret {} with {} of {} shares agreeing",
                combo, candidate.secret, candidate.inlier_count, n
            );
            best = Some(candidate);
        }
    }

    debug!(
        "Searched {} combinations, {} degenerate",
        combinations, degenerate
    );
    let best = best.ok_or(ShardError::NoViableConsensus { k })?;

    let mut inliers = Vec::with_capacity(best.inlier_count);
    let mut outliers = Vec::with_capacity(n - best.inlier_count);
    for (share, &is_inlier) in shares.iter().zip(&best.inlier) {
        if is_inlier {
            inliers.push(share.index);
        } else {
            outliers.push(share.index);
        }
    }
    inliers.sort_unstable();
    outliers.sort_unstable();

    Ok(ConsensusResult {
        secret: best.secret,
        inliers,
        outliers,
    })
}

/// Interpolates one combination and cross-validates every share outside it.
///
/// Returns `Ok(None)` when the combination itself is degenerate.
fn evaluate(shares: &[Share], combo: &[usize]) -> Result<Option<Candidate>, ShardError> {
    let points: Vec<&Share> = combo.iter().map(|&p| &shares[p]).collect();
    let secret = match lagrange_constant(&points) {
        Ok(secret) => secret,
        Err(ShardError::DegenerateInterpolation { x }) => {
            trace!("Skipping combination {:?}: repeated x = {}", combo, x);
            return Ok(None);
        }
        Err(err) => return Err(err),
    };

    let mut inlier = vec![false; shares.len()];
    for &p in combo {
        inlier[p] = true;
    }
    let mut inlier_count = combo.len();

    for r in 0..shares.len() {
        if inlier[r] {
            continue;
        }
        if is_consistent(shares, combo, r, &secret)? {
            inlier[r] = true;
            inlier_count += 1;
        }
    }

    Ok(Some(Candidate {
        secret,
        inlier,
        inlier_count,
    }))
}

/// A share agrees with `secret` if swapping it in for any single member of
/// `combo` reproduces `secret` exactly.
fn is_consistent(
    shares: &[Share],
    combo: &[usize],
    r: usize,
    secret: &ExactFraction,
) -> Result<bool, ShardError> {
    let mut trial: Vec<&Share> = Vec::with_capacity(combo.len());

    for drop in 0..combo.len() {
        trial.clear();
        trial.extend(
            combo
                .iter()
                .enumerate()
                .filter(|&(j, _)| j != drop)
                .map(|(_, &p)| &shares[p]),
        );
        trial.push(&shares[r]);

        match lagrange_constant(&trial) {
            Ok(value) if value == *secret => return Ok(true),
            Ok(_) | Err(ShardError::DegenerateInterpolation { .. }) => {}
            Err(err) => return Err(err),
        }
    }

    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::share::ShareDocument;

    fn shares(points: &[(u32, i64)]) -> Vec<Share> {
        points.iter().map(|&(i, y)| Share::new(i, y)).collect()
    }

    const SAMPLE: &str = r#"{
        "keys": { "n": 4, "k": 3 },
        "1": { "base": "10", "value": "4" },
        "2": { "base": "2", "value": "111" },
        "3": { "base": "10", "value": "12" },
        "6": { "base": "4", "value": "213" }
    }"#;

    const CORRUPTED: &str = r#"{
        "keys": { "n": 10, "k": 7 },
        "1": { "base": "6", "value": "13444211440455345511" },
        "2": { "base": "15", "value": "aed7015a346d635" },
        "3": { "base": "15", "value": "6aeeb69631c227c" },
        "4": { "base": "16", "value": "e1b5e05623d881f" },
        "5": { "base": "8", "value": "316034514573652620673" },
        "6": { "base": "3", "value": "2122212201122002221120200210011020220200" },
        "7": { "base": "3", "value": "20120221122211000100210021102001201112121" },
        "8": { "base": "6", "value": "20220554335330240002224253" },
        "9": { "base": "12", "value": "45153788322a1255483" },
        "10": { "base": "7", "value": "1101613130313526312514143" }
    }"#;

    #[test]
    fn test_sample_document_is_unanimous() {
        let doc = ShareDocument::from_json(SAMPLE).unwrap();
        let result = consensus(&doc.shares, doc.k).unwrap();

        assert_eq!(result.secret.to_string(), "3");
        assert_eq!(result.inliers, vec![1, 2, 3, 6]);
        assert!(result.outliers.is_empty());
    }

    #[test]
    fn test_detects_corrupted_shares_in_mixed_bases() {
        let doc = ShareDocument::from_json(CORRUPTED).unwrap();
        let result = consensus(&doc.shares, doc.k).unwrap();

        assert_eq!(result.secret.to_string(), "79836264049851");
        assert_eq!(result.inliers, vec![1, 3, 4, 5, 6, 7, 9, 10]);
        assert_eq!(result.outliers, vec![2, 8]);
    }

    #[test]
    fn test_search_is_deterministic() {
        let doc = ShareDocument::from_json(CORRUPTED).unwrap();
        let first = consensus(&doc.shares, doc.k).unwrap();
        let second = consensus(&doc.shares, doc.k).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_exactly_threshold_shares() {
        // f(x) = 10 - 4x + 2x^3
        let points = shares(&[(1, 8), (2, 18), (4, 122), (7, 668)]);
        let result = consensus(&points, 4).unwrap();

        assert_eq!(result.secret, ExactFraction::of(10));
        assert_eq!(result.inliers, vec![1, 2, 4, 7]);
        assert!(result.outliers.is_empty());
    }

    #[test]
    fn test_single_outlier_found_regardless_of_position() {
        // f(x) = 2x + 3
        let last = consensus(&shares(&[(1, 5), (2, 7), (3, 9), (4, 100)]), 2).unwrap();
        assert_eq!(last.secret, ExactFraction::of(3));
        assert_eq!(last.inliers, vec![1, 2, 3]);
        assert_eq!(last.outliers, vec![4]);

        // the first combination evaluated contains the bad share here
        let first = consensus(&shares(&[(1, 100), (2, 7), (3, 9), (4, 11)]), 2).unwrap();
        assert_eq!(first.secret, ExactFraction::of(3));
        assert_eq!(first.inliers, vec![2, 3, 4]);
        assert_eq!(first.outliers, vec![1]);
    }

    #[test]
    fn test_ties_keep_the_first_combination() {
        // y = x through shares 1 and 2, y = x + 7 through shares 3 and 4
        let result = consensus(&shares(&[(1, 1), (2, 2), (3, 10), (4, 11)]), 2).unwrap();

        assert_eq!(result.secret, ExactFraction::of(0));
        assert_eq!(result.inliers, vec![1, 2]);
        assert_eq!(result.outliers, vec![3, 4]);
    }

    #[test]
    fn test_degenerate_combinations_are_skipped() {
        // Two shares at x = 1 make every pair containing both unusable. Repeated
        // indices never come out of `ShareDocument`, so only the secret and the
        // size of the agreeing set are checked here.
        let mut points = shares(&[(1, 5), (2, 7), (3, 9)]);
        points.insert(1, Share::new(1, 9));

        let result = consensus(&points, 2).unwrap();
        assert_eq!(result.secret, ExactFraction::of(3));
        assert_eq!(result.inliers.len(), 3);
        assert_eq!(result.inliers.len() + result.outliers.len(), points.len());
    }

    #[test]
    fn test_fractional_consensus_secret() {
        // f(x) = (x + 1) / 2, integral only at odd x
        let points = shares(&[(1, 1), (3, 2), (5, 3), (7, 4)]);
        let result = consensus(&points, 2).unwrap();

        assert_eq!(result.secret.to_string(), "1/2");
        assert_eq!(result.inliers, vec![1, 3, 5, 7]);
    }

    #[test]
    fn test_rejects_insufficient_shares() {
        let points = shares(&[(1, 5), (2, 7)]);

        assert_eq!(
            consensus(&points, 3),
            Err(ShardError::InsufficientShares { got: 2, need: 3 })
        );
        assert_eq!(
            consensus(&points, 1),
            Err(ShardError::InsufficientShares { got: 2, need: 2 })
        );
        assert_eq!(
            consensus(&[], 0),
            Err(ShardError::InsufficientShares { got: 0, need: 2 })
        );
    }

    #[test]
    fn test_all_degenerate_has_no_consensus() {
        let points = vec![Share::new(1, 5), Share::new(1, 6), Share::new(1, 7)];

        assert_eq!(
            consensus(&points, 2),
            Err(ShardError::NoViableConsensus { k: 2 })
        );
    }
}
