use std::collections::HashSet;

use num_bigint::BigInt;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::ShardError;

/// A single `(index, value)` point purportedly lying on the secret polynomial.
///
/// The x-coordinate is always the share's index, kept as a `BigInt` so the
/// interpolator never converts between integer widths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Share {
    pub index: u32,
    pub x: BigInt,
    pub y: BigInt,
}

impl Share {
    pub fn new(index: u32, y: impl Into<BigInt>) -> Self {
        Share {
            index,
            x: BigInt::from(index),
            y: y.into(),
        }
    }
}

/// A decoded share document: the declared share count, the threshold and the
/// shares themselves ordered by ascending index.
///
/// # Examples
///
/// ```rust
/// use num_bigint::BigInt;
/// use shard_consensus::share::ShareDocument;
///
/// let doc = ShareDocument::from_json(r#"{
///     "keys": { "n": 2, "k": 2 },
///     "1": { "base": "10", "value": "5" },
///     "2": { "base": "2", "value": "111" }
/// }"#).unwrap();
///
/// assert_eq!(doc.k, 2);
/// assert_eq!(doc.shares[1].y, BigInt::from(7));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareDocument {
    pub n: usize,
    pub k: usize,
    pub shares: Vec<Share>,
}

#[derive(Debug, Deserialize)]
struct Keys {
    n: usize,
    k: usize,
}

/// Bases appear both as strings (`"16"`) and bare numbers (`16`) in the wild.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Radix {
    Number(u64),
    Text(String),
}

#[derive(Debug, Deserialize)]
struct Entry {
    base: Radix,
    value: String,
}

impl ShareDocument {
    /// Builds a document from already decoded shares.
    ///
    /// Shares are sorted by index; a zero or repeated index is rejected.
    pub fn new(k: usize, mut shares: Vec<Share>) -> Result<Self, ShardError> {
        let mut seen = HashSet::with_capacity(shares.len());
        for share in &shares {
            if share.index == 0 {
                return Err(ShardError::InvalidIndex(share.index.to_string()));
            }
            if !seen.insert(share.index) {
                return Err(ShardError::DuplicateIndex(share.index));
            }
        }
        shares.sort_by_key(|share| share.index);

        Ok(ShareDocument {
            n: shares.len(),
            k,
            shares,
        })
    }

    /// Parses a JSON share document of the form
    /// `{"keys": {"n": .., "k": ..}, "<index>": {"base": "..", "value": ".."}, ..}`.
    ///
    /// # Errors
    ///
    /// * [`ShardError::Json`] if the text is not a JSON object or an entry is malformed.
    /// * [`ShardError::MissingKeys`] if the `keys` object is absent or incomplete.
    /// * [`ShardError::InvalidIndex`], [`ShardError::InvalidBase`] or
    ///   [`ShardError::InvalidValue`] if an entry cannot be decoded.
    pub fn from_json(text: &str) -> Result<Self, ShardError> {
        let root: Map<String, Value> = serde_json::from_str(text)?;

        let keys = root.get("keys").ok_or(ShardError::MissingKeys)?;
        let keys: Keys =
            serde_json::from_value(keys.clone()).map_err(|_| ShardError::MissingKeys)?;

        let mut shares = Vec::new();
        for (key, value) in &root {
            if key == "keys" {
                continue;
            }
            if key.is_empty() || !key.chars().all(|c| c.is_ascii_digit()) {
                warn!("Ignoring non-share key {:?} in share document", key);
                continue;
            }
            // x = 0 would hand the secret itself to every trial that includes it
            let index: u32 = key
                .parse()
                .ok()
                .filter(|&index| index != 0)
                .ok_or_else(|| ShardError::InvalidIndex(key.clone()))?;

            let entry: Entry = serde_json::from_value(value.clone())
                .map_err(|err| ShardError::Json(format!("share {index}: {err}")))?;
            let base = match entry.base {
                Radix::Number(base) => base.to_string(),
                Radix::Text(base) => base,
            };
            let y = decode_value(index, &entry.value, &base)?;
            debug!("Decoded share {}: base {} -> {}", index, base, y);
            shares.push(Share::new(index, y));
        }

        let mut doc = ShareDocument::new(keys.k, shares)?;
        if keys.n != doc.shares.len() {
            warn!(
                "Share document declares n = {} but holds {} shares, using {}",
                keys.n,
                doc.shares.len(),
                doc.shares.len()
            );
        }
        doc.n = doc.shares.len();
        Ok(doc)
    }
}

/// Decodes `value` written in radix `base` (2 through 36, digits case-insensitive).
///
/// # Errors
///
/// Returns [`ShardError::InvalidBase`] for an unsupported radix and
/// [`ShardError::InvalidValue`] if `value` has digits outside it.
pub fn decode_value(index: u32, value: &str, base: &str) -> Result<BigInt, ShardError> {
    let radix: u32 = base
        .trim()
        .parse()
        .ok()
        .filter(|radix| (2..=36).contains(radix))
        .ok_or_else(|| ShardError::InvalidBase {
            index,
            base: base.to_string(),
        })?;

    BigInt::parse_bytes(value.trim().as_bytes(), radix).ok_or_else(|| {
        ShardError::InvalidValue {
            index,
            base: radix,
            value: value.to_string(),
        }
    })
}
