//! # Shamir Secret Recovery with Outlier Detection
//!
//! This library recovers a secret from a set of Shamir shares when some of those shares may have
//! been corrupted. It decodes share documents, interpolates the secret with exact rational
//! arithmetic, and runs a brute-force consensus search to tell good shares from bad ones.
//!
//! ## Shamir's Secret Sharing (SSS)
//!
//! A secret `S` is hidden as the constant term of a polynomial of degree `k-1` (where `k` is the
//! threshold number of shares needed to reconstruct the secret):
//!
//! ```ignore
//! f(x) = a0 + a1*x + a2*x^2 + ... + a(k-1)*x^(k-1)
//! ```
//!
//! where `a0 = S`. Each share is a point `(x, f(x))`, and any `k` of them determine `f`, and so
//! `S`, through Lagrange interpolation at `x = 0`. Here the arithmetic is over the rationals with
//! arbitrary-precision integers rather than a finite field, so every intermediate value is exact.
//!
//! ### Consensus Over Corrupted Shares
//!
//! If a share is wrong, any `k`-subset containing it yields the wrong secret, and nothing about
//! the share itself says so. The search therefore tries every `k`-subset, and for each one counts
//! how many of the remaining shares reproduce the same secret when swapped in. The subset with
//! the most corroborating shares wins; the shares that never agree with it are the outliers.
//! The search visits `C(n, k)` subsets, which is fine for the handful of shares it is meant for.
//!
//! ## Usage in the Code
//!
//! ### Example: Interpolating a Secret
//!
//! ```rust
//! use shard_consensus::interpolate::lagrange_constant;
//! use shard_consensus::share::Share;
//!
//! // f(x) = 2x + 3
//! let shares = [Share::new(1, 5), Share::new(2, 7)];
//! let secret = lagrange_constant(&shares).unwrap();
//! assert_eq!(secret.to_string(), "3");
//! ```
//!
//! ### Example: Recovering a Secret from a Share Document
//!
//! ```rust
//! use shard_consensus::consensus::consensus;
//! use shard_consensus::share::ShareDocument;
//!
//! let doc = ShareDocument::from_json(r#"{
//!     "keys": { "n": 4, "k": 3 },
//!     "1": { "base": "10", "value": "4" },
//!     "2": { "base": "2", "value": "111" },
//!     "3": { "base": "10", "value": "12" },
//!     "6": { "base": "4", "value": "213" }
//! }"#).unwrap();
//!
//! let result = consensus(&doc.shares, doc.k).unwrap();
//! assert_eq!(result.secret.to_string(), "3");
//! assert_eq!(result.inliers, vec![1, 2, 3, 6]);
//! assert!(result.outliers.is_empty());
//! ```
//!
//! ## Modules
//!
//! - `fraction`: Exact rational numbers over big integers.
//! - `interpolate`: Lagrange interpolation of shares.
//! - `combination`: Lexicographic k-combination enumeration.
//! - `consensus`: The outlier-tolerant consensus search.
//! - `share`: Shares and share document decoding.
//! - `report`: JSON rendering of results.
//! - `config`: Layered solver settings.
//! - `error`: The crate's error type.

/// The `fraction` module implements `ExactFraction`, a rational number kept in lowest terms with a
/// positive denominator. Equality is exact, which the consensus search relies on.
pub mod fraction;

/// The `interpolate` module evaluates the polynomial through a set of shares, most importantly at
/// `x = 0` where the secret lives.
pub mod interpolate;

/// The `combination` module enumerates k-subsets of share positions iteratively.
pub mod combination;

/// The `consensus` module searches every k-subset of shares for the secret that the largest number
/// of shares agree on, and partitions the shares into inliers and outliers.
pub mod consensus;

/// The `share` module defines the `Share` type and decodes JSON share documents whose values are
/// written in arbitrary bases.
pub mod share;

/// The `report` module renders results as JSON.
pub mod report;

/// The `config` module loads solver settings from a TOML file and the environment.
pub mod config;

pub mod error;

pub use consensus::{consensus, ConsensusResult};
pub use error::ShardError;
pub use fraction::ExactFraction;
pub use share::{Share, ShareDocument};
