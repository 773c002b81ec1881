use core::fmt;
use std::ops::{Add, Mul, Neg, Sub};
use std::str::FromStr;

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, Zero};
use serde::{
    de::{self, Visitor},
    Deserialize, Deserializer, Serialize, Serializer,
};

use crate::error::ShardError;

/// An exact rational number over arbitrary-precision integers.
///
/// Every value is kept in lowest terms with a strictly positive denominator, so
/// two fractions are equal exactly when their numerators and denominators are.
/// Zero is always `0/1`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExactFraction {
    numer: BigInt,
    denom: BigInt,
}

impl ExactFraction {
    /// Constructs the normalized fraction `numer / denom`.
    ///
    /// # Errors
    ///
    /// Returns [`ShardError::InvalidFraction`] if `denom` is zero.
    pub fn new(numer: BigInt, denom: BigInt) -> Result<Self, ShardError> {
        if denom.is_zero() {
            return Err(ShardError::InvalidFraction);
        }
        Ok(Self::normalize(numer, denom))
    }

    /// The integer `v` as the fraction `v/1`.
    pub fn of(v: impl Into<BigInt>) -> Self {
        ExactFraction {
            numer: v.into(),
            denom: BigInt::one(),
        }
    }

    pub fn zero() -> Self {
        Self::of(0)
    }

    pub fn one() -> Self {
        Self::of(1)
    }

    pub fn numer(&self) -> &BigInt {
        &self.numer
    }

    pub fn denom(&self) -> &BigInt {
        &self.denom
    }

    pub fn is_zero(&self) -> bool {
        self.numer.is_zero()
    }

    pub fn is_integer(&self) -> bool {
        self.denom.is_one()
    }

    /// Divides `self` by `other`.
    ///
    /// # Errors
    ///
    /// Returns [`ShardError::DivisionByZero`] if `other` is zero.
    pub fn checked_div(&self, other: &ExactFraction) -> Result<ExactFraction, ShardError> {
        if other.is_zero() {
            return Err(ShardError::DivisionByZero);
        }
        Ok(Self::normalize(
            &self.numer * &other.denom,
            &self.denom * &other.numer,
        ))
    }

    // Callers guarantee `denom != 0`.
    fn normalize(mut numer: BigInt, mut denom: BigInt) -> ExactFraction {
        if denom.is_negative() {
            numer = -numer;
            denom = -denom;
        }
        let g = numer.gcd(&denom);
        if !g.is_one() {
            numer /= &g;
            denom /= &g;
        }
        ExactFraction { numer, denom }
    }
}

impl Default for ExactFraction {
    fn default() -> Self {
        Self::zero()
    }
}

impl From<BigInt> for ExactFraction {
    fn from(v: BigInt) -> Self {
        Self::of(v)
    }
}

impl From<i64> for ExactFraction {
    fn from(v: i64) -> Self {
        Self::of(v)
    }
}

impl<'a> Add<&'a ExactFraction> for &'a ExactFraction {
    type Output = ExactFraction;

    fn add(self, rhs: &'a ExactFraction) -> ExactFraction {
        let numer = &self.numer * &rhs.denom + &rhs.numer * &self.denom;
        ExactFraction::normalize(numer, &self.denom * &rhs.denom)
    }
}

impl<'a> Sub<&'a ExactFraction> for &'a ExactFraction {
    type Output = ExactFraction;

    fn sub(self, rhs: &'a ExactFraction) -> ExactFraction {
        let numer = &self.numer * &rhs.denom - &rhs.numer * &self.denom;
        ExactFraction::normalize(numer, &self.denom * &rhs.denom)
    }
}

impl<'a> Mul<&'a ExactFraction> for &'a ExactFraction {
    type Output = ExactFraction;

    fn mul(self, rhs: &'a ExactFraction) -> ExactFraction {
        ExactFraction::normalize(&self.numer * &rhs.numer, &self.denom * &rhs.denom)
    }
}

impl Add for ExactFraction {
    type Output = ExactFraction;

    fn add(self, rhs: ExactFraction) -> ExactFraction {
        &self + &rhs
    }
}

impl Sub for ExactFraction {
    type Output = ExactFraction;

    fn sub(self, rhs: ExactFraction) -> ExactFraction {
        &self - &rhs
    }
}

impl Mul for ExactFraction {
    type Output = ExactFraction;

    fn mul(self, rhs: ExactFraction) -> ExactFraction {
        &self * &rhs
    }
}

impl Neg for ExactFraction {
    type Output = ExactFraction;

    fn neg(self) -> ExactFraction {
        ExactFraction {
            numer: -self.numer,
            denom: self.denom,
        }
    }
}

/// Renders `n` for integers and `n/d` otherwise.
impl fmt::Display for ExactFraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_integer() {
            write!(f, "{}", self.numer)
        } else {
            write!(f, "{}/{}", self.numer, self.denom)
        }
    }
}

/// Parses the [`Display`](fmt::Display) form back into a fraction.
impl FromStr for ExactFraction {
    type Err = ShardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse = |part: &str| {
            BigInt::from_str(part.trim())
                .map_err(|_| ShardError::Json(format!("invalid fraction {s:?}")))
        };
        match s.split_once('/') {
            Some((n, d)) => ExactFraction::new(parse(n)?, parse(d)?),
            None => Ok(ExactFraction::of(parse(s)?)),
        }
    }
}

/// Serializes as the decimal string rendering, so arbitrarily large secrets
/// survive formats with bounded numbers such as JSON.
impl Serialize for ExactFraction {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ExactFraction {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct FractionVisitor;

        impl<'de> Visitor<'de> for FractionVisitor {
            type Value = ExactFraction;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a string of the form \"n\" or \"n/d\"")
            }

            fn visit_str<E>(self, v: &str) -> Result<ExactFraction, E>
            where
                E: de::Error,
            {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_str(FractionVisitor)
    }
}
