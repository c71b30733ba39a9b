//! Arbitrary-precision, non-negative decimal values.
//!
//! RULE: Every sip count and production rate in the core is a Quantity.
//! Nothing else in the simulation does native floating-point arithmetic
//! on game values — progression routinely passes 1e308, where a plain
//! f64 saturates to infinity and comparisons stop meaning anything.
//!
//! Representation: a mantissa normalized into [1, 10) (or exactly 0)
//! plus a decimal exponent. Addition across more than 17 orders of
//! magnitude keeps the larger operand; that is the precision floor of
//! the representation and well past anything a player can observe.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use thiserror::Error;

/// Significant decimal digits carried by the mantissa. Operands further
/// apart than this cannot affect each other under add/subtract.
const SIGNIFICANT_DIGITS: i64 = 17;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("not a numeric value: {input:?}")]
pub struct QuantityParseError {
    pub input: String,
}

/// A non-negative decimal of unbounded magnitude.
#[derive(Debug, Clone, Copy)]
pub struct Quantity {
    /// 0.0, or a finite value in [1, 10).
    mantissa: f64,
    exponent: i64,
}

impl Quantity {
    pub const ZERO: Quantity = Quantity {
        mantissa: 0.0,
        exponent: 0,
    };

    /// Bring an arbitrary (mantissa, exponent) pair into canonical form.
    /// Non-finite and non-positive mantissas collapse to zero — the type
    /// is non-negative by construction.
    fn normalized(mantissa: f64, exponent: i64) -> Self {
        if !mantissa.is_finite() || mantissa <= 0.0 {
            return Self::ZERO;
        }
        let shift = mantissa.log10().floor() as i64;
        // Scale by an exactly-representable power of ten: divide for
        // downward shifts, multiply for upward ones. Dividing by an
        // inexact reciprocal (0.1, 0.001, …) would double-round.
        let mut m = if shift >= 0 {
            mantissa / 10f64.powi(shift as i32)
        } else {
            mantissa * 10f64.powi(-shift as i32)
        };
        if !m.is_finite() {
            // Subnormal underflow on the way up; nothing a game can buy
            // with it anyway.
            return Self::ZERO;
        }
        let mut e = exponent + shift;
        // log10/powi rounding can land a hair outside [1, 10).
        if m >= 10.0 {
            m /= 10.0;
            e += 1;
        }
        if m < 1.0 {
            m *= 10.0;
            e -= 1;
        }
        Self {
            mantissa: m,
            exponent: e,
        }
    }

    /// Boundary constructor for config values (efficiency factors, base
    /// rates). Negative and non-finite inputs clamp to zero.
    pub fn from_f64(value: f64) -> Self {
        Self::normalized(value, 0)
    }

    pub fn is_zero(&self) -> bool {
        self.mantissa == 0.0
    }

    pub fn add(&self, other: &Quantity) -> Quantity {
        if self.is_zero() {
            return *other;
        }
        if other.is_zero() {
            return *self;
        }
        let (hi, lo) = if self.exponent >= other.exponent {
            (self, other)
        } else {
            (other, self)
        };
        let gap = hi.exponent - lo.exponent;
        if gap > SIGNIFICANT_DIGITS {
            return *hi;
        }
        // Align in the smaller operand's frame; 10^gap is exact there.
        let m = hi.mantissa * 10f64.powi(gap as i32) + lo.mantissa;
        Self::normalized(m, lo.exponent)
    }

    /// Subtraction clamped at zero: a Quantity can never go negative.
    pub fn saturating_sub(&self, other: &Quantity) -> Quantity {
        if other.gte(self) {
            return Self::ZERO;
        }
        if other.is_zero() {
            return *self;
        }
        // self > other here, so the gap is non-negative.
        let gap = self.exponent - other.exponent;
        if gap > SIGNIFICANT_DIGITS {
            return *self;
        }
        let m = self.mantissa * 10f64.powi(gap as i32) - other.mantissa;
        Self::normalized(m, other.exponent)
    }

    pub fn mul(&self, other: &Quantity) -> Quantity {
        if self.is_zero() || other.is_zero() {
            return Self::ZERO;
        }
        // Mantissas live in [1, 10), so the raw product stays under 100.
        Self::normalized(
            self.mantissa * other.mantissa,
            self.exponent + other.exponent,
        )
    }

    /// Division by zero yields zero. The core only ever divides by
    /// validated denominators; see the load-time interval clamp.
    pub fn div(&self, other: &Quantity) -> Quantity {
        if self.is_zero() || other.is_zero() {
            return Self::ZERO;
        }
        Self::normalized(
            self.mantissa / other.mantissa,
            self.exponent - other.exponent,
        )
    }

    pub fn gte(&self, other: &Quantity) -> bool {
        self >= other
    }

    /// Round-trippable canonical form: `"0"`, or `"{mantissa}e{exponent}"`
    /// with the mantissa printed at shortest round-trip precision.
    pub fn to_canonical_string(&self) -> String {
        if self.is_zero() {
            "0".to_string()
        } else {
            format!("{:?}e{}", self.mantissa, self.exponent)
        }
    }

    /// Parse a decimal string: plain ("42", "0.5") or scientific
    /// ("3.6e3", "1e400"). Negative numeric input clamps to zero;
    /// anything non-numeric is a parse error.
    pub fn parse(input: &str) -> Result<Quantity, QuantityParseError> {
        let err = || QuantityParseError {
            input: input.to_string(),
        };
        let s = input.trim();
        if s.is_empty() {
            return Err(err());
        }
        let (mantissa_part, exponent) = match s.split_once(['e', 'E']) {
            Some((m, e)) => (m, e.parse::<i64>().map_err(|_| err())?),
            None => (s, 0),
        };
        let mantissa: f64 = mantissa_part.parse().map_err(|_| err())?;
        // f64's parser accepts "inf" and "NaN"; those are not quantities.
        if !mantissa.is_finite() {
            return Err(err());
        }
        Ok(Self::normalized(mantissa, exponent))
    }
}

impl From<u64> for Quantity {
    fn from(value: u64) -> Self {
        Self::normalized(value as f64, 0)
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_canonical_string())
    }
}

impl PartialEq for Quantity {
    fn eq(&self, other: &Self) -> bool {
        self.mantissa == other.mantissa && self.exponent == other.exponent
    }
}

impl Eq for Quantity {}

impl PartialOrd for Quantity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Quantity {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.is_zero(), other.is_zero()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => self
                .exponent
                .cmp(&other.exponent)
                // Mantissas are finite by construction, so the partial
                // comparison is total here.
                .then(
                    self.mantissa
                        .partial_cmp(&other.mantissa)
                        .unwrap_or(Ordering::Equal),
                ),
        }
    }
}

impl Serialize for Quantity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_canonical_string())
    }
}

impl<'de> Deserialize<'de> for Quantity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Quantity::parse(&s).map_err(serde::de::Error::custom)
    }
}
