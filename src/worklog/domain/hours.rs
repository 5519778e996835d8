//! Fixed-point hour durations.

use super::WorklogDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;

/// Non-negative duration measured in hundredths of an hour.
///
/// Inbound values are rounded to the nearest hundredth once, at the edge, so
/// every later sum is exact and grouped totals always equal the row total.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Hours(u32);

impl Hours {
    /// Zero hours.
    pub const ZERO: Self = Self(0);

    /// Largest storable duration; row stores keep hundredths in a signed
    /// 32-bit column.
    pub const MAX: Self = Self(i32::MAX.unsigned_abs());

    const SCALE: u32 = 100;

    /// Creates a duration from hundredths of an hour, clamped to
    /// [`Hours::MAX`].
    #[must_use]
    pub const fn from_centi(centi: u32) -> Self {
        if centi > Self::MAX.0 {
            Self::MAX
        } else {
            Self(centi)
        }
    }

    /// Creates a duration from whole hours.
    #[must_use]
    pub const fn from_whole(hours: u16) -> Self {
        // Widening u16 -> u32; the product stays below `MAX`.
        Self(hours as u32 * Self::SCALE)
    }

    /// Converts a floating-point hour count into a fixed-point duration.
    ///
    /// # Errors
    ///
    /// Returns [`WorklogDomainError::InvalidHours`] when the value is
    /// negative, not finite, or exceeds the storable range.
    #[expect(
        clippy::float_arithmetic,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "value is range-checked before the rounding cast"
    )]
    pub fn from_f64(value: f64) -> Result<Self, WorklogDomainError> {
        if !value.is_finite() || value < 0.0 {
            return Err(WorklogDomainError::InvalidHours(value.to_string()));
        }
        let scaled = (value * f64::from(Self::SCALE)).round();
        if scaled > f64::from(Self::MAX.0) {
            return Err(WorklogDomainError::InvalidHours(value.to_string()));
        }
        Ok(Self(scaled as u32))
    }

    /// Returns the duration in hundredths of an hour.
    #[must_use]
    pub const fn centi(self) -> u32 {
        self.0
    }

    /// Returns the duration as fractional hours.
    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        reason = "presentation-only conversion for JSON responses"
    )]
    pub fn as_f64(self) -> f64 {
        f64::from(self.0) / f64::from(Self::SCALE)
    }

    /// Adds two durations, returning `None` past [`Hours::MAX`].
    #[must_use]
    pub const fn checked_add(self, other: Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(total) if total <= Self::MAX.0 => Some(Self(total)),
            _ => None,
        }
    }

    /// Adds two durations, clamping at [`Hours::MAX`].
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        match self.checked_add(other) {
            Some(total) => total,
            None => Self::MAX,
        }
    }
}

impl Sum for Hours {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Self::saturating_add)
    }
}

impl<'a> Sum<&'a Self> for Hours {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

/// Formats with one decimal place, rounding half up (`3.5`, `0.3`).
impl fmt::Display for Hours {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tenths = self.0.saturating_add(5).div_euclid(10);
        write!(f, "{}.{}", tenths.div_euclid(10), tenths.rem_euclid(10))
    }
}
