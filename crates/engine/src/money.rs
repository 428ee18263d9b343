use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Sub, SubAssign},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Signed money amount represented as **integer cents** (hundredths of a
/// rupiah).
///
/// Every ledger total is accumulated in this type so that sums over many small
/// transactions never drift the way floating-point addition does.
///
/// # Examples
///
/// ```rust
/// use engine::MoneyCents;
///
/// let amount = MoneyCents::new(100_000_00);
/// assert_eq!(amount.cents(), 10_000_000);
/// assert_eq!(amount.to_string(), "Rp 100.000,00");
/// ```
///
/// Parsing from form input (accepts `.` or `,` as decimal separator; rejects
/// more than 2 decimals):
///
/// ```rust
/// use engine::MoneyCents;
///
/// assert_eq!("10".parse::<MoneyCents>().unwrap().cents(), 1000);
/// assert_eq!("10,5".parse::<MoneyCents>().unwrap().cents(), 1050);
/// assert!("12.345".parse::<MoneyCents>().is_err());
/// ```
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
#[repr(transparent)]
pub struct MoneyCents(i64);

impl MoneyCents {
    pub const ZERO: MoneyCents = MoneyCents(0);

    /// Largest amount a single ledger entry may carry: one trillion rupiah.
    pub const MAX_ENTRY: MoneyCents = MoneyCents(1_000_000_000_000 * 100);

    /// Creates a new amount from integer cents.
    #[must_use]
    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    /// Creates a new amount from whole rupiah.
    #[must_use]
    pub const fn from_units(units: i64) -> Self {
        Self(units * 100)
    }

    /// Returns the raw value in cents.
    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Addition clamped at the bounds of `i64`.
    #[must_use]
    pub const fn saturating_add(self, rhs: MoneyCents) -> MoneyCents {
        MoneyCents(self.0.saturating_add(rhs.0))
    }

    /// Subtraction clamped at the bounds of `i64`.
    #[must_use]
    pub const fn saturating_sub(self, rhs: MoneyCents) -> MoneyCents {
        MoneyCents(self.0.saturating_sub(rhs.0))
    }

    /// Fails unless `self` is a valid ledger entry amount: not negative and
    /// not above [`MoneyCents::MAX_ENTRY`].
    pub fn check_entry(self) -> Result<Self, EngineError> {
        if self.is_negative() {
            return Err(EngineError::Validation(
                "amount must not be negative".to_string(),
            ));
        }
        if self > Self::MAX_ENTRY {
            return Err(EngineError::Validation(format!(
                "amount must not exceed {}",
                Self::MAX_ENTRY
            )));
        }
        Ok(self)
    }

    /// Parses a user-entered ledger amount.
    pub fn parse_non_negative(input: &str) -> Result<Self, EngineError> {
        input.parse::<MoneyCents>()?.check_entry()
    }
}

impl fmt::Display for MoneyCents {
    /// Indonesian notation: `.` groups thousands, `,` separates cents.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let digits = (abs / 100).to_string();
        let cents = abs % 100;

        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (idx, ch) in digits.chars().enumerate() {
            if idx > 0 && (digits.len() - idx) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(ch);
        }

        write!(f, "{sign}Rp {grouped},{cents:02}")
    }
}

impl From<i64> for MoneyCents {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<MoneyCents> for i64 {
    fn from(value: MoneyCents) -> Self {
        value.0
    }
}

impl Add for MoneyCents {
    type Output = MoneyCents;

    fn add(self, rhs: MoneyCents) -> Self::Output {
        MoneyCents(self.0 + rhs.0)
    }
}

impl AddAssign for MoneyCents {
    fn add_assign(&mut self, rhs: MoneyCents) {
        self.0 += rhs.0;
    }
}

impl Sub for MoneyCents {
    type Output = MoneyCents;

    fn sub(self, rhs: MoneyCents) -> Self::Output {
        MoneyCents(self.0 - rhs.0)
    }
}

impl SubAssign for MoneyCents {
    fn sub_assign(&mut self, rhs: MoneyCents) {
        self.0 -= rhs.0;
    }
}

impl Sum for MoneyCents {
    fn sum<I: Iterator<Item = MoneyCents>>(iter: I) -> Self {
        iter.fold(MoneyCents::ZERO, Add::add)
    }
}

impl FromStr for MoneyCents {
    type Err = EngineError;

    /// Parses a decimal string into cents.
    ///
    /// Accepts `.` or `,` as decimal separator and an optional leading `+`/`-`.
    /// At most 2 fractional digits are allowed.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| EngineError::Validation(format!("invalid amount: {reason}"));

        let trimmed = s.trim();
        let (negative, rest) = match trimmed.strip_prefix('-') {
            Some(stripped) => (true, stripped.trim_start()),
            None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed).trim_start()),
        };
        if rest.is_empty() {
            return Err(invalid("empty"));
        }

        let normalized = rest.replace(',', ".");
        let (units_str, frac_str) = match normalized.split_once('.') {
            Some((units, frac)) => (units, frac),
            None => (normalized.as_str(), ""),
        };

        if units_str.is_empty()
            || !units_str.chars().all(|c| c.is_ascii_digit())
            || !frac_str.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid("not a number"));
        }

        let units: i64 = units_str.parse().map_err(|_| invalid("too large"))?;
        let cents: i64 = match frac_str.len() {
            0 => 0,
            1 => frac_str.parse::<i64>().map_err(|_| invalid("not a number"))? * 10,
            2 => frac_str.parse::<i64>().map_err(|_| invalid("not a number"))?,
            _ => return Err(invalid("too many decimals")),
        };

        let total = units
            .checked_mul(100)
            .and_then(|v| v.checked_add(cents))
            .ok_or_else(|| invalid("too large"))?;

        Ok(MoneyCents(if negative { -total } else { total }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_groups_thousands() {
        assert_eq!(MoneyCents::new(0).to_string(), "Rp 0,00");
        assert_eq!(MoneyCents::new(5).to_string(), "Rp 0,05");
        assert_eq!(MoneyCents::from_units(1_000).to_string(), "Rp 1.000,00");
        assert_eq!(MoneyCents::new(123_456_789).to_string(), "Rp 1.234.567,89");
        assert_eq!(MoneyCents::from_units(-40_000).to_string(), "-Rp 40.000,00");
    }

    #[test]
    fn parse_accepts_dot_or_comma() {
        assert_eq!("10".parse::<MoneyCents>().unwrap().cents(), 1000);
        assert_eq!("10.5".parse::<MoneyCents>().unwrap().cents(), 1050);
        assert_eq!("10,50".parse::<MoneyCents>().unwrap().cents(), 1050);
        assert_eq!("-0.01".parse::<MoneyCents>().unwrap().cents(), -1);
        assert_eq!("+1.00".parse::<MoneyCents>().unwrap().cents(), 100);
        assert_eq!("  2.30 ".parse::<MoneyCents>().unwrap().cents(), 230);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!("12.345".parse::<MoneyCents>().is_err());
        assert!("".parse::<MoneyCents>().is_err());
        assert!("1.2.3".parse::<MoneyCents>().is_err());
        assert!("abc".parse::<MoneyCents>().is_err());
        assert!(".5".parse::<MoneyCents>().is_err());
    }

    #[test]
    fn non_negative_parse_rejects_negative_amounts() {
        assert_eq!(
            MoneyCents::parse_non_negative("100000").unwrap(),
            MoneyCents::from_units(100_000)
        );
        assert!(matches!(
            MoneyCents::parse_non_negative("-1"),
            Err(EngineError::Validation(_))
        ));
    }

    #[test]
    fn entry_amounts_are_bounded() {
        assert_eq!(MoneyCents::MAX_ENTRY.check_entry().unwrap(), MoneyCents::MAX_ENTRY);
        assert!(matches!(
            MoneyCents::new(i64::MAX).check_entry(),
            Err(EngineError::Validation(_))
        ));
        assert!(MoneyCents::parse_non_negative("1000000000001").is_err());
        assert!(MoneyCents::parse_non_negative("1000000000000").is_ok());
    }

    #[test]
    fn saturating_arithmetic_stays_in_range() {
        let max = MoneyCents::new(i64::MAX);
        assert_eq!(max.saturating_add(MoneyCents::new(1)), max);
        assert_eq!(
            MoneyCents::new(i64::MIN).saturating_sub(MoneyCents::new(1)),
            MoneyCents::new(i64::MIN)
        );
    }

    #[test]
    fn sum_of_many_small_amounts_is_exact() {
        let total: MoneyCents = std::iter::repeat_n(MoneyCents::new(10), 1_000).sum();
        assert_eq!(total, MoneyCents::from_units(100));
    }
}
