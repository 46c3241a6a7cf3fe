//! Fixed-point monetary amounts.
//!
//! Every amount is stored as an `i64` count of milliunits (1/1000 of a currency
//! unit). Floating point never touches a stored value; decimal strings are parsed
//! digit by digit at the boundary.

use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

/// Number of milliunits in one currency unit.
pub const MILLIUNITS_PER_UNIT: i64 = 1000;

/// Largest magnitude `parse` accepts: $999,999,999,999.999.
///
/// Keeps any realistic number of stored amounts summable inside an `i64`.
pub const MAX_INPUT_MAGNITUDE: i64 = 999_999_999_999_999;

const CURRENCY_SYMBOL: char = '$';
const GROUPING_SEPARATOR: char = ',';

/// A signed monetary amount in milliunits.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Milliunits(i64);

impl Milliunits {
    pub const ZERO: Milliunits = Milliunits(0);

    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Builds an amount from whole cents, e.g. `from_cents(1050)` is $10.50.
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents * 10)
    }

    pub const fn value(self) -> i64 {
        self.0
    }

    /// Whole currency units, truncated toward zero.
    pub const fn whole_units(self) -> i64 {
        self.0 / MILLIUNITS_PER_UNIT
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    pub const fn abs(self) -> Self {
        Self(self.0.abs())
    }

    pub fn checked_add(self, rhs: Self) -> Result<Self, MoneyError> {
        self.0
            .checked_add(rhs.0)
            .map(Self)
            .ok_or(MoneyError::Overflow)
    }

    pub fn checked_sub(self, rhs: Self) -> Result<Self, MoneyError> {
        self.0
            .checked_sub(rhs.0)
            .map(Self)
            .ok_or(MoneyError::Overflow)
    }

    /// Sums without wrapping; fails on the first overflowing step.
    pub fn checked_sum<I>(values: I) -> Result<Self, MoneyError>
    where
        I: IntoIterator<Item = Self>,
    {
        values
            .into_iter()
            .try_fold(Self::ZERO, |total, value| total.checked_add(value))
    }

    /// Parses a user-entered dollar string such as `"$1,234.50"` or `"-10"`.
    ///
    /// Currency symbols, thousands separators and whitespace are ignored. The
    /// value is rounded to the nearest milliunit with halves rounded toward
    /// positive infinity. Magnitudes above [`MAX_INPUT_MAGNITUDE`] and exponent
    /// notation such as `1e3` are rejected.
    pub fn parse(input: &str) -> Result<Self, MoneyError> {
        let cleaned: String = input
            .chars()
            .filter(|ch| *ch != CURRENCY_SYMBOL && *ch != GROUPING_SEPARATOR && !ch.is_whitespace())
            .collect();
        if cleaned.is_empty() {
            return Err(MoneyError::Empty);
        }

        let (negative, unsigned) = match cleaned.as_bytes()[0] {
            b'-' => (true, &cleaned[1..]),
            b'+' => (false, &cleaned[1..]),
            _ => (false, cleaned.as_str()),
        };
        let malformed = || MoneyError::Malformed(input.trim().to_string());

        let (whole, fraction) = match unsigned.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (unsigned, ""),
        };
        if whole.is_empty() && fraction.is_empty() {
            return Err(malformed());
        }
        if !all_digits(whole) || !all_digits(fraction) {
            return Err(malformed());
        }

        let out_of_range = || MoneyError::OutOfRange(input.trim().to_string());
        let mut magnitude: i64 = 0;
        for digit in whole.bytes() {
            magnitude = magnitude
                .checked_mul(10)
                .and_then(|value| value.checked_add(i64::from(digit - b'0')))
                .ok_or_else(out_of_range)?;
        }
        magnitude = magnitude
            .checked_mul(MILLIUNITS_PER_UNIT)
            .ok_or_else(out_of_range)?;

        let (milli_digits, rest) = fraction.split_at(fraction.len().min(3));
        let mut milli: i64 = 0;
        for position in 0..3 {
            let digit = milli_digits.as_bytes().get(position).map_or(0, |d| d - b'0');
            milli = milli * 10 + i64::from(digit);
        }
        magnitude = magnitude
            .checked_add(milli + rounding_increment(rest, negative))
            .ok_or_else(out_of_range)?;
        if magnitude > MAX_INPUT_MAGNITUDE {
            return Err(out_of_range());
        }

        Ok(Self(if negative { -magnitude } else { magnitude }))
    }

    /// Formats the amount as en-US currency with two decimals, e.g. `-$1,234.50`.
    pub fn to_display_string(self) -> String {
        let cents = (self.0.unsigned_abs() + 5) / 10;
        let units = cents / 100;
        let remainder = cents % 100;
        let sign = if self.0 < 0 && cents != 0 { "-" } else { "" };
        format!(
            "{sign}{CURRENCY_SYMBOL}{}.{remainder:02}",
            group_thousands(units)
        )
    }

    /// Classifies the amount for display coloring.
    pub fn tone(self) -> AmountTone {
        match self.0.signum() {
            1 => AmountTone::Positive,
            -1 => AmountTone::Negative,
            _ => AmountTone::Zero,
        }
    }
}

fn all_digits(value: &str) -> bool {
    value.bytes().all(|b| b.is_ascii_digit())
}

/// Decides whether the digits beyond the third decimal place round the magnitude up.
fn rounding_increment(rest: &str, negative: bool) -> i64 {
    let mut digits = rest.bytes();
    let first = match digits.next() {
        Some(digit) => digit - b'0',
        None => return 0,
    };
    let tail_nonzero = digits.any(|digit| digit != b'0');
    let above_half = first > 5 || (first == 5 && tail_nonzero);
    let exactly_half = first == 5 && !tail_nonzero;
    if above_half || (exactly_half && !negative) {
        1
    } else {
        0
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(GROUPING_SEPARATOR);
        }
        grouped.push(ch);
    }
    grouped
}

/// Sign-based tone a display layer uses to color an amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AmountTone {
    Positive,
    Negative,
    Zero,
}

impl fmt::Display for Milliunits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_display_string())
    }
}

impl FromStr for Milliunits {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<i64> for Milliunits {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl Add for Milliunits {
    type Output = Milliunits;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Milliunits {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Milliunits {
    type Output = Milliunits;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl SubAssign for Milliunits {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Neg for Milliunits {
    type Output = Milliunits;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl Sum for Milliunits {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Milliunits> for Milliunits {
    fn sum<I: Iterator<Item = &'a Milliunits>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

/// Reasons a dollar string cannot be converted to milliunits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoneyError {
    Empty,
    Malformed(String),
    OutOfRange(String),
    /// Arithmetic on stored amounts left the `i64` range.
    Overflow,
}

impl fmt::Display for MoneyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoneyError::Empty => f.write_str("amount is empty"),
            MoneyError::Malformed(raw) => write!(f, "`{raw}` is not a valid amount"),
            MoneyError::OutOfRange(raw) => write!(f, "`{raw}` is too large"),
            MoneyError::Overflow => f.write_str("amount total is out of range"),
        }
    }
}

impl std::error::Error for MoneyError {}
