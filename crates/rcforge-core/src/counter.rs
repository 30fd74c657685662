//! Save counter and width-preserving integer formatting.
//!
//! The device stamps every file with a zero-padded counter after the main
//! structure (`<count>0013</count>`). Each save must advance it by exactly
//! one without changing its width.

use std::fmt;

/// The trailing save counter of a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveCounter {
    value: u64,
    width: usize,
}

impl SaveCounter {
    /// Create a counter with an explicit digit width.
    pub fn new(value: u64, width: usize) -> Self {
        Self { value, width }
    }

    /// Parse counter text such as `"0013"`.
    ///
    /// Surrounding whitespace is not accepted; the counter is always bare digits.
    pub fn parse(text: &str) -> Option<Self> {
        if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let value = text.parse().ok()?;
        Some(Self {
            value,
            width: text.len(),
        })
    }

    /// Current value.
    pub fn value(&self) -> u64 {
        self.value
    }

    /// Digit width the counter is written with.
    pub fn width(&self) -> usize {
        self.width
    }

    /// The counter after one more save.
    ///
    /// The width is kept; a value that no longer fits is written wider rather
    /// than wrapping. Returns `None` only at `u64::MAX`.
    pub fn next(&self) -> Option<Self> {
        Some(Self {
            value: self.value.checked_add(1)?,
            width: self.width,
        })
    }

    /// Text form, zero-padded to the width.
    pub fn format(&self) -> String {
        format!("{:0width$}", self.value, width = self.width)
    }
}

impl fmt::Display for SaveCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format())
    }
}

/// Format `value` the way `original` was written.
///
/// If `original` carries leading zeros (`"007"`), the result is zero-padded
/// to the same digit count; otherwise it is plain decimal.
pub fn format_like(original: &str, value: i64) -> String {
    let digits = original.strip_prefix('-').unwrap_or(original);
    let padded = digits.len() > 1
        && digits.starts_with('0')
        && digits.bytes().all(|b| b.is_ascii_digit());
    if !padded {
        return value.to_string();
    }
    let width = digits.len();
    if value < 0 {
        format!("-{:0width$}", value.unsigned_abs(), width = width)
    } else {
        format!("{:0width$}", value, width = width)
    }
}
