//! Field schemas, typed values, and per-kind validation.
//!
//! A field occupies one positional child of its section, except character
//! arrays, which occupy a run of `len` children (one character code each).

use std::fmt;

use rcforge_core::format_like;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lowest character code with a printable glyph.
pub const FIRST_CHAR_CODE: i64 = 32;
/// Highest character code with a printable glyph.
pub const LAST_CHAR_CODE: i64 = 126;
/// Code written to pad character arrays.
pub const PAD_CHAR_CODE: i64 = 32;

/// A decoded field value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    /// Boolean stored as `0` / `1`.
    Bool(bool),
    /// Integer, bounded by the field's range when declared.
    Int(i64),
    /// Index into the field's choice list.
    Enum(u32),
    /// Text decoded from a run of character codes, trailing padding removed.
    Chars(String),
    /// Undecoded text, kept verbatim.
    Opaque(String),
}

impl Value {
    /// Short name of the variant, used in messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Enum(_) => "enum",
            Value::Chars(_) => "chars",
            Value::Opaque(_) => "opaque",
        }
    }

    /// Numeric form, if the value has one.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Bool(b) => Some(i64::from(*b)),
            Value::Int(v) => Some(*v),
            Value::Enum(i) => Some(i64::from(*i)),
            Value::Chars(_) | Value::Opaque(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Enum(i) => write!(f, "{i}"),
            Value::Chars(s) => write!(f, "{s:?}"),
            Value::Opaque(s) => write!(f, "<{s}>"),
        }
    }
}

/// Value type and constraints of a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    /// `0` or `1`.
    Bool,
    /// Integer with optional inclusive bounds.
    Int {
        /// Lower bound, if any.
        min: Option<i64>,
        /// Upper bound, if any.
        max: Option<i64>,
    },
    /// Index into `choices`.
    Enum {
        /// Choice labels; the stored value is the index.
        choices: Vec<String>,
    },
    /// Fixed-length run of character codes.
    Chars {
        /// Number of positional children the field spans.
        len: usize,
    },
}

/// Schema of one field at one ordinal position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSchema {
    /// Logical name; `None` for fields whose meaning is not known.
    pub name: Option<String>,
    /// Value type and constraints.
    pub kind: FieldKind,
    /// Default value.
    pub default: Value,
    /// Derived or informational field, not independently settable.
    pub read_only: bool,
    /// Display label.
    pub label: Option<String>,
    /// Display unit, e.g. `"BPM x10"`.
    pub unit: Option<String>,
}

/// Why a value was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Integer outside the declared inclusive range.
    #[error("{value} is outside the allowed range [{min}, {max}]")]
    OutOfRange {
        /// Offending value.
        value: i64,
        /// Declared minimum (or `i64::MIN` when unbounded below).
        min: i64,
        /// Declared maximum (or `i64::MAX` when unbounded above).
        max: i64,
    },

    /// Boolean text other than `0` / `1`.
    #[error("expected 0 or 1, got {text:?}")]
    NotBoolean {
        /// Offending text.
        text: String,
    },

    /// Text that is not a decimal integer.
    #[error("{text:?} is not an integer")]
    NotInteger {
        /// Offending text.
        text: String,
    },

    /// Enumeration value outside the declared set.
    #[error("{value:?} is not one of: {choices}")]
    NotAChoice {
        /// Offending value as given.
        value: String,
        /// Allowed choices, comma separated.
        choices: String,
    },

    /// Text longer than the character array.
    #[error("text is {found} characters long, at most {max} fit")]
    TooLong {
        /// Length of the given text.
        found: usize,
        /// Array length.
        max: usize,
    },

    /// A character with no device code.
    #[error("character {ch:?} cannot be stored (printable ASCII only)")]
    BadChar {
        /// Offending character.
        ch: char,
    },

    /// A stored code with no character.
    #[error("character code {code} is outside the printable range")]
    BadCharCode {
        /// Offending code.
        code: i64,
    },

    /// Value variant does not match the field type.
    #[error("expected a {expected} value, got {found}")]
    WrongType {
        /// Type the field holds.
        expected: &'static str,
        /// Type that was given.
        found: &'static str,
    },

    /// Field is computed or informational.
    #[error("field is read-only")]
    ReadOnly,
}

/// What to do with an integer outside its range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutOfRangePolicy {
    /// Refuse the value.
    #[default]
    Reject,
    /// Move the value to the nearest bound.
    Clamp,
}

fn parse_int(text: &str) -> Result<i64, ValidationError> {
    text.trim().parse().map_err(|_| ValidationError::NotInteger {
        text: text.to_string(),
    })
}

/// Zero, moved into the range when the range excludes it.
fn implicit_int_default(min: Option<i64>, max: Option<i64>) -> i64 {
    let (lo, hi) = (min.unwrap_or(i64::MIN), max.unwrap_or(i64::MAX));
    if lo <= hi { 0_i64.clamp(lo, hi) } else { lo }
}

impl FieldSchema {
    /// Create a field with defaults for everything but name and kind.
    pub fn new(name: Option<&str>, kind: FieldKind) -> Self {
        let default = match &kind {
            FieldKind::Bool => Value::Bool(false),
            FieldKind::Int { min, max } => Value::Int(implicit_int_default(*min, *max)),
            FieldKind::Enum { .. } => Value::Enum(0),
            FieldKind::Chars { .. } => Value::Chars(String::new()),
        };
        Self {
            name: name.map(str::to_string),
            kind,
            default,
            read_only: false,
            label: None,
            unit: None,
        }
    }

    /// Unbounded integer field.
    pub fn int(name: &str) -> Self {
        Self::new(Some(name), FieldKind::Int { min: None, max: None })
    }

    /// Integer field with inclusive bounds.
    pub fn ranged(name: &str, min: i64, max: i64) -> Self {
        Self::new(
            Some(name),
            FieldKind::Int {
                min: Some(min),
                max: Some(max),
            },
        )
    }

    /// Boolean field.
    pub fn boolean(name: &str) -> Self {
        Self::new(Some(name), FieldKind::Bool)
    }

    /// Unnamed integer field.
    pub fn unknown() -> Self {
        Self::new(None, FieldKind::Int { min: None, max: None })
    }

    /// Set the default value.
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = default;
        self
    }

    /// Mark as read-only.
    pub fn as_read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// Number of positional children the field spans.
    pub fn width(&self) -> usize {
        match self.kind {
            FieldKind::Chars { len } => len,
            _ => 1,
        }
    }

    /// Label for display: the label, else the name, else `"?"`.
    pub fn display_name(&self) -> &str {
        self.label
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or("?")
    }

    /// Inclusive bounds used for range checks.
    pub fn bounds(&self) -> Option<(i64, i64)> {
        match &self.kind {
            FieldKind::Bool => Some((0, 1)),
            FieldKind::Int { min, max } => {
                if min.is_none() && max.is_none() {
                    None
                } else {
                    Some((min.unwrap_or(i64::MIN), max.unwrap_or(i64::MAX)))
                }
            }
            FieldKind::Enum { choices } => Some((0, choices.len() as i64 - 1)),
            FieldKind::Chars { .. } => None,
        }
    }

    /// Decode the raw text of the child run bound to this field.
    ///
    /// `raw` holds one entry per child (see [`FieldSchema::width`]).
    pub fn decode(&self, raw: &[&str]) -> Result<Value, ValidationError> {
        let value = match &self.kind {
            FieldKind::Chars { .. } => {
                let mut text = String::new();
                for code in raw {
                    let code = parse_int(code)?;
                    if code == 0 {
                        break;
                    }
                    if !(FIRST_CHAR_CODE..=LAST_CHAR_CODE).contains(&code) {
                        return Err(ValidationError::BadCharCode { code });
                    }
                    text.push(code as u8 as char);
                }
                Value::Chars(text.trim_end_matches(' ').to_string())
            }
            FieldKind::Bool => match raw.first().copied() {
                Some("0") => Value::Bool(false),
                Some("1") => Value::Bool(true),
                other => {
                    return Err(ValidationError::NotBoolean {
                        text: other.unwrap_or_default().to_string(),
                    });
                }
            },
            FieldKind::Int { .. } => Value::Int(parse_int(raw.first().copied().unwrap_or(""))?),
            FieldKind::Enum { .. } => {
                let index = parse_int(raw.first().copied().unwrap_or(""))?;
                Value::Enum(u32::try_from(index).map_err(|_| self.not_a_choice(index))?)
            }
        };
        self.validate(&value)?;
        Ok(value)
    }

    /// Check a value against the field's type and constraints.
    ///
    /// Does not look at [`FieldSchema::read_only`]; the model enforces that.
    pub fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        match (&self.kind, value) {
            (FieldKind::Bool, Value::Bool(_)) => Ok(()),
            (FieldKind::Int { .. }, Value::Int(v)) => match self.bounds() {
                Some((min, max)) if *v < min || *v > max => Err(ValidationError::OutOfRange {
                    value: *v,
                    min,
                    max,
                }),
                _ => Ok(()),
            },
            (FieldKind::Enum { choices }, Value::Enum(i)) => {
                if (*i as usize) < choices.len() {
                    Ok(())
                } else {
                    Err(self.not_a_choice(i64::from(*i)))
                }
            }
            (FieldKind::Chars { len }, Value::Chars(text)) => {
                let count = text.chars().count();
                if count > *len {
                    return Err(ValidationError::TooLong {
                        found: count,
                        max: *len,
                    });
                }
                match text.chars().find(|c| !(' '..='~').contains(c)) {
                    Some(ch) => Err(ValidationError::BadChar { ch }),
                    None => Ok(()),
                }
            }
            (_, found) => Err(ValidationError::WrongType {
                expected: self.kind_name(),
                found: found.kind_name(),
            }),
        }
    }

    /// Validate with a policy for out-of-range integers.
    ///
    /// Under [`OutOfRangePolicy::Clamp`] an out-of-range integer is moved to
    /// the nearest bound; every other violation is still an error. Trailing
    /// spaces of character text are dropped, as they are indistinguishable
    /// from padding once written.
    pub fn coerce(&self, value: Value, policy: OutOfRangePolicy) -> Result<Value, ValidationError> {
        let value = match value {
            Value::Chars(text) => Value::Chars(text.trim_end_matches(' ').to_string()),
            other => other,
        };
        match self.validate(&value) {
            Ok(()) => Ok(value),
            Err(ValidationError::OutOfRange { value: v, min, max })
                if policy == OutOfRangePolicy::Clamp =>
            {
                Ok(Value::Int(v.clamp(min, max)))
            }
            Err(e) => Err(e),
        }
    }

    /// Interpret user-supplied text as a value of this field.
    ///
    /// Booleans accept `0/1`, `true/false`, and `on/off`; enumerations accept
    /// an index or a choice label (case-insensitive). The result is not range
    /// checked.
    pub fn parse_input(&self, text: &str) -> Result<Value, ValidationError> {
        let trimmed = text.trim();
        match &self.kind {
            FieldKind::Bool => match trimmed.to_ascii_lowercase().as_str() {
                "0" | "false" | "off" => Ok(Value::Bool(false)),
                "1" | "true" | "on" => Ok(Value::Bool(true)),
                _ => Err(ValidationError::NotBoolean {
                    text: text.to_string(),
                }),
            },
            FieldKind::Int { .. } => parse_int(trimmed).map(Value::Int),
            FieldKind::Enum { choices } => {
                if let Some(i) = choices.iter().position(|c| c.eq_ignore_ascii_case(trimmed)) {
                    return Ok(Value::Enum(i as u32));
                }
                let index = trimmed.parse::<u32>().map_err(|_| ValidationError::NotAChoice {
                    value: text.to_string(),
                    choices: choices.join(", "),
                })?;
                Ok(Value::Enum(index))
            }
            FieldKind::Chars { .. } => Ok(Value::Chars(text.trim_end_matches(' ').to_string())),
        }
    }

    /// Raw texts for `value`, one per child of the run.
    ///
    /// `originals` are the texts currently stored; integer formatting keeps
    /// their zero padding. Character arrays are padded with spaces.
    pub fn encode(&self, value: &Value, originals: &[&str]) -> Vec<String> {
        let original = |i: usize| originals.get(i).copied().unwrap_or("");
        match value {
            Value::Chars(text) => {
                let mut codes: Vec<String> = text
                    .chars()
                    .enumerate()
                    .map(|(i, c)| format_like(original(i), c as i64))
                    .collect();
                for i in codes.len()..self.width() {
                    codes.push(format_like(original(i), PAD_CHAR_CODE));
                }
                codes
            }
            Value::Opaque(text) => vec![text.clone()],
            other => {
                let n = other.as_int().unwrap_or_default();
                vec![format_like(original(0), n)]
            }
        }
    }

    /// Human-readable rendering, using choice labels and ON/OFF.
    pub fn describe(&self, value: &Value) -> String {
        match (&self.kind, value) {
            (FieldKind::Bool, Value::Bool(b)) => (if *b { "ON" } else { "OFF" }).to_string(),
            (FieldKind::Enum { choices }, Value::Enum(i)) => choices
                .get(*i as usize)
                .cloned()
                .unwrap_or_else(|| i.to_string()),
            (_, Value::Chars(s)) => s.clone(),
            (_, Value::Opaque(s)) => s.clone(),
            (_, v) => v.to_string(),
        }
    }

    fn kind_name(&self) -> &'static str {
        match self.kind {
            FieldKind::Bool => "bool",
            FieldKind::Int { .. } => "int",
            FieldKind::Enum { .. } => "enum",
            FieldKind::Chars { .. } => "chars",
        }
    }

    fn not_a_choice(&self, value: i64) -> ValidationError {
        let choices = match &self.kind {
            FieldKind::Enum { choices } => choices
                .iter()
                .enumerate()
                .map(|(i, c)| format!("{i}={c}"))
                .collect::<Vec<_>>()
                .join(", "),
            _ => String::new(),
        };
        ValidationError::NotAChoice {
            value: value.to_string(),
            choices,
        }
    }
}
