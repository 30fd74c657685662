//! Structural parse errors.

use std::fmt;
use thiserror::Error;

/// A 1-based line and column inside the parsed text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    /// Line number, starting at 1.
    pub line: usize,
    /// Column number in characters, starting at 1.
    pub column: usize,
}

impl Position {
    /// Compute the position of byte offset `offset` in `input`.
    ///
    /// Offsets past the end clamp to the end of the input.
    pub fn at(input: &str, offset: usize) -> Self {
        let offset = offset.min(input.len());
        let before = input.get(..offset).unwrap_or(input);
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        let column = before[line_start..].chars().count() + 1;
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Errors raised while reading the raw tree.
///
/// Any of these is fatal for the unit being read: no partial tree is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A `<` was never closed by `>`.
    #[error("unterminated tag at {at}")]
    UnterminatedTag {
        /// Where the tag started.
        at: Position,
    },

    /// An element was still open when the input ended.
    #[error("element <{tag}> opened at {at} is never closed")]
    UnclosedElement {
        /// Tag identifier of the open element.
        tag: String,
        /// Where the element was opened.
        at: Position,
    },

    /// A close tag did not match the innermost open element.
    #[error("expected </{expected}> but found </{found}> at {at}")]
    MismatchedClose {
        /// Tag identifier of the innermost open element.
        expected: String,
        /// Tag identifier actually closed.
        found: String,
        /// Where the close tag starts.
        at: Position,
    },

    /// A close tag with no open element.
    #[error("unexpected close tag </{found}> at {at}")]
    UnexpectedClose {
        /// Tag identifier being closed.
        found: String,
        /// Where the close tag starts.
        at: Position,
    },

    /// An element holds both text and child elements.
    #[error("element <{tag}> mixes text with child elements at {at}")]
    MixedContent {
        /// Tag identifier of the offending element.
        tag: String,
        /// Where the stray text starts.
        at: Position,
    },

    /// Text outside any element.
    #[error("text outside of any element at {at}")]
    StrayText {
        /// Where the text starts.
        at: Position,
    },

    /// `<>` or `</>`.
    #[error("empty tag name at {at}")]
    EmptyTagName {
        /// Where the tag starts.
        at: Position,
    },

    /// Elements nested deeper than the reader accepts.
    #[error("nesting deeper than {max} levels at {at}")]
    TooDeep {
        /// Maximum accepted depth.
        max: usize,
        /// Where the too-deep element starts.
        at: Position,
    },

    /// Comments, CDATA, doctype, or self-closing elements.
    #[error("unsupported markup at {at}")]
    UnsupportedMarkup {
        /// Where the markup starts.
        at: Position,
    },

    /// A `<?` declaration with no closing `?>`.
    #[error("unterminated declaration at {at}")]
    UnterminatedDeclaration {
        /// Where the declaration starts.
        at: Position,
    },

    /// The input holds no element at all.
    #[error("no root element")]
    NoRoot,
}

impl ParseError {
    /// Position reported by the error, if any.
    pub fn position(&self) -> Option<Position> {
        match self {
            ParseError::UnterminatedTag { at }
            | ParseError::UnclosedElement { at, .. }
            | ParseError::MismatchedClose { at, .. }
            | ParseError::UnexpectedClose { at, .. }
            | ParseError::MixedContent { at, .. }
            | ParseError::StrayText { at }
            | ParseError::EmptyTagName { at }
            | ParseError::TooDeep { at, .. }
            | ParseError::UnsupportedMarkup { at }
            | ParseError::UnterminatedDeclaration { at } => Some(*at),
            ParseError::NoRoot => None,
        }
    }
}
