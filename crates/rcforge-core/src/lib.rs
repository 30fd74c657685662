//! rcforge core: raw tree reading and verbatim emission for RC0 files.
//!
//! RC0 is the semi-structured, XML-looking format a loop station uses to
//! persist memories and system settings. It is not well-formed XML: element
//! names are positional letters, bare digits, or symbols, and the file ends
//! with a save counter outside the main structure.
//!
//! This crate knows nothing about what the tags mean. It provides:
//!
//! - [`parse_document`] - tolerant reader producing an ordered [`Document`]
//! - [`RawNode`] / [`RawContent`] - generic tree nodes with their exact layout
//! - [`Document::emit`] - byte-identical re-emission
//! - [`SaveCounter`] - the trailing counter, incremented width-preserving
//! - [`format_like`] - integer formatting that keeps an original's zero padding
//!
//! # Example
//!
//! ```rust
//! use rcforge_core::{parse_document, SaveCounter};
//!
//! let text = "<mem>\n\t<A>1</A>\n</mem>\n<count>0041</count>";
//! let doc = parse_document(text).unwrap();
//! assert_eq!(doc.emit(), text);
//!
//! let (_, trailer) = doc.trailer().unwrap();
//! let next = SaveCounter::parse(trailer.text().unwrap()).unwrap().next().unwrap();
//! assert_eq!(next.to_string(), "0042");
//! ```
//!
//! # Tracing
//!
//! Enable the `tracing` feature to emit a `debug` event per parsed document.

pub mod counter;
pub mod error;
pub mod node;
pub mod reader;

pub use counter::{SaveCounter, format_like};
pub use error::{ParseError, Position};
pub use node::{Document, NodeAddr, RawContent, RawNode};
pub use reader::{MAX_DEPTH, parse_document};
