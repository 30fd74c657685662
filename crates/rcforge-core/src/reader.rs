//! Tolerant reader for RC0 tag soup.
//!
//! The format looks like XML but is not: tag identifiers may be bare digits
//! or symbols (`<0>`, `<#>`), so an XML parser rejects it. This reader only
//! cares about nesting and keeps every byte of layout.
//!
//! ## Grammar
//!
//! ```text
//! document ::= prolog element+ ws*
//! prolog   ::= ( ws* '<?' ... '?>' )*
//! element  ::= ws* '<' tag attrs '>' content '</' tag ws* '>'
//! content  ::= text | element+ ws*
//! tag      ::= [^ whitespace '<' '>' '/']+
//! ```
//!
//! Whitespace-only content that spans a line break is read as an empty
//! container; any other text is a scalar.

use crate::error::{ParseError, Position};
use crate::node::{Document, RawContent, RawNode};

/// Maximum element nesting accepted by [`parse_document`].
pub const MAX_DEPTH: usize = 64;

/// Parse one RC0 unit into a [`Document`].
///
/// The result emits back to `input` byte for byte.
pub fn parse_document(input: &str) -> Result<Document, ParseError> {
    let doc = Reader::new(input).document()?;
    #[cfg(feature = "tracing")]
    tracing::debug!(
        roots = doc.roots.len(),
        nodes = doc.node_count(),
        "parsed raw document"
    );
    Ok(doc)
}

fn is_blank(text: &str) -> bool {
    text.bytes().all(|b| b.is_ascii_whitespace())
}

fn is_tag_byte(b: u8) -> bool {
    !b.is_ascii_whitespace() && !matches!(b, b'<' | b'>' | b'/')
}

/// Single-pass reader over the input bytes. All delimiters are ASCII, so
/// every slice boundary lands on a char boundary.
struct Reader<'a> {
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            pos: 0,
        }
    }

    fn at(&self, offset: usize) -> Position {
        Position::at(self.input, offset)
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn starts_with(&self, s: &str) -> bool {
        self.bytes[self.pos..].starts_with(s.as_bytes())
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    /// Offset of the first non-whitespace byte in `start..end`.
    fn first_text(&self, start: usize, end: usize) -> usize {
        (start..end)
            .find(|&i| !self.bytes[i].is_ascii_whitespace())
            .unwrap_or(start)
    }

    /// `document ::= prolog element+ ws*`
    fn document(&mut self) -> Result<Document, ParseError> {
        let input = self.input;
        let prolog = self.prolog()?;
        let mut roots = Vec::new();

        let tail = loop {
            let lead_start = self.pos;
            self.skip_ws();
            match self.peek() {
                None => break input[lead_start..].to_string(),
                Some(b'<') => {
                    let lead = &input[lead_start..self.pos];
                    roots.push(self.element(lead, 1)?);
                }
                Some(_) => {
                    return Err(ParseError::StrayText {
                        at: self.at(self.pos),
                    });
                }
            }
        };

        if roots.is_empty() {
            return Err(ParseError::NoRoot);
        }
        Ok(Document { prolog, roots, tail })
    }

    /// `prolog ::= ( ws* '<?' ... '?>' )*`
    ///
    /// Whitespace after the last declaration belongs to the first element.
    fn prolog(&mut self) -> Result<String, ParseError> {
        let mut end = 0;
        loop {
            self.skip_ws();
            if !self.starts_with("<?") {
                break;
            }
            let start = self.pos;
            let Some(close) = self.input[start..].find("?>") else {
                return Err(ParseError::UnterminatedDeclaration {
                    at: self.at(start),
                });
            };
            self.pos = start + close + 2;
            end = self.pos;
        }
        self.pos = end;
        Ok(self.input[..end].to_string())
    }

    /// `element ::= '<' tag attrs '>' content '</' tag ws* '>'`, with the
    /// reader positioned on `<` and `lead` already consumed.
    fn element(&mut self, lead: &str, depth: usize) -> Result<RawNode, ParseError> {
        let input = self.input;
        let start = self.pos;
        if depth > MAX_DEPTH {
            return Err(ParseError::TooDeep {
                max: MAX_DEPTH,
                at: self.at(start),
            });
        }

        self.pos += 1; // '<'
        match self.peek() {
            Some(b'!' | b'?') => {
                return Err(ParseError::UnsupportedMarkup {
                    at: self.at(start),
                });
            }
            Some(b'/') => {
                self.pos = start;
                let found = self.close_tag()?;
                return Err(ParseError::UnexpectedClose {
                    found,
                    at: self.at(start),
                });
            }
            _ => {}
        }

        let name_start = self.pos;
        while self.peek().is_some_and(is_tag_byte) {
            self.pos += 1;
        }
        let tag = &input[name_start..self.pos];
        if tag.is_empty() {
            return Err(match self.peek() {
                None => ParseError::UnterminatedTag { at: self.at(start) },
                Some(_) => ParseError::EmptyTagName { at: self.at(start) },
            });
        }

        let attrs = self.attrs(start)?;
        if attrs.trim_end().ends_with('/') {
            return Err(ParseError::UnsupportedMarkup {
                at: self.at(start),
            });
        }

        let unclosed = || ParseError::UnclosedElement {
            tag: tag.to_string(),
            at: Position::at(input, start),
        };

        let text_start = self.pos;
        let text_end = input[text_start..]
            .find('<')
            .map(|i| text_start + i)
            .ok_or_else(unclosed)?;
        let text = &input[text_start..text_end];
        self.pos = text_end;

        let content = if self.starts_with("</") {
            self.expect_close(tag)?;
            if !text.is_empty() && is_blank(text) && text.contains('\n') {
                RawContent::Children {
                    nodes: Vec::new(),
                    tail: text.to_string(),
                }
            } else {
                RawContent::Scalar(text.to_string())
            }
        } else {
            if !is_blank(text) {
                return Err(ParseError::MixedContent {
                    tag: tag.to_string(),
                    at: self.at(self.first_text(text_start, text_end)),
                });
            }
            let mut nodes = Vec::new();
            let mut child_lead = text;
            loop {
                nodes.push(self.element(child_lead, depth + 1)?);
                let gap_start = self.pos;
                let gap_end = input[gap_start..]
                    .find('<')
                    .map(|i| gap_start + i)
                    .ok_or_else(unclosed)?;
                let gap = &input[gap_start..gap_end];
                if !is_blank(gap) {
                    return Err(ParseError::MixedContent {
                        tag: tag.to_string(),
                        at: self.at(self.first_text(gap_start, gap_end)),
                    });
                }
                self.pos = gap_end;
                if self.starts_with("</") {
                    self.expect_close(tag)?;
                    break RawContent::Children {
                        nodes,
                        tail: gap.to_string(),
                    };
                }
                child_lead = gap;
            }
        };

        Ok(RawNode {
            lead: lead.to_string(),
            tag: tag.to_string(),
            attrs: attrs.to_string(),
            content,
        })
    }

    /// Verbatim attribute text up to the closing `>`, honouring quotes.
    fn attrs(&mut self, tag_start: usize) -> Result<&'a str, ParseError> {
        let attr_start = self.pos;
        let mut quote = None;
        while let Some(b) = self.peek() {
            match (quote, b) {
                (Some(q), _) if b == q => quote = None,
                (Some(_), _) => {}
                (None, b'"' | b'\'') => quote = Some(b),
                (None, b'>') => {
                    let attrs = &self.input[attr_start..self.pos];
                    self.pos += 1;
                    return Ok(attrs);
                }
                (None, b'<') => break,
                (None, _) => {}
            }
            self.pos += 1;
        }
        Err(ParseError::UnterminatedTag {
            at: self.at(tag_start),
        })
    }

    /// Read `</name ws*>` and return `name`.
    fn close_tag(&mut self) -> Result<String, ParseError> {
        let start = self.pos;
        self.pos += 2; // "</"
        let Some(gt) = self.input[self.pos..].find('>') else {
            return Err(ParseError::UnterminatedTag { at: self.at(start) });
        };
        let name = self.input[self.pos..self.pos + gt].trim_end();
        if name.is_empty() {
            return Err(ParseError::EmptyTagName { at: self.at(start) });
        }
        if name.contains('<') {
            return Err(ParseError::UnterminatedTag { at: self.at(start) });
        }
        self.pos += gt + 1;
        Ok(name.to_string())
    }

    fn expect_close(&mut self, tag: &str) -> Result<(), ParseError> {
        let start = self.pos;
        let found = self.close_tag()?;
        if found != tag {
            return Err(ParseError::MismatchedClose {
                expected: tag.to_string(),
                found,
                at: self.at(start),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scalar_leaf() {
        let doc = parse_document("<A>77</A>").unwrap();
        assert_eq!(doc.roots.len(), 1);
        assert_eq!(doc.roots[0].tag, "A");
        assert_eq!(doc.roots[0].text(), Some("77"));
    }

    #[test]
    fn test_digit_and_symbol_tags() {
        let text = "<SETUP>\n\t<0>1</0>\n\t<#>2</#>\n\t<A>3</A>\n</SETUP>";
        let doc = parse_document(text).unwrap();
        let tags: Vec<_> = doc.roots[0].children().iter().map(|n| n.tag.as_str()).collect();
        assert_eq!(tags, ["0", "#", "A"]);
        assert_eq!(doc.emit(), text);
    }

    #[test]
    fn test_preserves_leading_zeros_and_spacing() {
        let text = "<count>0013</count>";
        let doc = parse_document(text).unwrap();
        assert_eq!(doc.roots[0].text(), Some("0013"));

        let text = "<A> 5 </A>";
        let doc = parse_document(text).unwrap();
        assert_eq!(doc.roots[0].text(), Some(" 5 "));
    }

    #[test]
    fn test_prolog_kept_verbatim() {
        let text = "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<database name=\"RC-505MK2\" revision=\"0\">\n<A>1</A>\n</database>\n<count>0001</count>";
        let doc = parse_document(text).unwrap();
        assert_eq!(doc.prolog, "<?xml version=\"1.0\" encoding=\"utf-8\"?>");
        assert_eq!(doc.roots[0].lead, "\n");
        assert_eq!(doc.roots[0].attr("name"), Some("RC-505MK2"));
        assert_eq!(doc.trailer().and_then(|(_, n)| n.text()), Some("0001"));
        assert_eq!(doc.emit(), text);
    }

    #[test]
    fn test_blank_multiline_content_is_empty_container() {
        let doc = parse_document("<MASTER>\n</MASTER>").unwrap();
        assert!(!doc.roots[0].is_scalar());
        assert!(doc.roots[0].children().is_empty());

        let doc = parse_document("<A></A>").unwrap();
        assert_eq!(doc.roots[0].text(), Some(""));
    }

    #[test]
    fn test_quoted_gt_in_attrs() {
        let text = "<mem note=\"a>b\"><A>1</A></mem>";
        let doc = parse_document(text).unwrap();
        assert_eq!(doc.roots[0].attr("note"), Some("a>b"));
        assert_eq!(doc.emit(), text);
    }

    #[test]
    fn test_close_tag_trailing_space() {
        let doc = parse_document("<A>1</A >").unwrap();
        assert_eq!(doc.roots[0].text(), Some("1"));
    }

    #[test]
    fn test_mismatched_close() {
        let err = parse_document("<A>\n\t<B>1</C>\n</A>").unwrap_err();
        assert!(matches!(
            err,
            ParseError::MismatchedClose { ref expected, ref found, at }
                if expected == "B" && found == "C" && at.line == 2
        ));
    }

    #[test]
    fn test_unclosed_element() {
        let err = parse_document("<mem>\n<A>1</A>\n").unwrap_err();
        assert!(matches!(err, ParseError::UnclosedElement { ref tag, .. } if tag == "mem"));

        let err = parse_document("<A>12").unwrap_err();
        assert!(matches!(err, ParseError::UnclosedElement { ref tag, .. } if tag == "A"));
    }

    #[test]
    fn test_unterminated_tag() {
        let err = parse_document("<mem id=\"0\"").unwrap_err();
        assert!(matches!(err, ParseError::UnterminatedTag { .. }));

        let err = parse_document("<mem><A>1</A").unwrap_err();
        assert!(matches!(err, ParseError::UnterminatedTag { .. }));
    }

    #[test]
    fn test_mixed_content() {
        let err = parse_document("<A>text<B>1</B></A>").unwrap_err();
        assert!(matches!(
            err,
            ParseError::MixedContent { ref tag, at } if tag == "A" && at.column == 4
        ));

        let err = parse_document("<A><B>1</B>oops</A>").unwrap_err();
        assert!(matches!(err, ParseError::MixedContent { .. }));
    }

    #[test]
    fn test_stray_text_and_close() {
        let err = parse_document("<A>1</A>junk").unwrap_err();
        assert!(matches!(err, ParseError::StrayText { .. }));

        let err = parse_document("</A>").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedClose { ref found, .. } if found == "A"));
    }

    #[test]
    fn test_empty_tag_name() {
        assert!(matches!(
            parse_document("<>1</>").unwrap_err(),
            ParseError::EmptyTagName { .. }
        ));
        assert!(matches!(
            parse_document("<A>1</>").unwrap_err(),
            ParseError::EmptyTagName { .. }
        ));
    }

    #[test]
    fn test_unsupported_markup() {
        assert!(matches!(
            parse_document("<A><!-- hi --></A>").unwrap_err(),
            ParseError::UnsupportedMarkup { .. }
        ));
        assert!(matches!(
            parse_document("<A><B/></A>").unwrap_err(),
            ParseError::UnsupportedMarkup { .. }
        ));
    }

    #[test]
    fn test_unterminated_declaration() {
        assert!(matches!(
            parse_document("<?xml version=\"1.0\"").unwrap_err(),
            ParseError::UnterminatedDeclaration { .. }
        ));
    }

    #[test]
    fn test_no_root() {
        assert_eq!(parse_document("").unwrap_err(), ParseError::NoRoot);
        assert_eq!(parse_document("  \n").unwrap_err(), ParseError::NoRoot);
        assert_eq!(
            parse_document("<?xml version=\"1.0\"?>\n").unwrap_err(),
            ParseError::NoRoot
        );
    }

    #[test]
    fn test_depth_limit() {
        let mut text = String::new();
        for _ in 0..=MAX_DEPTH {
            text.push_str("<X>");
        }
        text.push('1');
        for _ in 0..=MAX_DEPTH {
            text.push_str("</X>");
        }
        assert!(matches!(
            parse_document(&text).unwrap_err(),
            ParseError::TooDeep { max: MAX_DEPTH, .. }
        ));
    }

    #[test]
    fn test_crlf_layout_round_trips() {
        let text = "<mem>\r\n\t<A>1</A>\r\n</mem>\r\n";
        let doc = parse_document(text).unwrap();
        assert_eq!(doc.tail, "\r\n");
        assert_eq!(doc.emit(), text);
    }
}
