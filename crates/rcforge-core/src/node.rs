//! Generic raw tree: ordered nodes with verbatim layout.
//!
//! Every byte of the source is owned by exactly one place in the tree (a
//! node's leading whitespace, its attribute string, its scalar text, or a
//! container's closing whitespace), so [`Document::emit`] reproduces the
//! input without a formatting pass.

/// Child-index path from the document roots to a node.
///
/// `[0, 3, 1]` is the second child of the fourth child of the first root.
pub type NodeAddr = Vec<usize>;

/// Content of a raw node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawContent {
    /// Leaf text, exactly as written (no trimming, no numeric normalization).
    Scalar(String),
    /// Ordered child elements.
    Children {
        /// Children in source order.
        nodes: Vec<RawNode>,
        /// Whitespace between the last child and the close tag.
        tail: String,
    },
}

/// One element of the raw tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawNode {
    /// Whitespace preceding the open tag.
    pub lead: String,
    /// Tag identifier. Opaque: letters, digits, and symbols are all valid.
    pub tag: String,
    /// Everything between the tag identifier and `>`, verbatim (including
    /// the leading space), e.g. ` id="0"`.
    pub attrs: String,
    /// Scalar text or children.
    pub content: RawContent,
}

impl RawNode {
    /// Create a scalar node with no surrounding layout.
    pub fn scalar(tag: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            lead: String::new(),
            tag: tag.into(),
            attrs: String::new(),
            content: RawContent::Scalar(text.into()),
        }
    }

    /// Create a container node with no surrounding layout.
    pub fn container(tag: impl Into<String>, nodes: Vec<RawNode>) -> Self {
        Self {
            lead: String::new(),
            tag: tag.into(),
            attrs: String::new(),
            content: RawContent::Children {
                nodes,
                tail: String::new(),
            },
        }
    }

    /// Set the leading whitespace.
    pub fn with_lead(mut self, lead: impl Into<String>) -> Self {
        self.lead = lead.into();
        self
    }

    /// Set the verbatim attribute string.
    pub fn with_attrs(mut self, attrs: impl Into<String>) -> Self {
        self.attrs = attrs.into();
        self
    }

    /// Scalar text, if this is a leaf.
    pub fn text(&self) -> Option<&str> {
        match &self.content {
            RawContent::Scalar(text) => Some(text),
            RawContent::Children { .. } => None,
        }
    }

    /// Whether this node is a leaf.
    pub fn is_scalar(&self) -> bool {
        matches!(self.content, RawContent::Scalar(_))
    }

    /// Child nodes. Empty for leaves.
    pub fn children(&self) -> &[RawNode] {
        match &self.content {
            RawContent::Scalar(_) => &[],
            RawContent::Children { nodes, .. } => nodes,
        }
    }

    /// Mutable child nodes, `None` for leaves.
    pub fn children_mut(&mut self) -> Option<&mut Vec<RawNode>> {
        match &mut self.content {
            RawContent::Scalar(_) => None,
            RawContent::Children { nodes, .. } => Some(nodes),
        }
    }

    /// First child with the given tag identifier.
    pub fn child(&self, tag: &str) -> Option<&RawNode> {
        self.children().iter().find(|n| n.tag == tag)
    }

    /// Value of attribute `name` inside the verbatim attribute string.
    ///
    /// Only double- or single-quoted values are recognized.
    pub fn attr(&self, name: &str) -> Option<&str> {
        let mut rest = self.attrs.as_str();
        loop {
            rest = rest.trim_start();
            let eq = rest.find('=')?;
            let key = rest[..eq].trim();
            let after = rest[eq + 1..].trim_start();
            let quote = after.chars().next()?;
            if quote != '"' && quote != '\'' {
                return None;
            }
            let body = &after[1..];
            let end = body.find(quote)?;
            if key == name {
                return Some(&body[..end]);
            }
            rest = &body[end + 1..];
        }
    }

    /// Count this node and all of its descendants.
    pub fn node_count(&self) -> usize {
        1 + self.children().iter().map(RawNode::node_count).sum::<usize>()
    }

    /// Append the exact text of this node to `out`.
    pub fn emit_into(&self, out: &mut String) {
        out.push_str(&self.lead);
        out.push('<');
        out.push_str(&self.tag);
        out.push_str(&self.attrs);
        out.push('>');
        match &self.content {
            RawContent::Scalar(text) => out.push_str(text),
            RawContent::Children { nodes, tail } => {
                for node in nodes {
                    node.emit_into(out);
                }
                out.push_str(tail);
            }
        }
        out.push_str("</");
        out.push_str(&self.tag);
        out.push('>');
    }
}

/// A parsed unit: declarations, top-level elements, and trailing layout.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Document {
    /// Leading whitespace and `<?...?>` declarations, verbatim.
    pub prolog: String,
    /// Top-level elements in source order.
    pub roots: Vec<RawNode>,
    /// Whitespace after the last top-level element.
    pub tail: String,
}

impl Document {
    /// Reproduce the text this document was read from.
    pub fn emit(&self) -> String {
        let mut out = String::with_capacity(self.prolog.len() + self.roots.len() * 64);
        out.push_str(&self.prolog);
        for root in &self.roots {
            root.emit_into(&mut out);
        }
        out.push_str(&self.tail);
        out
    }

    /// The main structure: the first top-level element with children.
    pub fn body(&self) -> Option<(usize, &RawNode)> {
        self.roots.iter().enumerate().find(|(_, n)| !n.is_scalar())
    }

    /// The trailer: the last top-level scalar after the main structure.
    pub fn trailer(&self) -> Option<(usize, &RawNode)> {
        let (body_index, _) = self.body()?;
        self.roots
            .iter()
            .enumerate()
            .skip(body_index + 1)
            .rev()
            .find(|(_, n)| n.is_scalar())
    }

    /// Node at `addr`, or `None` if the path leaves the tree.
    pub fn node(&self, addr: &[usize]) -> Option<&RawNode> {
        let (first, rest) = addr.split_first()?;
        let mut node = self.roots.get(*first)?;
        for &index in rest {
            node = node.children().get(index)?;
        }
        Some(node)
    }

    /// Mutable node at `addr`.
    pub fn node_mut(&mut self, addr: &[usize]) -> Option<&mut RawNode> {
        let (first, rest) = addr.split_first()?;
        let mut node = self.roots.get_mut(*first)?;
        for &index in rest {
            node = node.children_mut()?.get_mut(index)?;
        }
        Some(node)
    }

    /// Replace the scalar text at `addr`, returning the previous text.
    ///
    /// Returns `None` (and changes nothing) if `addr` does not name a leaf.
    pub fn replace_scalar(&mut self, addr: &[usize], text: impl Into<String>) -> Option<String> {
        let node = self.node_mut(addr)?;
        match &mut node.content {
            RawContent::Scalar(old) => Some(std::mem::replace(old, text.into())),
            RawContent::Children { .. } => None,
        }
    }

    /// Total number of elements in the document.
    pub fn node_count(&self) -> usize {
        self.roots.iter().map(RawNode::node_count).sum()
    }
}
