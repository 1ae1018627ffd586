//! Structure-preserving text rewriter.
//!
//! A `Span` tree parallels a declaration's syntax subtree over the
//! original character stream. Each span contributes four pieces of text:
//! prefix (before the first child), the children themselves, suffix
//! (after the last child), and a separator (the inter-sibling gap
//! assigned during construction). The underlying text is immutable; all
//! edits go through the modification overlay. A span with no
//! modifications anywhere regenerates its source text byte-for-byte.

use surface_syntax::{NodeArena, NodeIndex, SyntaxKind};

/// Overlay edits for one span.
#[derive(Debug, Default, Clone)]
pub struct SpanModification {
    /// Replacement for the prefix text.
    pub prefix_override: Option<String>,
    /// Replacement for the suffix text.
    pub suffix_override: Option<String>,
    /// Suppress all child output.
    pub omit_children: bool,
    /// Suppress the trailing separator.
    pub omit_separator_after: bool,
}

impl SpanModification {
    /// Blank the span entirely: no prefix, no children, no suffix, no
    /// separator.
    pub fn skip_all(&mut self) {
        self.prefix_override = Some(String::new());
        self.suffix_override = Some(String::new());
        self.omit_children = true;
        self.omit_separator_after = true;
    }
}

#[derive(Debug)]
pub struct Span {
    pub node: NodeIndex,
    pub kind: SyntaxKind,
    pub start: u32,
    pub end: u32,
    separator_start: u32,
    separator_end: u32,
    pub children: Vec<Span>,
    pub modification: SpanModification,
}

impl Span {
    /// Build the span tree for a node's subtree. Child bounds are
    /// normalized so a child never extends outside its parent, and every
    /// gap of text between two consecutive children is assigned as the
    /// separator of the deepest rightmost descendant of the earlier child
    /// that has no suffix of its own.
    pub fn build(arena: &NodeArena, node: NodeIndex) -> Option<Span> {
        let n = arena.get(node)?;
        let mut children: Vec<Span> = arena
            .children(node)
            .iter()
            .filter_map(|&child| Span::build(arena, child))
            .collect();
        for child in &mut children {
            if child.start < n.pos {
                child.start = n.pos;
            }
            if child.end > n.end {
                child.end = n.end;
            }
        }
        for i in 1..children.len() {
            let gap_start = children[i - 1].end;
            let gap_end = children[i].start;
            if gap_start < gap_end {
                assign_gap(&mut children[i - 1], gap_start, gap_end);
            }
        }
        Some(Span {
            node,
            kind: n.kind,
            start: n.pos,
            end: n.end,
            separator_start: 0,
            separator_end: 0,
            children,
            modification: SpanModification::default(),
        })
    }

    /// Original text covered by this span (prefix + children + suffix).
    pub fn get_text<'s>(&self, source: &'s str) -> &'s str {
        &source[self.start as usize..self.end as usize]
    }

    /// Text before the first child (the whole span for leaves).
    pub fn prefix_text<'s>(&self, source: &'s str) -> &'s str {
        let end = match self.children.first() {
            Some(first) => first.start,
            None => self.end,
        };
        &source[self.start as usize..end as usize]
    }

    /// Text after the last child (empty for leaves).
    pub fn suffix_text<'s>(&self, source: &'s str) -> &'s str {
        match self.children.last() {
            Some(last) => &source[last.end as usize..self.end as usize],
            None => "",
        }
    }

    /// The inter-sibling gap assigned to this span.
    pub fn separator_text<'s>(&self, source: &'s str) -> &'s str {
        &source[self.separator_start as usize..self.separator_end as usize]
    }

    /// The trailing separator visible at this span: its own if set, else
    /// the last child's, recursively. Used to preserve trailing
    /// whitespace when a span's content is replaced.
    pub fn get_last_inner_separator<'s>(&self, source: &'s str) -> &'s str {
        if self.separator_start < self.separator_end {
            return self.separator_text(source);
        }
        match self.children.last() {
            Some(last) => last.get_last_inner_separator(source),
            None => "",
        }
    }

    /// Regenerate text with the modification overlay applied. Spans with
    /// no modifications reproduce their original text exactly.
    pub fn get_modified_text(&self, source: &str) -> String {
        let mut out = String::new();
        self.write_modified_text(source, &mut out);
        out
    }

    pub fn write_modified_text(&self, source: &str, out: &mut String) {
        match &self.modification.prefix_override {
            Some(prefix) => out.push_str(prefix),
            None => out.push_str(self.prefix_text(source)),
        }
        if !self.modification.omit_children {
            for child in &self.children {
                child.write_modified_text(source, out);
            }
        }
        match &self.modification.suffix_override {
            Some(suffix) => out.push_str(suffix),
            None => out.push_str(self.suffix_text(source)),
        }
        if !self.modification.omit_separator_after {
            out.push_str(self.separator_text(source));
        }
    }
}

/// Attach an inter-sibling gap to the deepest rightmost descendant of
/// `span` that has no suffix of its own, so later rewriting can address
/// the trailing whitespace/punctuation at the most specific node.
fn assign_gap(span: &mut Span, start: u32, end: u32) {
    let descend = match span.children.last() {
        // A non-empty suffix pins the gap to this span.
        Some(last) => last.end >= span.end,
        None => false,
    };
    if descend {
        if let Some(last) = span.children.last_mut() {
            assign_gap(last, start, end);
            return;
        }
    }
    span.separator_start = start;
    span.separator_end = end;
}
