//! Flat node arena.
//!
//! Nodes live in one pool indexed by `NodeIndex`; child lists and parent
//! links are side tables parallel to the pool. Spans are byte offsets into
//! the owning file's source text. A declaration node's span includes its
//! leading documentation comment, so regenerated text keeps the docs.

use surface_common::{CommentRange, comments};

use crate::kind::SyntaxKind;

/// Index of a node in the arena. `NONE` is the absent-node sentinel.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIndex(pub u32);

impl NodeIndex {
    pub const NONE: NodeIndex = NodeIndex(u32::MAX);

    #[inline]
    pub fn is_none(self) -> bool {
        self == NodeIndex::NONE
    }

    #[inline]
    pub fn is_some(self) -> bool {
        self != NodeIndex::NONE
    }
}

/// Index of a source file registered in the arena.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct FileId(pub u32);

/// A syntax node: kind plus byte span in its file's source text.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Node {
    pub kind: SyntaxKind,
    pub file: FileId,
    pub pos: u32,
    pub end: u32,
}

/// Per-file data handed over by the provider.
#[derive(Debug, Clone)]
pub struct SourceFileData {
    pub file_name: String,
    pub text: String,
    pub root: NodeIndex,
    /// Whether the file is a module (has imports/exports) as opposed to a
    /// global script. Script-context declarations are ambient.
    pub is_module: bool,
    /// Raw `/// <reference ... />` directive lines, in order of appearance.
    pub reference_directives: Vec<String>,
    /// All comment ranges, sorted by start position.
    pub comments: Vec<CommentRange>,
}

#[derive(Debug, Default)]
pub struct NodeArena {
    nodes: Vec<Node>,
    children: Vec<Vec<NodeIndex>>,
    parents: Vec<NodeIndex>,
    source_files: Vec<SourceFileData>,
}

impl NodeArena {
    pub fn new() -> NodeArena {
        NodeArena::default()
    }

    /// Register a source file. The root node is attached separately once
    /// it has been built.
    pub fn add_file(&mut self, file_name: impl Into<String>, text: impl Into<String>) -> FileId {
        let id = FileId(self.source_files.len() as u32);
        self.source_files.push(SourceFileData {
            file_name: file_name.into(),
            text: text.into(),
            root: NodeIndex::NONE,
            is_module: false,
            reference_directives: Vec::new(),
            comments: Vec::new(),
        });
        id
    }

    pub fn add_node(&mut self, file: FileId, kind: SyntaxKind, pos: u32, end: u32) -> NodeIndex {
        let idx = NodeIndex(self.nodes.len() as u32);
        self.nodes.push(Node {
            kind,
            file,
            pos,
            end,
        });
        self.children.push(Vec::new());
        self.parents.push(NodeIndex::NONE);
        idx
    }

    /// Append `child` to `parent`'s child list and record the back link.
    /// Children must be appended in source order.
    pub fn add_child(&mut self, parent: NodeIndex, child: NodeIndex) {
        self.children[parent.0 as usize].push(child);
        self.parents[child.0 as usize] = parent;
    }

    pub fn set_file_root(&mut self, file: FileId, root: NodeIndex) {
        self.source_files[file.0 as usize].root = root;
    }

    pub fn file_mut(&mut self, file: FileId) -> &mut SourceFileData {
        &mut self.source_files[file.0 as usize]
    }

    // Accessors

    #[inline]
    pub fn get(&self, index: NodeIndex) -> Option<&Node> {
        if index.is_none() {
            None
        } else {
            self.nodes.get(index.0 as usize)
        }
    }

    #[inline]
    pub fn children(&self, index: NodeIndex) -> &[NodeIndex] {
        if index.is_none() {
            &[]
        } else {
            &self.children[index.0 as usize]
        }
    }

    #[inline]
    pub fn parent(&self, index: NodeIndex) -> Option<NodeIndex> {
        if index.is_none() {
            return None;
        }
        let p = self.parents[index.0 as usize];
        if p.is_none() { None } else { Some(p) }
    }

    pub fn file(&self, file: FileId) -> &SourceFileData {
        &self.source_files[file.0 as usize]
    }

    pub fn files(&self) -> &[SourceFileData] {
        &self.source_files
    }

    pub fn file_by_name(&self, name: &str) -> Option<FileId> {
        self.source_files
            .iter()
            .position(|f| f.file_name == name)
            .map(|i| FileId(i as u32))
    }

    pub fn file_text(&self, file: FileId) -> &str {
        &self.source_files[file.0 as usize].text
    }

    /// The exact source text covered by a node's span.
    pub fn node_text(&self, index: NodeIndex) -> &str {
        let Some(node) = self.get(index) else {
            return "";
        };
        &self.file_text(node.file)[node.pos as usize..node.end as usize]
    }

    /// The documentation comment attached to a declaration node.
    ///
    /// A doc comment either starts the node's span (declaration spans
    /// include their leading docs) or immediately precedes the node.
    pub fn doc_comment_of(&self, index: NodeIndex) -> Option<&CommentRange> {
        let node = self.get(index)?;
        let file = self.file(node.file);
        let at_start = file
            .comments
            .iter()
            .find(|c| c.pos == node.pos && c.end <= node.end);
        if let Some(c) = at_start {
            if comments::is_doc_comment(c, &file.text) {
                return Some(c);
            }
            return None;
        }
        comments::nearest_doc_comment(&file.comments, node.pos, &file.text)
    }

    /// Text of the documentation comment attached to a declaration node.
    pub fn doc_comment_text(&self, index: NodeIndex) -> Option<&str> {
        let node = self.get(index)?;
        let file = self.file(node.file);
        self.doc_comment_of(index).map(|c| c.get_text(&file.text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_child_links() {
        let mut arena = NodeArena::new();
        let file = arena.add_file("a.d.ts", "interface A {}");
        let root = arena.add_node(file, SyntaxKind::SourceFile, 0, 14);
        let decl = arena.add_node(file, SyntaxKind::InterfaceDeclaration, 0, 14);
        arena.add_child(root, decl);
        arena.set_file_root(file, root);

        assert_eq!(arena.children(root), &[decl]);
        assert_eq!(arena.parent(decl), Some(root));
        assert_eq!(arena.parent(root), None);
        assert_eq!(arena.node_text(decl), "interface A {}");
    }

    #[test]
    fn test_doc_comment_inside_span() {
        let source = "/** @beta */\ninterface A {}";
        let mut arena = NodeArena::new();
        let file = arena.add_file("a.d.ts", source);
        let decl = arena.add_node(file, SyntaxKind::InterfaceDeclaration, 0, source.len() as u32);
        arena
            .file_mut(file)
            .comments
            .push(CommentRange::new(0, 12, true, true));

        let text = arena.doc_comment_text(decl);
        assert_eq!(text, Some("/** @beta */"));
    }
}
