//! Syntax tree and raw semantic model for the surface rollup engine.
//!
//! The engine never parses source text. An external semantic analysis
//! provider hands over two flat structures:
//! - a [`NodeArena`] of syntax nodes with byte spans over per-file source
//!   text, and
//! - a [`SemanticTable`] of raw bound symbols (alias links, import
//!   origins, export marking, per-module export maps).
//!
//! Everything downstream (symbol table, span rewriting, rollup
//! generation) is a read-only consumer of these structures.

pub mod kind;
pub use kind::SyntaxKind;

pub mod arena;
pub use arena::{FileId, Node, NodeArena, NodeIndex, SourceFileData};

pub mod semantic;
pub use semantic::{NAMESPACE_IMPORT, RawSymbol, RawSymbolFlags, RawSymbolId, SemanticTable};
