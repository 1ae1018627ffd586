//! Rollup generation for the surface engine.
//!
//! Takes the analyzer's symbol table and produces one trimmed,
//! deterministically-ordered declaration file per release tier. Untouched
//! source text is reproduced byte-for-byte through the [`Span`] rewriter;
//! deletions, renames and collapses are localized overlay modifications.
//!
//! Submodules:
//! - `entry` - per-symbol output records and the unique-naming pass
//! - `span` - structure-preserving text regeneration
//! - `collector` - export enumeration and transitive-reference closure
//! - `generator` - per-tier rewriting and output assembly

pub mod entry;
pub use entry::DtsEntry;

pub mod span;
pub use span::{Span, SpanModification};

mod collector;

pub mod generator;
pub use generator::{RollupGenerator, RollupKind};
