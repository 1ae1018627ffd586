//! Common types and utilities for the surface rollup engine.
//!
//! This crate provides foundational types used across all surface crates:
//! - Comment ranges and doc-comment lookup
//! - Release tags (`ReleaseTag`) and doc-comment tag scanning
//! - Analysis diagnostics (`Diagnostic`)

// Comment parsing utilities
pub mod comments;
pub use comments::{CommentRange, is_doc_comment, nearest_doc_comment};

// Release tiers and @tag scanning
pub mod release_tag;
pub use release_tag::ReleaseTag;

// Structured analysis warnings and errors
pub mod diagnostics;
pub use diagnostics::{Diagnostic, DiagnosticCategory, diagnostic_codes};
