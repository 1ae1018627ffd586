//! Rollup output records.
//!
//! One `DtsEntry` exists per distinct reachable symbol (exported or
//! transitively referenced). Entries are created during analysis and
//! never re-created; the unique name is assigned by a deterministic pass
//! over the complete, sorted entry set.

use surface_analyzer::AstSymbolId;
use surface_common::ReleaseTag;

/// One rollup-output record binding a symbol to its emitted identity.
#[derive(Debug, Clone)]
pub struct DtsEntry {
    pub symbol: AstSymbolId,
    /// Set iff the entry module exports this symbol; the declaration is
    /// then emitted with an export marker under this name.
    pub exported_name: Option<String>,
    /// Collision-free emitted name, assigned after the entry set is
    /// complete. Unique within one generator's output.
    pub unique_name: Option<String>,
    pub release_tag: ReleaseTag,
}

impl DtsEntry {
    pub fn new(symbol: AstSymbolId, release_tag: ReleaseTag) -> DtsEntry {
        DtsEntry {
            symbol,
            exported_name: None,
            unique_name: None,
            release_tag,
        }
    }

    /// The assigned unique name. Only valid after naming has run.
    pub fn emitted_name(&self) -> &str {
        self.unique_name.as_deref().unwrap_or("")
    }
}

/// Sort key for deterministic entry ordering: case-sensitive, except that
/// a leading internal marker (`_`) sorts as if stripped with the marker
/// re-appended at the tail, so internal names interleave alphabetically
/// with public ones instead of clustering at the top.
pub fn sort_key(name: &str) -> String {
    match name.strip_prefix('_') {
        Some(stripped) => format!("{stripped}_"),
        None => name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_key_interleaves_internal_names() {
        let mut names = vec!["Banana", "_Apple", "Apple", "_Cherry"];
        names.sort_by_key(|n| sort_key(n));
        assert_eq!(names, vec!["Apple", "_Apple", "Banana", "_Cherry"]);
    }

    #[test]
    fn test_sort_key_is_case_sensitive() {
        assert!(sort_key("Apple") < sort_key("apple"));
    }
}
