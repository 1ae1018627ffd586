//! Entry-module export enumeration.

use anyhow::Result;
use surface_common::diagnostic_codes;
use surface_syntax::NodeIndex;
use tracing::debug;

use crate::table::{AstSymbolId, AstSymbolTable, FollowOutcome};

/// The root query surface: the entry module's exported members, in
/// export order. Built once per analysis; read-only afterward.
#[derive(Debug)]
pub struct AstEntryPoint {
    pub exported_members: Vec<(String, AstSymbolId)>,
}

impl AstSymbolTable<'_> {
    /// Enumerate the entry module's exports, following each to its
    /// semantic identity. Unsupported export shapes are skipped with a
    /// warning rather than aborting the run.
    pub fn fetch_entry_point(&mut self, module_file: &str) -> Result<AstEntryPoint> {
        let semantics = self.semantics();
        let exports = semantics.exports_of(module_file).unwrap_or(&[]);
        debug!(module = module_file, count = exports.len(), "fetching entry point");

        let mut exported_members: Vec<(String, AstSymbolId)> = Vec::new();
        for (name, raw) in exports {
            if name == "default" {
                self.warn_at(
                    first_declaration_node(self, *raw),
                    diagnostic_codes::UNSUPPORTED_EXPORT,
                    "default exports from the entry point are not supported and were skipped",
                );
                continue;
            }
            match self.follow_symbol(*raw)? {
                FollowOutcome::Symbol(id) => exported_members.push((name.clone(), id)),
                FollowOutcome::Unresolved => {
                    self.warn_at(
                        first_declaration_node(self, *raw),
                        diagnostic_codes::UNSUPPORTED_EXPORT,
                        format!("export `{name}` could not be resolved and was skipped"),
                    );
                }
                FollowOutcome::Excluded => {
                    self.warn_at(
                        first_declaration_node(self, *raw),
                        diagnostic_codes::UNSUPPORTED_EXPORT,
                        format!("export `{name}` is not an emittable declaration and was skipped"),
                    );
                }
            }
        }
        Ok(AstEntryPoint { exported_members })
    }
}

fn first_declaration_node(
    table: &AstSymbolTable<'_>,
    raw: surface_syntax::RawSymbolId,
) -> NodeIndex {
    table
        .semantics()
        .get(raw)
        .declarations
        .first()
        .copied()
        .unwrap_or(NodeIndex::NONE)
}
