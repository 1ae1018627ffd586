//! Signature reference collection.
//!
//! Walks a declaration's syntax subtree, skipping executable statement
//! bodies, and resolves every type-reference-like node to its followed
//! root symbol. Unresolvable references degrade to a warning; the emitted
//! type reference is simply left unrenamed.

use anyhow::Result;
use surface_common::diagnostic_codes;
use surface_syntax::{NodeIndex, SyntaxKind};

use crate::table::{AstDeclarationId, AstSymbolId, AstSymbolTable, FollowOutcome};

impl AstSymbolTable<'_> {
    /// Followed root symbols referenced from the declaration's signature,
    /// in source order, deduplicated. Computed once and cached; the set
    /// is fully known before any consumer reads it.
    pub fn collect_referenced(&mut self, decl: AstDeclarationId) -> Result<Vec<AstSymbolId>> {
        if let Some(cached) = &self.declaration(decl).referenced {
            return Ok(cached.clone());
        }
        let node = self.declaration(decl).node;
        let mut referenced: Vec<AstSymbolId> = Vec::new();
        self.walk_for_references(node, &mut referenced)?;
        self.set_referenced(decl, referenced.clone());
        Ok(referenced)
    }

    fn walk_for_references(
        &mut self,
        node: NodeIndex,
        referenced: &mut Vec<AstSymbolId>,
    ) -> Result<()> {
        let arena = self.arena();
        let Some(n) = arena.get(node) else {
            return Ok(());
        };
        match n.kind {
            // Only type-level signature text matters.
            SyntaxKind::Block => Ok(()),
            SyntaxKind::TypeReference | SyntaxKind::HeritageClause => {
                for &child in arena.children(node) {
                    let is_name =
                        arena.get(child).is_some_and(|c| c.kind == SyntaxKind::Identifier);
                    if is_name {
                        self.register_reference(child, referenced)?;
                    } else {
                        self.walk_for_references(child, referenced)?;
                    }
                }
                Ok(())
            }
            // For `ns.Member` only the head name is a rollup-level
            // reference; the member name resolves within the namespace.
            SyntaxKind::QualifiedName => {
                if let Some(&head) = arena.children(node).first() {
                    let is_name =
                        arena.get(head).is_some_and(|c| c.kind == SyntaxKind::Identifier);
                    if is_name {
                        self.register_reference(head, referenced)?;
                    }
                }
                Ok(())
            }
            _ => {
                for &child in arena.children(node) {
                    self.walk_for_references(child, referenced)?;
                }
                Ok(())
            }
        }
    }

    fn register_reference(
        &mut self,
        name_node: NodeIndex,
        referenced: &mut Vec<AstSymbolId>,
    ) -> Result<()> {
        let Some(raw) = self.semantics().symbol_of(name_node) else {
            let text = self.arena().node_text(name_node).to_string();
            self.warn_at(
                name_node,
                diagnostic_codes::UNRESOLVED_REFERENCE,
                format!("reference to `{text}` could not be resolved"),
            );
            return Ok(());
        };
        match self.follow_symbol(raw)? {
            FollowOutcome::Symbol(id) => {
                let root = self.root_of(id);
                if !referenced.contains(&root) {
                    referenced.push(root);
                }
            }
            FollowOutcome::Unresolved => {
                let text = self.arena().node_text(name_node).to_string();
                self.warn_at(
                    name_node,
                    diagnostic_codes::UNRESOLVED_REFERENCE,
                    format!("reference to `{text}` could not be resolved"),
                );
            }
            FollowOutcome::Excluded => {}
        }
        Ok(())
    }

    fn set_referenced(&mut self, decl: AstDeclarationId, referenced: Vec<AstSymbolId>) {
        // Single assignment: the cached set is immutable once written.
        self.declaration_mut(decl).referenced = Some(referenced);
    }
}
