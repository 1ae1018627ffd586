//! Entry collection: export enumeration, transitive-reference closure,
//! deterministic ordering and unique-name assignment.

use std::collections::VecDeque;

use anyhow::{Result, bail};
use rustc_hash::FxHashSet;
use surface_analyzer::{AstDeclarationId, AstSymbolId};
use surface_common::{Diagnostic, diagnostic_codes};
use surface_syntax::{NodeIndex, SyntaxKind};
use tracing::debug;

use crate::entry::{DtsEntry, sort_key};
use crate::generator::RollupGenerator;

impl RollupGenerator<'_> {
    /// Build the complete entry table for one entry module.
    ///
    /// Exports are collected first so exported symbols win naming
    /// priority over reference-only pulls of the same identity; a
    /// breadth-first closure then creates an entry for every symbol
    /// transitively referenced by any known entry's declarations. The
    /// pass finishes by sorting entries and assigning unique names.
    pub fn analyze(&mut self, entry_module: &str) -> Result<()> {
        let entry_point = self.table.fetch_entry_point(entry_module)?;

        for (name, symbol) in &entry_point.exported_members {
            if self.table.symbol(*symbol).is_ambient {
                self.warn_symbol(
                    *symbol,
                    diagnostic_codes::AMBIENT_SYMBOL_SKIPPED,
                    format!("exported name `{name}` is an ambient symbol and was filtered"),
                );
                continue;
            }
            match self.entry_index.get(symbol) {
                Some(&index) => {
                    let existing = &mut self.entries[index];
                    match &existing.exported_name {
                        None => existing.exported_name = Some(name.clone()),
                        Some(previous) if previous != name => {
                            let message = format!(
                                "`{previous}` is also exported as `{name}`; \
                                 the first export name wins"
                            );
                            self.warn_symbol(
                                *symbol,
                                diagnostic_codes::UNSUPPORTED_EXPORT,
                                message,
                            );
                        }
                        Some(_) => {}
                    }
                }
                None => {
                    let tag = self.table.effective_release_tag(*symbol);
                    let mut entry = DtsEntry::new(*symbol, tag);
                    entry.exported_name = Some(name.clone());
                    self.entry_index.insert(*symbol, self.entries.len());
                    self.entries.push(entry);
                }
            }
        }
        self.entry_point = Some(entry_point);

        // Closure over transitive references. The visited set acknowledges
        // already-seen symbols as reachable without re-expanding them, so
        // mutually-referencing declarations terminate.
        let mut queue: VecDeque<AstSymbolId> =
            self.entries.iter().map(|entry| entry.symbol).collect();
        let mut visited: FxHashSet<AstSymbolId> = queue.iter().copied().collect();
        while let Some(symbol) = queue.pop_front() {
            let decls = self.table.symbol(symbol).declarations.to_vec();
            for decl in decls {
                for referenced in self.table.collect_referenced(decl)? {
                    if !visited.insert(referenced) {
                        continue;
                    }
                    if self.table.symbol(referenced).is_ambient {
                        let name = self.table.symbol(referenced).local_name.clone();
                        self.warn_symbol(
                            referenced,
                            diagnostic_codes::AMBIENT_SYMBOL_SKIPPED,
                            format!("ambient symbol `{name}` was filtered from emission"),
                        );
                        continue;
                    }
                    let tag = self.table.effective_release_tag(referenced);
                    self.entry_index.insert(referenced, self.entries.len());
                    self.entries.push(DtsEntry::new(referenced, tag));
                    queue.push_back(referenced);
                }
            }
        }
        debug!(entries = self.entries.len(), "entry closure complete");

        self.sort_entries();
        self.assign_unique_names()?;
        self.prepare_emit_tables()?;
        self.analyzed = true;
        Ok(())
    }

    fn sort_entries(&mut self) {
        let mut entries = std::mem::take(&mut self.entries);
        entries.sort_by_cached_key(|entry| {
            let name = entry.exported_name.clone().unwrap_or_else(|| {
                self.table.symbol(entry.symbol).local_name.clone()
            });
            sort_key(&name)
        });
        self.entry_index = entries
            .iter()
            .enumerate()
            .map(|(index, entry)| (entry.symbol, index))
            .collect();
        self.entries = entries;
    }

    /// Two deterministic passes over the sorted entry set.
    ///
    /// Exported names are claimed verbatim first; a name claimed by two
    /// distinct entries is a program invariant violation and aborts the
    /// run. Reference-only entries then receive their local name with a
    /// numeric suffix appended until no collision remains.
    fn assign_unique_names(&mut self) -> Result<()> {
        let mut used: FxHashSet<String> = FxHashSet::default();
        for entry in &mut self.entries {
            if let Some(name) = &entry.exported_name {
                if !used.insert(name.clone()) {
                    bail!(
                        "two different declarations are exported under the same name `{name}`"
                    );
                }
                entry.unique_name = Some(name.clone());
            }
        }
        for index in 0..self.entries.len() {
            if self.entries[index].unique_name.is_some() {
                continue;
            }
            let base = self
                .table
                .symbol(self.entries[index].symbol)
                .local_name
                .clone();
            let mut candidate = base.clone();
            let mut counter = 1u32;
            while used.contains(&candidate) {
                counter += 1;
                candidate = format!("{base}_{counter}");
            }
            used.insert(candidate.clone());
            self.entries[index].unique_name = Some(candidate);
        }
        Ok(())
    }

    /// Precompute everything `emit` needs so emission is read-only:
    /// per-declaration release tags (members included), identifier
    /// renames, and reference directives from every analyzed file.
    fn prepare_emit_tables(&mut self) -> Result<()> {
        for index in 0..self.entries.len() {
            let symbol = self.entries[index].symbol;
            let decls = self.table.symbol(symbol).declarations.to_vec();
            for decl in decls {
                self.tag_declarations(decl);
                let node = self.table.declaration(decl).node;
                if let Some(n) = self.table.arena().get(node) {
                    let file = self.table.arena().file(n.file);
                    for directive in &file.reference_directives {
                        self.directives.insert(directive.clone());
                    }
                }
                self.collect_renames(node);
            }
        }
        Ok(())
    }

    fn tag_declarations(&mut self, decl: AstDeclarationId) {
        let symbol = self.table.declaration(decl).symbol;
        let tag = self.table.effective_release_tag(symbol);
        self.decl_tags.insert(decl, tag);
        let children = self.table.declaration(decl).children.to_vec();
        for child in children {
            self.tag_declarations(child);
        }
    }

    fn collect_renames(&mut self, node: NodeIndex) {
        let arena = self.table.arena();
        let mut stack: Vec<NodeIndex> = vec![node];
        while let Some(current) = stack.pop() {
            let Some(n) = arena.get(current) else {
                continue;
            };
            if n.kind == SyntaxKind::Identifier {
                let Some(symbol) = self.table.resolved_symbol_of_node(current) else {
                    continue;
                };
                let Some(&index) = self.entry_index.get(&symbol) else {
                    continue;
                };
                let unique = self.entries[index].emitted_name().to_string();
                if !unique.is_empty() && unique != arena.node_text(current) {
                    self.renames.insert(current.0, unique);
                }
                continue;
            }
            for &child in arena.children(current) {
                stack.push(child);
            }
        }
    }

    fn warn_symbol(&mut self, symbol: AstSymbolId, code: u32, message: impl Into<String>) {
        let node = self
            .table
            .symbol(symbol)
            .declarations
            .first()
            .map(|&decl| self.table.declaration(decl).node)
            .unwrap_or(NodeIndex::NONE);
        let (file, start, length) = match self.table.arena().get(node) {
            Some(n) => (
                self.table.arena().file(n.file).file_name.clone(),
                n.pos,
                n.end - n.pos,
            ),
            None => (String::new(), 0, 0),
        };
        self.diagnostics.push(Diagnostic::warning(
            file,
            start,
            length,
            message.into(),
            code,
        ));
    }
}
