//! Per-tier rollup emission.
//!
//! After `analyze` has built the entry table, `emit` may be called any
//! number of times; it is read-only over the precomputed tables, so
//! emissions for different tiers are independent.

use indexmap::IndexSet;
use rustc_hash::FxHashMap;
use surface_analyzer::{AstDeclarationId, AstSymbolId, AstSymbolTable};
use surface_analyzer::ast_import::{AstImport, ExportName};
use surface_analyzer::entry_point::AstEntryPoint;
use surface_common::{Diagnostic, ReleaseTag};
use surface_syntax::{NodeArena, SemanticTable, SyntaxKind};
use tracing::debug;

use crate::entry::DtsEntry;
use crate::span::Span;

/// Which rollup flavor to generate. Each kind includes everything the
/// next stricter kind includes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RollupKind {
    /// Everything, including `@internal` declarations.
    Internal,
    Alpha,
    Beta,
    /// Only `@public` (and untagged) declarations in full.
    Public,
}

impl RollupKind {
    pub fn cutoff(self) -> ReleaseTag {
        match self {
            RollupKind::Internal => ReleaseTag::Internal,
            RollupKind::Alpha => ReleaseTag::Alpha,
            RollupKind::Beta => ReleaseTag::Beta,
            RollupKind::Public => ReleaseTag::Public,
        }
    }
}

/// Orchestrates analysis and emission for one entry module.
///
/// All mutable state is owned by the generator instance; nothing is
/// process-global, so multiple analyses can run side by side.
pub struct RollupGenerator<'a> {
    pub(crate) table: AstSymbolTable<'a>,
    pub(crate) entry_point: Option<AstEntryPoint>,
    pub(crate) entries: Vec<DtsEntry>,
    pub(crate) entry_index: FxHashMap<AstSymbolId, usize>,
    /// Identifier node -> replacement name, for every identifier whose
    /// resolved symbol maps to an entry emitted under a different name.
    pub(crate) renames: FxHashMap<u32, String>,
    /// Release tag per fetched declaration, members included.
    pub(crate) decl_tags: FxHashMap<AstDeclarationId, ReleaseTag>,
    /// Reference directives from every analyzed source file, first
    /// occurrence wins the position.
    pub(crate) directives: IndexSet<String>,
    pub(crate) diagnostics: Vec<Diagnostic>,
    pub(crate) analyzed: bool,
}

impl<'a> RollupGenerator<'a> {
    pub fn new(arena: &'a NodeArena, semantics: &'a SemanticTable) -> RollupGenerator<'a> {
        RollupGenerator {
            table: AstSymbolTable::new(arena, semantics),
            entry_point: None,
            entries: Vec::new(),
            entry_index: FxHashMap::default(),
            renames: FxHashMap::default(),
            decl_tags: FxHashMap::default(),
            directives: IndexSet::new(),
            diagnostics: Vec::new(),
            analyzed: false,
        }
    }

    pub fn table(&self) -> &AstSymbolTable<'a> {
        &self.table
    }

    pub fn entry_point(&self) -> Option<&AstEntryPoint> {
        self.entry_point.as_ref()
    }

    /// Entries in emission order. Populated by `analyze`.
    pub fn entries(&self) -> &[DtsEntry] {
        &self.entries
    }

    /// All analysis warnings, table-level and generator-level.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        let mut all = self.table.diagnostics().to_vec();
        all.extend(self.diagnostics.iter().cloned());
        all
    }

    /// Generate the rollup text for one release kind.
    ///
    /// The output starts with consolidated import lines for included
    /// external entries, then reference directives, then each entry's
    /// rewritten declarations separated by blank lines. Excluded entries
    /// render as a placeholder line so the omission is discoverable.
    pub fn emit(&self, kind: RollupKind) -> String {
        debug_assert!(self.analyzed, "emit called before analyze");
        let cutoff = kind.cutoff();
        debug!(?kind, entries = self.entries.len(), "emitting rollup");
        let mut blocks: Vec<String> = Vec::new();

        let mut imports: Vec<String> = Vec::new();
        for entry in &self.entries {
            let symbol = self.table.symbol(entry.symbol);
            if let Some(import) = &symbol.ast_import
                && entry.release_tag.includes(cutoff)
            {
                imports.push(import_line(import, entry.emitted_name()));
            }
        }
        if !imports.is_empty() {
            blocks.push(imports.join("\n"));
        }
        if !self.directives.is_empty() {
            let lines: Vec<&str> = self.directives.iter().map(|s| s.as_str()).collect();
            blocks.push(lines.join("\n"));
        }

        for entry in &self.entries {
            let symbol = self.table.symbol(entry.symbol);
            if symbol.ast_import.is_some() {
                continue;
            }
            if !entry.release_tag.includes(cutoff) {
                blocks.push(format!(
                    "/* Excluded from this release type: {} */",
                    entry.emitted_name()
                ));
                continue;
            }
            for &decl in &symbol.declarations {
                let node = self.table.declaration(decl).node;
                let Some(file) = self.table.arena().get(node).map(|n| n.file) else {
                    continue;
                };
                let Some(mut span) = Span::build(self.table.arena(), node) else {
                    continue;
                };
                let source = self.table.arena().file_text(file);
                self.rewrite_span(&mut span, source, entry, cutoff, true);
                blocks.push(span.get_modified_text(source));
            }
        }

        let mut out = blocks.join("\n\n");
        if !out.is_empty() {
            out.push('\n');
        }
        out
    }

    /// Depth-first rewrite with per-node-kind dispatch.
    fn rewrite_span(
        &self,
        span: &mut Span,
        source: &str,
        entry: &DtsEntry,
        cutoff: ReleaseTag,
        is_root: bool,
    ) {
        // Statement bodies collapse to a terminator; the deepest inherited
        // separator keeps the trailing line break.
        if span.kind.is_body() {
            let suffix = span.get_last_inner_separator(source).to_string();
            span.modification.prefix_override = Some(";".to_string());
            span.modification.suffix_override = Some(suffix);
            span.modification.omit_children = true;
            span.modification.omit_separator_after = true;
            return;
        }
        if span.kind == SyntaxKind::Identifier {
            if let Some(new_name) = self.renames.get(&span.node.0) {
                span.modification.prefix_override = Some(new_name.clone());
            }
            return;
        }

        // The export/declare decision is re-derived centrally and inserted
        // once, immediately before the declaration keyword; any original
        // modifier keywords are blanked.
        let mut pending_header = if span.kind.is_declaration() {
            Some(self.header_for(span, entry, is_root))
        } else {
            None
        };
        let is_declaration = span.kind.is_declaration();
        for i in 0..span.children.len() {
            let child_kind = span.children[i].kind;
            if is_declaration && child_kind.is_modifier_keyword() {
                span.children[i].modification.skip_all();
            } else if child_kind.is_declaration_keyword() && pending_header.is_some() {
                if let Some(header) = pending_header.take() {
                    let prefix = format!("{header}{}", span.children[i].prefix_text(source));
                    span.children[i].modification.prefix_override = Some(prefix);
                }
            } else if (child_kind.is_member_declaration() || child_kind.is_declaration())
                && self.is_trimmed(span.children[i].node, cutoff)
            {
                self.collapse_child(span, i, source);
            } else {
                self.rewrite_span(&mut span.children[i], source, entry, cutoff, false);
            }
        }
    }

    /// The re-derived `export`/`declare` header for a declaration.
    ///
    /// Interfaces and type aliases are always ambient in declaration
    /// output, so they never need `declare`. Nested namespace members
    /// keep their original export decision.
    fn header_for(&self, span: &Span, entry: &DtsEntry, is_root: bool) -> String {
        if !is_root {
            let exported = span
                .children
                .iter()
                .any(|c| c.kind == SyntaxKind::ExportKeyword);
            return if exported {
                "export ".to_string()
            } else {
                String::new()
            };
        }
        let exported = entry.exported_name.is_some();
        let needs_declare = matches!(
            span.kind,
            SyntaxKind::ClassDeclaration
                | SyntaxKind::EnumDeclaration
                | SyntaxKind::FunctionDeclaration
                | SyntaxKind::VariableStatement
                | SyntaxKind::ModuleDeclaration
        );
        match (exported, needs_declare) {
            (true, true) => "export declare ".to_string(),
            (true, false) => "export ".to_string(),
            (false, true) => "declare ".to_string(),
            (false, false) => String::new(),
        }
    }

    fn is_trimmed(&self, node: surface_syntax::NodeIndex, cutoff: ReleaseTag) -> bool {
        self.table
            .declaration_for_node(node)
            .and_then(|decl| self.decl_tags.get(&decl))
            .is_some_and(|tag| !tag.includes(cutoff))
    }

    /// Collapse a trimmed child declaration to a placeholder comment,
    /// preserving the trailing separator and folding away a directly
    /// following list comma so the surrounding formatting stays intact.
    fn collapse_child(&self, parent: &mut Span, i: usize, source: &str) {
        let node = parent.children[i].node;
        let name = self
            .table
            .declaration_for_node(node)
            .map(|decl| {
                self.table
                    .symbol(self.table.declaration(decl).symbol)
                    .local_name
                    .clone()
            })
            .unwrap_or_default();
        let mut suffix = parent.children[i]
            .get_last_inner_separator(source)
            .to_string();
        parent.children[i].modification.skip_all();
        parent.children[i].modification.prefix_override =
            Some(format!("/* Excluded from this release type: {name} */"));
        if i + 1 < parent.children.len() && parent.children[i + 1].kind.is_punctuation() {
            suffix.push_str(parent.children[i + 1].separator_text(source));
            parent.children[i + 1].modification.skip_all();
        }
        parent.children[i].modification.suffix_override = Some(suffix);
    }
}

/// One consolidated import statement for an external entry.
fn import_line(import: &AstImport, local_name: &str) -> String {
    match &import.export_name {
        ExportName::Namespace => {
            format!("import * as {local_name} from '{}';", import.module_path)
        }
        ExportName::Named(name) if name == "default" => {
            format!("import {local_name} from '{}';", import.module_path)
        }
        ExportName::Named(name) if name == local_name => {
            format!("import {{ {name} }} from '{}';", import.module_path)
        }
        ExportName::Named(name) => {
            format!(
                "import {{ {name} as {local_name} }} from '{}';",
                import.module_path
            )
        }
    }
}
