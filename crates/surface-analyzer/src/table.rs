//! Symbol and declaration arenas, alias following, and fetching.
//!
//! `AstSymbolTable` owns every `AstSymbol`/`AstDeclaration` created during
//! one analysis session. Symbols are memoized by followed raw identity
//! (local definitions) or by import value (external origins), so each
//! distinct semantic identity yields exactly one `AstSymbol`.

use anyhow::{Result, bail};
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;
use surface_common::{Diagnostic, ReleaseTag};
use surface_syntax::{NAMESPACE_IMPORT, NodeArena, NodeIndex, RawSymbolId, SemanticTable};
use tracing::{debug, warn};

use crate::ast_import::{AstImport, ExportName, is_local_module_path};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AstSymbolId(pub u32);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AstDeclarationId(pub u32);

/// The semantic identity of a name after alias following.
///
/// Aggregates one or more declaration sites (declaration merging) and
/// records whether the symbol originates outside the project.
#[derive(Debug)]
pub struct AstSymbol {
    /// Name at the definition site (or at the import site for external
    /// symbols).
    pub local_name: String,
    /// Followed raw identity; `None` for external imports.
    pub followed: Option<RawSymbolId>,
    /// Set iff the symbol originates outside the project.
    pub ast_import: Option<AstImport>,
    pub declarations: SmallVec<[AstDeclarationId; 1]>,
    /// Enclosing container symbol for members and namespace-nested
    /// declarations.
    pub parent: Option<AstSymbolId>,
    /// Global/script-context symbol with no export marking anywhere along
    /// its alias chain; never emitted.
    pub is_ambient: bool,
}

/// One syntactic declaration site of a symbol.
#[derive(Debug)]
pub struct AstDeclaration {
    pub node: NodeIndex,
    pub symbol: AstSymbolId,
    pub parent: Option<AstDeclarationId>,
    pub children: Vec<AstDeclarationId>,
    /// Followed root symbols referenced from this declaration's
    /// signature. Computed once on first request, immutable afterwards.
    pub(crate) referenced: Option<Vec<AstSymbolId>>,
}

/// Result of following a raw symbol.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FollowOutcome {
    Symbol(AstSymbolId),
    /// The chain could not be followed to a definition; the reference is
    /// dropped (best-effort policy).
    Unresolved,
    /// The target is a pure syntactic artifact and not an emission unit.
    Excluded,
}

pub struct AstSymbolTable<'a> {
    arena: &'a NodeArena,
    semantics: &'a SemanticTable,
    symbols: Vec<AstSymbol>,
    declarations: Vec<AstDeclaration>,
    by_identity: FxHashMap<RawSymbolId, AstSymbolId>,
    by_import: FxHashMap<AstImport, AstSymbolId>,
    decl_table: FxHashMap<(Option<AstDeclarationId>, NodeIndex), AstDeclarationId>,
    decl_by_node: FxHashMap<u32, AstDeclarationId>,
    pub(crate) tag_cache: FxHashMap<AstSymbolId, ReleaseTag>,
    pub(crate) diagnostics: Vec<Diagnostic>,
}

impl<'a> AstSymbolTable<'a> {
    pub fn new(arena: &'a NodeArena, semantics: &'a SemanticTable) -> AstSymbolTable<'a> {
        AstSymbolTable {
            arena,
            semantics,
            symbols: Vec::new(),
            declarations: Vec::new(),
            by_identity: FxHashMap::default(),
            by_import: FxHashMap::default(),
            decl_table: FxHashMap::default(),
            decl_by_node: FxHashMap::default(),
            tag_cache: FxHashMap::default(),
            diagnostics: Vec::new(),
        }
    }

    pub fn arena(&self) -> &'a NodeArena {
        self.arena
    }

    pub fn semantics(&self) -> &'a SemanticTable {
        self.semantics
    }

    #[inline]
    pub fn symbol(&self, id: AstSymbolId) -> &AstSymbol {
        &self.symbols[id.0 as usize]
    }

    #[inline]
    pub fn declaration(&self, id: AstDeclarationId) -> &AstDeclaration {
        &self.declarations[id.0 as usize]
    }

    #[inline]
    pub(crate) fn declaration_mut(&mut self, id: AstDeclarationId) -> &mut AstDeclaration {
        &mut self.declarations[id.0 as usize]
    }

    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// The outermost enclosing symbol: members resolve to the container
    /// that is an emission unit.
    pub fn root_of(&self, mut id: AstSymbolId) -> AstSymbolId {
        while let Some(parent) = self.symbol(id).parent {
            id = parent;
        }
        id
    }

    /// The declaration record for a syntax node, if one was fetched.
    pub fn declaration_for_node(&self, node: NodeIndex) -> Option<AstDeclarationId> {
        self.decl_by_node.get(&node.0).copied()
    }

    /// Follow the symbol bound to a node to its semantic identity.
    /// Returns `None` for unbound nodes and non-emission targets.
    pub fn resolved_symbol_of_node(&mut self, node: NodeIndex) -> Option<AstSymbolId> {
        let raw = self.semantics.symbol_of(node)?;
        match self.follow_symbol(raw) {
            Ok(FollowOutcome::Symbol(id)) => Some(id),
            _ => None,
        }
    }

    /// Repeatedly dereference alias indirections until reaching a
    /// definition, or capture the remaining chain as an [`AstImport`]
    /// when it crosses into a non-local module path.
    pub fn follow_symbol(&mut self, raw: RawSymbolId) -> Result<FollowOutcome> {
        let semantics = self.semantics;
        let mut current = raw;
        let mut exported_along_chain = false;
        let mut seen: FxHashSet<RawSymbolId> = FxHashSet::default();
        loop {
            if !seen.insert(current) {
                warn!(name = %semantics.get(current).name, "re-export chain forms a cycle");
                return Ok(FollowOutcome::Unresolved);
            }
            let sym = semantics.get(current);
            if sym.is_exported() {
                exported_along_chain = true;
            }
            if !sym.is_alias() {
                break;
            }
            if let Some(module) = &sym.import_module
                && !is_local_module_path(module)
            {
                let imported = sym.import_name.as_deref().unwrap_or(&sym.name);
                let export_name = if imported == NAMESPACE_IMPORT {
                    ExportName::Namespace
                } else {
                    ExportName::Named(imported.to_string())
                };
                let import = AstImport {
                    module_path: module.clone(),
                    export_name,
                };
                let id = self.fetch_imported(import, sym.name.clone());
                return Ok(FollowOutcome::Symbol(id));
            }
            match sym.alias_target {
                Some(target) => current = target,
                None => {
                    warn!(name = %sym.name, "alias has no resolvable target");
                    return Ok(FollowOutcome::Unresolved);
                }
            }
        }
        self.fetch_local(current, exported_along_chain)
    }

    fn fetch_imported(&mut self, import: AstImport, local_name: String) -> AstSymbolId {
        if let Some(&id) = self.by_import.get(&import) {
            return id;
        }
        debug!(module = %import.module_path, name = %local_name, "capturing external import");
        let id = AstSymbolId(self.symbols.len() as u32);
        self.symbols.push(AstSymbol {
            local_name,
            followed: None,
            ast_import: Some(import.clone()),
            declarations: SmallVec::new(),
            parent: None,
            is_ambient: false,
        });
        self.by_import.insert(import, id);
        id
    }

    fn fetch_local(&mut self, raw: RawSymbolId, exported_along_chain: bool) -> Result<FollowOutcome> {
        if let Some(&id) = self.by_identity.get(&raw) {
            return Ok(FollowOutcome::Symbol(id));
        }
        let semantics = self.semantics;
        let arena = self.arena;
        let sym = semantics.get(raw);
        if sym.declarations.is_empty() {
            return Ok(FollowOutcome::Unresolved);
        }
        // Type parameters and anonymous type literals are not emission
        // units and never enter the table.
        if sym
            .declarations
            .iter()
            .all(|&d| arena.get(d).is_none_or(|n| n.kind.is_syntactic_artifact()))
        {
            return Ok(FollowOutcome::Excluded);
        }

        // Fetch the container first so member declarations can be matched
        // to their enclosing declaration.
        let parent_ast = match sym.parent {
            Some(p) => match self.follow_symbol(p)? {
                FollowOutcome::Symbol(id) => Some(id),
                _ => None,
            },
            None => None,
        };
        // Fetching the container discovers its members; this symbol may
        // already exist now.
        if let Some(&id) = self.by_identity.get(&raw) {
            return Ok(FollowOutcome::Symbol(id));
        }

        let exported = exported_along_chain || sym.is_exported();
        let in_module = arena
            .get(sym.declarations[0])
            .is_none_or(|n| arena.file(n.file).is_module);
        let is_ambient = !exported && !in_module;

        let id = AstSymbolId(self.symbols.len() as u32);
        debug!(name = %sym.name, ambient = is_ambient, "fetching symbol");
        self.symbols.push(AstSymbol {
            local_name: sym.name.clone(),
            followed: Some(raw),
            ast_import: None,
            declarations: SmallVec::new(),
            parent: parent_ast,
            is_ambient,
        });
        self.by_identity.insert(raw, id);

        // The declaration list must be complete before the symbol is used
        // to resolve other symbols' references.
        let mut decls: SmallVec<[AstDeclarationId; 1]> = SmallVec::new();
        for &node in &sym.declarations {
            let parent_decl = self.match_parent_declaration(parent_ast, node)?;
            decls.push(self.fetch_declaration(node, id, parent_decl)?);
        }
        for &decl in &decls {
            self.discover_children(decl, raw)?;
        }
        Ok(FollowOutcome::Symbol(id))
    }

    fn fetch_declaration(
        &mut self,
        node: NodeIndex,
        symbol: AstSymbolId,
        parent: Option<AstDeclarationId>,
    ) -> Result<AstDeclarationId> {
        let key = (parent, node);
        if let Some(&existing) = self.decl_table.get(&key) {
            return Ok(existing);
        }
        let id = AstDeclarationId(self.declarations.len() as u32);
        self.declarations.push(AstDeclaration {
            node,
            symbol,
            parent,
            children: Vec::new(),
            referenced: None,
        });
        self.decl_table.insert(key, id);
        self.decl_by_node.insert(node.0, id);
        self.symbols[symbol.0 as usize].declarations.push(id);
        if let Some(p) = parent {
            self.declarations[p.0 as usize].children.push(id);
        }
        Ok(id)
    }

    /// Find which of the parent symbol's declarations encloses `node`.
    /// A member that cannot be matched is a program invariant violation.
    fn match_parent_declaration(
        &self,
        parent: Option<AstSymbolId>,
        node: NodeIndex,
    ) -> Result<Option<AstDeclarationId>> {
        let Some(parent) = parent else {
            return Ok(None);
        };
        for &pd in &self.symbol(parent).declarations {
            if self.is_ancestor(self.declaration(pd).node, node) {
                return Ok(Some(pd));
            }
        }
        bail!(
            "declaration of `{}` cannot be matched to an enclosing declaration of `{}`",
            self.arena.node_text(node).chars().take(40).collect::<String>(),
            self.symbol(parent).local_name,
        );
    }

    fn is_ancestor(&self, ancestor: NodeIndex, node: NodeIndex) -> bool {
        let mut current = node;
        while let Some(parent) = self.arena.parent(current) {
            if parent == ancestor {
                return true;
            }
            current = parent;
        }
        false
    }

    /// Fetch the member/nested declarations syntactically contained in
    /// `decl` whose symbols name `owner_raw` as their container.
    fn discover_children(&mut self, decl: AstDeclarationId, owner_raw: RawSymbolId) -> Result<()> {
        let arena = self.arena;
        let semantics = self.semantics;
        let node = self.declaration(decl).node;
        let mut stack: Vec<NodeIndex> = Vec::new();
        let mut push_children = |stack: &mut Vec<NodeIndex>, of: NodeIndex| {
            for &child in arena.children(of).iter().rev() {
                stack.push(child);
            }
        };
        push_children(&mut stack, node);
        while let Some(current) = stack.pop() {
            let Some(n) = arena.get(current) else {
                continue;
            };
            if n.kind.is_body() {
                continue;
            }
            if n.kind.is_member_declaration() || n.kind.is_declaration() {
                if let Some(raw) = semantics.symbol_of(current)
                    && semantics.get(raw).parent == Some(owner_raw)
                {
                    // The child's own fetch discovers deeper members.
                    self.follow_symbol(raw)?;
                    continue;
                }
            }
            push_children(&mut stack, current);
        }
        Ok(())
    }

    pub(crate) fn warn_at(&mut self, node: NodeIndex, code: u32, message: impl Into<String>) {
        let (file, start, length) = match self.arena.get(node) {
            Some(n) => (
                self.arena.file(n.file).file_name.clone(),
                n.pos,
                n.end - n.pos,
            ),
            None => (String::new(), 0, 0),
        };
        let message = message.into();
        warn!(code, %message);
        self.diagnostics
            .push(Diagnostic::warning(file, start, length, message, code));
    }
}
