//! Fixture binder.
//!
//! Produces the `SemanticTable` the provider contract specifies: raw
//! symbols with merged declarations, member symbols with parent links,
//! alias symbols for import/export specifiers with their module origin
//! recorded, per-module export maps, and bindings for every identifier
//! in a type-reference position.

use rustc_hash::{FxHashMap, FxHashSet};
use surface_syntax::{
    FileId, NAMESPACE_IMPORT, NodeArena, NodeIndex, RawSymbolFlags, RawSymbolId, SemanticTable,
    SyntaxKind,
};

pub(crate) fn bind(arena: &NodeArena) -> SemanticTable {
    let mut binder = Binder {
        arena,
        semantics: SemanticTable::new(),
        scopes: FxHashMap::default(),
        members: FxHashMap::default(),
        exported_names: FxHashSet::default(),
        pending_local: Vec::new(),
        pending_imports: Vec::new(),
    };
    for index in 0..arena.files().len() {
        binder.bind_file(FileId(index as u32));
    }
    binder.resolve_pending();
    binder.resolve_references();
    binder.semantics
}

struct Binder<'a> {
    arena: &'a NodeArena,
    semantics: SemanticTable,
    /// Scope tables keyed by the scope-owning node (source file root or
    /// namespace body).
    scopes: FxHashMap<u32, FxHashMap<String, RawSymbolId>>,
    /// Member symbols keyed by (container, member name) so merged
    /// container declarations share member identities.
    members: FxHashMap<(RawSymbolId, String), RawSymbolId>,
    exported_names: FxHashSet<(String, String)>,
    /// `export { A as B };` specifiers awaiting local resolution.
    pending_local: Vec<(RawSymbolId, NodeIndex, String)>,
    /// Aliases importing from project-local modules: (symbol, specifier,
    /// imported name, importing file).
    pending_imports: Vec<(RawSymbolId, String, String, String)>,
}

impl Binder<'_> {
    fn bind_file(&mut self, file: FileId) {
        let data = self.arena.file(file);
        let root = data.root;
        let file_name = data.file_name.clone();
        for &statement in self.arena.children(root) {
            self.bind_statement(statement, root, None, &file_name, true);
        }
    }

    fn bind_statement(
        &mut self,
        node: NodeIndex,
        scope_node: NodeIndex,
        parent: Option<RawSymbolId>,
        file_name: &str,
        file_level: bool,
    ) {
        let Some(n) = self.arena.get(node) else {
            return;
        };
        match n.kind {
            SyntaxKind::ImportDeclaration => self.bind_import(node, scope_node, file_name),
            SyntaxKind::ExportDeclaration => self.bind_export(node, scope_node, file_name),
            kind if kind.is_declaration() => {
                self.bind_declaration(node, scope_node, parent, file_name, file_level);
            }
            _ => {}
        }
    }

    fn bind_declaration(
        &mut self,
        node: NodeIndex,
        scope_node: NodeIndex,
        parent: Option<RawSymbolId>,
        file_name: &str,
        file_level: bool,
    ) {
        let kind = match self.arena.get(node) {
            Some(n) => n.kind,
            None => return,
        };
        let Some(name_node) = self.first_ident_child(node) else {
            panic!("declaration without a name");
        };
        let name = self.arena.node_text(name_node).to_string();
        let exported = self.has_child_of_kind(node, SyntaxKind::ExportKeyword);

        let existing = self
            .scopes
            .get(&scope_node.0)
            .and_then(|scope| scope.get(&name))
            .copied();
        let symbol = match existing {
            Some(symbol) => {
                // Declaration merging: a second site joins the symbol.
                let raw = self.semantics.get_mut(symbol);
                raw.declarations.push(node);
                if exported {
                    raw.flags |= RawSymbolFlags::EXPORTED;
                }
                symbol
            }
            None => {
                let mut flags = RawSymbolFlags::empty();
                if exported {
                    flags |= RawSymbolFlags::EXPORTED;
                }
                let symbol = self.semantics.alloc(name.clone(), flags);
                {
                    let raw = self.semantics.get_mut(symbol);
                    raw.parent = parent;
                    raw.declarations.push(node);
                }
                self.scopes
                    .entry(scope_node.0)
                    .or_default()
                    .insert(name.clone(), symbol);
                symbol
            }
        };
        self.semantics.bind_node(node, symbol);
        self.semantics.bind_node(name_node, symbol);

        if file_level
            && exported
            && self
                .exported_names
                .insert((file_name.to_string(), name.clone()))
        {
            self.semantics.add_module_export(file_name, name, symbol);
        }

        let children: Vec<NodeIndex> = self.arena.children(node).to_vec();
        for &child in &children {
            if self.kind_of(child) == Some(SyntaxKind::TypeParameter) {
                self.bind_type_parameter(child);
            }
        }
        match kind {
            SyntaxKind::InterfaceDeclaration
            | SyntaxKind::ClassDeclaration
            | SyntaxKind::EnumDeclaration => {
                for &child in &children {
                    if self
                        .kind_of(child)
                        .is_some_and(|k| k.is_member_declaration())
                    {
                        self.bind_member(child, symbol);
                    }
                }
            }
            SyntaxKind::ModuleDeclaration => {
                for &child in &children {
                    if self.kind_of(child) == Some(SyntaxKind::ModuleBlock) {
                        let statements: Vec<NodeIndex> = self.arena.children(child).to_vec();
                        for statement in statements {
                            self.bind_statement(statement, child, Some(symbol), file_name, false);
                        }
                    }
                }
            }
            _ => {}
        }
    }

    fn bind_member(&mut self, member: NodeIndex, container: RawSymbolId) {
        let kind = self.kind_of(member);
        let name_node = self.first_ident_child(member);
        let name = if kind == Some(SyntaxKind::Constructor) {
            "constructor".to_string()
        } else {
            match name_node {
                Some(ident) => self.arena.node_text(ident).to_string(),
                None => return,
            }
        };
        let key = (container, name.clone());
        let symbol = match self.members.get(&key) {
            Some(&symbol) => {
                self.semantics.get_mut(symbol).declarations.push(member);
                symbol
            }
            None => {
                let symbol = self.semantics.alloc(name, RawSymbolFlags::empty());
                {
                    let raw = self.semantics.get_mut(symbol);
                    raw.parent = Some(container);
                    raw.declarations.push(member);
                }
                self.members.insert(key, symbol);
                symbol
            }
        };
        self.semantics.bind_node(member, symbol);
        if kind != Some(SyntaxKind::Constructor)
            && let Some(ident) = name_node
        {
            self.semantics.bind_node(ident, symbol);
        }
    }

    fn bind_type_parameter(&mut self, node: NodeIndex) {
        let Some(ident) = self.first_ident_child(node) else {
            return;
        };
        let name = self.arena.node_text(ident).to_string();
        let symbol = self.semantics.alloc(name, RawSymbolFlags::empty());
        self.semantics.get_mut(symbol).declarations.push(node);
        self.semantics.bind_node(node, symbol);
        self.semantics.bind_node(ident, symbol);
    }

    fn bind_import(&mut self, node: NodeIndex, scope_node: NodeIndex, file_name: &str) {
        let Some(module) = self.string_child_text(node) else {
            return;
        };
        let children: Vec<NodeIndex> = self.arena.children(node).to_vec();
        for child in children {
            match self.kind_of(child) {
                Some(SyntaxKind::Identifier) => {
                    // Default import: `import X from 'mod';`
                    let local = self.arena.node_text(child).to_string();
                    let symbol = self.alias_symbol(&local, &module, "default");
                    self.semantics.bind_node(child, symbol);
                    self.insert_scope(scope_node, local, symbol);
                    self.maybe_pending(symbol, &module, "default", file_name);
                }
                Some(SyntaxKind::NamespaceImport) => {
                    let Some(ident) = self.first_ident_child(child) else {
                        continue;
                    };
                    let local = self.arena.node_text(ident).to_string();
                    let symbol = self.alias_symbol(&local, &module, NAMESPACE_IMPORT);
                    self.semantics.bind_node(child, symbol);
                    self.semantics.bind_node(ident, symbol);
                    self.insert_scope(scope_node, local, symbol);
                }
                Some(SyntaxKind::ImportSpecifier) => {
                    let idents: Vec<NodeIndex> = self.arena.children(child).to_vec();
                    let Some(&first) = idents.first() else {
                        continue;
                    };
                    let imported = self.arena.node_text(first).to_string();
                    let local_node = *idents.last().unwrap_or(&first);
                    let local = self.arena.node_text(local_node).to_string();
                    let symbol = self.alias_symbol(&local, &module, &imported);
                    self.semantics.bind_node(child, symbol);
                    for ident in idents {
                        self.semantics.bind_node(ident, symbol);
                    }
                    self.insert_scope(scope_node, local, symbol);
                    self.maybe_pending(symbol, &module, &imported, file_name);
                }
                _ => {}
            }
        }
    }

    fn bind_export(&mut self, node: NodeIndex, scope_node: NodeIndex, file_name: &str) {
        let module = self.string_child_text(node);
        let children: Vec<NodeIndex> = self.arena.children(node).to_vec();
        for child in children {
            if self.kind_of(child) != Some(SyntaxKind::ExportSpecifier) {
                continue;
            }
            let idents: Vec<NodeIndex> = self.arena.children(child).to_vec();
            let Some(&first) = idents.first() else {
                continue;
            };
            let original = self.arena.node_text(first).to_string();
            let exported_node = *idents.last().unwrap_or(&first);
            let exported = self.arena.node_text(exported_node).to_string();

            let symbol = self.semantics.alloc(
                exported.clone(),
                RawSymbolFlags::ALIAS | RawSymbolFlags::EXPORTED,
            );
            self.semantics.bind_node(child, symbol);
            for ident in idents {
                self.semantics.bind_node(ident, symbol);
            }
            match &module {
                Some(module) => {
                    {
                        let raw = self.semantics.get_mut(symbol);
                        raw.import_module = Some(module.clone());
                        raw.import_name = Some(original.clone());
                    }
                    self.maybe_pending(symbol, module, &original, file_name);
                }
                None => {
                    self.pending_local.push((symbol, scope_node, original));
                }
            }
            self.semantics
                .add_module_export(file_name, exported, symbol);
        }
    }

    fn alias_symbol(&mut self, local: &str, module: &str, imported: &str) -> RawSymbolId {
        let symbol = self.semantics.alloc(local, RawSymbolFlags::ALIAS);
        let raw = self.semantics.get_mut(symbol);
        raw.import_module = Some(module.to_string());
        raw.import_name = Some(imported.to_string());
        symbol
    }

    fn maybe_pending(&mut self, symbol: RawSymbolId, module: &str, imported: &str, file: &str) {
        if module.starts_with("./") || module.starts_with("../") {
            self.pending_imports.push((
                symbol,
                module.to_string(),
                imported.to_string(),
                file.to_string(),
            ));
        }
    }

    fn insert_scope(&mut self, scope_node: NodeIndex, name: String, symbol: RawSymbolId) {
        self.scopes
            .entry(scope_node.0)
            .or_default()
            .insert(name, symbol);
    }

    fn resolve_pending(&mut self) {
        for (symbol, scope_node, name) in std::mem::take(&mut self.pending_local) {
            let target = self
                .scopes
                .get(&scope_node.0)
                .and_then(|scope| scope.get(&name))
                .copied();
            self.semantics.get_mut(symbol).alias_target = target;
        }
        for (symbol, specifier, imported, importer) in std::mem::take(&mut self.pending_imports) {
            let Some(target_file) = self.resolve_module(&specifier, &importer) else {
                continue;
            };
            let target = self
                .semantics
                .exports_of(&target_file)
                .and_then(|exports| {
                    exports
                        .iter()
                        .find(|(name, _)| *name == imported)
                        .map(|(_, symbol)| *symbol)
                });
            self.semantics.get_mut(symbol).alias_target = target;
        }
    }

    /// Resolve a relative specifier against the importing file.
    fn resolve_module(&self, specifier: &str, importer: &str) -> Option<String> {
        let mut parts: Vec<&str> = importer.split('/').collect();
        parts.pop();
        for segment in specifier.split('/') {
            match segment {
                "." => {}
                ".." => {
                    parts.pop();
                }
                other => parts.push(other),
            }
        }
        let joined = parts.join("/");
        for candidate in [joined.clone(), format!("{joined}.d.ts"), format!("{joined}.ts")] {
            if self.arena.file_by_name(&candidate).is_some() {
                return Some(candidate);
            }
        }
        None
    }

    /// Bind every unbound identifier that sits in a type-reference
    /// position, resolving through type parameters, enclosing namespace
    /// scopes and the file scope.
    fn resolve_references(&mut self) {
        for index in 0..self.arena.files().len() {
            let root = self.arena.file(FileId(index as u32)).root;
            let mut stack = vec![root];
            while let Some(current) = stack.pop() {
                for &child in self.arena.children(current) {
                    stack.push(child);
                }
                if self.kind_of(current) != Some(SyntaxKind::Identifier) {
                    continue;
                }
                if self.semantics.symbol_of(current).is_some() {
                    continue;
                }
                let Some(parent) = self.arena.parent(current) else {
                    continue;
                };
                let parent_kind = self.kind_of(parent);
                let is_first = self.arena.children(parent).first() == Some(&current);
                let in_reference_position = match parent_kind {
                    Some(SyntaxKind::TypeReference) | Some(SyntaxKind::QualifiedName) => is_first,
                    Some(SyntaxKind::HeritageClause) => true,
                    _ => false,
                };
                if !in_reference_position {
                    continue;
                }
                if let Some(symbol) = self.resolve_identifier(current) {
                    self.semantics.bind_node(current, symbol);
                }
            }
        }
    }

    fn resolve_identifier(&self, node: NodeIndex) -> Option<RawSymbolId> {
        let name = self.arena.node_text(node);
        let mut current = node;
        while let Some(parent) = self.arena.parent(current) {
            for &sibling in self.arena.children(parent) {
                if self.kind_of(sibling) == Some(SyntaxKind::TypeParameter)
                    && let Some(ident) = self.first_ident_child(sibling)
                    && self.arena.node_text(ident) == name
                {
                    return self.semantics.symbol_of(sibling);
                }
            }
            if matches!(
                self.kind_of(parent),
                Some(SyntaxKind::ModuleBlock) | Some(SyntaxKind::SourceFile)
            ) && let Some(scope) = self.scopes.get(&parent.0)
                && let Some(&symbol) = scope.get(name)
            {
                return Some(symbol);
            }
            current = parent;
        }
        // Globals declared in script files are visible from every file.
        for data in self.arena.files() {
            if !data.is_module
                && let Some(scope) = self.scopes.get(&data.root.0)
                && let Some(&symbol) = scope.get(name)
            {
                return Some(symbol);
            }
        }
        None
    }

    // Node helpers

    fn kind_of(&self, node: NodeIndex) -> Option<SyntaxKind> {
        self.arena.get(node).map(|n| n.kind)
    }

    fn first_ident_child(&self, node: NodeIndex) -> Option<NodeIndex> {
        self.arena
            .children(node)
            .iter()
            .copied()
            .find(|&child| self.kind_of(child) == Some(SyntaxKind::Identifier))
    }

    fn has_child_of_kind(&self, node: NodeIndex, kind: SyntaxKind) -> bool {
        self.arena
            .children(node)
            .iter()
            .any(|&child| self.kind_of(child) == Some(kind))
    }

    fn string_child_text(&self, node: NodeIndex) -> Option<String> {
        let literal = self
            .arena
            .children(node)
            .iter()
            .copied()
            .find(|&child| self.kind_of(child) == Some(SyntaxKind::StringLiteral))?;
        let text = self.arena.node_text(literal);
        if text.len() >= 2 {
            Some(text[1..text.len() - 1].to_string())
        } else {
            None
        }
    }
}
