//! Raw semantic model.
//!
//! The provider's binding results, consumed read-only by the symbol
//! table: one `RawSymbol` per bound name, a node-to-symbol map covering
//! declaration names and references alike, and per-module export maps.

use bitflags::bitflags;
use rustc_hash::FxHashMap;

use crate::arena::NodeIndex;

/// `import_name` value marking a namespace import (`import * as ns`).
pub const NAMESPACE_IMPORT: &str = "*";

bitflags! {
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
    pub struct RawSymbolFlags: u32 {
        /// The symbol is an alias (import or export specifier) for
        /// another symbol.
        const ALIAS = 1 << 0;
        /// The declaration site carries an export modifier, or the
        /// symbol is re-exported by name.
        const EXPORTED = 1 << 1;
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RawSymbolId(pub u32);

/// A symbol as bound by the provider, before alias following.
#[derive(Debug, Clone)]
pub struct RawSymbol {
    pub name: String,
    pub flags: RawSymbolFlags,
    /// Declaration sites, in binding order. Merged declarations (e.g. an
    /// interface declared twice) all appear here.
    pub declarations: Vec<NodeIndex>,
    /// Enclosing container symbol for members and namespace-nested
    /// declarations.
    pub parent: Option<RawSymbolId>,
    /// For aliases whose target resolves within the project.
    pub alias_target: Option<RawSymbolId>,
    /// Module specifier for aliases created by an import or re-export.
    pub import_module: Option<String>,
    /// Name imported from `import_module`; [`NAMESPACE_IMPORT`] for
    /// namespace imports.
    pub import_name: Option<String>,
}

impl RawSymbol {
    pub fn is_alias(&self) -> bool {
        self.flags.contains(RawSymbolFlags::ALIAS)
    }

    pub fn is_exported(&self) -> bool {
        self.flags.contains(RawSymbolFlags::EXPORTED)
    }
}

#[derive(Debug, Default)]
pub struct SemanticTable {
    symbols: Vec<RawSymbol>,
    /// Node index -> symbol, for declaration names and references alike.
    node_symbols: FxHashMap<u32, RawSymbolId>,
    /// File name -> exported (name, symbol) pairs in declaration order.
    module_exports: FxHashMap<String, Vec<(String, RawSymbolId)>>,
}

impl SemanticTable {
    pub fn new() -> SemanticTable {
        SemanticTable::default()
    }

    pub fn alloc(&mut self, name: impl Into<String>, flags: RawSymbolFlags) -> RawSymbolId {
        let id = RawSymbolId(self.symbols.len() as u32);
        self.symbols.push(RawSymbol {
            name: name.into(),
            flags,
            declarations: Vec::new(),
            parent: None,
            alias_target: None,
            import_module: None,
            import_name: None,
        });
        id
    }

    #[inline]
    pub fn get(&self, id: RawSymbolId) -> &RawSymbol {
        &self.symbols[id.0 as usize]
    }

    #[inline]
    pub fn get_mut(&mut self, id: RawSymbolId) -> &mut RawSymbol {
        &mut self.symbols[id.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Bind a node (declaration name or reference) to a symbol.
    pub fn bind_node(&mut self, node: NodeIndex, symbol: RawSymbolId) {
        self.node_symbols.insert(node.0, symbol);
    }

    /// The symbol bound to a node, if any.
    pub fn symbol_of(&self, node: NodeIndex) -> Option<RawSymbolId> {
        self.node_symbols.get(&node.0).copied()
    }

    pub fn add_module_export(
        &mut self,
        file_name: impl Into<String>,
        exported_name: impl Into<String>,
        symbol: RawSymbolId,
    ) {
        self.module_exports
            .entry(file_name.into())
            .or_default()
            .push((exported_name.into(), symbol));
    }

    /// Exported members of a module, in declaration order.
    pub fn exports_of(&self, file_name: &str) -> Option<&[(String, RawSymbolId)]> {
        self.module_exports.get(file_name).map(|v| v.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alias_flags() {
        let mut table = SemanticTable::new();
        let id = table.alloc("Widget", RawSymbolFlags::ALIAS | RawSymbolFlags::EXPORTED);
        assert!(table.get(id).is_alias());
        assert!(table.get(id).is_exported());

        let plain = table.alloc("Helper", RawSymbolFlags::empty());
        assert!(!table.get(plain).is_alias());
    }

    #[test]
    fn test_module_exports_preserve_order() {
        let mut table = SemanticTable::new();
        let a = table.alloc("A", RawSymbolFlags::EXPORTED);
        let b = table.alloc("B", RawSymbolFlags::EXPORTED);
        table.add_module_export("index.d.ts", "B", b);
        table.add_module_export("index.d.ts", "A", a);

        let exports = table.exports_of("index.d.ts").unwrap();
        assert_eq!(exports[0].0, "B");
        assert_eq!(exports[1].0, "A");
    }
}
