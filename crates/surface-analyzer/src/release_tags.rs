//! Release-tag derivation.
//!
//! A symbol's tag comes from the nearest preceding documentation comment
//! of its own declarations; merged declarations that disagree keep the
//! first tag encountered in declaration order (first-wins, recorded as a
//! warning). Symbols without a tag inherit from their container.

use surface_common::{ReleaseTag, diagnostic_codes};

use crate::table::{AstSymbolId, AstSymbolTable};

impl AstSymbolTable<'_> {
    /// The tag written on the symbol's own declarations, if any.
    pub fn declared_release_tag(&mut self, symbol: AstSymbolId) -> ReleaseTag {
        let mut found = ReleaseTag::None;
        let decls: Vec<_> = self.symbol(symbol).declarations.to_vec();
        for decl_id in decls {
            let node = self.declaration(decl_id).node;
            let Some(text) = self.arena().doc_comment_text(node) else {
                continue;
            };
            let Some(tag) = ReleaseTag::scan_doc_comment(text) else {
                continue;
            };
            if found == ReleaseTag::None {
                found = tag;
            } else if tag != found {
                let name = self.symbol(symbol).local_name.clone();
                self.warn_at(
                    node,
                    diagnostic_codes::CONFLICTING_RELEASE_TAGS,
                    format!(
                        "merged declarations of `{name}` disagree on the release tag; \
                         the first ({found:?}) wins"
                    ),
                );
            }
        }
        found
    }

    /// The tag used for inclusion decisions: the declared tag, else the
    /// container's effective tag (recursively), else untagged.
    pub fn effective_release_tag(&mut self, symbol: AstSymbolId) -> ReleaseTag {
        if let Some(&cached) = self.tag_cache.get(&symbol) {
            return cached;
        }
        let mut tag = self.declared_release_tag(symbol);
        if tag == ReleaseTag::None
            && let Some(parent) = self.symbol(symbol).parent
        {
            tag = self.effective_release_tag(parent);
        }
        self.tag_cache.insert(symbol, tag);
        tag
    }
}
