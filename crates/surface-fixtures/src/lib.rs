//! Test fixtures for the surface rollup engine.
//!
//! The engine consumes a [`NodeArena`] and [`SemanticTable`] produced by
//! an external semantic analysis provider. This crate stands in for that
//! provider in tests: it parses a small declaration-file subset and binds
//! symbols the same way the real provider contract specifies, so test
//! sources stay readable.
//!
//! This crate is test tooling; it is only ever a dev-dependency.

use surface_syntax::{FileId, NodeArena, SemanticTable};

mod lexer;
mod parser;
mod binder;

/// A multi-file fixture under construction.
#[derive(Default)]
pub struct FixtureProject {
    files: Vec<(String, String, bool)>,
}

impl FixtureProject {
    pub fn new() -> FixtureProject {
        FixtureProject::default()
    }

    /// Add a module file (has import/export semantics).
    pub fn file(mut self, name: impl Into<String>, source: impl Into<String>) -> FixtureProject {
        self.files.push((name.into(), source.into(), true));
        self
    }

    /// Add a global script file; its declarations are ambient.
    pub fn script_file(
        mut self,
        name: impl Into<String>,
        source: impl Into<String>,
    ) -> FixtureProject {
        self.files.push((name.into(), source.into(), false));
        self
    }

    /// Parse and bind every file. Panics on malformed fixture source.
    pub fn build(self) -> Fixture {
        let mut arena = NodeArena::new();
        for (name, source, is_module) in &self.files {
            let file = arena.add_file(name.clone(), source.clone());
            let lexed = lexer::lex(source);
            {
                let data = arena.file_mut(file);
                data.comments = lexed.comments.clone();
                data.reference_directives = lexed.directives.clone();
                data.is_module = *is_module;
            }
            let root = parser::parse(&mut arena, file, source, &lexed);
            arena.set_file_root(file, root);
        }
        let semantics = binder::bind(&arena);
        Fixture { arena, semantics }
    }
}

/// A built fixture: the two structures the engine consumes.
pub struct Fixture {
    pub arena: NodeArena,
    pub semantics: SemanticTable,
}

impl Fixture {
    /// Single-module convenience: the file is named `index.d.ts`.
    pub fn parse(source: &str) -> Fixture {
        FixtureProject::new().file("index.d.ts", source).build()
    }

    pub fn file_id(&self, name: &str) -> FileId {
        match self.arena.file_by_name(name) {
            Some(id) => id,
            None => panic!("fixture has no file named {name}"),
        }
    }

    pub fn source(&self, name: &str) -> &str {
        self.arena.file_text(self.file_id(name))
    }
}
