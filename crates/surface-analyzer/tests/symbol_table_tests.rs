//! Symbol table behavior: alias following, memoization, merging,
//! ambient detection and release tags.

use surface_analyzer::{AstSymbolTable, ExportName, FollowOutcome};
use surface_common::{ReleaseTag, diagnostic_codes};
use surface_fixtures::{Fixture, FixtureProject};
use surface_syntax::{NodeIndex, RawSymbolId, SyntaxKind};

fn find_node(fixture: &Fixture, file: &str, kind: SyntaxKind, text_contains: &str) -> NodeIndex {
    let root = fixture.arena.file(fixture.file_id(file)).root;
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        for &child in fixture.arena.children(node) {
            stack.push(child);
        }
        if fixture.arena.get(node).map(|n| n.kind) == Some(kind)
            && fixture.arena.node_text(node).contains(text_contains)
        {
            return node;
        }
    }
    panic!("no {kind:?} node containing {text_contains:?} in {file}");
}

fn raw_symbol_of(fixture: &Fixture, file: &str, kind: SyntaxKind, text: &str) -> RawSymbolId {
    let node = find_node(fixture, file, kind, text);
    fixture.semantics.symbol_of(node).expect("node is bound")
}

fn follow(table: &mut AstSymbolTable<'_>, raw: RawSymbolId) -> FollowOutcome {
    table.follow_symbol(raw).expect("follow succeeds")
}

#[test]
fn test_alias_chain_reaches_definition() {
    let fixture = FixtureProject::new()
        .file("other.d.ts", "export class Item {\n    id: number;\n}\n")
        .file(
            "index.d.ts",
            "import { Item } from './other';\n\nexport class Holder {\n    item: Item;\n}\n",
        )
        .build();
    let mut table = AstSymbolTable::new(&fixture.arena, &fixture.semantics);

    let alias = raw_symbol_of(&fixture, "index.d.ts", SyntaxKind::ImportSpecifier, "Item");
    let definition = raw_symbol_of(&fixture, "other.d.ts", SyntaxKind::ClassDeclaration, "Item");

    let via_alias = follow(&mut table, alias);
    let direct = follow(&mut table, definition);
    assert_eq!(via_alias, direct);

    let FollowOutcome::Symbol(id) = via_alias else {
        panic!("expected a symbol");
    };
    let symbol = table.symbol(id);
    assert_eq!(symbol.local_name, "Item");
    assert!(symbol.ast_import.is_none());
    assert_eq!(symbol.declarations.len(), 1);
}

#[test]
fn test_external_imports_are_memoized_by_value() {
    let fixture = FixtureProject::new()
        .file(
            "a.d.ts",
            "import { Widget } from 'widgets';\nexport class A {\n    w: Widget;\n}\n",
        )
        .file(
            "index.d.ts",
            "import { Widget } from 'widgets';\nexport class B {\n    w: Widget;\n}\n",
        )
        .build();
    let mut table = AstSymbolTable::new(&fixture.arena, &fixture.semantics);

    let first = raw_symbol_of(&fixture, "a.d.ts", SyntaxKind::ImportSpecifier, "Widget");
    let second = raw_symbol_of(&fixture, "index.d.ts", SyntaxKind::ImportSpecifier, "Widget");
    assert_ne!(first, second);

    let a = follow(&mut table, first);
    let b = follow(&mut table, second);
    assert_eq!(a, b);

    let FollowOutcome::Symbol(id) = a else {
        panic!("expected a symbol");
    };
    let import = table.symbol(id).ast_import.as_ref().expect("external");
    assert_eq!(import.module_path, "widgets");
    assert_eq!(import.export_name, ExportName::Named("Widget".to_string()));
}

#[test]
fn test_namespace_import_capture() {
    let fixture = Fixture::parse(
        "import * as widgets from 'widgets';\n\nexport class A {\n    all: widgets.Registry;\n}\n",
    );
    let mut table = AstSymbolTable::new(&fixture.arena, &fixture.semantics);
    let alias = raw_symbol_of(&fixture, "index.d.ts", SyntaxKind::NamespaceImport, "widgets");
    let FollowOutcome::Symbol(id) = follow(&mut table, alias) else {
        panic!("expected a symbol");
    };
    let import = table.symbol(id).ast_import.as_ref().expect("external");
    assert_eq!(import.export_name, ExportName::Namespace);
    assert_eq!(table.symbol(id).local_name, "widgets");
}

#[test]
fn test_declaration_merging_yields_one_symbol() {
    let fixture = Fixture::parse(
        "export interface Config {\n    a: string;\n}\nexport interface Config {\n    b: number;\n}\n",
    );
    let mut table = AstSymbolTable::new(&fixture.arena, &fixture.semantics);
    let raw = raw_symbol_of(&fixture, "index.d.ts", SyntaxKind::InterfaceDeclaration, "a: string");
    let FollowOutcome::Symbol(id) = follow(&mut table, raw) else {
        panic!("expected a symbol");
    };
    assert_eq!(table.symbol(id).declarations.len(), 2);
}

#[test]
fn test_member_symbols_resolve_to_container_root() {
    let fixture = Fixture::parse("export class Widget {\n    id: number;\n}\n");
    let mut table = AstSymbolTable::new(&fixture.arena, &fixture.semantics);
    let class_raw = raw_symbol_of(&fixture, "index.d.ts", SyntaxKind::ClassDeclaration, "Widget");
    let member_raw =
        raw_symbol_of(&fixture, "index.d.ts", SyntaxKind::PropertySignature, "id: number");

    let FollowOutcome::Symbol(class_id) = follow(&mut table, class_raw) else {
        panic!("expected a symbol");
    };
    let FollowOutcome::Symbol(member_id) = follow(&mut table, member_raw) else {
        panic!("expected a symbol");
    };
    assert_eq!(table.symbol(member_id).parent, Some(class_id));
    assert_eq!(table.root_of(member_id), class_id);

    // The member declaration is recorded as a child of the class decl.
    let class_decl = table.symbol(class_id).declarations[0];
    let children = &table.declaration(class_decl).children;
    assert_eq!(children.len(), 1);
    assert_eq!(table.declaration(children[0]).symbol, member_id);
}

#[test]
fn test_type_parameters_are_excluded() {
    let fixture = Fixture::parse("export interface Box<T> {\n    value: T;\n}\n");
    let mut table = AstSymbolTable::new(&fixture.arena, &fixture.semantics);
    let tp = raw_symbol_of(&fixture, "index.d.ts", SyntaxKind::TypeParameter, "T");
    assert_eq!(follow(&mut table, tp), FollowOutcome::Excluded);
}

#[test]
fn test_ambient_detection() {
    let fixture = FixtureProject::new()
        .script_file("globals.d.ts", "declare class GlobalWidget {\n    id: number;\n}\n")
        .file(
            "index.d.ts",
            "declare class Helper {\n    x: number;\n}\nexport class A {\n    h: Helper;\n    g: GlobalWidget;\n}\n",
        )
        .build();
    let mut table = AstSymbolTable::new(&fixture.arena, &fixture.semantics);

    let global = raw_symbol_of(&fixture, "globals.d.ts", SyntaxKind::ClassDeclaration, "GlobalWidget");
    let FollowOutcome::Symbol(global_id) = follow(&mut table, global) else {
        panic!("expected a symbol");
    };
    assert!(table.symbol(global_id).is_ambient);

    // An unexported helper in a module file is not ambient.
    let helper =
        raw_symbol_of(&fixture, "index.d.ts", SyntaxKind::ClassDeclaration, "class Helper");
    let FollowOutcome::Symbol(helper_id) = follow(&mut table, helper) else {
        panic!("expected a symbol");
    };
    assert!(!table.symbol(helper_id).is_ambient);
}

#[test]
fn test_collect_referenced_skips_bodies_and_dedupes() {
    let fixture = Fixture::parse(
        "export class Helper {\n    x: number;\n}\nexport class Facade {\n    a: Helper;\n    b: Helper;\n    run(): void {\n        unrelated;\n    }\n}\n",
    );
    let mut table = AstSymbolTable::new(&fixture.arena, &fixture.semantics);
    let facade = raw_symbol_of(&fixture, "index.d.ts", SyntaxKind::ClassDeclaration, "Facade");
    let FollowOutcome::Symbol(facade_id) = follow(&mut table, facade) else {
        panic!("expected a symbol");
    };
    let decl = table.symbol(facade_id).declarations[0];
    let referenced = table.collect_referenced(decl).expect("collect succeeds");

    let helper =
        raw_symbol_of(&fixture, "index.d.ts", SyntaxKind::ClassDeclaration, "class Helper");
    let FollowOutcome::Symbol(helper_id) = follow(&mut table, helper) else {
        panic!("expected a symbol");
    };
    assert_eq!(referenced, vec![helper_id]);
}

#[test]
fn test_mutually_referencing_symbols_terminate() {
    let fixture = Fixture::parse(
        "export interface Ping {\n    other: Pong;\n}\nexport interface Pong {\n    other: Ping;\n}\n",
    );
    let mut table = AstSymbolTable::new(&fixture.arena, &fixture.semantics);
    let ping = raw_symbol_of(&fixture, "index.d.ts", SyntaxKind::InterfaceDeclaration, "Ping {");
    let pong = raw_symbol_of(&fixture, "index.d.ts", SyntaxKind::InterfaceDeclaration, "Pong {");

    let FollowOutcome::Symbol(ping_id) = follow(&mut table, ping) else {
        panic!("expected a symbol");
    };
    let FollowOutcome::Symbol(pong_id) = follow(&mut table, pong) else {
        panic!("expected a symbol");
    };
    let ping_decl = table.symbol(ping_id).declarations[0];
    let pong_decl = table.symbol(pong_id).declarations[0];
    assert_eq!(table.collect_referenced(ping_decl).unwrap(), vec![pong_id]);
    assert_eq!(table.collect_referenced(pong_decl).unwrap(), vec![ping_id]);
}

#[test]
fn test_unresolved_reference_is_warned_and_dropped() {
    let fixture = Fixture::parse("export interface Thing {\n    widget: MissingType;\n}\n");
    let mut table = AstSymbolTable::new(&fixture.arena, &fixture.semantics);
    let thing = raw_symbol_of(&fixture, "index.d.ts", SyntaxKind::InterfaceDeclaration, "Thing");
    let FollowOutcome::Symbol(id) = follow(&mut table, thing) else {
        panic!("expected a symbol");
    };
    let decl = table.symbol(id).declarations[0];
    let referenced = table.collect_referenced(decl).unwrap();
    assert!(referenced.is_empty());
    assert!(
        table
            .diagnostics()
            .iter()
            .any(|d| d.code == diagnostic_codes::UNRESOLVED_REFERENCE)
    );
}

#[test]
fn test_entry_point_lists_exports_in_order() {
    let fixture = Fixture::parse(
        "export class B {\n    x: number;\n}\nexport class A {\n    y: number;\n}\n",
    );
    let mut table = AstSymbolTable::new(&fixture.arena, &fixture.semantics);
    let entry_point = table.fetch_entry_point("index.d.ts").unwrap();
    let names: Vec<&str> = entry_point
        .exported_members
        .iter()
        .map(|(n, _)| n.as_str())
        .collect();
    assert_eq!(names, vec!["B", "A"]);
}

#[test]
fn test_unresolvable_reexport_is_skipped_with_warning() {
    let fixture = Fixture::parse(
        "export { Missing } from './nowhere';\nexport class A {\n    x: number;\n}\n",
    );
    let mut table = AstSymbolTable::new(&fixture.arena, &fixture.semantics);
    let entry_point = table.fetch_entry_point("index.d.ts").unwrap();
    let names: Vec<&str> = entry_point
        .exported_members
        .iter()
        .map(|(n, _)| n.as_str())
        .collect();
    assert_eq!(names, vec!["A"]);
    assert!(
        table
            .diagnostics()
            .iter()
            .any(|d| d.code == diagnostic_codes::UNSUPPORTED_EXPORT)
    );
}

#[test]
fn test_release_tag_inheritance_and_conflict() {
    let fixture = Fixture::parse(
        "/** @beta */\nexport class Widget {\n    id: number;\n}\n\n/** @beta */\nexport interface Config {\n    a: string;\n}\n\n/** @public */\nexport interface Config {\n    b: number;\n}\n",
    );
    let mut table = AstSymbolTable::new(&fixture.arena, &fixture.semantics);

    let widget = raw_symbol_of(&fixture, "index.d.ts", SyntaxKind::ClassDeclaration, "Widget");
    let FollowOutcome::Symbol(widget_id) = follow(&mut table, widget) else {
        panic!("expected a symbol");
    };
    assert_eq!(table.effective_release_tag(widget_id), ReleaseTag::Beta);

    // Untagged member inherits the container's tag.
    let member =
        raw_symbol_of(&fixture, "index.d.ts", SyntaxKind::PropertySignature, "id: number");
    let FollowOutcome::Symbol(member_id) = follow(&mut table, member) else {
        panic!("expected a symbol");
    };
    assert_eq!(table.effective_release_tag(member_id), ReleaseTag::Beta);

    // Merged declarations disagree: first wins, warning recorded.
    let config = raw_symbol_of(&fixture, "index.d.ts", SyntaxKind::InterfaceDeclaration, "a: string");
    let FollowOutcome::Symbol(config_id) = follow(&mut table, config) else {
        panic!("expected a symbol");
    };
    assert_eq!(table.effective_release_tag(config_id), ReleaseTag::Beta);
    assert!(
        table
            .diagnostics()
            .iter()
            .any(|d| d.code == diagnostic_codes::CONFLICTING_RELEASE_TAGS)
    );
}
