//! End-to-end rollup generation scenarios.

use surface_common::diagnostic_codes;
use surface_fixtures::{Fixture, FixtureProject};
use surface_rollup::{RollupGenerator, RollupKind};

fn generator(fixture: &Fixture) -> RollupGenerator<'_> {
    let mut generator = RollupGenerator::new(&fixture.arena, &fixture.semantics);
    generator.analyze("index.d.ts").expect("analysis succeeds");
    generator
}

#[test]
fn test_public_rollup_collapses_internal_helper() {
    let fixture = Fixture::parse(
        "/**\n * @public\n */\nexport class Foo {\n    bar(): _Bar;\n}\n\n/** @internal */\ndeclare class _Bar {\n    value: number;\n}\n",
    );
    let generator = generator(&fixture);

    let public = generator.emit(RollupKind::Public);
    assert_eq!(
        public,
        "/* Excluded from this release type: _Bar */\n\n\
         /**\n * @public\n */\nexport declare class Foo {\n    bar(): _Bar;\n}\n"
    );

    let internal = generator.emit(RollupKind::Internal);
    assert_eq!(
        internal,
        "/** @internal */\ndeclare class _Bar {\n    value: number;\n}\n\n\
         /**\n * @public\n */\nexport declare class Foo {\n    bar(): _Bar;\n}\n"
    );
}

#[test]
fn test_tier_monotonicity() {
    let fixture = Fixture::parse(
        "/** @internal */\nexport class A {\n    x: number;\n}\n/** @beta */\nexport class B {\n    y: number;\n}\n/** @public */\nexport class C {\n    z: number;\n}\n",
    );
    let generator = generator(&fixture);

    let outputs = [
        generator.emit(RollupKind::Public),
        generator.emit(RollupKind::Beta),
        generator.emit(RollupKind::Alpha),
        generator.emit(RollupKind::Internal),
    ];
    // Anything emitted in full at a stricter tier is emitted in full at
    // every looser tier.
    for (stricter, looser) in [(0, 1), (1, 2), (2, 3)] {
        for name in ["class A", "class B", "class C"] {
            if outputs[stricter].contains(name) {
                assert!(
                    outputs[looser].contains(name),
                    "{name} missing from looser tier"
                );
            }
        }
    }
    assert!(!outputs[0].contains("class A"));
    assert!(outputs[0].contains("Excluded from this release type: A"));
    assert!(!outputs[0].contains("class B"));
    assert!(outputs[1].contains("class B"));
    assert!(outputs[3].contains("class A"));
}

#[test]
fn test_reference_only_entry_is_renamed_on_collision() {
    let fixture = FixtureProject::new()
        .file("other.d.ts", "export class Item {\n    id: number;\n}\n")
        .file(
            "index.d.ts",
            "import { Item as ImportedItem } from './other';\n\nexport class Item {\n    parent: ImportedItem;\n}\n",
        )
        .build();
    let generator = generator(&fixture);

    let output = generator.emit(RollupKind::Public);
    assert_eq!(
        output,
        "export declare class Item {\n    parent: Item_2;\n}\n\n\
         declare class Item_2 {\n    id: number;\n}\n"
    );

    // Unique names are pairwise distinct.
    let mut names: Vec<&str> = generator
        .entries()
        .iter()
        .map(|e| e.emitted_name())
        .collect();
    names.sort_unstable();
    let len_before = names.len();
    names.dedup();
    assert_eq!(names.len(), len_before);
}

#[test]
fn test_external_reexport_becomes_import_line() {
    let fixture = Fixture::parse("export { Y as X } from 'widgets';\n");
    let generator = generator(&fixture);
    let output = generator.emit(RollupKind::Public);
    assert_eq!(output, "import { Y as X } from 'widgets';\n");
}

#[test]
fn test_external_reference_import_shapes() {
    let fixture = Fixture::parse(
        "/// <reference lib=\"es2020\" />\nimport { Widget } from 'widgets';\nimport * as logging from 'logkit';\n\nexport const VERSION: string;\nexport function render(target: Widget): void {\n    logging.log(target);\n}\n",
    );
    let generator = generator(&fixture);
    let output = generator.emit(RollupKind::Public);

    // `logging` is only used inside the function body, which is not part
    // of the type surface, so no import line is emitted for it.
    assert_eq!(
        output,
        "import { Widget } from 'widgets';\n\n\
         /// <reference lib=\"es2020\" />\n\n\
         export declare const VERSION: string;\n\n\
         export declare function render(target: Widget): void ;\n"
    );
}

#[test]
fn test_enum_member_collapse_keeps_list_formatting() {
    let fixture = Fixture::parse(
        "export enum Color {\n    Red = 1,\n    /** @beta */\n    Green = 2,\n    Blue = 3\n}\n",
    );
    let generator = generator(&fixture);

    let public = generator.emit(RollupKind::Public);
    assert_eq!(
        public,
        "export declare enum Color {\n    Red = 1,\n    /* Excluded from this release type: Green */\n    Blue = 3\n}\n"
    );
    assert!(!public.contains(",,"));

    let beta = generator.emit(RollupKind::Beta);
    assert!(beta.contains("Green = 2,"));
}

#[test]
fn test_namespace_members_keep_export_and_trim_by_tag() {
    let fixture = Fixture::parse(
        "export namespace Utils {\n    export function parse(text: string): number;\n    /** @internal */\n    export const SECRET: string;\n}\n",
    );
    let generator = generator(&fixture);

    let public = generator.emit(RollupKind::Public);
    assert_eq!(
        public,
        "export declare namespace Utils {\n    export function parse(text: string): number;\n    /* Excluded from this release type: SECRET */\n}\n"
    );

    let internal = generator.emit(RollupKind::Internal);
    assert_eq!(
        internal,
        "export declare namespace Utils {\n    export function parse(text: string): number;\n    /** @internal */\n    export const SECRET: string;\n}\n"
    );
}

#[test]
fn test_duplicate_exported_name_is_fatal() {
    let fixture = Fixture::parse(
        "export class A {\n    x: number;\n}\nclass B {\n    y: number;\n}\nexport { B as A };\n",
    );
    let mut generator = RollupGenerator::new(&fixture.arena, &fixture.semantics);
    let result = generator.analyze("index.d.ts");
    assert!(result.is_err());
    let message = format!("{:#}", result.unwrap_err());
    assert!(message.contains("same name"), "unexpected error: {message}");
}

#[test]
fn test_ambient_symbols_are_filtered_with_warning() {
    let fixture = FixtureProject::new()
        .script_file("globals.d.ts", "declare class GlobalWidget {\n    id: number;\n}\n")
        .file(
            "index.d.ts",
            "export class Holder {\n    widget: GlobalWidget;\n}\n",
        )
        .build();
    let generator = generator(&fixture);
    let output = generator.emit(RollupKind::Internal);

    // The global stays referenced by name but is never declared in the
    // rollup.
    assert!(output.contains("widget: GlobalWidget;"));
    assert!(!output.contains("declare class GlobalWidget"));
    assert!(
        generator
            .diagnostics()
            .iter()
            .any(|d| d.code == diagnostic_codes::AMBIENT_SYMBOL_SKIPPED)
    );
}

#[test]
fn test_default_entry_point_export_is_skipped() {
    let fixture = Fixture::parse(
        "class A {\n    x: number;\n}\nexport { A as default };\n",
    );
    let generator = generator(&fixture);
    assert_eq!(generator.emit(RollupKind::Public), "");
    assert!(
        generator
            .diagnostics()
            .iter()
            .any(|d| d.code == diagnostic_codes::UNSUPPORTED_EXPORT)
    );
}

#[test]
fn test_merged_declarations_emit_every_site() {
    let fixture = Fixture::parse(
        "export interface Config {\n    a: string;\n}\nexport interface Config {\n    b: number;\n}\n",
    );
    let generator = generator(&fixture);
    let output = generator.emit(RollupKind::Public);
    assert_eq!(
        output,
        "export interface Config {\n    a: string;\n}\n\n\
         export interface Config {\n    b: number;\n}\n"
    );
    // One entry despite two declaration sites.
    assert_eq!(generator.entries().len(), 1);
}

#[test]
fn test_unresolved_reference_warns_but_emits() {
    let fixture = Fixture::parse("export interface Thing {\n    widget: MissingType;\n}\n");
    let generator = generator(&fixture);
    let output = generator.emit(RollupKind::Public);
    assert!(output.contains("widget: MissingType;"));
    assert!(
        generator
            .diagnostics()
            .iter()
            .any(|d| d.code == diagnostic_codes::UNRESOLVED_REFERENCE)
    );
}

#[test]
fn test_method_body_is_replaced_with_terminator() {
    let fixture = Fixture::parse(
        "export class Calc {\n    add(n: number): number {\n        return n;\n    }\n    total: number;\n}\n",
    );
    let generator = generator(&fixture);
    let output = generator.emit(RollupKind::Public);
    assert_eq!(
        output,
        "export declare class Calc {\n    add(n: number): number ;\n    total: number;\n}\n"
    );
}

#[test]
fn test_cycles_terminate_with_one_entry_each() {
    let fixture = Fixture::parse(
        "export interface Ping {\n    other: Pong;\n}\nexport interface Pong {\n    other: Ping;\n}\n",
    );
    let generator = generator(&fixture);
    assert_eq!(generator.entries().len(), 2);
    let output = generator.emit(RollupKind::Public);
    assert!(output.contains("export interface Ping"));
    assert!(output.contains("export interface Pong"));
}

#[test]
fn test_internal_names_interleave_in_output_order() {
    let fixture = Fixture::parse(
        "export class Banana {\n    b: _Apple;\n}\nexport class Apple {\n    a: number;\n}\ndeclare class _Apple {\n    hidden: number;\n}\n",
    );
    let generator = generator(&fixture);
    let output = generator.emit(RollupKind::Internal);

    let apple = output.find("class Apple").expect("Apple emitted");
    let underscore_apple = output.find("class _Apple").expect("_Apple emitted");
    let banana = output.find("class Banana").expect("Banana emitted");
    assert!(apple < underscore_apple, "Apple sorts before _Apple");
    assert!(underscore_apple < banana, "_Apple sorts before Banana");
}
