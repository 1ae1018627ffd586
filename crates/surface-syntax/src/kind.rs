//! Syntax node kinds.
//!
//! A closed enumeration of the declaration-file grammar subset the engine
//! operates on. The rewriter dispatches exhaustively on these kinds, so
//! adding a kind is a compile-time-checked requirement for every consumer.

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SyntaxKind {
    SourceFile,

    // Import/export shapes
    ImportDeclaration,
    ImportSpecifier,
    NamespaceImport,
    ExportDeclaration,
    ExportSpecifier,

    // Declarations
    InterfaceDeclaration,
    ClassDeclaration,
    EnumDeclaration,
    TypeAliasDeclaration,
    FunctionDeclaration,
    VariableStatement,
    ModuleDeclaration,

    // Members
    PropertySignature,
    MethodSignature,
    Constructor,
    EnumMember,
    Parameter,
    TypeParameter,
    HeritageClause,

    // Type nodes
    TypeReference,
    UnionType,
    ArrayType,
    TypeLiteral,
    KeywordType,
    QualifiedName,

    // Bodies
    Block,
    ModuleBlock,

    // Terminals
    Identifier,
    StringLiteral,
    NumericLiteral,

    // Modifier keywords
    ExportKeyword,
    DeclareKeyword,
    DefaultKeyword,
    ReadonlyKeyword,

    // Declaration keywords
    InterfaceKeyword,
    ClassKeyword,
    EnumKeyword,
    TypeKeyword,
    FunctionKeyword,
    NamespaceKeyword,
    ConstKeyword,
    LetKeyword,
    VarKeyword,

    // Punctuation
    CommaToken,
}

impl SyntaxKind {
    /// Statement-level declarations: the emission units of a rollup.
    pub fn is_declaration(self) -> bool {
        matches!(
            self,
            SyntaxKind::InterfaceDeclaration
                | SyntaxKind::ClassDeclaration
                | SyntaxKind::EnumDeclaration
                | SyntaxKind::TypeAliasDeclaration
                | SyntaxKind::FunctionDeclaration
                | SyntaxKind::VariableStatement
                | SyntaxKind::ModuleDeclaration
        )
    }

    /// Container members that carry their own release tag.
    pub fn is_member_declaration(self) -> bool {
        matches!(
            self,
            SyntaxKind::PropertySignature
                | SyntaxKind::MethodSignature
                | SyntaxKind::Constructor
                | SyntaxKind::EnumMember
        )
    }

    /// Modifiers that are blanked during rewriting; the export/declare
    /// decision is re-derived centrally.
    pub fn is_modifier_keyword(self) -> bool {
        matches!(
            self,
            SyntaxKind::ExportKeyword | SyntaxKind::DeclareKeyword | SyntaxKind::DefaultKeyword
        )
    }

    /// The keyword token that introduces a declaration; the re-derived
    /// header is inserted immediately before it.
    pub fn is_declaration_keyword(self) -> bool {
        matches!(
            self,
            SyntaxKind::InterfaceKeyword
                | SyntaxKind::ClassKeyword
                | SyntaxKind::EnumKeyword
                | SyntaxKind::TypeKeyword
                | SyntaxKind::FunctionKeyword
                | SyntaxKind::NamespaceKeyword
                | SyntaxKind::ConstKeyword
                | SyntaxKind::LetKeyword
                | SyntaxKind::VarKeyword
        )
    }

    /// Executable statement bodies; their contents never matter for a
    /// declaration's type surface.
    pub fn is_body(self) -> bool {
        self == SyntaxKind::Block
    }

    /// Pure syntactic artifacts: these never become emission units and are
    /// excluded from the symbol table.
    pub fn is_syntactic_artifact(self) -> bool {
        matches!(self, SyntaxKind::TypeParameter | SyntaxKind::TypeLiteral)
    }

    /// Pure punctuation tokens (list separators).
    pub fn is_punctuation(self) -> bool {
        self == SyntaxKind::CommaToken
    }
}
