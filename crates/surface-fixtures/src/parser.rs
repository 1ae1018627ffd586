//! Recursive-descent parser for the fixture declaration subset.
//!
//! Builds `NodeArena` nodes with exact byte spans. Token-level children
//! are materialized for everything the rewriter dispatches on: modifier
//! and declaration keywords, identifiers, enum list commas, and statement
//! bodies. Declaration spans include their leading doc comment. Panics on
//! malformed fixture source; this is a test harness.

use surface_common::{CommentRange, comments};
use surface_syntax::{FileId, NodeArena, NodeIndex, SyntaxKind};

use crate::lexer::{LexOutput, Token, TokenKind};

pub(crate) fn parse(arena: &mut NodeArena, file: FileId, src: &str, lexed: &LexOutput) -> NodeIndex {
    let mut parser = Parser {
        arena,
        file,
        src,
        tokens: &lexed.tokens,
        comments: &lexed.comments,
        pos: 0,
    };
    parser.parse_source_file()
}

struct Parser<'a> {
    arena: &'a mut NodeArena,
    file: FileId,
    src: &'a str,
    tokens: &'a [Token],
    comments: &'a [CommentRange],
    pos: usize,
}

impl Parser<'_> {
    // Token access

    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<Token> {
        self.tokens.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Token {
        let token = match self.peek() {
            Some(t) => t,
            None => panic!("fixture source ended unexpectedly"),
        };
        self.pos += 1;
        token
    }

    fn at_punct(&self, ch: u8) -> bool {
        matches!(self.peek(), Some(t) if t.kind == TokenKind::Punct(ch))
    }

    fn punct_at(&self, offset: usize, ch: u8) -> bool {
        matches!(self.peek_at(offset), Some(t) if t.kind == TokenKind::Punct(ch))
    }

    fn eat_punct(&mut self, ch: u8) -> Option<Token> {
        if self.at_punct(ch) {
            Some(self.bump())
        } else {
            None
        }
    }

    fn expect_punct(&mut self, ch: u8) -> Token {
        match self.eat_punct(ch) {
            Some(t) => t,
            None => panic!(
                "expected `{}` at token {:?}",
                ch as char,
                self.peek().map(|t| t.text(self.src).to_string())
            ),
        }
    }

    fn at_kw(&self, text: &str) -> bool {
        matches!(self.peek(), Some(t) if t.kind == TokenKind::Ident && t.text(self.src) == text)
    }

    fn kw_at(&self, offset: usize, text: &str) -> bool {
        matches!(self.peek_at(offset), Some(t) if t.kind == TokenKind::Ident && t.text(self.src) == text)
    }

    fn expect_ident(&mut self) -> Token {
        let token = self.bump();
        if token.kind != TokenKind::Ident {
            panic!("expected identifier, found `{}`", token.text(self.src));
        }
        token
    }

    // Node construction

    fn token_node(&mut self, kind: SyntaxKind, token: Token) -> NodeIndex {
        self.arena.add_node(self.file, kind, token.start, token.end)
    }

    fn ident_node(&mut self, token: Token) -> NodeIndex {
        self.token_node(SyntaxKind::Identifier, token)
    }

    fn finish(&mut self, kind: SyntaxKind, start: u32, end: u32, children: Vec<NodeIndex>) -> NodeIndex {
        let node = self.arena.add_node(self.file, kind, start, end);
        for child in children {
            self.arena.add_child(node, child);
        }
        node
    }

    fn node_end(&self, node: NodeIndex) -> u32 {
        self.arena.get(node).map(|n| n.end).unwrap_or(0)
    }

    /// Declaration spans start at their attached doc comment, if any.
    fn start_with_doc(&self, token_start: u32) -> u32 {
        match comments::nearest_doc_comment(self.comments, token_start, self.src) {
            Some(comment) => comment.pos,
            None => token_start,
        }
    }

    // Grammar

    fn parse_source_file(&mut self) -> NodeIndex {
        let mut statements = Vec::new();
        while self.peek().is_some() {
            statements.push(self.parse_statement());
        }
        self.finish(
            SyntaxKind::SourceFile,
            0,
            self.src.len() as u32,
            statements,
        )
    }

    fn parse_statement(&mut self) -> NodeIndex {
        if self.at_kw("import") {
            return self.parse_import();
        }
        if self.at_kw("export") && self.punct_at(1, b'{') {
            return self.parse_export_declaration();
        }
        self.parse_declaration()
    }

    fn parse_import(&mut self) -> NodeIndex {
        let import_kw = self.bump();
        let mut children = Vec::new();
        if self.at_punct(b'*') {
            let star = self.bump();
            let as_kw = self.bump();
            debug_assert_eq!(as_kw.text(self.src), "as");
            let name = self.expect_ident();
            let ident = self.ident_node(name);
            let ns = self.finish(
                SyntaxKind::NamespaceImport,
                star.start,
                name.end,
                vec![ident],
            );
            children.push(ns);
        } else if self.at_punct(b'{') {
            self.bump();
            while !self.at_punct(b'}') {
                children.push(self.parse_import_specifier(SyntaxKind::ImportSpecifier));
                if self.eat_punct(b',').is_none() {
                    break;
                }
            }
            self.expect_punct(b'}');
        } else {
            let name = self.expect_ident();
            let ident = self.ident_node(name);
            children.push(ident);
        }
        let from_kw = self.bump();
        debug_assert_eq!(from_kw.text(self.src), "from");
        let module = self.bump();
        debug_assert_eq!(module.kind, TokenKind::Str);
        children.push(self.token_node(SyntaxKind::StringLiteral, module));
        let semi = self.expect_punct(b';');
        self.finish(
            SyntaxKind::ImportDeclaration,
            import_kw.start,
            semi.end,
            children,
        )
    }

    fn parse_import_specifier(&mut self, kind: SyntaxKind) -> NodeIndex {
        let first = self.expect_ident();
        let first_node = self.ident_node(first);
        if self.at_kw("as") {
            self.bump();
            let second = self.expect_ident();
            let second_node = self.ident_node(second);
            self.finish(kind, first.start, second.end, vec![first_node, second_node])
        } else {
            self.finish(kind, first.start, first.end, vec![first_node])
        }
    }

    fn parse_export_declaration(&mut self) -> NodeIndex {
        let export_kw = self.bump();
        self.expect_punct(b'{');
        let mut children = Vec::new();
        while !self.at_punct(b'}') {
            children.push(self.parse_import_specifier(SyntaxKind::ExportSpecifier));
            if self.eat_punct(b',').is_none() {
                break;
            }
        }
        self.expect_punct(b'}');
        if self.at_kw("from") {
            self.bump();
            let module = self.bump();
            debug_assert_eq!(module.kind, TokenKind::Str);
            children.push(self.token_node(SyntaxKind::StringLiteral, module));
        }
        let semi = self.expect_punct(b';');
        self.finish(
            SyntaxKind::ExportDeclaration,
            export_kw.start,
            semi.end,
            children,
        )
    }

    fn parse_declaration(&mut self) -> NodeIndex {
        let first = match self.peek() {
            Some(t) => t,
            None => panic!("expected declaration"),
        };
        let start = self.start_with_doc(first.start);
        let mut modifiers = Vec::new();
        loop {
            if self.at_kw("export") {
                let t = self.bump();
                modifiers.push(self.token_node(SyntaxKind::ExportKeyword, t));
            } else if self.at_kw("declare") {
                let t = self.bump();
                modifiers.push(self.token_node(SyntaxKind::DeclareKeyword, t));
            } else if self.at_kw("default") {
                let t = self.bump();
                modifiers.push(self.token_node(SyntaxKind::DefaultKeyword, t));
            } else {
                break;
            }
        }
        if self.at_kw("interface") {
            self.parse_interface(start, modifiers)
        } else if self.at_kw("class") {
            self.parse_class(start, modifiers)
        } else if self.at_kw("enum") {
            self.parse_enum(start, modifiers)
        } else if self.at_kw("const") && self.kw_at(1, "enum") {
            let t = self.bump();
            modifiers.push(self.token_node(SyntaxKind::ConstKeyword, t));
            self.parse_enum(start, modifiers)
        } else if self.at_kw("const") || self.at_kw("let") || self.at_kw("var") {
            self.parse_variable(start, modifiers)
        } else if self.at_kw("type") {
            self.parse_type_alias(start, modifiers)
        } else if self.at_kw("function") {
            self.parse_function(start, modifiers)
        } else if self.at_kw("namespace") {
            self.parse_namespace(start, modifiers)
        } else {
            panic!(
                "unsupported declaration starting at `{}`",
                first.text(self.src)
            );
        }
    }

    fn parse_interface(&mut self, start: u32, mut children: Vec<NodeIndex>) -> NodeIndex {
        let kw = self.bump();
        children.push(self.token_node(SyntaxKind::InterfaceKeyword, kw));
        let name = self.expect_ident();
        let ident = self.ident_node(name);
        children.push(ident);
        if self.at_punct(b'<') {
            let params = self.parse_type_parameters();
            children.extend(params);
        }
        while self.at_kw("extends") || self.at_kw("implements") {
            children.push(self.parse_heritage_clause());
        }
        self.expect_punct(b'{');
        while !self.at_punct(b'}') {
            children.push(self.parse_signature_member(false));
        }
        let close = self.expect_punct(b'}');
        self.finish(SyntaxKind::InterfaceDeclaration, start, close.end, children)
    }

    fn parse_class(&mut self, start: u32, mut children: Vec<NodeIndex>) -> NodeIndex {
        let kw = self.bump();
        children.push(self.token_node(SyntaxKind::ClassKeyword, kw));
        let name = self.expect_ident();
        let ident = self.ident_node(name);
        children.push(ident);
        if self.at_punct(b'<') {
            let params = self.parse_type_parameters();
            children.extend(params);
        }
        while self.at_kw("extends") || self.at_kw("implements") {
            children.push(self.parse_heritage_clause());
        }
        self.expect_punct(b'{');
        while !self.at_punct(b'}') {
            children.push(self.parse_signature_member(true));
        }
        let close = self.expect_punct(b'}');
        self.finish(SyntaxKind::ClassDeclaration, start, close.end, children)
    }

    fn parse_type_parameters(&mut self) -> Vec<NodeIndex> {
        self.expect_punct(b'<');
        let mut params = Vec::new();
        loop {
            let name = self.expect_ident();
            let ident = self.ident_node(name);
            let mut children = vec![ident];
            let mut end = name.end;
            if self.at_kw("extends") {
                self.bump();
                let constraint = self.parse_type();
                end = self.node_end(constraint);
                children.push(constraint);
            }
            params.push(self.finish(SyntaxKind::TypeParameter, name.start, end, children));
            if self.eat_punct(b',').is_none() {
                break;
            }
        }
        self.expect_punct(b'>');
        params
    }

    fn parse_heritage_clause(&mut self) -> NodeIndex {
        let kw = self.bump();
        let mut items = Vec::new();
        loop {
            items.push(self.parse_type_reference());
            if self.eat_punct(b',').is_none() {
                break;
            }
        }
        let end = items.last().map(|&n| self.node_end(n)).unwrap_or(kw.end);
        self.finish(SyntaxKind::HeritageClause, kw.start, end, items)
    }

    fn parse_signature_member(&mut self, class_context: bool) -> NodeIndex {
        let first = match self.peek() {
            Some(t) => t,
            None => panic!("unterminated member list"),
        };
        let start = self.start_with_doc(first.start);
        let mut children = Vec::new();

        if class_context && self.at_kw("constructor") {
            self.bump();
            children.extend(self.parse_parameters());
            let mut end = self.tokens[self.pos - 1].end;
            if self.at_punct(b'{') {
                let block = self.parse_block();
                end = self.node_end(block);
                children.push(block);
            } else if let Some(semi) = self.eat_punct(b';') {
                end = semi.end;
            }
            return self.finish(SyntaxKind::Constructor, start, end, children);
        }

        if self.at_kw("readonly") && matches!(self.peek_at(1), Some(t) if t.kind == TokenKind::Ident)
        {
            let t = self.bump();
            children.push(self.token_node(SyntaxKind::ReadonlyKeyword, t));
        }
        let name = self.expect_ident();
        let ident = self.ident_node(name);
        children.push(ident);

        if self.at_punct(b'(') {
            children.extend(self.parse_parameters());
            let mut end = self.tokens[self.pos - 1].end;
            if self.eat_punct(b':').is_some() {
                let return_type = self.parse_type();
                end = self.node_end(return_type);
                children.push(return_type);
            }
            if self.at_punct(b'{') {
                let block = self.parse_block();
                end = self.node_end(block);
                children.push(block);
            } else if let Some(semi) = self.eat_punct(b';') {
                end = semi.end;
            }
            self.finish(SyntaxKind::MethodSignature, start, end, children)
        } else {
            self.eat_punct(b'?');
            self.expect_punct(b':');
            let member_type = self.parse_type();
            let mut end = self.node_end(member_type);
            children.push(member_type);
            if let Some(semi) = self.eat_punct(b';') {
                end = semi.end;
            }
            self.finish(SyntaxKind::PropertySignature, start, end, children)
        }
    }

    fn parse_parameters(&mut self) -> Vec<NodeIndex> {
        self.expect_punct(b'(');
        let mut params = Vec::new();
        while !self.at_punct(b')') {
            let name = self.expect_ident();
            let ident = self.ident_node(name);
            self.eat_punct(b'?');
            self.expect_punct(b':');
            let param_type = self.parse_type();
            let end = self.node_end(param_type);
            params.push(self.finish(
                SyntaxKind::Parameter,
                name.start,
                end,
                vec![ident, param_type],
            ));
            if self.eat_punct(b',').is_none() {
                break;
            }
        }
        self.expect_punct(b')');
        params
    }

    fn parse_block(&mut self) -> NodeIndex {
        let open = self.expect_punct(b'{');
        let mut depth = 1usize;
        let mut end = open.end;
        while depth > 0 {
            let token = self.bump();
            match token.kind {
                TokenKind::Punct(b'{') => depth += 1,
                TokenKind::Punct(b'}') => depth -= 1,
                _ => {}
            }
            end = token.end;
        }
        self.finish(SyntaxKind::Block, open.start, end, Vec::new())
    }

    fn parse_enum(&mut self, start: u32, mut children: Vec<NodeIndex>) -> NodeIndex {
        let kw = self.bump();
        children.push(self.token_node(SyntaxKind::EnumKeyword, kw));
        let name = self.expect_ident();
        let ident = self.ident_node(name);
        children.push(ident);
        self.expect_punct(b'{');
        while !self.at_punct(b'}') {
            let first = match self.peek() {
                Some(t) => t,
                None => panic!("unterminated enum body"),
            };
            let member_start = self.start_with_doc(first.start);
            let member_name = self.expect_ident();
            let member_ident = self.ident_node(member_name);
            let mut member_children = vec![member_ident];
            let mut end = member_name.end;
            if self.eat_punct(b'=').is_some() {
                let value = self.bump();
                let value_kind = match value.kind {
                    TokenKind::Str => SyntaxKind::StringLiteral,
                    _ => SyntaxKind::NumericLiteral,
                };
                member_children.push(self.token_node(value_kind, value));
                end = value.end;
            }
            children.push(self.finish(
                SyntaxKind::EnumMember,
                member_start,
                end,
                member_children,
            ));
            if self.at_punct(b',') {
                let comma = self.bump();
                children.push(self.token_node(SyntaxKind::CommaToken, comma));
            }
        }
        let close = self.expect_punct(b'}');
        self.finish(SyntaxKind::EnumDeclaration, start, close.end, children)
    }

    fn parse_variable(&mut self, start: u32, mut children: Vec<NodeIndex>) -> NodeIndex {
        let kw = self.bump();
        let kw_kind = match kw.text(self.src) {
            "const" => SyntaxKind::ConstKeyword,
            "let" => SyntaxKind::LetKeyword,
            _ => SyntaxKind::VarKeyword,
        };
        children.push(self.token_node(kw_kind, kw));
        let name = self.expect_ident();
        let ident = self.ident_node(name);
        children.push(ident);
        self.expect_punct(b':');
        let var_type = self.parse_type();
        children.push(var_type);
        let semi = self.expect_punct(b';');
        self.finish(SyntaxKind::VariableStatement, start, semi.end, children)
    }

    fn parse_type_alias(&mut self, start: u32, mut children: Vec<NodeIndex>) -> NodeIndex {
        let kw = self.bump();
        children.push(self.token_node(SyntaxKind::TypeKeyword, kw));
        let name = self.expect_ident();
        let ident = self.ident_node(name);
        children.push(ident);
        if self.at_punct(b'<') {
            let params = self.parse_type_parameters();
            children.extend(params);
        }
        self.expect_punct(b'=');
        let aliased = self.parse_type();
        children.push(aliased);
        let semi = self.expect_punct(b';');
        self.finish(SyntaxKind::TypeAliasDeclaration, start, semi.end, children)
    }

    fn parse_function(&mut self, start: u32, mut children: Vec<NodeIndex>) -> NodeIndex {
        let kw = self.bump();
        children.push(self.token_node(SyntaxKind::FunctionKeyword, kw));
        let name = self.expect_ident();
        let ident = self.ident_node(name);
        children.push(ident);
        children.extend(self.parse_parameters());
        let mut end = self.tokens[self.pos - 1].end;
        if self.eat_punct(b':').is_some() {
            let return_type = self.parse_type();
            end = self.node_end(return_type);
            children.push(return_type);
        }
        if self.at_punct(b'{') {
            let block = self.parse_block();
            end = self.node_end(block);
            children.push(block);
        } else {
            let semi = self.expect_punct(b';');
            end = semi.end;
        }
        self.finish(SyntaxKind::FunctionDeclaration, start, end, children)
    }

    fn parse_namespace(&mut self, start: u32, mut children: Vec<NodeIndex>) -> NodeIndex {
        let kw = self.bump();
        children.push(self.token_node(SyntaxKind::NamespaceKeyword, kw));
        let name = self.expect_ident();
        let ident = self.ident_node(name);
        children.push(ident);
        let open = self.expect_punct(b'{');
        let mut statements = Vec::new();
        while !self.at_punct(b'}') {
            statements.push(self.parse_statement());
        }
        let close = self.expect_punct(b'}');
        let block = self.finish(SyntaxKind::ModuleBlock, open.start, close.end, statements);
        children.push(block);
        self.finish(SyntaxKind::ModuleDeclaration, start, close.end, children)
    }

    // Types

    fn parse_type(&mut self) -> NodeIndex {
        let first = self.parse_type_postfix();
        if !self.at_punct(b'|') {
            return first;
        }
        let mut parts = vec![first];
        while self.eat_punct(b'|').is_some() {
            parts.push(self.parse_type_postfix());
        }
        let start = self.arena.get(parts[0]).map(|n| n.pos).unwrap_or(0);
        let end = parts.last().map(|&n| self.node_end(n)).unwrap_or(start);
        self.finish(SyntaxKind::UnionType, start, end, parts)
    }

    fn parse_type_postfix(&mut self) -> NodeIndex {
        let mut node = self.parse_type_primary();
        while self.at_punct(b'[') && self.punct_at(1, b']') {
            self.bump();
            let close = self.bump();
            let start = self.arena.get(node).map(|n| n.pos).unwrap_or(0);
            node = self.finish(SyntaxKind::ArrayType, start, close.end, vec![node]);
        }
        node
    }

    fn parse_type_primary(&mut self) -> NodeIndex {
        let token = match self.peek() {
            Some(t) => t,
            None => panic!("expected type"),
        };
        match token.kind {
            TokenKind::Str => {
                self.bump();
                self.token_node(SyntaxKind::StringLiteral, token)
            }
            TokenKind::Num => {
                self.bump();
                self.token_node(SyntaxKind::NumericLiteral, token)
            }
            TokenKind::Punct(b'{') => {
                let open = self.bump();
                let mut depth = 1usize;
                let mut end = open.end;
                while depth > 0 {
                    let t = self.bump();
                    match t.kind {
                        TokenKind::Punct(b'{') => depth += 1,
                        TokenKind::Punct(b'}') => depth -= 1,
                        _ => {}
                    }
                    end = t.end;
                }
                self.finish(SyntaxKind::TypeLiteral, open.start, end, Vec::new())
            }
            TokenKind::Punct(b'(') => {
                self.bump();
                let inner = self.parse_type();
                self.expect_punct(b')');
                inner
            }
            TokenKind::Ident => {
                if is_primitive_keyword(token.text(self.src)) {
                    self.bump();
                    self.token_node(SyntaxKind::KeywordType, token)
                } else {
                    self.parse_type_reference()
                }
            }
            _ => panic!("unsupported type starting at `{}`", token.text(self.src)),
        }
    }

    fn parse_type_reference(&mut self) -> NodeIndex {
        let name = self.expect_ident();
        let head_ident = self.ident_node(name);
        let mut head = head_ident;
        let mut end = name.end;
        if self.at_punct(b'.') {
            self.bump();
            let member = self.expect_ident();
            let member_ident = self.ident_node(member);
            head = self.finish(
                SyntaxKind::QualifiedName,
                name.start,
                member.end,
                vec![head_ident, member_ident],
            );
            end = member.end;
        }
        let mut children = vec![head];
        if self.at_punct(b'<') {
            self.bump();
            loop {
                children.push(self.parse_type());
                if self.eat_punct(b',').is_none() {
                    break;
                }
            }
            let close = self.expect_punct(b'>');
            end = close.end;
        }
        self.finish(SyntaxKind::TypeReference, name.start, end, children)
    }
}

fn is_primitive_keyword(text: &str) -> bool {
    matches!(
        text,
        "string"
            | "number"
            | "boolean"
            | "any"
            | "unknown"
            | "never"
            | "void"
            | "undefined"
            | "null"
            | "object"
            | "symbol"
            | "bigint"
            | "this"
    )
}
