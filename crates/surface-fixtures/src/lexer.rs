//! Token scanner for fixture sources.
//!
//! Produces a flat token list plus the comment ranges and reference
//! directives the provider contract records per file. Comments are not
//! tokens; the parser re-associates doc comments with declarations by
//! position.

use surface_common::CommentRange;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum TokenKind {
    Ident,
    Str,
    Num,
    Punct(u8),
}

#[derive(Copy, Clone, Debug)]
pub(crate) struct Token {
    pub kind: TokenKind,
    pub start: u32,
    pub end: u32,
}

impl Token {
    pub fn text<'a>(&self, src: &'a str) -> &'a str {
        &src[self.start as usize..self.end as usize]
    }
}

pub(crate) struct LexOutput {
    pub tokens: Vec<Token>,
    pub comments: Vec<CommentRange>,
    pub directives: Vec<String>,
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b'$'
}

fn is_ident_continue(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

pub(crate) fn lex(src: &str) -> LexOutput {
    let bytes = src.as_bytes();
    let len = bytes.len();
    let mut pos = 0usize;
    let mut tokens = Vec::new();
    let mut comments = Vec::new();
    let mut directives = Vec::new();

    while pos < len {
        let b = bytes[pos];
        if b == b' ' || b == b'\t' || b == b'\r' || b == b'\n' {
            pos += 1;
            continue;
        }
        if b == b'/' && pos + 1 < len && bytes[pos + 1] == b'/' {
            let start = pos;
            while pos < len && bytes[pos] != b'\n' && bytes[pos] != b'\r' {
                pos += 1;
            }
            let text = &src[start..pos];
            if text.starts_with("///") && text.contains("<reference") {
                directives.push(text.trim_end().to_string());
            }
            let has_trailing_new_line = pos < len;
            comments.push(CommentRange::new(
                start as u32,
                pos as u32,
                false,
                has_trailing_new_line,
            ));
            continue;
        }
        if b == b'/' && pos + 1 < len && bytes[pos + 1] == b'*' {
            let start = pos;
            pos += 2;
            while pos + 1 < len && !(bytes[pos] == b'*' && bytes[pos + 1] == b'/') {
                pos += 1;
            }
            pos = (pos + 2).min(len);
            let has_trailing_new_line = pos < len && (bytes[pos] == b'\n' || bytes[pos] == b'\r');
            comments.push(CommentRange::new(
                start as u32,
                pos as u32,
                true,
                has_trailing_new_line,
            ));
            continue;
        }
        if b == b'\'' || b == b'"' {
            let start = pos;
            pos += 1;
            while pos < len && bytes[pos] != b {
                pos += 1;
            }
            pos = (pos + 1).min(len);
            tokens.push(Token {
                kind: TokenKind::Str,
                start: start as u32,
                end: pos as u32,
            });
            continue;
        }
        if b.is_ascii_digit() {
            let start = pos;
            while pos < len && (bytes[pos].is_ascii_digit() || bytes[pos] == b'.') {
                pos += 1;
            }
            tokens.push(Token {
                kind: TokenKind::Num,
                start: start as u32,
                end: pos as u32,
            });
            continue;
        }
        if is_ident_start(b) {
            let start = pos;
            while pos < len && is_ident_continue(bytes[pos]) {
                pos += 1;
            }
            tokens.push(Token {
                kind: TokenKind::Ident,
                start: start as u32,
                end: pos as u32,
            });
            continue;
        }
        tokens.push(Token {
            kind: TokenKind::Punct(b),
            start: pos as u32,
            end: (pos + 1) as u32,
        });
        pos += 1;
    }

    LexOutput {
        tokens,
        comments,
        directives,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_tokens() {
        let out = lex("export interface Foo { bar: string; }");
        let texts: Vec<&str> = out
            .tokens
            .iter()
            .map(|t| t.text("export interface Foo { bar: string; }"))
            .collect();
        assert_eq!(
            texts,
            vec!["export", "interface", "Foo", "{", "bar", ":", "string", ";", "}"]
        );
    }

    #[test]
    fn test_comments_and_directives() {
        let src = "/// <reference lib=\"es2015\" />\n/** @beta */\nclass A {}";
        let out = lex(src);
        assert_eq!(out.directives, vec!["/// <reference lib=\"es2015\" />"]);
        assert_eq!(out.comments.len(), 2);
        assert!(out.comments[1].is_multi_line);
        assert_eq!(out.comments[1].get_text(src), "/** @beta */");
    }

    #[test]
    fn test_string_token_keeps_quotes() {
        let src = "import { A } from './helpers';";
        let out = lex(src);
        let s = out
            .tokens
            .iter()
            .find(|t| t.kind == TokenKind::Str)
            .copied()
            .unwrap();
        assert_eq!(s.text(src), "'./helpers'");
    }
}
