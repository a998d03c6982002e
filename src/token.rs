//! The token alphabet recognized by the lexer.

use std::collections::HashMap;

use lazy_static::lazy_static;

/// The closed set of token kinds the lexer can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Illegal,
    Eof,

    Ident,
    Int,
    String,

    Assign,
    Plus,
    Minus,
    Bang,
    Asterisk,
    Slash,

    Lt,
    Gt,
    Eq,
    NotEq,
    To,

    Comma,
    Semicolon,
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Colon,

    Function,
    Let,
    Set,
    True,
    False,
    If,
    Else,
    Return,
    RepoPath,
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TokenKind::Illegal => "ILLEGAL",
            TokenKind::Eof => "EOF",
            TokenKind::Ident => "IDENT",
            TokenKind::Int => "INT",
            TokenKind::String => "STRING",
            TokenKind::Assign => "=",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Bang => "!",
            TokenKind::Asterisk => "*",
            TokenKind::Slash => "/",
            TokenKind::Lt => "<",
            TokenKind::Gt => ">",
            TokenKind::Eq => "==",
            TokenKind::NotEq => "!=",
            TokenKind::To => "->",
            TokenKind::Comma => ",",
            TokenKind::Semicolon => ";",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::Colon => ":",
            TokenKind::Function => "FUNCTION",
            TokenKind::Let => "LET",
            TokenKind::Set => "SET",
            TokenKind::True => "TRUE",
            TokenKind::False => "FALSE",
            TokenKind::If => "IF",
            TokenKind::Else => "ELSE",
            TokenKind::Return => "RETURN",
            TokenKind::RepoPath => "REPOPATH",
        };
        write!(f, "{}", s)
    }
}

/// A single lexed token: its kind and the exact literal that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub literal: String,
}

impl Token {
    pub fn new(kind: TokenKind, literal: impl Into<String>) -> Self {
        Self {
            kind,
            literal: literal.into(),
        }
    }
}

lazy_static! {
    static ref KEYWORDS: HashMap<&'static str, TokenKind> = {
        let mut m = HashMap::new();
        m.insert("fn", TokenKind::Function);
        m.insert("let", TokenKind::Let);
        m.insert("set", TokenKind::Set);
        m.insert("true", TokenKind::True);
        m.insert("false", TokenKind::False);
        m.insert("if", TokenKind::If);
        m.insert("else", TokenKind::Else);
        m.insert("return", TokenKind::Return);
        m.insert("repopath", TokenKind::RepoPath);
        m
    };
}

/// Maps an identifier literal to its keyword token kind, or `Ident` if it isn't one.
pub fn lookup_ident(ident: &str) -> TokenKind {
    KEYWORDS.get(ident).copied().unwrap_or(TokenKind::Ident)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_resolve() {
        assert_eq!(lookup_ident("let"), TokenKind::Let);
        assert_eq!(lookup_ident("repopath"), TokenKind::RepoPath);
        assert_eq!(lookup_ident("foobar"), TokenKind::Ident);
    }

    #[test]
    fn display_matches_wire_form() {
        assert_eq!(TokenKind::To.to_string(), "->");
        assert_eq!(TokenKind::Eq.to_string(), "==");
        assert_eq!(TokenKind::NotEq.to_string(), "!=");
    }
}
