//! Token types for lexical analysis
//!
//! Defines all token types recognized by the Ember lexer.

use crate::span::Span;
use serde::{Deserialize, Serialize};

/// Token type produced by the lexer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// The kind of token
    pub kind: TokenKind,
    /// The source text of this token (unescaped contents for strings)
    pub lexeme: String,
    /// Source location
    pub span: Span,
    /// Column of the first character (1-based)
    pub column: u32,
}

impl Token {
    /// Create a new token
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, span: Span, column: u32) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            span,
            column,
        }
    }
}

/// Classification of token types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    // Literals
    /// Integer literal (42)
    Int,
    /// Float literal (3.14)
    Float,
    /// String literal ("hello")
    String,
    True,
    False,
    Null,
    Identifier,

    // Keywords
    Package,
    Import,
    As,
    Function,
    Return,
    If,
    Else,
    While,
    Break,

    // Type keywords
    IntType,
    FloatType,
    StringType,
    BooleanType,
    JsonType,

    // Punctuation
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,
    Semicolon,
    Comma,
    Colon,
    Dot,

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Equal,
    EqualEqual,
    Bang,
    BangEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    AmpAmp,
    PipePipe,

    /// Lexing error; the lexeme holds the message
    Error,
    Eof,
}

impl TokenKind {
    /// Check if a string is a keyword and return the corresponding token kind
    pub fn is_keyword(s: &str) -> Option<TokenKind> {
        match s {
            "package" => Some(TokenKind::Package),
            "import" => Some(TokenKind::Import),
            "as" => Some(TokenKind::As),
            "function" => Some(TokenKind::Function),
            "return" => Some(TokenKind::Return),
            "if" => Some(TokenKind::If),
            "else" => Some(TokenKind::Else),
            "while" => Some(TokenKind::While),
            "break" => Some(TokenKind::Break),
            "true" => Some(TokenKind::True),
            "false" => Some(TokenKind::False),
            "null" => Some(TokenKind::Null),
            "int" => Some(TokenKind::IntType),
            "float" => Some(TokenKind::FloatType),
            "string" => Some(TokenKind::StringType),
            "boolean" => Some(TokenKind::BooleanType),
            "json" => Some(TokenKind::JsonType),
            _ => None,
        }
    }

    /// Whether this token starts a type name
    pub fn is_type_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::IntType
                | TokenKind::FloatType
                | TokenKind::StringType
                | TokenKind::BooleanType
                | TokenKind::JsonType
        )
    }

    /// Get the string representation of this token kind
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Int => "integer",
            TokenKind::Float => "float",
            TokenKind::String => "string literal",
            TokenKind::True => "true",
            TokenKind::False => "false",
            TokenKind::Null => "null",
            TokenKind::Identifier => "identifier",
            TokenKind::Package => "package",
            TokenKind::Import => "import",
            TokenKind::As => "as",
            TokenKind::Function => "function",
            TokenKind::Return => "return",
            TokenKind::If => "if",
            TokenKind::Else => "else",
            TokenKind::While => "while",
            TokenKind::Break => "break",
            TokenKind::IntType => "int",
            TokenKind::FloatType => "float",
            TokenKind::StringType => "string",
            TokenKind::BooleanType => "boolean",
            TokenKind::JsonType => "json",
            TokenKind::LeftParen => "(",
            TokenKind::RightParen => ")",
            TokenKind::LeftBrace => "{",
            TokenKind::RightBrace => "}",
            TokenKind::LeftBracket => "[",
            TokenKind::RightBracket => "]",
            TokenKind::Semicolon => ";",
            TokenKind::Comma => ",",
            TokenKind::Colon => ":",
            TokenKind::Dot => ".",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::Equal => "=",
            TokenKind::EqualEqual => "==",
            TokenKind::Bang => "!",
            TokenKind::BangEqual => "!=",
            TokenKind::Less => "<",
            TokenKind::LessEqual => "<=",
            TokenKind::Greater => ">",
            TokenKind::GreaterEqual => ">=",
            TokenKind::AmpAmp => "&&",
            TokenKind::PipePipe => "||",
            TokenKind::Error => "error",
            TokenKind::Eof => "end of file",
        }
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
