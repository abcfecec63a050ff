//! Parsing (tokens to AST)
//!
//! The parser converts a stream of tokens into a [`Unit`].
//! Uses Pratt parsing for expressions and recursive descent for statements.

mod expr;
mod stmt;

use crate::ast::*;
use crate::diagnostic::{error_codes, Diagnostic};
use crate::token::{Token, TokenKind};

/// Parser state for building AST from tokens
pub struct Parser {
    pub(super) tokens: Vec<Token>,
    pub(super) current: usize,
    pub(super) diagnostics: Vec<Diagnostic>,
    /// Number of enclosing `while` bodies
    pub(super) loop_depth: usize,
}

/// Operator precedence levels for Pratt parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(super) enum Precedence {
    Lowest,
    Or,         // ||
    And,        // &&
    Equality,   // == !=
    Comparison, // < <= > >=
    Term,       // + -
    Factor,     // * / %
    Unary,      // ! -
    Index,      // []
}

impl Parser {
    /// Create a new parser for the given tokens
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            current: 0,
            diagnostics: Vec::new(),
            loop_depth: 0,
        }
    }

    /// Parse tokens into a unit
    pub fn parse(&mut self) -> (Unit, Vec<Diagnostic>) {
        let mut package = None;
        let mut imports = Vec::new();
        let mut functions = Vec::new();

        if self.check(TokenKind::Package) {
            match self.parse_package() {
                Ok(decl) => package = Some(decl),
                Err(_) => self.synchronize(),
            }
        }

        while self.check(TokenKind::Import) {
            match self.parse_import() {
                Ok(decl) => imports.push(decl),
                Err(_) => self.synchronize(),
            }
        }

        while !self.is_at_end() {
            if self.check(TokenKind::Function) {
                match self.parse_function() {
                    Ok(func) => functions.push(func),
                    Err(_) => self.synchronize(),
                }
            } else {
                self.error("Expected 'function' declaration");
                self.advance();
                self.synchronize();
            }
        }

        let unit = Unit {
            package,
            imports,
            functions,
        };
        (unit, std::mem::take(&mut self.diagnostics))
    }

    // === Top-level parsing ===

    /// `package a.b.c;`
    fn parse_package(&mut self) -> Result<PackageDecl, ()> {
        let start = self.consume(TokenKind::Package, "Expected 'package'")?.span;
        let path = self.parse_dotted_path("a package name")?;
        let end = self
            .consume(TokenKind::Semicolon, "Expected ';' after package declaration")?
            .span;

        Ok(PackageDecl {
            path,
            span: start.merge(end),
        })
    }

    /// `import a.b.c;` or `import a.b.c as alias;`
    fn parse_import(&mut self) -> Result<ImportDecl, ()> {
        let start = self.consume(TokenKind::Import, "Expected 'import'")?.span;
        let path_start = self.peek().span;
        let path = self.parse_dotted_path("a package name")?;

        let alias = if self.match_token(TokenKind::As) {
            let token = self.consume_identifier("an import alias")?;
            Identifier {
                name: token.lexeme.clone(),
                span: token.span,
            }
        } else {
            let last = path.rsplit('.').next().unwrap_or(&path).to_string();
            Identifier {
                name: last,
                span: path_start,
            }
        };

        let end = self
            .consume(TokenKind::Semicolon, "Expected ';' after import")?
            .span;

        Ok(ImportDecl {
            path,
            alias,
            span: start.merge(end),
        })
    }

    /// `ident(.ident)*`; type keywords such as `json` are valid segments
    fn parse_dotted_path(&mut self, what: &str) -> Result<String, ()> {
        let mut path = self.consume_path_segment(what)?;
        while self.match_token(TokenKind::Dot) {
            path.push('.');
            path.push_str(&self.consume_path_segment(what)?);
        }
        Ok(path)
    }

    fn consume_path_segment(&mut self, what: &str) -> Result<String, ()> {
        if self.check(TokenKind::Identifier) || self.peek().kind.is_type_keyword() {
            Ok(self.advance().lexeme.clone())
        } else {
            self.error(&format!("Expected {}", what));
            Err(())
        }
    }

    /// `function name(type a, type b) (ret) { ... }`
    fn parse_function(&mut self) -> Result<FunctionDecl, ()> {
        let fn_span = self.consume(TokenKind::Function, "Expected 'function'")?.span;

        let name_token = self.consume_identifier("a function name")?;
        let name = Identifier {
            name: name_token.lexeme.clone(),
            span: name_token.span,
        };

        self.consume(TokenKind::LeftParen, "Expected '(' after function name")?;

        let mut params = Vec::new();
        if !self.check(TokenKind::RightParen) {
            loop {
                let type_ref = self.parse_type_ref()?;
                let param_tok = self.consume_identifier("a parameter name")?;
                let param_name = Identifier {
                    name: param_tok.lexeme.clone(),
                    span: param_tok.span,
                };
                params.push(Param {
                    span: type_ref.span().merge(param_name.span),
                    type_ref,
                    name: param_name,
                });

                if !self.match_token(TokenKind::Comma) {
                    break;
                }
            }
        }

        self.consume(TokenKind::RightParen, "Expected ')' after parameters")?;

        // Optional parenthesised return type list
        let mut return_types = Vec::new();
        if self.match_token(TokenKind::LeftParen) {
            loop {
                return_types.push(self.parse_type_ref()?);
                if !self.match_token(TokenKind::Comma) {
                    break;
                }
            }
            self.consume(TokenKind::RightParen, "Expected ')' after return types")?;
        }

        let body = self.parse_block()?;
        let end_span = body.span;

        Ok(FunctionDecl {
            name,
            params,
            return_types,
            body,
            span: fn_span.merge(end_span),
        })
    }

    /// Parse a type reference: `int`, `string[]`, `json[][]`
    pub(super) fn parse_type_ref(&mut self) -> Result<TypeRef, ()> {
        let token = self.advance().clone();
        let primitive = match token.kind {
            TokenKind::IntType => PrimitiveType::Int,
            TokenKind::FloatType => PrimitiveType::Float,
            TokenKind::StringType => PrimitiveType::String,
            TokenKind::BooleanType => PrimitiveType::Boolean,
            TokenKind::JsonType => PrimitiveType::Json,
            _ => {
                self.error_at(&token, "Expected a type name");
                return Err(());
            }
        };

        let mut type_ref = TypeRef::Primitive(primitive, token.span);
        while self.check(TokenKind::LeftBracket) && self.peek_next_kind() == Some(TokenKind::RightBracket) {
            self.advance();
            let end = self.advance().span;
            type_ref = TypeRef::Array(Box::new(type_ref), token.span.merge(end));
        }

        Ok(type_ref)
    }

    // === Helper methods ===

    /// Advance to next token and return reference to previous
    pub(super) fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        &self.tokens[self.current - 1]
    }

    /// Peek at current token
    pub(super) fn peek(&self) -> &Token {
        &self.tokens[self.current.min(self.tokens.len() - 1)]
    }

    /// Kind of the token after the current one
    pub(super) fn peek_next_kind(&self) -> Option<TokenKind> {
        self.tokens.get(self.current + 1).map(|t| t.kind)
    }

    /// Check if current token matches kind
    pub(super) fn check(&self, kind: TokenKind) -> bool {
        !self.is_at_end() && self.peek().kind == kind
    }

    /// Match and consume token if it matches
    pub(super) fn match_token(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume token of given kind or error
    pub(super) fn consume(&mut self, kind: TokenKind, message: &str) -> Result<&Token, ()> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            self.error(message);
            Err(())
        }
    }

    /// Consume an identifier token
    pub(super) fn consume_identifier(&mut self, what: &str) -> Result<&Token, ()> {
        if self.check(TokenKind::Identifier) {
            Ok(self.advance())
        } else {
            let found = self.peek().kind;
            self.error(&format!("Expected {}, found '{}'", what, found));
            Err(())
        }
    }

    /// Check if at end of token stream
    pub(super) fn is_at_end(&self) -> bool {
        self.current >= self.tokens.len() || self.tokens[self.current].kind == TokenKind::Eof
    }

    /// Record an error at the current token
    pub(super) fn error(&mut self, message: &str) {
        let token = self.peek().clone();
        self.error_at(&token, message);
    }

    /// Record an error at a specific token
    pub(super) fn error_at(&mut self, token: &Token, message: &str) {
        // The lexer already reported malformed tokens
        if token.kind == TokenKind::Error {
            return;
        }
        self.diagnostics.push(
            Diagnostic::error_with_code(error_codes::SYNTAX_ERROR, message, token.span)
                .with_column(token.column as usize)
                .with_label("syntax error"),
        );
    }

    /// Skip tokens until the next top-level function declaration
    fn synchronize(&mut self) {
        while !self.is_at_end() && !self.check(TokenKind::Function) {
            self.advance();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use pretty_assertions::assert_eq;

    pub(crate) fn parse(source: &str) -> (Unit, Vec<Diagnostic>) {
        let (tokens, lex_diags) = Lexer::new(source).tokenize();
        assert!(lex_diags.is_empty(), "lexer diagnostics: {:?}", lex_diags);
        Parser::new(tokens).parse()
    }

    #[test]
    fn test_package_and_imports() {
        let (unit, diags) = parse(
            "package test.lang;\nimport ballerina.lang.json;\nimport a.b.c as d;\n",
        );
        assert!(diags.is_empty(), "{:?}", diags);
        assert_eq!(unit.package.unwrap().path, "test.lang");
        assert_eq!(unit.imports.len(), 2);
        assert_eq!(unit.imports[0].path, "ballerina.lang.json");
        assert_eq!(unit.imports[0].alias.name, "json");
        assert_eq!(unit.imports[1].alias.name, "d");
    }

    #[test]
    fn test_function_signature() {
        let (unit, diags) = parse("function add(int a, int b) (int) {\n    return a + b;\n}\n");
        assert!(diags.is_empty(), "{:?}", diags);
        let func = &unit.functions[0];
        assert_eq!(func.name.name, "add");
        assert_eq!(func.params.len(), 2);
        assert_eq!(func.params[1].name.name, "b");
        assert_eq!(func.return_types.len(), 1);
        assert_eq!(func.line(), 1);
        assert_eq!(func.body.statements[0].line(), 2);
    }

    #[test]
    fn test_array_type_ref() {
        let (unit, diags) = parse("function f(string[][] grid) {}");
        assert!(diags.is_empty());
        assert_eq!(unit.functions[0].params[0].type_ref.to_string(), "string[][]");
    }

    #[test]
    fn test_missing_semicolon_reported_with_line() {
        let (unit, diags) = parse("function f() {\n    int x = 1\n}\nfunction g() {}\n");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].line, 3);
        assert!(diags[0].message.contains("';'"));
        // Recovery resumes at the next function
        assert_eq!(unit.functions.len(), 1);
        assert_eq!(unit.functions[0].name.name, "g");
    }

    #[test]
    fn test_stray_top_level_statement() {
        let (_, diags) = parse("int x = 1;\nfunction f() {}");
        assert_eq!(diags[0].message, "Expected 'function' declaration");
    }
}
