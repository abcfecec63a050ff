//! Literal scanning for the lexer

use crate::diagnostic::error_codes;
use crate::lexer::Lexer;
use crate::token::{Token, TokenKind};

impl Lexer {
    /// Scan a string literal; the token lexeme holds the unescaped contents
    pub(super) fn string(&mut self) -> Token {
        let mut value = String::new();
        let mut error_token = None;

        while !self.is_at_end() && self.peek() != '"' {
            if self.peek() == '\n' {
                return self.error_token_with_code(
                    error_codes::UNTERMINATED_STRING,
                    "Unterminated string literal",
                );
            }

            if self.peek() == '\\' {
                self.advance();
                if self.is_at_end() {
                    break;
                }

                let escape_char = self.advance();
                match escape_char {
                    'n' => value.push('\n'),
                    'r' => value.push('\r'),
                    't' => value.push('\t'),
                    '\\' => value.push('\\'),
                    '"' => value.push('"'),
                    other => {
                        if error_token.is_none() {
                            error_token = Some(self.error_token_with_code(
                                error_codes::INVALID_ESCAPE,
                                &format!("Invalid escape sequence '\\{}'", other),
                            ));
                        }
                    }
                }
            } else {
                value.push(self.advance());
            }
        }

        if self.is_at_end() {
            return self.error_token_with_code(
                error_codes::UNTERMINATED_STRING,
                "Unterminated string literal",
            );
        }

        self.advance(); // Closing "

        match error_token {
            Some(err) => err,
            None => self.make_token(TokenKind::String, &value),
        }
    }

    /// Scan an integer or float literal
    pub(super) fn number(&mut self) -> Token {
        let start = self.current - 1;
        let mut kind = TokenKind::Int;

        while self.peek().is_ascii_digit() {
            self.advance();
        }

        // A dot only belongs to the number when a digit follows it
        if self.peek() == '.' && matches!(self.peek_next(), Some(c) if c.is_ascii_digit()) {
            kind = TokenKind::Float;
            self.advance();
            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }

        if self.peek() == 'e' || self.peek() == 'E' {
            kind = TokenKind::Float;
            self.advance();
            if self.peek() == '+' || self.peek() == '-' {
                self.advance();
            }
            if !self.peek().is_ascii_digit() {
                return self.error_token_with_code(
                    error_codes::INVALID_NUMBER,
                    "Invalid number: exponent requires digits",
                );
            }
            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }

        let lexeme: String = self.chars[start..self.current].iter().collect();
        self.make_token(kind, &lexeme)
    }

    /// Scan an identifier or keyword
    pub(super) fn identifier(&mut self) -> Token {
        let start = self.current - 1;

        while self.peek().is_alphanumeric() || self.peek() == '_' {
            self.advance();
        }

        let lexeme: String = self.chars[start..self.current].iter().collect();
        let kind = TokenKind::is_keyword(&lexeme).unwrap_or(TokenKind::Identifier);

        self.make_token(kind, &lexeme)
    }
}

#[cfg(test)]
mod tests {
    use crate::lexer::Lexer;
    use crate::token::TokenKind;
    use rstest::rstest;

    #[rstest]
    #[case("42", TokenKind::Int)]
    #[case("3.14", TokenKind::Float)]
    #[case("1e3", TokenKind::Float)]
    #[case("2.5E-2", TokenKind::Float)]
    fn test_number_kinds(#[case] source: &str, #[case] kind: TokenKind) {
        let (tokens, diags) = Lexer::new(source).tokenize();
        assert!(diags.is_empty());
        assert_eq!(tokens[0].kind, kind);
        assert_eq!(tokens[0].lexeme, source);
    }

    #[test]
    fn test_string_escapes() {
        let (tokens, diags) = Lexer::new(r#""a\tb\"c""#).tokenize();
        assert!(diags.is_empty());
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(tokens[0].lexeme, "a\tb\"c");
    }

    #[test]
    fn test_string_keeps_dollar_paths() {
        let (tokens, _) = Lexer::new(r#""$.name.""#).tokenize();
        assert_eq!(tokens[0].lexeme, "$.name.");
    }

    #[test]
    fn test_unterminated_string() {
        let (tokens, diags) = Lexer::new("\"abc").tokenize();
        assert_eq!(tokens[0].kind, TokenKind::Error);
        assert_eq!(diags[0].message, "Unterminated string literal");
    }

    #[test]
    fn test_invalid_escape() {
        let (tokens, diags) = Lexer::new(r#""a\qb""#).tokenize();
        assert_eq!(tokens[0].kind, TokenKind::Error);
        assert_eq!(diags[0].message, "Invalid escape sequence '\\q'");
    }

    #[test]
    fn test_member_dot_is_not_float() {
        let (tokens, _) = Lexer::new("1.x").tokenize();
        assert_eq!(tokens[0].kind, TokenKind::Int);
        assert_eq!(tokens[1].kind, TokenKind::Dot);
    }
}
