//! Expression parsing (Pratt parsing)

use crate::ast::*;
use crate::parser::{Parser, Precedence};
use crate::token::{Token, TokenKind};

impl Parser {
    /// Parse an expression
    pub(super) fn parse_expression(&mut self) -> Result<Expr, ()> {
        self.parse_precedence(Precedence::Lowest)
    }

    /// Parse expression with given precedence
    pub(super) fn parse_precedence(&mut self, precedence: Precedence) -> Result<Expr, ()> {
        let mut left = self.parse_prefix()?;

        while precedence < self.current_precedence() {
            left = self.parse_infix(left)?;
        }

        Ok(left)
    }

    /// Parse prefix expression
    fn parse_prefix(&mut self) -> Result<Expr, ()> {
        match self.peek().kind {
            TokenKind::Int => self.parse_int(),
            TokenKind::Float => self.parse_float(),
            TokenKind::String => {
                let token = self.advance();
                Ok(Expr::Literal(Literal::String(token.lexeme.clone()), token.span))
            }
            TokenKind::True | TokenKind::False => {
                let token = self.advance();
                let value = token.kind == TokenKind::True;
                Ok(Expr::Literal(Literal::Boolean(value), token.span))
            }
            TokenKind::Null => {
                let span = self.advance().span;
                Ok(Expr::Literal(Literal::Null, span))
            }
            TokenKind::Identifier => self.parse_identifier_or_call(),
            // Package aliases may be spelled like a type, as in `json:getString(..)`
            kind if kind.is_type_keyword() && self.peek_next_kind() == Some(TokenKind::Colon) => {
                self.parse_identifier_or_call()
            }
            TokenKind::LeftParen => self.parse_group(),
            TokenKind::LeftBracket => self.parse_array_literal(),
            TokenKind::LeftBrace => self.parse_json_object(),
            TokenKind::Minus | TokenKind::Bang => self.parse_unary(),
            _ => {
                self.error("Expected expression");
                Err(())
            }
        }
    }

    /// Parse infix expression
    fn parse_infix(&mut self, left: Expr) -> Result<Expr, ()> {
        match self.peek().kind {
            TokenKind::LeftBracket => self.parse_index(left),
            _ => self.parse_binary(left),
        }
    }

    /// Get current token precedence
    fn current_precedence(&self) -> Precedence {
        Self::token_precedence(self.peek())
    }

    /// Get precedence for a token
    fn token_precedence(token: &Token) -> Precedence {
        match token.kind {
            TokenKind::PipePipe => Precedence::Or,
            TokenKind::AmpAmp => Precedence::And,
            TokenKind::EqualEqual | TokenKind::BangEqual => Precedence::Equality,
            TokenKind::Less
            | TokenKind::LessEqual
            | TokenKind::Greater
            | TokenKind::GreaterEqual => Precedence::Comparison,
            TokenKind::Plus | TokenKind::Minus => Precedence::Term,
            TokenKind::Star | TokenKind::Slash | TokenKind::Percent => Precedence::Factor,
            TokenKind::LeftBracket => Precedence::Index,
            _ => Precedence::Lowest,
        }
    }

    fn parse_int(&mut self) -> Result<Expr, ()> {
        let token = self.advance().clone();
        match token.lexeme.parse::<i64>() {
            Ok(value) => Ok(Expr::Literal(Literal::Int(value), token.span)),
            Err(_) => {
                self.error_at(&token, "Integer literal is out of range");
                Err(())
            }
        }
    }

    fn parse_float(&mut self) -> Result<Expr, ()> {
        let token = self.advance().clone();
        match token.lexeme.parse::<f64>() {
            Ok(value) => Ok(Expr::Literal(Literal::Float(value), token.span)),
            Err(_) => {
                self.error_at(&token, "Invalid float literal");
                Err(())
            }
        }
    }

    /// Identifier, `name(args)` or `alias:name(args)`
    fn parse_identifier_or_call(&mut self) -> Result<Expr, ()> {
        let token = self.advance();
        let first = Identifier {
            name: token.lexeme.clone(),
            span: token.span,
        };

        if self.match_token(TokenKind::Colon) {
            let name_token = self.consume_identifier("a function name after ':'")?;
            let name = Identifier {
                name: name_token.lexeme.clone(),
                span: name_token.span,
            };
            if !self.check(TokenKind::LeftParen) {
                self.error("Expected '(' after qualified function name");
                return Err(());
            }
            return self.parse_call(FunctionName {
                alias: Some(first),
                name,
            });
        }

        if self.check(TokenKind::LeftParen) {
            return self.parse_call(FunctionName {
                alias: None,
                name: first,
            });
        }

        Ok(Expr::Identifier(first))
    }

    /// Parse call arguments for an already-parsed callee
    fn parse_call(&mut self, callee: FunctionName) -> Result<Expr, ()> {
        let callee_span = match &callee.alias {
            Some(alias) => alias.span.merge(callee.name.span),
            None => callee.name.span,
        };
        self.consume(TokenKind::LeftParen, "Expected '('")?;
        let mut args = Vec::new();

        if !self.check(TokenKind::RightParen) {
            loop {
                args.push(self.parse_expression()?);
                if !self.match_token(TokenKind::Comma) {
                    break;
                }
            }
        }

        let end_span = self
            .consume(TokenKind::RightParen, "Expected ')' after arguments")?
            .span;

        Ok(Expr::Call(CallExpr {
            callee,
            args,
            span: callee_span.merge(end_span),
        }))
    }

    /// Parse grouped expression
    fn parse_group(&mut self) -> Result<Expr, ()> {
        let start_span = self.consume(TokenKind::LeftParen, "Expected '('")?.span;
        let expr = self.parse_expression()?;
        let end_span = self.consume(TokenKind::RightParen, "Expected ')'")?.span;

        Ok(Expr::Group(GroupExpr {
            expr: Box::new(expr),
            span: start_span.merge(end_span),
        }))
    }

    /// Parse array literal
    fn parse_array_literal(&mut self) -> Result<Expr, ()> {
        let start_span = self.consume(TokenKind::LeftBracket, "Expected '['")?.span;
        let mut elements = Vec::new();

        if !self.check(TokenKind::RightBracket) {
            loop {
                elements.push(self.parse_expression()?);
                if !self.match_token(TokenKind::Comma) {
                    break;
                }
            }
        }

        let end_span = self
            .consume(TokenKind::RightBracket, "Expected ']' after array elements")?
            .span;

        Ok(Expr::ArrayLiteral(ArrayLiteral {
            elements,
            span: start_span.merge(end_span),
        }))
    }

    /// Parse `{"key": value, ...}`
    fn parse_json_object(&mut self) -> Result<Expr, ()> {
        let start_span = self.consume(TokenKind::LeftBrace, "Expected '{'")?.span;
        let mut entries = Vec::new();

        if !self.check(TokenKind::RightBrace) {
            loop {
                let key = self
                    .consume(TokenKind::String, "Expected a string key in json object")?
                    .lexeme
                    .clone();
                self.consume(TokenKind::Colon, "Expected ':' after json key")?;
                let value = self.parse_expression()?;
                entries.push((key, value));
                if !self.match_token(TokenKind::Comma) {
                    break;
                }
            }
        }

        let end_span = self
            .consume(TokenKind::RightBrace, "Expected '}' after json object")?
            .span;

        Ok(Expr::JsonObject(JsonObjectLiteral {
            entries,
            span: start_span.merge(end_span),
        }))
    }

    /// Parse unary expression
    fn parse_unary(&mut self) -> Result<Expr, ()> {
        let op_token = self.advance();
        let op_span = op_token.span;
        let op = if op_token.kind == TokenKind::Minus {
            UnaryOp::Negate
        } else {
            UnaryOp::Not
        };

        let operand = self.parse_precedence(Precedence::Unary)?;
        let operand_span = operand.span();

        Ok(Expr::Unary(UnaryExpr {
            op,
            expr: Box::new(operand),
            span: op_span.merge(operand_span),
        }))
    }

    /// Parse binary expression
    fn parse_binary(&mut self, left: Expr) -> Result<Expr, ()> {
        let left_span = left.span();
        let op_token = self.advance().clone();

        let op = match op_token.kind {
            TokenKind::Plus => BinaryOp::Add,
            TokenKind::Minus => BinaryOp::Sub,
            TokenKind::Star => BinaryOp::Mul,
            TokenKind::Slash => BinaryOp::Div,
            TokenKind::Percent => BinaryOp::Mod,
            TokenKind::EqualEqual => BinaryOp::Eq,
            TokenKind::BangEqual => BinaryOp::Ne,
            TokenKind::Less => BinaryOp::Lt,
            TokenKind::LessEqual => BinaryOp::Le,
            TokenKind::Greater => BinaryOp::Gt,
            TokenKind::GreaterEqual => BinaryOp::Ge,
            TokenKind::AmpAmp => BinaryOp::And,
            TokenKind::PipePipe => BinaryOp::Or,
            _ => {
                self.error_at(&op_token, "Expected binary operator");
                return Err(());
            }
        };

        let right = self.parse_precedence(Self::token_precedence(&op_token))?;
        let right_span = right.span();

        Ok(Expr::Binary(BinaryExpr {
            op,
            left: Box::new(left),
            right: Box::new(right),
            span: left_span.merge(right_span),
        }))
    }

    /// Parse index expression
    fn parse_index(&mut self, target: Expr) -> Result<Expr, ()> {
        let target_span = target.span();
        self.consume(TokenKind::LeftBracket, "Expected '['")?;
        let index = self.parse_expression()?;
        let end_span = self
            .consume(TokenKind::RightBracket, "Expected ']' after index")?
            .span;

        Ok(Expr::Index(IndexExpr {
            target: Box::new(target),
            index: Box::new(index),
            span: target_span.merge(end_span),
        }))
    }
}
