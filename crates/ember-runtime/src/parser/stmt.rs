//! Statement parsing

use crate::ast::*;
use crate::diagnostic::{error_codes, Diagnostic};
use crate::parser::Parser;
use crate::token::TokenKind;

impl Parser {
    /// Parse a `{ ... }` block
    pub(super) fn parse_block(&mut self) -> Result<Block, ()> {
        let start_span = self.consume(TokenKind::LeftBrace, "Expected '{'")?.span;
        let mut statements = Vec::new();

        while !self.check(TokenKind::RightBrace) && !self.is_at_end() {
            statements.push(self.parse_statement()?);
        }

        let end_span = self.consume(TokenKind::RightBrace, "Expected '}'")?.span;

        Ok(Block {
            statements,
            span: start_span.merge(end_span),
        })
    }

    /// Parse a statement
    pub(super) fn parse_statement(&mut self) -> Result<Stmt, ()> {
        match self.peek().kind {
            kind if kind.is_type_keyword() && self.peek_next_kind() != Some(TokenKind::Colon) => {
                self.parse_var_decl()
            }
            TokenKind::If => self.parse_if_stmt(),
            TokenKind::While => self.parse_while_stmt(),
            TokenKind::Return => self.parse_return_stmt(),
            TokenKind::Break => {
                let token = self.advance().clone();
                if self.loop_depth == 0 {
                    self.diagnostics.push(
                        Diagnostic::error_with_code(
                            error_codes::BREAK_OUTSIDE_LOOP,
                            "'break' outside of a loop",
                            token.span,
                        )
                        .with_column(token.column as usize)
                        .with_label("not inside a while loop"),
                    );
                }
                let end = self
                    .consume(TokenKind::Semicolon, "Expected ';' after 'break'")?
                    .span;
                Ok(Stmt::Break(token.span.merge(end)))
            }
            TokenKind::Function => {
                self.error("Nested function declarations are not supported");
                Err(())
            }
            _ => self.parse_assign_or_expr_stmt(),
        }
    }

    /// `string[] fruits;` or `int x = 1;`
    fn parse_var_decl(&mut self) -> Result<Stmt, ()> {
        let type_ref = self.parse_type_ref()?;

        let name_token = self.consume_identifier("a variable name")?;
        let name = Identifier {
            name: name_token.lexeme.clone(),
            span: name_token.span,
        };

        let init = if self.match_token(TokenKind::Equal) {
            Some(self.parse_expression()?)
        } else {
            None
        };

        let end_span = self
            .consume(
                TokenKind::Semicolon,
                "Expected ';' after variable declaration",
            )?
            .span;

        Ok(Stmt::VarDecl(VarDecl {
            span: type_ref.span().merge(end_span),
            type_ref,
            name,
            init,
        }))
    }

    /// Parse assignment or expression statement
    fn parse_assign_or_expr_stmt(&mut self) -> Result<Stmt, ()> {
        let expr = self.parse_expression()?;
        let expr_span = expr.span();

        if self.match_token(TokenKind::Equal) {
            let target = self.expr_to_assign_target(expr)?;
            let value = self.parse_expression()?;
            let end_span = self
                .consume(TokenKind::Semicolon, "Expected ';' after assignment")?
                .span;

            return Ok(Stmt::Assign(Assign {
                target,
                value,
                span: expr_span.merge(end_span),
            }));
        }

        let end_span = self
            .consume(TokenKind::Semicolon, "Expected ';' after expression")?
            .span;

        Ok(Stmt::Expr(ExprStmt {
            expr,
            span: expr_span.merge(end_span),
        }))
    }

    /// Convert a parsed expression into an assignment target
    fn expr_to_assign_target(&mut self, expr: Expr) -> Result<AssignTarget, ()> {
        match expr {
            Expr::Identifier(id) => Ok(AssignTarget::Name(id)),
            Expr::Index(IndexExpr { target, index, .. }) => match *target {
                Expr::Identifier(name) => Ok(AssignTarget::Index { name, index }),
                _ => {
                    self.error("Only indexing a named variable can be assigned to");
                    Err(())
                }
            },
            _ => {
                self.error("Invalid assignment target");
                Err(())
            }
        }
    }

    fn parse_if_stmt(&mut self) -> Result<Stmt, ()> {
        let if_span = self.consume(TokenKind::If, "Expected 'if'")?.span;
        self.consume(TokenKind::LeftParen, "Expected '(' after 'if'")?;
        let cond = self.parse_expression()?;
        self.consume(TokenKind::RightParen, "Expected ')' after condition")?;

        let then_block = self.parse_block()?;
        let mut end_span = then_block.span;

        let else_block = if self.match_token(TokenKind::Else) {
            let block = if self.check(TokenKind::If) {
                // `else if` desugars to an else block holding one if statement
                let nested = self.parse_if_stmt()?;
                let span = nested.span();
                Block {
                    statements: vec![nested],
                    span,
                }
            } else {
                self.parse_block()?
            };
            end_span = block.span;
            Some(block)
        } else {
            None
        };

        Ok(Stmt::If(IfStmt {
            cond,
            then_block,
            else_block,
            span: if_span.merge(end_span),
        }))
    }

    fn parse_while_stmt(&mut self) -> Result<Stmt, ()> {
        let while_span = self.consume(TokenKind::While, "Expected 'while'")?.span;
        self.consume(TokenKind::LeftParen, "Expected '(' after 'while'")?;
        let cond = self.parse_expression()?;
        self.consume(TokenKind::RightParen, "Expected ')' after condition")?;
        self.loop_depth += 1;
        let body = self.parse_block();
        self.loop_depth -= 1;
        let body = body?;
        let end_span = body.span;

        Ok(Stmt::While(WhileStmt {
            cond,
            body,
            span: while_span.merge(end_span),
        }))
    }

    fn parse_return_stmt(&mut self) -> Result<Stmt, ()> {
        let return_span = self.consume(TokenKind::Return, "Expected 'return'")?.span;

        let value = if !self.check(TokenKind::Semicolon) {
            Some(self.parse_expression()?)
        } else {
            None
        };

        let end_span = self
            .consume(TokenKind::Semicolon, "Expected ';' after return")?
            .span;

        Ok(Stmt::Return(ReturnStmt {
            value,
            span: return_span.merge(end_span),
        }))
    }
}
