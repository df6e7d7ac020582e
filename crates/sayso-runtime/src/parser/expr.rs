//! Expression parsing (precedence climbing)
//!
//! The operator table: concatenation `..` = 1, comparisons = 2, additive
//! = 3, multiplicative = 4. An operator is accepted when its precedence
//! is at least the current minimum, and its right operand parses with
//! minimum = precedence + 1, which makes equal-precedence chains
//! left-associative.

use crate::ast::*;
use crate::parser::Parser;
use crate::token::TokenKind;
use std::rc::Rc;

/// Binary operator and precedence for an infix token, if any
fn binary_op(kind: TokenKind) -> Option<(BinaryOp, u8)> {
    match kind {
        TokenKind::DotDot => Some((BinaryOp::Concat, 1)),
        TokenKind::EqEq => Some((BinaryOp::Eq, 2)),
        TokenKind::NotEq => Some((BinaryOp::Ne, 2)),
        TokenKind::Ge => Some((BinaryOp::Ge, 2)),
        TokenKind::Le => Some((BinaryOp::Le, 2)),
        TokenKind::Gt => Some((BinaryOp::Gt, 2)),
        TokenKind::Lt => Some((BinaryOp::Lt, 2)),
        TokenKind::Plus => Some((BinaryOp::Add, 3)),
        TokenKind::Minus => Some((BinaryOp::Sub, 3)),
        TokenKind::Star => Some((BinaryOp::Mul, 4)),
        TokenKind::Slash => Some((BinaryOp::Div, 4)),
        _ => None,
    }
}

impl Parser {
    /// Parse an expression
    pub(super) fn parse_expression(&mut self) -> Result<Expr, ()> {
        self.parse_precedence(0)
    }

    /// Parse an expression whose operators all have precedence >= `min_prec`
    fn parse_precedence(&mut self, min_prec: u8) -> Result<Expr, ()> {
        let mut left = self.parse_primary()?;

        while let Some((op, prec)) = binary_op(self.peek().kind) {
            if prec < min_prec {
                break;
            }
            self.advance();
            let right = self.parse_precedence(prec + 1)?;
            let span = left.span().merge(right.span());
            left = Expr::Binary(BinaryExpr {
                op,
                left: Box::new(left),
                right: Box::new(right),
                span,
            });
        }

        Ok(left)
    }

    /// Parse a primary expression
    fn parse_primary(&mut self) -> Result<Expr, ()> {
        match self.peek().kind {
            TokenKind::Number => self.parse_number(),
            TokenKind::String => self.parse_string(),
            TokenKind::Yes | TokenKind::No => self.parse_bool(),
            TokenKind::LeftBracket => self.parse_list(),
            TokenKind::LeftBrace => self.parse_map(),
            TokenKind::Lambda | TokenKind::Do => self.parse_lambda(),
            TokenKind::Identifier => self.parse_identifier(),
            TokenKind::LeftParen => self.parse_group(),
            _ => {
                self.error_expected("Expected expression");
                Err(())
            }
        }
    }

    /// Parse a number literal; a decimal point selects floating-point
    fn parse_number(&mut self) -> Result<Expr, ()> {
        let token = self.advance();
        let span = token.span;
        let lexeme = token.lexeme.clone();

        let literal = if lexeme.contains('.') {
            Literal::Float(lexeme.parse().unwrap_or(0.0))
        } else {
            match lexeme.parse::<i64>() {
                Ok(value) => Literal::Int(value),
                // Literal too large for an integer
                Err(_) => Literal::Float(lexeme.parse().unwrap_or(0.0)),
            }
        };

        Ok(Expr::Literal(literal, span))
    }

    /// Parse a string literal; `{…}` placeholders make it a template
    fn parse_string(&mut self) -> Result<Expr, ()> {
        let token = self.advance();
        let span = token.span;
        let text = token.lexeme.clone();

        if text.contains('{') && text.contains('}') {
            Ok(Expr::Template(TemplateExpr { text, span }))
        } else {
            Ok(Expr::Literal(Literal::Str(text), span))
        }
    }

    /// Parse `yes` / `no`
    fn parse_bool(&mut self) -> Result<Expr, ()> {
        let token = self.advance();
        let value = token.kind == TokenKind::Yes;
        Ok(Expr::Literal(Literal::Bool(value), token.span))
    }

    /// Parse an identifier: a call when followed by `(`, otherwise a
    /// variable reference
    fn parse_identifier(&mut self) -> Result<Expr, ()> {
        let token = self.advance();
        let callee = Identifier {
            name: token.lexeme.clone(),
            span: token.span,
        };

        if self.check(TokenKind::LeftParen) {
            return self.parse_call(callee);
        }

        Ok(Expr::Variable(callee))
    }

    /// Parse a parenthesized sub-expression
    fn parse_group(&mut self) -> Result<Expr, ()> {
        self.consume(TokenKind::LeftParen, "Expected '('")?;
        let expr = self.parse_expression()?;
        self.consume(TokenKind::RightParen, "Expected ')'")?;
        Ok(expr)
    }

    /// Parse a list literal `[e1, e2, …]`
    fn parse_list(&mut self) -> Result<Expr, ()> {
        let start = self.consume(TokenKind::LeftBracket, "Expected '['")?.span;
        let mut elements = Vec::new();

        while !self.check(TokenKind::RightBracket) {
            elements.push(self.parse_expression()?);
            if !self.match_token(TokenKind::Comma) {
                break;
            }
        }

        let end = self.consume(TokenKind::RightBracket, "Expected ']'")?.span;
        Ok(Expr::List(ListExpr {
            elements,
            span: start.merge(end),
        }))
    }

    /// Parse a mapping literal `{k1: v1, k2: v2, …}`
    fn parse_map(&mut self) -> Result<Expr, ()> {
        let start = self.consume(TokenKind::LeftBrace, "Expected '{'")?.span;
        let mut pairs = Vec::new();

        while !self.check(TokenKind::RightBrace) {
            let key = self.parse_expression()?;
            self.consume(TokenKind::Colon, "Expected ':' after mapping key")?;
            let value = self.parse_expression()?;
            pairs.push((key, value));
            if !self.match_token(TokenKind::Comma) {
                break;
            }
        }

        let end = self.consume(TokenKind::RightBrace, "Expected '}'")?.span;
        Ok(Expr::Map(MapExpr {
            pairs,
            span: start.merge(end),
        }))
    }

    /// Parse a lambda literal: `lambda (a, b) -> <body> end`, also
    /// spelled `do (a, b) -> <body> end`. The arrow is the token pair
    /// `-` `>` (the token set has no dedicated arrow token).
    pub(super) fn parse_lambda(&mut self) -> Result<Expr, ()> {
        let start = self.advance().span; // 'lambda' or 'do'
        self.consume(TokenKind::LeftParen, "Expected '(' after 'lambda'")?;

        let mut params = Vec::new();
        if !self.check(TokenKind::RightParen) {
            loop {
                let param = self.consume_identifier("a parameter name")?;
                params.push(param.name);
                if !self.match_token(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.consume(TokenKind::RightParen, "Expected ')' after parameters")?;

        self.consume(TokenKind::Minus, "Expected '->' after lambda parameters")?;
        self.consume(TokenKind::Gt, "Expected '->' after lambda parameters")?;

        let body = self.parse_body(TokenKind::End)?;
        Ok(Expr::Lambda(Rc::new(LambdaExpr {
            params,
            body,
            span: start,
        })))
    }

    /// Parse a call's argument list; the callee name was already consumed
    fn parse_call(&mut self, callee: Identifier) -> Result<Expr, ()> {
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

        let end = self.consume(TokenKind::RightParen, "Expected ')' after arguments")?.span;
        let span = callee.span.merge(end);
        Ok(Expr::Call(CallExpr { callee, args, span }))
    }
}
