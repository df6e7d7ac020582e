//! Statement parsing
//!
//! Dispatch is driven by the statement's leading token: a fixed set of
//! keywords routes to dedicated parsers, anything else parses as a bare
//! expression statement. An unknown leading keyword is a parse failure.

use crate::ast::*;
use crate::parser::Parser;
use crate::token::TokenKind;
use std::rc::Rc;

impl Parser {
    /// Parse a single statement
    pub(super) fn parse_statement(&mut self) -> Result<Stmt, ()> {
        match self.peek().kind {
            TokenKind::Doc => self.parse_doc(),
            TokenKind::Try => self.parse_try_catch(),
            TokenKind::Say => self.parse_print(),
            TokenKind::Add => self.parse_add_to(),
            TokenKind::Subtract => self.parse_subtract_from(),
            TokenKind::Multiply => self.parse_multiply_by(),
            TokenKind::Divide => self.parse_divide_by(),
            TokenKind::Input => self.parse_input(),
            TokenKind::Remember => self.parse_remember(),
            TokenKind::If => self.parse_if(),
            TokenKind::For => self.parse_for_each(),
            TokenKind::When => self.parse_func_def(),
            TokenKind::Return => self.parse_return(),
            TokenKind::Get => self.parse_import(),
            // Lambda literals double as (no-op) statements
            TokenKind::Lambda => Ok(Stmt::Expr(self.parse_lambda()?)),
            TokenKind::Do if self.peek_ahead(1).kind == TokenKind::LeftParen => {
                Ok(Stmt::Expr(self.parse_lambda()?))
            }
            // `yes`/`no` start ordinary expressions
            TokenKind::Yes | TokenKind::No => Ok(Stmt::Expr(self.parse_expression()?)),
            kind if kind.is_reserved_word() => {
                let message = format!("Unknown keyword '{}'", self.peek().lexeme);
                self.error(&message);
                Err(())
            }
            _ => Ok(Stmt::Expr(self.parse_expression()?)),
        }
    }

    /// Parse statements up to (and including) a closing `end`-style keyword
    pub(super) fn parse_body(&mut self, terminator: TokenKind) -> Result<Vec<Stmt>, ()> {
        let mut body = Vec::new();
        while !self.check(terminator) {
            if self.is_at_end() {
                self.error_expected(&format!("Expected '{}'", terminator.as_str()));
                return Err(());
            }
            body.push(self.parse_statement()?);
        }
        self.advance(); // terminator
        Ok(body)
    }

    /// `doc "<text>" <stmt>`
    fn parse_doc(&mut self) -> Result<Stmt, ()> {
        let doc_span = self.consume(TokenKind::Doc, "Expected 'doc'")?.span;
        let text = self
            .consume(TokenKind::String, "Expected documentation string after 'doc'")?
            .lexeme
            .clone();
        let stmt = self.parse_statement()?;
        Ok(Stmt::Doc(DocStmt {
            text,
            stmt: Box::new(stmt),
            span: doc_span,
        }))
    }

    /// `try <body> if_it_fails <body> end`
    fn parse_try_catch(&mut self) -> Result<Stmt, ()> {
        let try_span = self.consume(TokenKind::Try, "Expected 'try'")?.span;
        let try_body = self.parse_body(TokenKind::IfItFails)?;
        let catch_body = self.parse_body(TokenKind::End)?;
        Ok(Stmt::TryCatch(TryCatchStmt {
            try_body,
            catch_body,
            span: try_span,
        }))
    }

    /// `say e1, e2, … [with <sep> between]`
    fn parse_print(&mut self) -> Result<Stmt, ()> {
        let say_span = self.consume(TokenKind::Say, "Expected 'say'")?.span;

        let mut exprs = vec![self.parse_expression()?];
        while self.match_token(TokenKind::Comma) {
            exprs.push(self.parse_expression()?);
        }

        let sep = if self.match_token(TokenKind::With) {
            let sep = self.parse_expression()?;
            self.match_token(TokenKind::Between); // trailing 'between' is optional
            Some(sep)
        } else {
            None
        };

        let span = say_span.merge(exprs.last().map(|e| e.span()).unwrap_or(say_span));
        Ok(Stmt::Print(PrintStmt { exprs, sep, span }))
    }

    /// `add <expr> to <ident>`
    fn parse_add_to(&mut self) -> Result<Stmt, ()> {
        let start = self.consume(TokenKind::Add, "Expected 'add'")?.span;
        let value = self.parse_expression()?;
        self.consume(TokenKind::To, "Expected 'to' after value")?;
        let target = self.consume_identifier("a variable name")?;
        let span = start.merge(target.span);
        Ok(Stmt::Compound(CompoundStmt {
            target,
            op: CompoundOp::Add,
            value,
            span,
        }))
    }

    /// `subtract <expr> from <ident>`
    fn parse_subtract_from(&mut self) -> Result<Stmt, ()> {
        let start = self.consume(TokenKind::Subtract, "Expected 'subtract'")?.span;
        let value = self.parse_expression()?;
        self.consume(TokenKind::From, "Expected 'from' after value")?;
        let target = self.consume_identifier("a variable name")?;
        let span = start.merge(target.span);
        Ok(Stmt::Compound(CompoundStmt {
            target,
            op: CompoundOp::Subtract,
            value,
            span,
        }))
    }

    /// `multiply <ident> by <expr>`
    fn parse_multiply_by(&mut self) -> Result<Stmt, ()> {
        let start = self.consume(TokenKind::Multiply, "Expected 'multiply'")?.span;
        let target = self.consume_identifier("a variable name")?;
        self.consume(TokenKind::By, "Expected 'by' after variable")?;
        let value = self.parse_expression()?;
        let span = start.merge(value.span());
        Ok(Stmt::Compound(CompoundStmt {
            target,
            op: CompoundOp::Multiply,
            value,
            span,
        }))
    }

    /// `divide <ident> by <expr>`
    fn parse_divide_by(&mut self) -> Result<Stmt, ()> {
        let start = self.consume(TokenKind::Divide, "Expected 'divide'")?.span;
        let target = self.consume_identifier("a variable name")?;
        self.consume(TokenKind::By, "Expected 'by' after variable")?;
        let value = self.parse_expression()?;
        let span = start.merge(value.span());
        Ok(Stmt::Compound(CompoundStmt {
            target,
            op: CompoundOp::Divide,
            value,
            span,
        }))
    }

    /// `input <prompt-expr>`
    fn parse_input(&mut self) -> Result<Stmt, ()> {
        let start = self.consume(TokenKind::Input, "Expected 'input'")?.span;
        let prompt = self.parse_expression()?;
        let span = start.merge(prompt.span());
        Ok(Stmt::Input(InputStmt { prompt, span }))
    }

    /// `remember <expr> as <ident>`
    fn parse_remember(&mut self) -> Result<Stmt, ()> {
        let start = self.consume(TokenKind::Remember, "Expected 'remember'")?.span;
        let expr = self.parse_expression()?;
        self.consume(TokenKind::As, "Expected 'as' after value")?;
        let name = self.consume_identifier("a variable name")?;
        let span = start.merge(name.span);
        Ok(Stmt::Remember(RememberStmt { name, expr, span }))
    }

    /// `if <condition> then <body> [else <body>] end`
    fn parse_if(&mut self) -> Result<Stmt, ()> {
        let start = self.consume(TokenKind::If, "Expected 'if'")?.span;
        let cond = self.parse_condition()?;
        self.consume(TokenKind::Then, "Expected 'then' after condition")?;

        let mut then_body = Vec::new();
        let mut else_body = None;
        loop {
            if self.match_token(TokenKind::End) {
                break;
            }
            if self.match_token(TokenKind::Else) {
                let body = self.parse_body(TokenKind::End)?;
                else_body = Some(body);
                break;
            }
            if self.is_at_end() {
                self.error_expected("Expected 'end'");
                return Err(());
            }
            then_body.push(self.parse_statement()?);
        }

        Ok(Stmt::If(IfStmt {
            cond,
            then_body,
            else_body,
            span: start,
        }))
    }

    /// `for each x in xs do … end`, or the mapping form
    /// `for each k, v in m do … end`
    fn parse_for_each(&mut self) -> Result<Stmt, ()> {
        let start = self.consume(TokenKind::For, "Expected 'for'")?.span;
        self.consume(TokenKind::Each, "Expected 'each' after 'for'")?;
        let first = self.consume_identifier("a loop variable name")?;

        if self.match_token(TokenKind::Comma) {
            let second = self.consume_identifier("a loop variable name")?;
            self.consume(TokenKind::In, "Expected 'in' after loop variables")?;
            let iterable = self.parse_expression()?;
            self.consume(TokenKind::Do, "Expected 'do' before loop body")?;
            let body = self.parse_body(TokenKind::End)?;
            return Ok(Stmt::ForEachPair(ForEachPairStmt {
                key: first,
                value: second,
                iterable,
                body,
                span: start,
            }));
        }

        self.consume(TokenKind::In, "Expected 'in' after loop variable")?;
        let iterable = self.parse_expression()?;
        self.consume(TokenKind::Do, "Expected 'do' before loop body")?;
        let body = self.parse_body(TokenKind::End)?;
        Ok(Stmt::ForEach(ForEachStmt {
            var: first,
            iterable,
            body,
            span: start,
        }))
    }

    /// `when <name>(<params>) <body> end`
    fn parse_func_def(&mut self) -> Result<Stmt, ()> {
        let start = self.consume(TokenKind::When, "Expected 'when'")?.span;
        let name = self.consume_identifier("a function name")?;
        self.consume(TokenKind::LeftParen, "Expected '(' after function name")?;

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

        let body = self.parse_body(TokenKind::End)?;
        Ok(Stmt::FuncDef(Rc::new(FuncDef {
            name: name.name,
            params,
            // Defaults and the variadic marker are representable in the
            // AST but have no surface syntax yet
            defaults: Default::default(),
            variadic: false,
            body,
            span: start,
        })))
    }

    /// `return <expr>`
    fn parse_return(&mut self) -> Result<Stmt, ()> {
        let start = self.consume(TokenKind::Return, "Expected 'return'")?.span;
        let value = self.parse_expression()?;
        let span = start.merge(value.span());
        Ok(Stmt::Return(ReturnStmt { value, span }))
    }

    /// `get <filename-expr>`
    fn parse_import(&mut self) -> Result<Stmt, ()> {
        let start = self.consume(TokenKind::Get, "Expected 'get'")?.span;
        let filename = self.parse_expression()?;
        let span = start.merge(filename.span());
        Ok(Stmt::Import(ImportStmt { filename, span }))
    }

    /// A condition is either a plain expression or the worded form
    /// `<expr> is <op-words> <expr>`
    pub(super) fn parse_condition(&mut self) -> Result<Expr, ()> {
        let left = self.parse_expression()?;

        if !self.match_token(TokenKind::Is) {
            return Ok(left);
        }

        let phrase_span = self.peek().span;
        let mut words = Vec::new();
        while matches!(
            self.peek().kind,
            TokenKind::Greater
                | TokenKind::Less
                | TokenKind::Than
                | TokenKind::Or
                | TokenKind::Equal
                | TokenKind::To
                | TokenKind::Not
        ) {
            words.push(self.advance().lexeme.clone());
        }

        let phrase = words.join(" ");
        let op = match phrase.as_str() {
            "greater than" => BinaryOp::Gt,
            "less than" => BinaryOp::Lt,
            "greater than or equal to" => BinaryOp::Ge,
            "less than or equal to" => BinaryOp::Le,
            "equal to" => BinaryOp::Eq,
            "not equal to" => BinaryOp::Ne,
            "not greater than" => BinaryOp::Le,
            "not less than" => BinaryOp::Ge,
            _ => {
                let message = format!("Unknown comparison phrase '{}'", phrase);
                self.diagnostics.push(
                    crate::diagnostic::Diagnostic::error_with_code("SY1001", message, phrase_span)
                        .with_label("syntax error")
                        .with_help(
                            "expected a phrase like 'greater than' or 'not equal to' after 'is'",
                        ),
                );
                return Err(());
            }
        };

        let right = self.parse_expression()?;
        let span = left.span().merge(right.span());
        Ok(Expr::Binary(BinaryExpr {
            op,
            left: Box::new(left),
            right: Box::new(right),
            span,
        }))
    }
}
