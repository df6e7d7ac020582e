//! Parsing (tokens to AST)
//!
//! Recursive descent for statements, precedence climbing for
//! expressions. A parse failure aborts the whole program: the first
//! expected/actual mismatch is recorded as a diagnostic and parsing
//! stops with no partial results.

mod expr;
mod stmt;

use crate::ast::{Identifier, Program, Stmt};
use crate::diagnostic::Diagnostic;
use crate::span::Span;
use crate::token::{Token, TokenKind};

/// Parser state for building the AST from tokens
pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    diagnostics: Vec<Diagnostic>,
}

impl Parser {
    /// Create a new parser for the given tokens
    pub fn new(tokens: Vec<Token>) -> Self {
        let mut tokens = tokens;
        if tokens.is_empty() {
            tokens.push(Token::new(TokenKind::Eof, "", Span::dummy()));
        }
        Self {
            tokens,
            current: 0,
            diagnostics: Vec::new(),
        }
    }

    /// Parse tokens into a program.
    ///
    /// On failure the returned diagnostics are non-empty and the program
    /// holds only the statements parsed before the error; callers treat
    /// any diagnostic as fatal.
    pub fn parse(&mut self) -> (Program, Vec<Diagnostic>) {
        let mut statements = Vec::new();

        while !self.is_at_end() {
            match self.parse_statement() {
                Ok(stmt) => statements.push(stmt),
                Err(()) => break,
            }
        }

        (Program { statements }, std::mem::take(&mut self.diagnostics))
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

    /// Peek `n` tokens ahead of the current one
    pub(super) fn peek_ahead(&self, n: usize) -> &Token {
        &self.tokens[(self.current + n).min(self.tokens.len() - 1)]
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
            self.error_expected(message);
            Err(())
        }
    }

    /// Consume an identifier token, with a clearer message for reserved words
    pub(super) fn consume_identifier(&mut self, context: &str) -> Result<Identifier, ()> {
        let current = self.peek();

        if current.kind == TokenKind::Identifier {
            let token = self.advance();
            Ok(Identifier {
                name: token.lexeme.clone(),
                span: token.span,
            })
        } else if current.kind.is_reserved_word() {
            let message = format!(
                "Cannot use reserved word '{}' as {}",
                current.lexeme, context
            );
            self.error(&message);
            Err(())
        } else {
            self.error_expected(&format!("Expected {}", context));
            Err(())
        }
    }

    /// Check if at end of token stream
    pub(super) fn is_at_end(&self) -> bool {
        self.current >= self.tokens.len() || self.tokens[self.current].kind == TokenKind::Eof
    }

    /// Record an error at the current token
    pub(super) fn error(&mut self, message: &str) {
        let span = self.peek().span;
        self.diagnostics.push(
            Diagnostic::error_with_code("SY1000", message, span)
                .with_label("syntax error")
                .with_help("check your syntax for typos or missing words"),
        );
    }

    /// Record an expected/actual mismatch at the current token
    pub(super) fn error_expected(&mut self, expected: &str) {
        let actual = if self.peek().kind == TokenKind::Eof {
            "end of input".to_string()
        } else {
            format!("'{}'", self.peek().lexeme)
        };
        let message = format!("{}, found {}", expected, actual);
        self.error(&message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::*;
    use crate::lexer::Lexer;

    fn parse_source(source: &str) -> (Program, Vec<Diagnostic>) {
        let mut lexer = Lexer::new(source);
        let (tokens, lex_diagnostics) = lexer.tokenize();
        assert!(lex_diagnostics.is_empty(), "lexical errors: {:?}", lex_diagnostics);
        let mut parser = Parser::new(tokens);
        parser.parse()
    }

    fn parse_ok(source: &str) -> Program {
        let (program, diagnostics) = parse_source(source);
        assert!(diagnostics.is_empty(), "parse errors: {:?}", diagnostics);
        program
    }

    fn parse_err(source: &str) -> Vec<Diagnostic> {
        let (_, diagnostics) = parse_source(source);
        assert!(!diagnostics.is_empty(), "expected a parse error for {:?}", source);
        diagnostics
    }

    #[test]
    fn test_parser_creation() {
        let mut parser = Parser::new(Vec::new());
        let (program, _) = parser.parse();
        assert_eq!(program.statements.len(), 0);
    }

    #[test]
    fn test_parse_remember() {
        let program = parse_ok("remember 5 as x");
        match &program.statements[0] {
            Stmt::Remember(decl) => {
                assert_eq!(decl.name.name, "x");
                assert_eq!(decl.expr, Expr::Literal(Literal::Int(5), decl.expr.span()));
            }
            other => panic!("Expected remember statement, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_say_multiple_values() {
        let program = parse_ok(r#"say 1, 2, 3"#);
        match &program.statements[0] {
            Stmt::Print(print) => {
                assert_eq!(print.exprs.len(), 3);
                assert!(print.sep.is_none());
            }
            other => panic!("Expected print statement, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_say_with_separator() {
        let program = parse_ok(r#"say 1, 2 with ", " between"#);
        match &program.statements[0] {
            Stmt::Print(print) => {
                assert_eq!(print.exprs.len(), 2);
                assert!(print.sep.is_some());
            }
            other => panic!("Expected print statement, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_compound_forms() {
        let program = parse_ok("add 1 to x\nsubtract 2 from y\nmultiply z by 3\ndivide w by 4");
        let ops: Vec<CompoundOp> = program
            .statements
            .iter()
            .map(|s| match s {
                Stmt::Compound(c) => c.op,
                other => panic!("Expected compound statement, got {:?}", other),
            })
            .collect();
        assert_eq!(
            ops,
            vec![
                CompoundOp::Add,
                CompoundOp::Subtract,
                CompoundOp::Multiply,
                CompoundOp::Divide
            ]
        );
    }

    #[test]
    fn test_parse_if_else() {
        let program = parse_ok("if x then say 1 else say 2 end");
        match &program.statements[0] {
            Stmt::If(if_stmt) => {
                assert_eq!(if_stmt.then_body.len(), 1);
                assert_eq!(if_stmt.else_body.as_ref().unwrap().len(), 1);
            }
            other => panic!("Expected if statement, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_condition_phrase() {
        let program = parse_ok("if x is greater than 3 then say x end");
        match &program.statements[0] {
            Stmt::If(if_stmt) => match &if_stmt.cond {
                Expr::Binary(b) => assert_eq!(b.op, BinaryOp::Gt),
                other => panic!("Expected binary condition, got {:?}", other),
            },
            other => panic!("Expected if statement, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_condition_long_phrases() {
        let cases = [
            ("greater than or equal to", BinaryOp::Ge),
            ("less than or equal to", BinaryOp::Le),
            ("equal to", BinaryOp::Eq),
            ("not equal to", BinaryOp::Ne),
            ("not greater than", BinaryOp::Le),
            ("not less than", BinaryOp::Ge),
        ];
        for (phrase, op) in cases {
            let program = parse_ok(&format!("if x is {} 3 then say x end", phrase));
            match &program.statements[0] {
                Stmt::If(if_stmt) => match &if_stmt.cond {
                    Expr::Binary(b) => assert_eq!(b.op, op, "phrase {:?}", phrase),
                    other => panic!("Expected binary condition, got {:?}", other),
                },
                other => panic!("Expected if statement, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_parse_condition_unknown_phrase() {
        let diagnostics = parse_err("if x is not than 3 then say x end");
        assert!(diagnostics[0].message.contains("not than"));
    }

    #[test]
    fn test_parse_for_each() {
        let program = parse_ok("for each item in [1, 2] do say item end");
        match &program.statements[0] {
            Stmt::ForEach(f) => assert_eq!(f.var.name, "item"),
            other => panic!("Expected for-each statement, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_for_each_pair() {
        let program = parse_ok("for each k, v in ages do say k end");
        match &program.statements[0] {
            Stmt::ForEachPair(f) => {
                assert_eq!(f.key.name, "k");
                assert_eq!(f.value.name, "v");
            }
            other => panic!("Expected mapping for-each statement, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_func_def() {
        let program = parse_ok("when greet(name) say name end");
        match &program.statements[0] {
            Stmt::FuncDef(func) => {
                assert_eq!(func.name, "greet");
                assert_eq!(func.params, vec!["name".to_string()]);
                assert!(func.defaults.is_empty());
                assert!(!func.variadic);
            }
            other => panic!("Expected function definition, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_lambda_expression() {
        let program = parse_ok("remember lambda (a, b) -> return a end as f");
        match &program.statements[0] {
            Stmt::Remember(decl) => match &decl.expr {
                Expr::Lambda(lambda) => assert_eq!(lambda.params.len(), 2),
                other => panic!("Expected lambda expression, got {:?}", other),
            },
            other => panic!("Expected remember statement, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_do_block_statement() {
        // A lambda as a bare statement is valid (and a no-op at runtime)
        let program = parse_ok("do (x) -> say x end");
        assert!(matches!(&program.statements[0], Stmt::Expr(Expr::Lambda(_))));
    }

    #[test]
    fn test_parse_try_catch() {
        let program = parse_ok("try say 1 if_it_fails say 2 end");
        match &program.statements[0] {
            Stmt::TryCatch(t) => {
                assert_eq!(t.try_body.len(), 1);
                assert_eq!(t.catch_body.len(), 1);
            }
            other => panic!("Expected try/catch statement, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_doc_wrapper() {
        let program = parse_ok(r#"doc "adds things" when f(a) return a end"#);
        match &program.statements[0] {
            Stmt::Doc(doc) => {
                assert_eq!(doc.text, "adds things");
                assert!(matches!(doc.stmt.as_ref(), Stmt::FuncDef(_)));
            }
            other => panic!("Expected doc statement, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_import() {
        let program = parse_ok(r#"get "helpers""#);
        assert!(matches!(&program.statements[0], Stmt::Import(_)));
    }

    #[test]
    fn test_precedence_multiplication_binds_tighter() {
        // 1 + 2 * 3 parses as 1 + (2 * 3)
        let program = parse_ok("1 + 2 * 3");
        match &program.statements[0] {
            Stmt::Expr(Expr::Binary(add)) => {
                assert_eq!(add.op, BinaryOp::Add);
                match add.right.as_ref() {
                    Expr::Binary(mul) => assert_eq!(mul.op, BinaryOp::Mul),
                    other => panic!("Expected multiplication on the right, got {:?}", other),
                }
            }
            other => panic!("Expected binary expression, got {:?}", other),
        }
    }

    #[test]
    fn test_precedence_parentheses() {
        // (1 + 2) * 3 parses as (1 + 2) * 3
        let program = parse_ok("(1 + 2) * 3");
        match &program.statements[0] {
            Stmt::Expr(Expr::Binary(mul)) => {
                assert_eq!(mul.op, BinaryOp::Mul);
                match mul.left.as_ref() {
                    Expr::Binary(add) => assert_eq!(add.op, BinaryOp::Add),
                    other => panic!("Expected addition on the left, got {:?}", other),
                }
            }
            other => panic!("Expected binary expression, got {:?}", other),
        }
    }

    #[test]
    fn test_left_associativity() {
        // 1 - 2 - 3 parses as (1 - 2) - 3
        let program = parse_ok("1 - 2 - 3");
        match &program.statements[0] {
            Stmt::Expr(Expr::Binary(outer)) => {
                assert_eq!(outer.op, BinaryOp::Sub);
                assert!(matches!(outer.left.as_ref(), Expr::Binary(_)));
                assert!(matches!(
                    outer.right.as_ref(),
                    Expr::Literal(Literal::Int(3), _)
                ));
            }
            other => panic!("Expected binary expression, got {:?}", other),
        }
    }

    #[test]
    fn test_concat_binds_loosest() {
        // "n = " .. 1 + 2 parses as "n = " .. (1 + 2)
        let program = parse_ok(r#""n = " .. 1 + 2"#);
        match &program.statements[0] {
            Stmt::Expr(Expr::Binary(concat)) => {
                assert_eq!(concat.op, BinaryOp::Concat);
                assert!(matches!(concat.right.as_ref(), Expr::Binary(_)));
            }
            other => panic!("Expected binary expression, got {:?}", other),
        }
    }

    #[test]
    fn test_template_string_detected() {
        let program = parse_ok(r#"say "hello {name}""#);
        match &program.statements[0] {
            Stmt::Print(print) => assert!(matches!(&print.exprs[0], Expr::Template(_))),
            other => panic!("Expected print statement, got {:?}", other),
        }
    }

    #[test]
    fn test_plain_string_is_literal() {
        let program = parse_ok(r#"say "hello""#);
        match &program.statements[0] {
            Stmt::Print(print) => {
                assert!(matches!(&print.exprs[0], Expr::Literal(Literal::Str(_), _)))
            }
            other => panic!("Expected print statement, got {:?}", other),
        }
    }

    #[test]
    fn test_map_literal() {
        let program = parse_ok(r#"remember {"a": 1, "b": 2} as m"#);
        match &program.statements[0] {
            Stmt::Remember(decl) => match &decl.expr {
                Expr::Map(map) => assert_eq!(map.pairs.len(), 2),
                other => panic!("Expected map literal, got {:?}", other),
            },
            other => panic!("Expected remember statement, got {:?}", other),
        }
    }

    #[test]
    fn test_call_vs_variable() {
        let program = parse_ok("f(1, 2)\nf");
        assert!(matches!(&program.statements[0], Stmt::Expr(Expr::Call(_))));
        assert!(matches!(&program.statements[1], Stmt::Expr(Expr::Variable(_))));
    }

    #[test]
    fn test_zero_argument_call() {
        let program = parse_ok("clear()");
        match &program.statements[0] {
            Stmt::Expr(Expr::Call(call)) => assert!(call.args.is_empty()),
            other => panic!("Expected call, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_leading_keyword_fails() {
        let diagnostics = parse_err("end");
        assert!(diagnostics[0].message.contains("end"));
    }

    #[test]
    fn test_missing_then_fails() {
        let diagnostics = parse_err("if x say 1 end");
        assert!(diagnostics[0].message.contains("Expected 'then'"));
    }

    #[test]
    fn test_missing_end_fails() {
        parse_err("if x then say 1");
    }

    #[test]
    fn test_reserved_word_as_name_fails() {
        let diagnostics = parse_err("remember 1 as end");
        assert!(diagnostics[0].message.contains("reserved word"));
    }

    #[test]
    fn test_first_error_aborts_parse() {
        // No recovery: the bad statement stops the parse entirely
        let (program, diagnostics) = parse_source("say 1\nif x say 2 end\nsay 3");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(program.statements.len(), 1);
    }
}
