//! AST interpreter (tree-walking)
//!
//! Direct AST evaluation over a chain of environments:
//! - conditional/loop/try bodies run in the environment of their
//!   enclosing statement list (no block scoping),
//! - named-function calls get a fresh environment chained to the
//!   call-site environment (no lexical capture),
//! - closure calls get a fresh environment chained to the closure's
//!   captured defining environment.
//!
//! A per-frame "locals" set tracks names introduced by `remember … as`;
//! blocks receive a fresh copy per execution, calls start from their
//! parameter names.

mod expr;
mod stmt;

use crate::ast::Program;
use crate::environment::Environment;
use crate::value::{RuntimeError, Value};
use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

/// Control flow signal for return propagation. A pending `Return` stops
/// every enclosing block up to the nearest function or closure boundary,
/// which consumes it.
#[derive(Debug, Clone, PartialEq)]
pub(super) enum Signal {
    None,
    Return(Value),
}

/// Interpreter state
pub struct Interpreter {
    /// Root environment, created once per run and alive for the whole
    /// program
    globals: Rc<RefCell<Environment>>,
    /// Pending control-flow signal
    signal: Signal,
}

impl Interpreter {
    /// Create a new interpreter with an empty root environment
    pub fn new() -> Self {
        Self {
            globals: Rc::new(RefCell::new(Environment::new())),
            signal: Signal::None,
        }
    }

    /// Execute a program against the root environment.
    ///
    /// Returns the last bare expression's value (useful for embedding and
    /// the REPL), or the value of a top-level `return`.
    pub fn run(&mut self, program: &Program) -> Result<Value, RuntimeError> {
        let globals = Rc::clone(&self.globals);
        let mut locals = HashSet::new();
        let last_value = self.exec_block(&program.statements, &globals, &mut locals)?;

        match std::mem::replace(&mut self.signal, Signal::None) {
            Signal::Return(value) => Ok(value),
            Signal::None => Ok(last_value),
        }
    }

    /// Bind a name in the root environment (for embedding and tests)
    pub fn define_global(&mut self, name: impl Into<String>, value: Value) {
        self.globals.borrow_mut().define(name, value);
    }

    /// Read a name from the root environment (for embedding and tests)
    pub fn global(&self, name: &str) -> Option<Value> {
        self.globals.borrow().get(name)
    }

    /// Execute a statement sequence against the given environment and
    /// locals set, stopping early when a signal is raised
    pub(super) fn exec_block(
        &mut self,
        stmts: &[crate::ast::Stmt],
        env: &Rc<RefCell<Environment>>,
        locals: &mut HashSet<String>,
    ) -> Result<Value, RuntimeError> {
        let mut last_value = Value::Nothing;

        for stmt in stmts {
            last_value = self.exec_stmt(stmt, env, locals)?;
            if self.signal != Signal::None {
                break;
            }
        }

        Ok(last_value)
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use crate::parser::Parser;

    fn run_source(interpreter: &mut Interpreter, source: &str) -> Result<Value, RuntimeError> {
        let mut lexer = Lexer::new(source);
        let (tokens, lex_diagnostics) = lexer.tokenize();
        assert!(lex_diagnostics.is_empty(), "lexical errors: {:?}", lex_diagnostics);
        let mut parser = Parser::new(tokens);
        let (program, parse_diagnostics) = parser.parse();
        assert!(parse_diagnostics.is_empty(), "parse errors: {:?}", parse_diagnostics);
        interpreter.run(&program)
    }

    #[test]
    fn test_state_persists_across_runs() {
        let mut interpreter = Interpreter::new();
        run_source(&mut interpreter, "remember 3 as x").unwrap();
        let result = run_source(&mut interpreter, "x + 1").unwrap();
        assert_eq!(result, Value::int(4));
    }

    #[test]
    fn test_define_and_read_global() {
        let mut interpreter = Interpreter::new();
        interpreter.define_global("x", Value::int(42));
        assert_eq!(interpreter.global("x"), Some(Value::int(42)));
        assert_eq!(run_source(&mut interpreter, "x").unwrap(), Value::int(42));
    }

    #[test]
    fn test_top_level_return_stops_program() {
        let mut interpreter = Interpreter::new();
        let result = run_source(&mut interpreter, "remember 1 as x\nreturn 9\nremember 2 as x").unwrap();
        assert_eq!(result, Value::int(9));
        assert_eq!(interpreter.global("x"), Some(Value::int(1)));
    }
}
