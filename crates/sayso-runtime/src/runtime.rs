//! Sayso runtime API for embedding

use crate::diagnostic::Diagnostic;
use crate::interpreter::Interpreter;
use crate::lexer::Lexer;
use crate::parser::Parser;
use crate::span::Span;
use crate::value::{RuntimeError, Value};
use std::cell::RefCell;

/// Result type for runtime operations
pub type RuntimeResult<T> = Result<T, Vec<Diagnostic>>;

/// Sayso runtime instance
///
/// Provides a high-level API for embedding Sayso in host applications.
/// Interpreter state persists across `eval` calls, so a REPL can feed
/// lines one at a time.
///
/// # Examples
///
/// ```
/// use sayso_runtime::Sayso;
///
/// let runtime = Sayso::new();
/// let result = runtime.eval("1 + 2");
/// ```
pub struct Sayso {
    /// Interpreter for executing code (using interior mutability)
    interpreter: RefCell<Interpreter>,
}

impl Sayso {
    /// Create a new Sayso runtime instance
    pub fn new() -> Self {
        Self {
            interpreter: RefCell::new(Interpreter::new()),
        }
    }

    /// Evaluate Sayso source code.
    ///
    /// Returns the last bare expression's value, or diagnostics if the
    /// source fails to tokenize, parse, or run.
    ///
    /// # Examples
    ///
    /// ```
    /// use sayso_runtime::{Sayso, Value};
    ///
    /// let runtime = Sayso::new();
    /// match runtime.eval("1 + 2") {
    ///     Ok(value) => assert_eq!(value, Value::int(3)),
    ///     Err(diagnostics) => panic!("Error: {:?}", diagnostics),
    /// }
    /// ```
    pub fn eval(&self, source: &str) -> RuntimeResult<Value> {
        // Lexical failure aborts before parsing
        let mut lexer = Lexer::new(source);
        let (tokens, lex_diagnostics) = lexer.tokenize();
        if !lex_diagnostics.is_empty() {
            return Err(lex_diagnostics);
        }

        // Parse failure aborts before execution
        let mut parser = Parser::new(tokens);
        let (program, parse_diagnostics) = parser.parse();
        if !parse_diagnostics.is_empty() {
            return Err(parse_diagnostics);
        }

        let mut interpreter = self.interpreter.borrow_mut();
        match interpreter.run(&program) {
            Ok(value) => Ok(value),
            Err(runtime_error) => Err(vec![runtime_error_to_diagnostic(runtime_error)]),
        }
    }

    /// Evaluate a Sayso source file.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use sayso_runtime::Sayso;
    ///
    /// let runtime = Sayso::new();
    /// let result = runtime.eval_file("program.say");
    /// ```
    pub fn eval_file(&self, path: &str) -> RuntimeResult<Value> {
        let source = std::fs::read_to_string(path).map_err(|e| {
            vec![Diagnostic::error(
                format!("Failed to read file: {}", e),
                Span::dummy(),
            )]
        })?;

        self.eval(&source)
            .map_err(|diagnostics| diagnostics.into_iter().map(|d| d.with_file(path)).collect())
    }

    /// Bind a name in the root environment (for embedding and tests)
    pub fn define_global(&self, name: impl Into<String>, value: Value) {
        self.interpreter.borrow_mut().define_global(name, value);
    }

    /// Read a name from the root environment (for embedding and tests)
    pub fn global(&self, name: &str) -> Option<Value> {
        self.interpreter.borrow().global(name)
    }
}

impl Default for Sayso {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert a RuntimeError to a Diagnostic
fn runtime_error_to_diagnostic(error: RuntimeError) -> Diagnostic {
    let code = match &error {
        RuntimeError::UndefinedVariable { .. } => "SY2000",
        RuntimeError::UndefinedFunction { .. } => "SY2001",
        RuntimeError::NotCallable { .. } => "SY2002",
        RuntimeError::TypeError { .. } => "SY2003",
        RuntimeError::DivideByZero { .. } => "SY2004",
        RuntimeError::MissingArgument { .. } => "SY2005",
        RuntimeError::InvalidBuiltinArgument { .. } => "SY2006",
        RuntimeError::IoError { .. } => "SY2007",
    };

    Diagnostic::error_with_code(code, error.to_string(), error.span()).with_label("runtime error")
}
