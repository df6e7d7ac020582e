//! Statement execution

use crate::ast::*;
use crate::environment::Environment;
use crate::interpreter::{Interpreter, Signal};
use crate::lexer::Lexer;
use crate::parser::Parser;
use crate::value::{FunctionValue, RuntimeError, Value};
use std::cell::RefCell;
use std::collections::HashSet;
use std::io::{BufRead, Write};
use std::rc::Rc;

/// Module files use this extension; `get` appends it when absent
pub const MODULE_EXTENSION: &str = ".say";

impl Interpreter {
    /// Execute a statement. Control statements produce `Nothing`; a bare
    /// expression statement produces its value.
    pub(super) fn exec_stmt(
        &mut self,
        stmt: &Stmt,
        env: &Rc<RefCell<Environment>>,
        locals: &mut HashSet<String>,
    ) -> Result<Value, RuntimeError> {
        match stmt {
            Stmt::Doc(doc) => self.exec_doc(doc, env, locals),
            Stmt::Print(print) => self.exec_print(print, env),
            Stmt::Compound(compound) => self.exec_compound(compound, env),
            Stmt::Input(input) => self.exec_input(input, env),
            Stmt::Remember(decl) => self.exec_remember(decl, env, locals),
            Stmt::If(if_stmt) => self.exec_if(if_stmt, env, locals),
            Stmt::ForEach(for_stmt) => self.exec_for_each(for_stmt, env, locals),
            Stmt::ForEachPair(for_stmt) => self.exec_for_each_pair(for_stmt, env, locals),
            Stmt::FuncDef(func) => {
                let value = Value::Function(Rc::new(FunctionValue::new(Rc::clone(func))));
                env.borrow_mut().define(func.name.clone(), value);
                Ok(Value::Nothing)
            }
            Stmt::Import(import) => self.exec_import(import, env),
            Stmt::TryCatch(try_stmt) => self.exec_try_catch(try_stmt, env, locals),
            Stmt::Return(return_stmt) => {
                let value = self.eval_expr(&return_stmt.value, env)?;
                self.signal = Signal::Return(value);
                Ok(Value::Nothing)
            }
            Stmt::Expr(expr) => self.eval_expr(expr, env),
        }
    }

    /// Record the documentation text, then execute the wrapped statement
    fn exec_doc(
        &mut self,
        doc: &DocStmt,
        env: &Rc<RefCell<Environment>>,
        locals: &mut HashSet<String>,
    ) -> Result<Value, RuntimeError> {
        // Key by the wrapped statement's name where it has one, falling
        // back to node identity for unnamed statements
        let key = match doc.stmt.as_ref() {
            Stmt::FuncDef(func) => format!("_doc_{}", func.name),
            Stmt::Remember(decl) => format!("_doc_{}", decl.name.name),
            other => format!("_doc_{:p}", other as *const Stmt),
        };
        env.borrow_mut().define(key, Value::string(doc.text.clone()));
        self.exec_stmt(&doc.stmt, env, locals)
    }

    /// Evaluate every expression left-to-right, join with the separator
    /// (default: one space), and write one line to stdout
    fn exec_print(
        &mut self,
        print: &PrintStmt,
        env: &Rc<RefCell<Environment>>,
    ) -> Result<Value, RuntimeError> {
        let mut parts = Vec::with_capacity(print.exprs.len());
        for expr in &print.exprs {
            parts.push(self.eval_expr(expr, env)?.to_display_string());
        }

        let sep = match &print.sep {
            Some(expr) => self.eval_expr(expr, env)?.to_display_string(),
            None => " ".to_string(),
        };

        println!("{}", parts.join(&sep));
        Ok(Value::Nothing)
    }

    /// Read-modify-write an existing variable: current value found by
    /// chain lookup, result written into the current level
    fn exec_compound(
        &mut self,
        compound: &CompoundStmt,
        env: &Rc<RefCell<Environment>>,
    ) -> Result<Value, RuntimeError> {
        let name = &compound.target.name;
        let current = env.borrow().get(name).ok_or_else(|| {
            RuntimeError::UndefinedVariable {
                name: name.clone(),
                span: compound.target.span,
            }
        })?;

        let value = self.eval_expr(&compound.value, env)?;

        let (current, value) = match (&current, &value) {
            (Value::Number(a), Value::Number(b)) => (*a, *b),
            _ => {
                return Err(RuntimeError::TypeError {
                    msg: format!(
                        "Cannot {} {} and {}",
                        compound.op.as_str(),
                        current.type_name(),
                        value.type_name()
                    ),
                    span: compound.span,
                })
            }
        };

        let result = match compound.op {
            CompoundOp::Add => current.add(value),
            CompoundOp::Subtract => current.sub(value),
            CompoundOp::Multiply => current.mul(value),
            CompoundOp::Divide => {
                if value.is_zero() {
                    return Err(RuntimeError::DivideByZero {
                        span: compound.span,
                    });
                }
                current.div(value)
            }
        };

        env.borrow_mut().define(name.clone(), Value::Number(result));
        Ok(Value::Nothing)
    }

    /// Show the prompt, read one line, and store the raw text under the
    /// reserved `_last_input` name
    fn exec_input(
        &mut self,
        input: &InputStmt,
        env: &Rc<RefCell<Environment>>,
    ) -> Result<Value, RuntimeError> {
        let prompt = self.eval_expr(&input.prompt, env)?;
        print!("{}", prompt.to_display_string());
        let _ = std::io::stdout().flush();

        let mut line = String::new();
        std::io::stdin()
            .lock()
            .read_line(&mut line)
            .map_err(|e| RuntimeError::IoError {
                message: e.to_string(),
                span: input.span,
            })?;

        while line.ends_with('\n') || line.ends_with('\r') {
            line.pop();
        }

        env.borrow_mut().define("_last_input", Value::string(line));
        Ok(Value::Nothing)
    }

    /// Bind the value in the current level; callables take the binding
    /// name as their display name
    fn exec_remember(
        &mut self,
        decl: &RememberStmt,
        env: &Rc<RefCell<Environment>>,
        locals: &mut HashSet<String>,
    ) -> Result<Value, RuntimeError> {
        let value = self.eval_expr(&decl.expr, env)?;

        match &value {
            Value::Function(func) => *func.name.borrow_mut() = decl.name.name.clone(),
            Value::Closure(closure) => *closure.name.borrow_mut() = decl.name.name.clone(),
            _ => {}
        }

        env.borrow_mut().define(decl.name.name.clone(), value);
        locals.insert(decl.name.name.clone());
        Ok(Value::Nothing)
    }

    /// Both branches share the enclosing environment; each runs with a
    /// fresh copy of the locals set
    fn exec_if(
        &mut self,
        if_stmt: &IfStmt,
        env: &Rc<RefCell<Environment>>,
        locals: &mut HashSet<String>,
    ) -> Result<Value, RuntimeError> {
        let cond = self.eval_expr(&if_stmt.cond, env)?;

        if cond.is_truthy() {
            let mut branch_locals = locals.clone();
            self.exec_block(&if_stmt.then_body, env, &mut branch_locals)?;
        } else if let Some(else_body) = &if_stmt.else_body {
            let mut branch_locals = locals.clone();
            self.exec_block(else_body, env, &mut branch_locals)?;
        }

        Ok(Value::Nothing)
    }

    /// Iterate a list's elements, a string's characters, or a mapping's
    /// keys; the loop variable is bound in the shared environment
    fn exec_for_each(
        &mut self,
        for_stmt: &ForEachStmt,
        env: &Rc<RefCell<Environment>>,
        locals: &mut HashSet<String>,
    ) -> Result<Value, RuntimeError> {
        let iterable = self.eval_expr(&for_stmt.iterable, env)?;

        let elements: Vec<Value> = match &iterable {
            Value::List(list) => list.iter().cloned().collect(),
            Value::String(s) => s.chars().map(|c| Value::string(c.to_string())).collect(),
            Value::Map(map) => map.keys().cloned().collect(),
            other => {
                return Err(RuntimeError::TypeError {
                    msg: format!("{} is not iterable", other.type_name()),
                    span: for_stmt.iterable.span(),
                })
            }
        };

        for element in elements {
            env.borrow_mut().define(for_stmt.var.name.clone(), element);

            let mut iter_locals = locals.clone();
            self.exec_block(&for_stmt.body, env, &mut iter_locals)?;

            if self.signal != Signal::None {
                break;
            }
        }

        Ok(Value::Nothing)
    }

    /// Iterate a mapping's entries in insertion order, binding key and
    /// value names per entry
    fn exec_for_each_pair(
        &mut self,
        for_stmt: &ForEachPairStmt,
        env: &Rc<RefCell<Environment>>,
        locals: &mut HashSet<String>,
    ) -> Result<Value, RuntimeError> {
        let iterable = self.eval_expr(&for_stmt.iterable, env)?;

        let entries: Vec<(Value, Value)> = match &iterable {
            Value::Map(map) => map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            other => {
                return Err(RuntimeError::TypeError {
                    msg: format!("Expected a mapping, got {}", other.type_name()),
                    span: for_stmt.iterable.span(),
                })
            }
        };

        for (key, value) in entries {
            {
                let mut env = env.borrow_mut();
                env.define(for_stmt.key.name.clone(), key);
                env.define(for_stmt.value.name.clone(), value);
            }

            let mut iter_locals = locals.clone();
            self.exec_block(&for_stmt.body, env, &mut iter_locals)?;

            if self.signal != Signal::None {
                break;
            }
        }

        Ok(Value::Nothing)
    }

    /// Read, parse, and execute a module file against the current
    /// environment. Failures of any kind are reported and do not abort
    /// the importing program.
    fn exec_import(
        &mut self,
        import: &ImportStmt,
        env: &Rc<RefCell<Environment>>,
    ) -> Result<Value, RuntimeError> {
        let mut filename = self.eval_expr(&import.filename, env)?.to_display_string();
        if !filename.ends_with(MODULE_EXTENSION) {
            filename.push_str(MODULE_EXTENSION);
        }

        let source = match std::fs::read_to_string(&filename) {
            Ok(source) => source,
            Err(e) => {
                eprintln!("Import of '{}' failed: {}", filename, e);
                return Ok(Value::Nothing);
            }
        };

        let mut lexer = Lexer::new(source);
        let (tokens, lex_diagnostics) = lexer.tokenize();
        if !lex_diagnostics.is_empty() {
            for diagnostic in lex_diagnostics {
                eprint!("{}", diagnostic.with_file(&filename).to_human_string());
            }
            return Ok(Value::Nothing);
        }

        let mut parser = Parser::new(tokens);
        let (program, parse_diagnostics) = parser.parse();
        if !parse_diagnostics.is_empty() {
            for diagnostic in parse_diagnostics {
                eprint!("{}", diagnostic.with_file(&filename).to_human_string());
            }
            return Ok(Value::Nothing);
        }

        // Imported top-level bindings merge into the importing scope
        let mut import_locals = HashSet::new();
        if let Err(e) = self.exec_block(&program.statements, env, &mut import_locals) {
            eprintln!("Import of '{}' failed: {}", filename, e);
        }

        // A top-level return in the module stops the module only
        self.signal = Signal::None;
        Ok(Value::Nothing)
    }

    /// Run the try-body; any runtime failure switches to the catch-body,
    /// discarding the failure's details. Side effects before the failure
    /// are retained.
    fn exec_try_catch(
        &mut self,
        try_stmt: &TryCatchStmt,
        env: &Rc<RefCell<Environment>>,
        locals: &mut HashSet<String>,
    ) -> Result<Value, RuntimeError> {
        let mut try_locals = locals.clone();
        if self.exec_block(&try_stmt.try_body, env, &mut try_locals).is_err() {
            let mut catch_locals = locals.clone();
            self.exec_block(&try_stmt.catch_body, env, &mut catch_locals)?;
        }

        Ok(Value::Nothing)
    }
}
