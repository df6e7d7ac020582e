//! Expression evaluation

use crate::ast::*;
use crate::environment::Environment;
use crate::interpreter::{Interpreter, Signal};
use crate::stdlib;
use crate::value::{ClosureValue, FunctionValue, RuntimeError, Value, ValueMap};
use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

impl Interpreter {
    /// Evaluate an expression
    pub(super) fn eval_expr(
        &mut self,
        expr: &Expr,
        env: &Rc<RefCell<Environment>>,
    ) -> Result<Value, RuntimeError> {
        match expr {
            Expr::Literal(literal, _) => Ok(self.eval_literal(literal)),
            Expr::Template(template) => Ok(Value::string(self.interpolate(&template.text, env))),
            Expr::Variable(id) => {
                env.borrow()
                    .get(&id.name)
                    .ok_or_else(|| RuntimeError::UndefinedVariable {
                        name: id.name.clone(),
                        span: id.span,
                    })
            }
            Expr::Binary(binary) => self.eval_binary(binary, env),
            Expr::List(list) => {
                let elements: Result<Vec<Value>, _> = list
                    .elements
                    .iter()
                    .map(|e| self.eval_expr(e, env))
                    .collect();
                Ok(Value::list(elements?))
            }
            Expr::Map(map) => self.eval_map_literal(map, env),
            Expr::Lambda(lambda) => Ok(Value::Closure(Rc::new(ClosureValue::new(
                Rc::clone(lambda),
                Rc::clone(env),
            )))),
            Expr::Call(call) => self.eval_call(call, env),
        }
    }

    /// Evaluate a literal
    fn eval_literal(&self, literal: &Literal) -> Value {
        match literal {
            Literal::Int(i) => Value::int(*i),
            Literal::Float(f) => Value::float(*f),
            Literal::Str(s) => Value::string(s.clone()),
            Literal::Bool(b) => Value::Bool(*b),
        }
    }

    /// Substitute `{identifier}` placeholders with the display string of
    /// the binding at the innermost environment level. Placeholders whose
    /// name is absent at that level (even if bound further out) stay
    /// unchanged.
    fn interpolate(&self, text: &str, env: &Rc<RefCell<Environment>>) -> String {
        let chars: Vec<char> = text.chars().collect();
        let mut out = String::new();
        let mut i = 0;

        while i < chars.len() {
            if chars[i] == '{' {
                let mut j = i + 1;
                if j < chars.len() && (chars[j].is_alphabetic() || chars[j] == '_') {
                    j += 1;
                    while j < chars.len() && (chars[j].is_alphanumeric() || chars[j] == '_') {
                        j += 1;
                    }
                    if j < chars.len() && chars[j] == '}' {
                        let name: String = chars[i + 1..j].iter().collect();
                        let env = env.borrow();
                        if env.contains_local(&name) {
                            let value = env.get(&name).expect("local binding just checked");
                            out.push_str(&value.to_display_string());
                        } else {
                            out.push('{');
                            out.push_str(&name);
                            out.push('}');
                        }
                        i = j + 1;
                        continue;
                    }
                }
            }
            out.push(chars[i]);
            i += 1;
        }

        out
    }

    /// Evaluate a binary operation
    fn eval_binary(
        &mut self,
        binary: &BinaryExpr,
        env: &Rc<RefCell<Environment>>,
    ) -> Result<Value, RuntimeError> {
        let left = self.eval_expr(&binary.left, env)?;
        let right = self.eval_expr(&binary.right, env)?;

        match binary.op {
            BinaryOp::Concat => Ok(Value::string(format!(
                "{}{}",
                left.to_display_string(),
                right.to_display_string()
            ))),

            // Comparisons use the total value ordering; mismatched kinds
            // order by rank and never raise
            BinaryOp::Eq => Ok(Value::Bool(left == right)),
            BinaryOp::Ne => Ok(Value::Bool(left != right)),
            BinaryOp::Lt => Ok(Value::Bool(left.total_cmp(&right).is_lt())),
            BinaryOp::Le => Ok(Value::Bool(left.total_cmp(&right).is_le())),
            BinaryOp::Gt => Ok(Value::Bool(left.total_cmp(&right).is_gt())),
            BinaryOp::Ge => Ok(Value::Bool(left.total_cmp(&right).is_ge())),

            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div => {
                let (a, b) = match (&left, &right) {
                    (Value::Number(a), Value::Number(b)) => (*a, *b),
                    _ => {
                        return Err(RuntimeError::TypeError {
                            msg: format!(
                                "Operands of '{}' must be numbers, got {} and {}",
                                binary.op.as_str(),
                                left.type_name(),
                                right.type_name()
                            ),
                            span: binary.span,
                        })
                    }
                };

                let result = match binary.op {
                    BinaryOp::Add => a.add(b),
                    BinaryOp::Sub => a.sub(b),
                    BinaryOp::Mul => a.mul(b),
                    BinaryOp::Div => {
                        if b.is_zero() {
                            return Err(RuntimeError::DivideByZero { span: binary.span });
                        }
                        a.div(b)
                    }
                    _ => unreachable!(),
                };
                Ok(Value::Number(result))
            }

            // Evaluator-only: no surface grammar path produces these
            BinaryOp::And => Ok(Value::Bool(left.is_truthy() && right.is_truthy())),
            BinaryOp::Or => Ok(Value::Bool(left.is_truthy() || right.is_truthy())),
        }
    }

    /// Evaluate a mapping literal, keys and values left-to-right per pair
    fn eval_map_literal(
        &mut self,
        map: &MapExpr,
        env: &Rc<RefCell<Environment>>,
    ) -> Result<Value, RuntimeError> {
        let mut entries = ValueMap::new();
        for (key_expr, value_expr) in &map.pairs {
            let key = self.eval_expr(key_expr, env)?;
            let value = self.eval_expr(value_expr, env)?;
            entries.insert(key, value);
        }
        Ok(Value::Map(Rc::new(entries)))
    }

    /// Evaluate a call. Builtin names are recognized before user lookup;
    /// any other name must resolve to a function or closure value.
    pub(super) fn eval_call(
        &mut self,
        call: &CallExpr,
        env: &Rc<RefCell<Environment>>,
    ) -> Result<Value, RuntimeError> {
        let name = &call.callee.name;

        if stdlib::is_builtin(name) {
            let args: Result<Vec<Value>, _> =
                call.args.iter().map(|arg| self.eval_expr(arg, env)).collect();
            return stdlib::call_builtin(name, &args?, call.span);
        }

        let callee = env.borrow().get(name);
        match callee {
            Some(Value::Function(func)) => self.call_function(&func, call, env),
            Some(Value::Closure(closure)) => self.call_closure(&closure, call, env),
            Some(_) => Err(RuntimeError::NotCallable {
                name: name.clone(),
                span: call.callee.span,
            }),
            None => Err(RuntimeError::UndefinedFunction {
                name: name.clone(),
                span: call.callee.span,
            }),
        }
    }

    /// Invoke a named function: fresh environment chained to the
    /// *call-site* environment (named functions capture nothing).
    fn call_function(
        &mut self,
        func: &Rc<FunctionValue>,
        call: &CallExpr,
        env: &Rc<RefCell<Environment>>,
    ) -> Result<Value, RuntimeError> {
        let decl = &func.decl;
        let local_env = Rc::new(RefCell::new(Environment::with_enclosing(Rc::clone(env))));
        let mut locals: HashSet<String> = decl.params.iter().cloned().collect();

        for (i, param) in decl.params.iter().enumerate() {
            let value = if i < call.args.len() {
                self.eval_expr(&call.args[i], env)?
            } else if let Some(default) = decl.defaults.get(param) {
                // Defaults are evaluated in the caller's environment
                self.eval_expr(default, env)?
            } else {
                return Err(RuntimeError::MissingArgument {
                    function: func.name.borrow().clone(),
                    param: param.clone(),
                    span: call.span,
                });
            };
            local_env.borrow_mut().define(param.clone(), value);
        }

        if decl.variadic {
            let mut extra = Vec::new();
            for arg in call.args.iter().skip(decl.params.len()) {
                extra.push(self.eval_expr(arg, env)?);
            }
            local_env.borrow_mut().define("args", Value::list(extra));
        }

        self.exec_block(&decl.body, &local_env, &mut locals)?;

        match std::mem::replace(&mut self.signal, Signal::None) {
            Signal::Return(value) => Ok(value),
            Signal::None => Ok(Value::Nothing),
        }
    }

    /// Invoke a closure: fresh environment chained to the closure's
    /// captured *defining* environment. Parameters bind positionally with
    /// no default or variadic support.
    fn call_closure(
        &mut self,
        closure: &Rc<ClosureValue>,
        call: &CallExpr,
        env: &Rc<RefCell<Environment>>,
    ) -> Result<Value, RuntimeError> {
        let local_env = Rc::new(RefCell::new(Environment::with_enclosing(Rc::clone(
            &closure.env,
        ))));
        let mut locals: HashSet<String> = closure.lambda.params.iter().cloned().collect();

        for (param, arg) in closure.lambda.params.iter().zip(call.args.iter()) {
            let value = self.eval_expr(arg, env)?;
            local_env.borrow_mut().define(param.clone(), value);
        }

        self.exec_block(&closure.lambda.body, &local_env, &mut locals)?;

        match std::mem::replace(&mut self.signal, Signal::None) {
            Signal::Return(value) => Ok(value),
            Signal::None => Ok(Value::Nothing),
        }
    }
}
