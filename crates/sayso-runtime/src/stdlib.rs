//! Builtin functions
//!
//! Builtin names are recognized at call dispatch before any user lookup,
//! so they cannot be shadowed by user definitions. Arguments arrive
//! already evaluated.

use crate::span::Span;
use crate::value::{Number, RuntimeError, Value};
use std::cmp::Ordering;
use std::io::Write;

/// Check if a call name is a builtin
pub fn is_builtin(name: &str) -> bool {
    matches!(
        name,
        "length"
            | "to_number"
            | "to_string"
            | "min"
            | "max"
            | "sort"
            | "reverse"
            | "exit"
            | "wait"
            | "clear"
    )
}

/// Call a builtin function.
///
/// `call_span` is the span of the call expression, used for error
/// reporting.
pub fn call_builtin(name: &str, args: &[Value], call_span: Span) -> Result<Value, RuntimeError> {
    match name {
        "length" => {
            expect_arity(name, args, 1, call_span)?;
            length(&args[0], call_span)
        }
        "to_number" => {
            expect_arity(name, args, 1, call_span)?;
            to_number(&args[0], call_span).map(Value::Number)
        }
        "to_string" => {
            expect_arity(name, args, 1, call_span)?;
            Ok(Value::string(args[0].to_display_string()))
        }
        "min" => extrema(name, args, Ordering::Less, call_span),
        "max" => extrema(name, args, Ordering::Greater, call_span),
        "sort" => {
            expect_arity(name, args, 1, call_span)?;
            sort(&args[0], call_span)
        }
        "reverse" => {
            expect_arity(name, args, 1, call_span)?;
            reverse(&args[0], call_span)
        }
        "exit" => {
            // Immediate termination with a success status; not an error
            std::process::exit(0);
        }
        "wait" => {
            expect_arity(name, args, 1, call_span)?;
            wait(&args[0], call_span)
        }
        "clear" => {
            clear();
            Ok(Value::Nothing)
        }
        _ => Err(RuntimeError::UndefinedFunction {
            name: name.to_string(),
            span: call_span,
        }),
    }
}

fn expect_arity(name: &str, args: &[Value], n: usize, span: Span) -> Result<(), RuntimeError> {
    if args.len() != n {
        return Err(RuntimeError::InvalidBuiltinArgument {
            msg: format!("{}() takes {} argument(s), got {}", name, n, args.len()),
            span,
        });
    }
    Ok(())
}

/// Element count of a list or mapping, character count of a string
fn length(value: &Value, span: Span) -> Result<Value, RuntimeError> {
    let len = match value {
        Value::String(s) => s.chars().count(),
        Value::List(l) => l.len(),
        Value::Map(m) => m.len(),
        other => {
            return Err(RuntimeError::TypeError {
                msg: format!("length() expects a list, mapping, or string, got {}", other.type_name()),
                span,
            })
        }
    };
    Ok(Value::int(len as i64))
}

/// Numeric coercion; the result is always floating-point
fn to_number(value: &Value, span: Span) -> Result<Number, RuntimeError> {
    match value {
        Value::Number(n) => Ok(Number::Float(n.as_f64())),
        Value::String(s) => s.trim().parse::<f64>().map(Number::Float).map_err(|_| {
            RuntimeError::InvalidBuiltinArgument {
                msg: format!("Could not convert '{}' to a number", s),
                span,
            }
        }),
        Value::Bool(true) => Ok(Number::Float(1.0)),
        Value::Bool(false) => Ok(Number::Float(0.0)),
        other => Err(RuntimeError::TypeError {
            msg: format!("to_number() expects a number, string, or boolean, got {}", other.type_name()),
            span,
        }),
    }
}

/// Sequence view of a value for `min`/`max`/`sort`/`reverse`: a list's
/// elements, a string's characters, or a mapping's keys
fn sequence_of(value: &Value, builtin: &str, span: Span) -> Result<Vec<Value>, RuntimeError> {
    match value {
        Value::List(l) => Ok(l.iter().cloned().collect()),
        Value::String(s) => Ok(s.chars().map(|c| Value::string(c.to_string())).collect()),
        Value::Map(m) => Ok(m.keys().cloned().collect()),
        other => Err(RuntimeError::TypeError {
            msg: format!("{}() expects a sequence, got {}", builtin, other.type_name()),
            span,
        }),
    }
}

/// Variadic minimum/maximum by the total value ordering. A single
/// argument is treated as a sequence; ties keep the first candidate.
fn extrema(name: &str, args: &[Value], wanted: Ordering, span: Span) -> Result<Value, RuntimeError> {
    let candidates = match args {
        [] => {
            return Err(RuntimeError::InvalidBuiltinArgument {
                msg: format!("{}() expects at least 1 argument", name),
                span,
            })
        }
        [single] => sequence_of(single, name, span)?,
        many => many.to_vec(),
    };

    let mut best = match candidates.first() {
        Some(first) => first.clone(),
        None => {
            return Err(RuntimeError::InvalidBuiltinArgument {
                msg: format!("{}() of an empty sequence", name),
                span,
            })
        }
    };

    for candidate in &candidates[1..] {
        if candidate.total_cmp(&best) == wanted {
            best = candidate.clone();
        }
    }

    Ok(best)
}

/// Ascending stable sort by the total value ordering; returns a new list
fn sort(value: &Value, span: Span) -> Result<Value, RuntimeError> {
    let mut elements = sequence_of(value, "sort", span)?;
    elements.sort_by(|a, b| a.total_cmp(b));
    Ok(Value::list(elements))
}

/// Reversed copy of a sequence, as a list
fn reverse(value: &Value, span: Span) -> Result<Value, RuntimeError> {
    let mut elements = sequence_of(value, "reverse", span)?;
    elements.reverse();
    Ok(Value::list(elements))
}

/// Block the (only) thread for the given number of seconds
fn wait(value: &Value, span: Span) -> Result<Value, RuntimeError> {
    let seconds = to_number(value, span)?.as_f64();
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(RuntimeError::InvalidBuiltinArgument {
            msg: "wait() expects a non-negative number of seconds".to_string(),
            span,
        });
    }
    std::thread::sleep(std::time::Duration::from_secs_f64(seconds));
    Ok(Value::Nothing)
}

/// Clear the terminal and move the cursor home
fn clear() {
    print!("\x1B[2J\x1B[1;1H");
    let _ = std::io::stdout().flush();
}
