//! `sayso repl`: interactive session

use anyhow::Result;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use sayso_runtime::{Sayso, Value};

/// Read-eval-print loop against a persistent environment
pub fn repl() -> Result<()> {
    println!("Sayso {} (type exit() or press Ctrl-D to quit)", sayso_runtime::VERSION);

    let runtime = Sayso::new();
    let mut editor = DefaultEditor::new()?;

    loop {
        match editor.readline("say> ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let _ = editor.add_history_entry(line);

                match runtime.eval(line) {
                    Ok(Value::Nothing) => {}
                    Ok(value) => println!("{}", value),
                    Err(diagnostics) => {
                        for diagnostic in diagnostics {
                            eprint!("{}", diagnostic.to_human_string());
                        }
                    }
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        }
    }

    Ok(())
}
