//! `sayso run`: execute a source file

use anyhow::Result;
use sayso_runtime::{Diagnostic, Sayso};

/// Run a Sayso source file, reporting diagnostics on failure
pub fn run(file: &str, json: bool) -> Result<()> {
    let runtime = Sayso::new();

    match runtime.eval_file(file) {
        Ok(_) => Ok(()),
        Err(diagnostics) => {
            report(&diagnostics, json)?;
            std::process::exit(1);
        }
    }
}

/// Print diagnostics as human-readable text or JSON
fn report(diagnostics: &[Diagnostic], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(diagnostics)?);
    } else {
        for diagnostic in diagnostics {
            eprint!("{}", diagnostic.to_human_string());
        }
    }
    Ok(())
}
