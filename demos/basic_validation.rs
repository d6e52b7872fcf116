//! Basic example of sandboxed path and formula validation.
//!
//! Run with: ALLOWED_PATHS=/data/sheets cargo run --example basic_validation

use xlsx_sandbox::logging;
use xlsx_sandbox::prelude::*;

fn main() -> anyhow::Result<()> {
    logging::init()?;

    let sandbox = Sandbox::from_env()?;
    sandbox.log_startup_info();

    let root = sandbox
        .config()
        .allowed_roots()
        .first()
        .map(|root| root.display().to_string())
        .unwrap_or_else(|| std::env::temp_dir().display().to_string());

    let candidates = [
        format!("{}/report.xlsx", root),
        format!("{}/../secrets/report.xlsx", root),
        format!("{}/report.csv", root),
        "/etc/passwd".to_string(),
    ];

    for candidate in &candidates {
        match sandbox.validate_path(candidate, false) {
            Ok(path) => println!("allowed   {}", path),
            Err(rejection) => println!("rejected  [{}] {}", rejection.kind(), rejection),
        }
    }

    println!();

    for formula in ["=SUM(A1:A10)", "=WEBSERVICE(\"http://evil\")", "SUM(A1)"] {
        match sandbox.validate_formula(formula) {
            Ok(()) => println!("allowed   {}", formula),
            Err(rejection) => println!("rejected  [{}] {}", rejection.kind(), rejection),
        }
    }

    Ok(())
}
