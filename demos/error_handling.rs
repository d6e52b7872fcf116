//! Example demonstrating how a tool dispatcher reacts to each rejection kind.
//!
//! This example shows how to:
//! - Offer to create a workbook when the file is missing
//! - Report security refusals without retrying
//! - Surface configuration errors at startup
//!
//! Run with: cargo run --example error_handling

use xlsx_sandbox::prelude::*;

/// What the dispatcher tells the calling agent.
fn respond(outcome: ValidationOutcome<ValidatedPath>) -> String {
    match outcome {
        Ok(path) => format!("ok: opening {}", path),
        Err(rejection) if rejection.is_not_found() => {
            format!("{} (use create_workbook to make it)", rejection)
        }
        Err(rejection) if rejection.is_security_violation() => {
            format!("access denied: {}", rejection)
        }
        Err(rejection) => match rejection.kind() {
            RejectionKind::TooLarge => format!("refusing to load: {}", rejection),
            RejectionKind::MissingParentDirectory => {
                format!("{} (create the folder first)", rejection)
            }
            _ => format!("invalid request: {}", rejection),
        },
    }
}

fn main() -> anyhow::Result<()> {
    println!("=== Error Handling Example ===\n");

    let workspace = tempfile::tempdir()?;
    let existing = workspace.path().join("budget.xlsx");
    std::fs::write(&existing, vec![0u8; 2048])?;

    let sandbox = Sandbox::new(
        SandboxConfig::builder()
            .allowed_root(workspace.path())
            .max_file_size(1024)
            .build(),
    );
    println!("{}\n", sandbox.describe());

    let root = workspace.path().display().to_string();
    let requests = [
        (format!("{}/missing.xlsx", root), true),
        (format!("{}/budget.xlsx", root), true),
        (format!("{}/archive/2023.xlsx", root), false),
        (format!("{}/../other.xlsx", root), false),
        (format!("{}/notes.txt", root), false),
        (format!("{}/fresh.xlsx", root), false),
    ];

    for (path, must_exist) in &requests {
        println!("{} -> {}", path, respond(sandbox.validate_path(path, *must_exist)));
    }

    println!("\n--- Configuration errors ---");
    let result = SandboxConfig::from_env_with(|key| match key {
        "MAX_FILE_SIZE_MB" => Ok("a lot".to_string()),
        _ => Err(std::env::VarError::NotPresent),
    });
    if let Err(e) = result {
        println!("startup refused: {}", e);
    }

    Ok(())
}
