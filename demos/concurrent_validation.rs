//! Example of validating many paths concurrently from async tasks.
//!
//! One `Sandbox` is cloned into every task; the clones share a single
//! frozen configuration, so no locking is involved.
//!
//! Run with: cargo run --example concurrent_validation

use std::time::Instant;

use xlsx_sandbox::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    println!("=== Concurrent Validation Example ===\n");

    let workspace = tempfile::tempdir().map_err(|e| SandboxError::Config(e.to_string()))?;
    let sandbox = Sandbox::new(SandboxConfig::builder().allowed_root(workspace.path()).build());

    let root = workspace.path().display().to_string();
    let requests = vec![
        format!("{}/q1.xlsx", root),
        format!("{}/q2.xlsx", root),
        format!("{}/../q3.xlsx", root),
        format!("{}/q4.xlsm", root),
        "/tmp/elsewhere/q5.xlsx".to_string(),
    ];

    println!("Starting {} concurrent validations...\n", requests.len());
    let start = Instant::now();

    let mut handles = Vec::new();
    for path in requests {
        let sandbox = sandbox.clone();
        handles.push(tokio::spawn(async move {
            let outcome = sandbox.validate_path_async(&path, false).await;
            (path, outcome)
        }));
    }

    for handle in handles {
        let (path, outcome) = handle
            .await
            .map_err(|e| SandboxError::TaskFailed(e.to_string()))?;
        match outcome {
            Ok(validated) => println!("allowed  {} -> {}", path, validated),
            Err(e) => println!("rejected {} ({})", path, e),
        }
    }

    println!("\nCompleted in {:?}", start.elapsed());
    Ok(())
}
