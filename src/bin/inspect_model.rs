//! Utility to inspect a classifier artifact and compare it with the feature schema.

use credit_risk_form::classifier::{ModelArtifact, DEFAULT_MODEL_PATH};
use credit_risk_form::schema::feature_names;
use dotenvy::dotenv;
use sha2::{Digest, Sha256};
use std::env;

/// Main entry point for the model inspection utility.
///
/// Reads the artifact named by the first argument (or `MODEL_PATH`), prints
/// its checksum, tree count and feature order, and flags any column that
/// differs from what the form sends.
fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let path = env::args()
        .nth(1)
        .or_else(|| env::var("MODEL_PATH").ok())
        .unwrap_or_else(|| DEFAULT_MODEL_PATH.to_string());

    let bytes = std::fs::read(&path)
        .map_err(|e| anyhow::anyhow!("Modelo não encontrado em: {} ({})", path, e))?;
    let artifact: ModelArtifact = serde_json::from_slice(&bytes)?;

    println!("Artifact: {}", path);
    println!("SHA-256:  {}", hex::encode(Sha256::digest(&bytes)));
    println!("Trees:    {}", artifact.trees.len());
    println!("Base:     {}", artifact.base_score);
    println!();

    let expected: Vec<&str> = feature_names().collect();
    let rows = expected.len().max(artifact.feature_names.len());
    let mut mismatches = 0;
    for i in 0..rows {
        let want = expected.get(i).copied().unwrap_or("-");
        let have = artifact.feature_names.get(i).map(String::as_str).unwrap_or("-");
        let marker = if want == have { " " } else { "!" };
        if want != have {
            mismatches += 1;
        }
        println!("{} {:>2}  {:<18} {}", marker, i, want, have);
    }
    println!();

    match artifact.validate() {
        Ok(()) => println!("Artifact is compatible with the form."),
        Err(e) => {
            println!("Artifact rejected: {}", e);
            anyhow::bail!("{} column mismatch(es)", mismatches);
        }
    }

    Ok(())
}
