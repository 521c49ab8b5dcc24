// Print a summary of a forest model artifact
//
// Usage: cargo run --bin inspect_model -- models/crop_recommendation_rf_model.json

use anyhow::Context;
use crop_advisor::models::forest::{ForestArtifact, ForestClassifier, ForestRegressor};
use std::path::PathBuf;

fn main() -> anyhow::Result<()> {
    let path: PathBuf = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .context("Usage: inspect_model <artifact.json>")?;

    let artifact = ForestArtifact::from_path(&path)?;

    println!("Artifact: {:?}", path);
    println!("  Kind: {}", artifact.kind());
    println!("  Trees: {}", artifact.n_trees());
    println!("  Max depth: {}", artifact.max_depth());
    println!("  Leaves: {}", artifact.n_leaves());

    match artifact {
        ForestArtifact::RandomForestClassifier(a) => {
            println!("  Classes ({}): {}", a.classes.len(), a.classes.join(", "));
            ForestClassifier::from_artifact(a).context("Artifact failed validation")?;
        }
        ForestArtifact::RandomForestRegressor(a) => {
            println!("  Features: {}", a.feature_names.join(", "));
            for (column, values) in &a.categories {
                println!("  {} categories: {}", column, values.len());
            }
            ForestRegressor::from_artifact(a).context("Artifact failed validation")?;
        }
    }

    println!("  Validation: OK");
    Ok(())
}
