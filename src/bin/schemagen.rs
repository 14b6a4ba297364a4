// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! JSON Schema Generator
//!
//! Generates JSON Schema files for the zone store format from the Rust types
//! in src/zone.rs and src/store/file.rs, so editors and CI can validate
//! hand-edited zone stores.
//!
//! Usage:
//!   cargo run --bin schemagen [OUTPUT_DIR]
//!
//! Generated files are written to schemas/ unless another directory is given.

use schemars::{schema_for, JsonSchema};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use zonekeeper::store::file::ZoneStoreDocument;
use zonekeeper::zone::{ZoneRecord, ZoneTimers};

const GENERATED_NOTE: &str =
    "AUTO-GENERATED from src/zone.rs and src/store/file.rs. Run `cargo run --bin schemagen` to regenerate.";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let output_dir = std::env::args()
        .nth(1)
        .map_or_else(|| PathBuf::from("schemas"), PathBuf::from);

    fs::create_dir_all(&output_dir)?;

    println!("Generating JSON Schema files...");

    generate_schema::<ZoneStoreDocument>("zone-store.schema.json", &output_dir)?;
    generate_schema::<ZoneRecord>("zone.schema.json", &output_dir)?;
    generate_schema::<ZoneTimers>("zone-timers.schema.json", &output_dir)?;

    println!(
        "✓ Successfully generated JSON Schema files in {}",
        output_dir.display()
    );

    Ok(())
}

fn generate_schema<T>(filename: &str, output_dir: &Path) -> Result<(), Box<dyn std::error::Error>>
where
    T: JsonSchema,
{
    let mut schema: Value = serde_json::to_value(schema_for!(T))?;

    // JSON has no comments, so the regeneration note goes into $comment
    if let Some(object) = schema.as_object_mut() {
        object.insert(
            "$comment".to_string(),
            Value::String(GENERATED_NOTE.to_string()),
        );
    }

    let output_path = output_dir.join(filename);
    fs::write(&output_path, serde_json::to_string_pretty(&schema)? + "\n")?;

    println!("  Generated {}", output_path.display());
    Ok(())
}
