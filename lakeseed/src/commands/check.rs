// lakeseed/src/commands/check.rs
//
// USE CASE: Offline dry run. Resolves the configuration and translates every
// definition without opening a connection or calling the catalog.

use anyhow::Context;
use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL};
use serde::Serialize;

use lakeseed_core::application::{prepare, translate};
use lakeseed_core::domain::semantic::DeploymentPayload;
use lakeseed_core::infrastructure::fs::write_json;

use super::{DomainContext, PAYLOADS_FILE};
use crate::cli::DomainArgs;

#[derive(Debug, Serialize)]
struct CheckedDefinition {
    definition: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    payload: Option<DeploymentPayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

pub fn execute(args: DomainArgs) -> anyhow::Result<()> {
    let ctx = DomainContext::load(&args)?;
    let options = ctx.pipeline_options(false);

    let (effective, namespace) = prepare(&ctx.global, &ctx.domain_options, &options.required_keys)?;
    println!("🔎 Configuration resolved, raw namespace {}", namespace);

    let loaded = ctx.definitions()?;
    let mut checked: Vec<CheckedDefinition> = loaded
        .failures
        .into_iter()
        .map(|failure| CheckedDefinition {
            definition: failure.target,
            payload: None,
            error: failure.error,
        })
        .collect();

    for (definition, translated) in loaded
        .definitions
        .iter()
        .zip(translate(&loaded.definitions, &effective))
    {
        checked.push(match translated {
            Ok(payload) => CheckedDefinition {
                definition: definition.label(),
                payload: Some(payload),
                error: None,
            },
            Err(e) => CheckedDefinition {
                definition: definition.label(),
                payload: None,
                error: Some(e.to_string()),
            },
        });
    }

    let path = ctx.target_dir().join(PAYLOADS_FILE);
    write_json(&path, &checked).with_context(|| format!("Failed to write {}", path.display()))?;

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Definition", "Target", "Result"]);
    for entry in &checked {
        let (target, result) = match (&entry.payload, &entry.error) {
            (Some(payload), _) => (payload.target.to_string(), "ok".to_string()),
            (None, error) => (
                String::new(),
                error.clone().unwrap_or_else(|| "failed".to_string()),
            ),
        };
        table.add_row(vec![entry.definition.clone(), target, result]);
    }
    println!("{table}");
    println!("   Payloads: {}", path.display());

    let failed = checked.iter().filter(|c| c.error.is_some()).count();
    if failed > 0 {
        eprintln!("\n❌ {} definition(s) failed to translate.", failed);
        std::process::exit(1);
    }
    println!("\n✨ All {} definition(s) translate cleanly.", checked.len());
    Ok(())
}
