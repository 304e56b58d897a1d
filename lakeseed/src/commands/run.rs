// lakeseed/src/commands/run.rs
//
// USE CASE: Run every stage for one domain.

use anyhow::Context;
use chrono::Utc;

use lakeseed_core::application::{PipelineInputs, prepare, run_pipeline};
use lakeseed_core::domain::report::RunReport;
use lakeseed_core::infrastructure::batches::load_batches;

use super::{DomainContext, conclude};
use crate::cli::DomainArgs;

pub async fn execute(args: DomainArgs, tolerate_partial: bool) -> anyhow::Result<()> {
    let start = std::time::Instant::now();
    let started_at = Utc::now();

    let ctx = DomainContext::load(&args)?;
    let options = ctx.pipeline_options(tolerate_partial);

    let outcome = async {
        let data_dir = ctx.domain_dir().join("data");
        let batches = load_batches(&data_dir)
            .with_context(|| format!("Failed to read batches from {}", data_dir.display()))?;
        let loaded = ctx.definitions()?;
        println!(
            "   {} table(s), {} definition(s)",
            batches.len(),
            loaded.definitions.len()
        );

        let inputs = PipelineInputs {
            global: ctx.global.clone(),
            domain: ctx.domain_options.clone(),
            batches,
            definitions: loaded.definitions,
            definition_failures: loaded.failures,
        };

        // Adapters need the resolved connection keys; run_pipeline resolves again.
        let (effective, namespace) = prepare(&inputs.global, &inputs.domain, &options.required_keys)?;
        println!("🚀 Running pipeline into {}", namespace);
        let backend = ctx.backend(&effective)?;

        Ok::<RunReport, anyhow::Error>(run_pipeline(
            &inputs,
            &options,
            backend.factory.as_ref(),
            backend.catalog.as_ref(),
        )
        .await?)
    }
    .await;

    let report = outcome.unwrap_or_else(|e| RunReport::aborted(started_at, format!("{:#}", e)));
    println!("   Finished in {:.2?}", start.elapsed());
    conclude(&report, &ctx.target_dir())
}
