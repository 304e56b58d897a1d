// lakeseed/src/commands/deploy.rs
//
// USE CASE: Translate and publish the domain's definitions against the
// tables already in place.

use chrono::Utc;

use lakeseed_core::application::{deploy_definitions, prepare};
use lakeseed_core::domain::report::RunReport;

use super::{DomainContext, conclude};
use crate::cli::DomainArgs;

pub async fn execute(args: DomainArgs) -> anyhow::Result<()> {
    let started_at = Utc::now();
    let ctx = DomainContext::load(&args)?;
    let options = ctx.pipeline_options(false);

    let outcome = async {
        let loaded = ctx.definitions()?;
        let (effective, _) = prepare(&ctx.global, &ctx.domain_options, &options.required_keys)?;
        let backend = ctx.backend(&effective)?;

        println!("📡 Publishing {} definition(s)", loaded.definitions.len());
        // No ingestion in this command, so nothing is held back.
        let published = deploy_definitions(
            backend.catalog.as_ref(),
            &loaded.definitions,
            &effective,
            &[],
            true,
        )
        .await;

        let mut report = RunReport::new(started_at);
        report.deployments = loaded.failures;
        report.deployments.extend(published);
        Ok::<RunReport, anyhow::Error>(report.finish())
    }
    .await;

    let report = outcome.unwrap_or_else(|e| RunReport::aborted(started_at, format!("{:#}", e)));
    conclude(&report, &ctx.target_dir())
}
