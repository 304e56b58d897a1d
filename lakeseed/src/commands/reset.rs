// lakeseed/src/commands/reset.rs
//
// USE CASE: Drop and recreate the raw schema, nothing else.

use lakeseed_core::application::{prepare, reset_with};

use super::DomainContext;
use crate::cli::DomainArgs;

pub async fn execute(args: DomainArgs) -> anyhow::Result<()> {
    let ctx = DomainContext::load(&args)?;
    let options = ctx.pipeline_options(false);

    let (effective, namespace) = prepare(&ctx.global, &ctx.domain_options, &options.required_keys)?;
    let backend = ctx.backend(&effective)?;

    println!("🧨 Resetting {}", namespace);
    reset_with(backend.factory.as_ref(), &namespace).await?;
    println!("✨ Schema {} recreated.", namespace);
    Ok(())
}
