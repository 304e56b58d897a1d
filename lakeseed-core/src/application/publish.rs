// lakeseed-core/src/application/publish.rs

use tracing::{info, instrument, warn};

use crate::domain::report::DeploymentResult;
use crate::domain::semantic::DeploymentPayload;
use crate::error::LakeseedError;
use crate::ports::catalog_api::CatalogApi;

/// Lookup-before-write for every payload, sequentially and in input order.
/// Never fails as a whole: each payload gets its own result.
#[instrument(skip_all, fields(payloads = payloads.len()))]
pub async fn publish(api: &dyn CatalogApi, payloads: &[DeploymentPayload]) -> Vec<DeploymentResult> {
    let mut results = Vec::with_capacity(payloads.len());

    for payload in payloads {
        let target = payload.target.to_string();
        let result = match publish_one(api, payload).await {
            Ok(result) => {
                info!(target = %target, status = ?result.status, "Published");
                result
            }
            Err(e) => {
                warn!(target = %target, error = %e, "Publishing failed");
                DeploymentResult::failed(&target, e)
            }
        };
        results.push(result);
    }

    results
}

async fn publish_one(
    api: &dyn CatalogApi,
    payload: &DeploymentPayload,
) -> Result<DeploymentResult, LakeseedError> {
    let target = payload.target.to_string();
    let fail = |step: &str, e: LakeseedError| LakeseedError::Publish {
        target: target.clone(),
        reason: format!("{} failed: {}", step, e),
    };

    let existing = api
        .get_semantic_object(&payload.target)
        .await
        .map_err(|e| fail("lookup", e))?;

    if let Some(existing) = existing {
        let updated = api
            .update_semantic_object(&existing, payload)
            .await
            .map_err(|e| fail("update", e))?;
        return Ok(DeploymentResult::updated(&target, &updated.id));
    }

    match api.create_semantic_object(payload).await {
        Ok(created) => Ok(DeploymentResult::created(&target, &created.id)),
        // Someone created it between our lookup and our create.
        Err(e) if e.is_conflict() => {
            let existing = api
                .get_semantic_object(&payload.target)
                .await
                .map_err(|e| fail("lookup after conflict", e))?
                .ok_or_else(|| fail("create", e))?;
            let updated = api
                .update_semantic_object(&existing, payload)
                .await
                .map_err(|e| fail("update", e))?;
            Ok(DeploymentResult::updated(&target, &updated.id))
        }
        Err(e) => Err(fail("create", e)),
    }
}
