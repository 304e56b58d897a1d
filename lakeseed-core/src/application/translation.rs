// lakeseed-core/src/application/translation.rs

// Declarative definitions -> resolved, validated payloads. Pure: no I/O,
// same input, same output.

use std::collections::{BTreeMap, HashSet};
use tracing::{debug, instrument, warn};

use crate::domain::config::EffectiveConfig;
use crate::domain::error::TranslationError;
use crate::domain::semantic::duration::{interval_outlasts_import, parse_duration_minutes};
use crate::domain::semantic::placeholder::substitute;
use crate::domain::semantic::{
    DeploymentPayload, QualifiedName, SecurityMode, SemanticDefinition, SemanticKind,
};

/// One entry per definition, in input order. Later definitions that target an
/// already-claimed `catalog.schema.name` fail with `DuplicateTarget`.
#[instrument(skip_all, fields(definitions = definitions.len()))]
pub fn translate(
    definitions: &[SemanticDefinition],
    config: &EffectiveConfig,
) -> Vec<Result<DeploymentPayload, TranslationError>> {
    let mut claimed: HashSet<QualifiedName> = HashSet::new();

    definitions
        .iter()
        .map(|definition| {
            let payload = translate_one(definition, config)?;
            if !claimed.insert(payload.target.clone()) {
                warn!(target = %payload.target, "Duplicate target");
                return Err(TranslationError::DuplicateTarget(payload.target.to_string()));
            }
            debug!(target = %payload.target, "Definition translated");
            Ok(payload)
        })
        .collect()
}

pub fn translate_one(
    definition: &SemanticDefinition,
    config: &EffectiveConfig,
) -> Result<DeploymentPayload, TranslationError> {
    let label = definition.name.as_str();
    let resolve = |template: &str| {
        substitute(template, config).map_err(|key| TranslationError::UnresolvedPlaceholder {
            definition: label.to_string(),
            key,
        })
    };

    // 1. Placeholders
    let query = resolve(&definition.query)?;
    let namespace = resolve(&definition.namespace)?;
    let storage_location = definition
        .metadata
        .storage_location
        .as_deref()
        .map(resolve)
        .transpose()?;

    // 2. Shape
    let malformed = |reason: String| TranslationError::Malformed {
        definition: label.to_string(),
        reason,
    };
    if !definition.unknown_keys.is_empty() {
        return Err(malformed(format!(
            "unknown field(s): {}",
            definition.unknown_keys.join(", ")
        )));
    }
    let (catalog, schema) = split_namespace(&namespace)
        .ok_or_else(|| malformed(format!("namespace '{}' is not 'catalog.schema'", namespace)))?;
    let name = definition.name.trim();
    if name.is_empty() || name.contains('.') {
        return Err(malformed(format!("invalid object name '{}'", definition.name)));
    }
    if query.trim().is_empty() {
        return Err(malformed("query is empty".to_string()));
    }

    // 3. Kind-specific metadata
    let metadata = &definition.metadata;
    let (view_security_mode, definition_properties) = match definition.kind {
        SemanticKind::View => {
            if let Some(field) = metadata.materialized_fields_set().first() {
                return Err(TranslationError::UnexpectedMetadata {
                    definition: label.to_string(),
                    field: field.to_string(),
                });
            }
            (
                Some(metadata.security_mode.unwrap_or(SecurityMode::Definer)),
                BTreeMap::new(),
            )
        }
        SemanticKind::MaterializedView => {
            if metadata.security_mode.is_some() {
                return Err(TranslationError::UnexpectedMetadata {
                    definition: label.to_string(),
                    field: "security_mode".to_string(),
                });
            }
            let interval = metadata
                .refresh_interval
                .as_deref()
                .map(str::trim)
                .filter(|i| !i.is_empty())
                .ok_or_else(|| TranslationError::MissingRefreshInterval(label.to_string()))?;

            // 4. Durations
            check_refresh_window(label, interval, metadata.max_import_duration.as_deref())?;

            let mut props = BTreeMap::new();
            props.insert("refresh_interval".to_string(), interval.to_string());
            let optional = [
                ("max_import_duration", metadata.max_import_duration.clone()),
                ("incremental_column", metadata.incremental_column.clone()),
                ("grace_period", metadata.grace_period.clone()),
                (
                    "failed_refresh_limit",
                    metadata.failed_refresh_limit.map(|n| n.to_string()),
                ),
                (
                    "refresh_schedule_timezone",
                    metadata.refresh_schedule_timezone.clone(),
                ),
                ("storage_location", storage_location),
            ];
            for (key, value) in optional {
                if let Some(value) = value {
                    props.insert(key.to_string(), value);
                }
            }
            (None, props)
        }
    };

    // 5. Assembly
    Ok(DeploymentPayload {
        kind: definition.kind,
        target: QualifiedName::new(catalog, schema, name),
        definition_query: query,
        description: definition.description.clone(),
        columns: definition.columns.clone(),
        tags: metadata.tags.clone(),
        view_security_mode,
        definition_properties,
        marked_for_deletion: false,
    })
}

fn split_namespace(namespace: &str) -> Option<(&str, &str)> {
    let (catalog, schema) = namespace.trim().split_once('.')?;
    let (catalog, schema) = (catalog.trim(), schema.trim());
    if catalog.is_empty() || schema.is_empty() || schema.contains('.') {
        return None;
    }
    Some((catalog, schema))
}

fn check_refresh_window(
    definition: &str,
    interval: &str,
    max_import: Option<&str>,
) -> Result<(), TranslationError> {
    let invalid = |value: &str| TranslationError::InvalidDuration {
        definition: definition.to_string(),
        value: value.to_string(),
    };

    let interval_minutes = parse_duration_minutes(interval).ok_or_else(|| invalid(interval))?;
    let Some(duration) = max_import else {
        return Ok(());
    };
    let import_minutes = parse_duration_minutes(duration).ok_or_else(|| invalid(duration))?;

    if interval_outlasts_import(interval_minutes, import_minutes) {
        Ok(())
    } else {
        Err(TranslationError::RefreshIntervalTooShort {
            definition: definition.to_string(),
            interval: interval.to_string(),
            duration: duration.to_string(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::config::OptionSet;

    fn config() -> EffectiveConfig {
        let global: OptionSet = [
            ("SEMANTIC_CATALOG", "dp"),
            ("SEMANTIC_SCHEMA", "sales"),
            ("SCHEMA", "demo_raw"),
            ("EMPTY", ""),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        EffectiveConfig::merge(&global, &OptionSet::new())
    }

    const NS: &str = "${SEMANTIC_CATALOG}.${SEMANTIC_SCHEMA}";

    #[test]
    fn test_view_resolves_and_defaults_to_definer() {
        let def = SemanticDefinition::view("orders_v", NS, "SELECT * FROM ${SCHEMA}.orders");
        let payload = translate_one(&def, &config()).unwrap();

        assert_eq!(payload.target, QualifiedName::new("dp", "sales", "orders_v"));
        assert_eq!(payload.definition_query, "SELECT * FROM demo_raw.orders");
        assert_eq!(payload.view_security_mode, Some(SecurityMode::Definer));
        assert!(payload.definition_properties.is_empty());
        assert!(!payload.marked_for_deletion);
    }

    #[test]
    fn test_unresolved_placeholder_names_the_key() {
        let def = SemanticDefinition::view("v", NS, "SELECT * FROM ${MISSING}.t WHERE ${EMPTY}");
        let err = translate_one(&def, &config()).unwrap_err();
        assert_eq!(
            err,
            TranslationError::UnresolvedPlaceholder {
                definition: "v".into(),
                key: "MISSING".into()
            }
        );

        let def = SemanticDefinition::view("v", NS, "SELECT ${EMPTY}");
        let err = translate_one(&def, &config()).unwrap_err();
        assert!(matches!(err, TranslationError::UnresolvedPlaceholder { key, .. } if key == "EMPTY"));
    }

    #[test]
    fn test_namespace_and_name_shape() {
        let def = SemanticDefinition::view("v", "${SEMANTIC_SCHEMA}", "SELECT 1");
        assert!(matches!(
            translate_one(&def, &config()),
            Err(TranslationError::Malformed { .. })
        ));

        let def = SemanticDefinition::view("a.b", NS, "SELECT 1");
        assert!(matches!(
            translate_one(&def, &config()),
            Err(TranslationError::Malformed { .. })
        ));

        let def = SemanticDefinition::view("v", NS, "   ");
        assert!(matches!(
            translate_one(&def, &config()),
            Err(TranslationError::Malformed { .. })
        ));
    }

    #[test]
    fn test_unknown_fields_are_malformed() {
        let mut def = SemanticDefinition::materialized_view("mv", NS, "SELECT 1", "4h");
        def.unknown_keys = vec!["refresh_intervall".into()];

        let err = translate_one(&def, &config()).unwrap_err();
        assert_eq!(
            err,
            TranslationError::Malformed {
                definition: "mv".into(),
                reason: "unknown field(s): refresh_intervall".into()
            }
        );
    }

    #[test]
    fn test_materialized_view_requires_refresh_interval() {
        let mut def = SemanticDefinition::materialized_view("mv", NS, "SELECT 1", "4h");
        def.metadata.refresh_interval = None;
        assert_eq!(
            translate_one(&def, &config()).unwrap_err(),
            TranslationError::MissingRefreshInterval("mv".into())
        );
    }

    #[test]
    fn test_kind_specific_fields_are_rejected_on_the_other_kind() {
        let mut view = SemanticDefinition::view("v", NS, "SELECT 1");
        view.metadata.refresh_interval = Some("1h".into());
        assert_eq!(
            translate_one(&view, &config()).unwrap_err(),
            TranslationError::UnexpectedMetadata {
                definition: "v".into(),
                field: "refresh_interval".into()
            }
        );

        let mut mv = SemanticDefinition::materialized_view("mv", NS, "SELECT 1", "4h");
        mv.metadata.security_mode = Some(SecurityMode::Invoker);
        assert!(matches!(
            translate_one(&mv, &config()).unwrap_err(),
            TranslationError::UnexpectedMetadata { field, .. } if field == "security_mode"
        ));
    }

    #[test]
    fn test_refresh_window_checks() {
        let mut mv = SemanticDefinition::materialized_view("mv", NS, "SELECT 1", "60m");
        mv.metadata.max_import_duration = Some("1h".into());
        assert!(matches!(
            translate_one(&mv, &config()).unwrap_err(),
            TranslationError::RefreshIntervalTooShort { .. }
        ));

        mv.metadata.refresh_interval = Some("67m".into());
        assert!(translate_one(&mv, &config()).is_ok());

        mv.metadata.refresh_interval = Some("4 hours".into());
        assert!(matches!(
            translate_one(&mv, &config()).unwrap_err(),
            TranslationError::InvalidDuration { value, .. } if value == "4 hours"
        ));
    }

    #[test]
    fn test_materialized_properties_are_strings() {
        let mut mv = SemanticDefinition::materialized_view("mv", NS, "SELECT 1", "4h");
        mv.metadata.failed_refresh_limit = Some(3);
        mv.metadata.incremental_column = Some("updated_at".into());
        mv.metadata.storage_location = Some("s3://b/${SCHEMA}/mv/".into());

        let payload = translate_one(&mv, &config()).unwrap();
        assert_eq!(payload.view_security_mode, None);
        assert_eq!(payload.definition_properties["refresh_interval"], "4h");
        assert_eq!(payload.definition_properties["failed_refresh_limit"], "3");
        assert_eq!(payload.definition_properties["incremental_column"], "updated_at");
        assert_eq!(
            payload.definition_properties["storage_location"],
            "s3://b/demo_raw/mv/"
        );
    }

    #[test]
    fn test_batch_keeps_order_and_rejects_later_duplicates() {
        let defs = vec![
            SemanticDefinition::view("a", NS, "SELECT 1"),
            SemanticDefinition::view("b", NS, "SELECT ${NOPE}"),
            SemanticDefinition::view("a", NS, "SELECT 2"),
        ];

        let results = translate(&defs, &config());
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap().definition_query, "SELECT 1");
        assert!(matches!(
            results[1],
            Err(TranslationError::UnresolvedPlaceholder { .. })
        ));
        assert_eq!(
            results[2],
            Err(TranslationError::DuplicateTarget("dp.sales.a".into()))
        );

        assert_eq!(translate(&defs, &config()), results);
    }
}
