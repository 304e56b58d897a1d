// lakeseed-core/src/domain/semantic/placeholder.rs

use regex::{Captures, Regex};
use std::sync::OnceLock;

use crate::domain::config::EffectiveConfig;

fn re_placeholder() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}")
            .unwrap_or_else(|_| Regex::new("$^").unwrap_or_else(|_| unreachable!()))
    })
}

/// Keys referenced by `${KEY}` tokens, in order of appearance (duplicates kept).
pub fn placeholders(template: &str) -> Vec<String> {
    re_placeholder()
        .captures_iter(template)
        .map(|c| c[1].to_string())
        .collect()
}

/// Substitute every `${KEY}` from `config`. Returns the first key that is
/// missing (or empty) instead of substituting a blank.
pub fn substitute(template: &str, config: &EffectiveConfig) -> Result<String, String> {
    if let Some(missing) = placeholders(template)
        .into_iter()
        .find(|key| config.get(key).is_none())
    {
        return Err(missing);
    }

    let resolved = re_placeholder().replace_all(template, |caps: &Captures| {
        config.get(&caps[1]).unwrap_or_default().to_string()
    });
    Ok(resolved.into_owned())
}
