// lakeseed-core/src/domain/semantic/duration.rs

use regex::Regex;
use std::sync::OnceLock;

fn re_duration() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(\d+)([mhd])$")
            .unwrap_or_else(|_| Regex::new("$^").unwrap_or_else(|_| unreachable!()))
    })
}

/// `'30m'`, `'4h'`, `'2d'` -> minutes. Case-insensitive, surrounding blanks ignored.
pub fn parse_duration_minutes(raw: &str) -> Option<u64> {
    let normalized = raw.trim().to_lowercase();
    let caps = re_duration().captures(&normalized)?;
    let value: u64 = caps[1].parse().ok()?;
    let factor = match &caps[2] {
        "m" => 1,
        "h" => 60,
        "d" => 1440,
        _ => return None,
    };
    value.checked_mul(factor)
}

/// A refresh interval must exceed the import duration by more than 10%.
pub fn interval_outlasts_import(interval_minutes: u64, import_minutes: u64) -> bool {
    // interval > duration * 1.10, in integer arithmetic
    u128::from(interval_minutes) * 10 > u128::from(import_minutes) * 11
}
