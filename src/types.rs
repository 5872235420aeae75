// src/types.rs

use std::time::Duration;

use serde::Deserialize;

/// How the configured main class expects to be launched.
///
/// This is decided when the config is parsed instead of by inspecting the
/// application's classes.
///
/// - `Plain`: a regular `main` method; only `run_args` are passed.
/// - `Vertx`: the Vert.x launcher; the main verticle plus `-options`/`-conf`
///   are passed before `run_args`.
/// - `LegacyVertx`: the pre-4.x launcher, which additionally needs the
///   leading `run` sub-command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LauncherKind {
    #[default]
    Plain,
    Vertx,
    LegacyVertx,
}

impl LauncherKind {
    /// Whether the main class follows the Vert.x launcher convention.
    pub fn is_vertx(self) -> bool {
        matches!(self, LauncherKind::Vertx | LauncherKind::LegacyVertx)
    }
}

/// Parse a simple duration string like `"3s"`, `"250ms"`, `"1m"`, `"2h"`.
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    // Find the boundary between digits and suffix.
    let idx = s
        .chars()
        .position(|c| !c.is_ascii_digit())
        .ok_or_else(|| format!("duration '{s}' is missing a unit suffix"))?;

    let (num_part, unit_part) = s.split_at(idx);
    let value: u64 = num_part
        .parse()
        .map_err(|e| format!("invalid duration number '{}': {}", num_part, e))?;
    let unit = unit_part.trim().to_lowercase();

    match unit.as_str() {
        "ms" => Ok(Duration::from_millis(value)),
        "s" => Ok(Duration::from_secs(value)),
        "m" => scaled_secs(value, 60, s),
        "h" => scaled_secs(value, 60 * 60, s),
        _ => Err(format!(
            "unsupported duration unit '{}'; expected ms, s, m, or h",
            unit
        )),
    }
}

fn scaled_secs(value: u64, factor: u64, input: &str) -> Result<Duration, String> {
    value
        .checked_mul(factor)
        .map(Duration::from_secs)
        .ok_or_else(|| format!("duration '{}' is too large", input.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn durations_with_every_unit() {
        assert_eq!(parse_duration("250ms"), Ok(Duration::from_millis(250)));
        assert_eq!(parse_duration(" 3s "), Ok(Duration::from_secs(3)));
        assert_eq!(parse_duration("2m"), Ok(Duration::from_secs(120)));
        assert_eq!(parse_duration("1h"), Ok(Duration::from_secs(3600)));
    }

    #[test]
    fn oversized_durations_are_rejected() {
        assert!(parse_duration("400000000000000000h").is_err());
        assert!(parse_duration("400000000000000000m").is_err());
        assert_eq!(
            parse_duration("400000000000000000s"),
            Ok(Duration::from_secs(400_000_000_000_000_000))
        );
    }

    #[test]
    fn durations_need_number_and_unit() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("10").is_err());
        assert!(parse_duration("ms").is_err());
        assert!(parse_duration("5d").is_err());
    }
}
