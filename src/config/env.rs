//! Process environment queries.
//!
//! - `HOT_ROUTER_ENV=production` (or `--production`) selects production mode
//! - `BUILD_NUMBER`, `TEAMCITY_VERSION` or `CI` mark a CI run
//! - `HOT_ROUTER_WATCH` forces file watching on or off

use serde::Serialize;

pub const ENV_VAR: &str = "HOT_ROUTER_ENV";
pub const WATCH_VAR: &str = "HOT_ROUTER_WATCH";
const CI_VARS: &[&str] = &["BUILD_NUMBER", "TEAMCITY_VERSION", "CI"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Development,
    Production,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Environment {
    pub mode: Mode,
    pub ci: bool,
    /// Explicit watch override; `None` leaves it to the config and mode.
    pub watch: Option<bool>,
}

impl Environment {
    /// Read the real process environment.
    pub fn detect(production_flag: bool) -> Self {
        Self::from_lookup(production_flag, |key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup.
    pub fn from_lookup(production_flag: bool, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let production = production_flag
            || lookup(ENV_VAR)
                .map(|value| value.trim().eq_ignore_ascii_case("production"))
                .unwrap_or(false);

        let ci = CI_VARS
            .iter()
            .any(|key| lookup(key).is_some_and(|value| !value.is_empty()));

        Self {
            mode: if production {
                Mode::Production
            } else {
                Mode::Development
            },
            ci,
            watch: lookup(WATCH_VAR).and_then(|value| parse_flag(&value)),
        }
    }

    pub fn is_production(&self) -> bool {
        self.mode == Mode::Production
    }

    /// Whether file watching should run, given the configured default.
    pub fn watch_enabled(&self, configured: bool) -> bool {
        self.watch
            .unwrap_or(configured && !self.is_production())
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)], production_flag: bool) -> Environment {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Environment::from_lookup(production_flag, |key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_to_development() {
        let e = env(&[], false);
        assert_eq!(e.mode, Mode::Development);
        assert!(!e.ci);
        assert!(e.watch_enabled(true));
        assert!(!e.watch_enabled(false));
    }

    #[test]
    fn production_from_flag_or_variable() {
        assert!(env(&[], true).is_production());
        assert!(env(&[(ENV_VAR, "Production")], false).is_production());
        assert!(!env(&[(ENV_VAR, "staging")], false).is_production());
    }

    #[test]
    fn production_disables_watching_unless_forced() {
        assert!(!env(&[], true).watch_enabled(true));
        assert!(env(&[(WATCH_VAR, "true")], true).watch_enabled(true));
        assert!(!env(&[(WATCH_VAR, "0")], false).watch_enabled(true));
        assert!(env(&[(WATCH_VAR, "maybe")], false).watch_enabled(true));
    }

    #[test]
    fn ci_detection() {
        assert!(env(&[("TEAMCITY_VERSION", "2024.1")], false).ci);
        assert!(env(&[("BUILD_NUMBER", "42")], false).ci);
        assert!(!env(&[("CI", "")], false).ci);
    }
}
