// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 flowline contributors

//! Environment-driven capture settings
//!
//! All knobs default to sensible values; `FLOWLINE_*` variables override.

/// Capture-time behavior settings for [`FlowRegistry`](crate::flow::FlowRegistry)
#[derive(Debug, Clone)]
pub struct Settings {
    /// Record a capture issue when a step closes with no marked I/O
    pub warn_on_missing_io: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            warn_on_missing_io: true,
        }
    }
}

impl Settings {
    /// Load settings from the environment, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            warn_on_missing_io: env_bool("FLOWLINE_WARN_ON_MISSING_IO")
                .unwrap_or(defaults.warn_on_missing_io),
        }
    }
}

fn env_bool(var: &str) -> Option<bool> {
    let value = std::env::var(var).ok()?;
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert!(settings.warn_on_missing_io);
    }

    #[test]
    fn test_env_bool_parsing() {
        std::env::set_var("FLOWLINE_TEST_BOOL", "off");
        assert_eq!(env_bool("FLOWLINE_TEST_BOOL"), Some(false));
        std::env::set_var("FLOWLINE_TEST_BOOL", "YES");
        assert_eq!(env_bool("FLOWLINE_TEST_BOOL"), Some(true));
        std::env::set_var("FLOWLINE_TEST_BOOL", "maybe");
        assert_eq!(env_bool("FLOWLINE_TEST_BOOL"), None);
        std::env::remove_var("FLOWLINE_TEST_BOOL");
    }
}
