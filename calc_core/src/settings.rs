//! # Engine Settings
//!
//! Tunables for the engine and its collaborators. Settings files are plain
//! JSON; any field left out takes its default, so an empty object `{}` is a
//! valid settings file.
//!
//! ```json
//! {
//!   "fraction_digits": 10,
//!   "max_rewrites": 64,
//!   "default_radix": "DEC",
//!   "history_limit": 500
//! }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{CalcError, CalcResult};
use crate::radix::Radix;
use crate::scientific::Constants;

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Decimals printed for non-integer results before trimming zeros
    pub fraction_digits: usize,

    /// Minimum function-call rewrite budget per expression; an expression
    /// with more opening parentheses gets one rewrite per parenthesis
    pub max_rewrites: usize,

    /// Radix a new programmer session starts in
    pub default_radix: Radix,

    /// Maximum number of history entries kept (0 = unbounded)
    pub history_limit: usize,

    /// Values substituted for `π` and `e`
    pub constants: Constants,
}

impl Default for EngineSettings {
    fn default() -> Self {
        EngineSettings {
            fraction_digits: 10,
            max_rewrites: 64,
            default_radix: Radix::Dec,
            history_limit: 500,
            constants: Constants::default(),
        }
    }
}

/// Read settings from a JSON file.
pub fn load_settings(path: &Path) -> CalcResult<EngineSettings> {
    let contents = fs::read_to_string(path)
        .map_err(|e| CalcError::file_error("read settings", path.display().to_string(), e.to_string()))?;

    let settings: EngineSettings = serde_json::from_str(&contents).map_err(|e| {
        CalcError::serialization(format!("Invalid JSON in {}: {}", path.display(), e))
    })?;

    debug!(path = %path.display(), ?settings, "loaded settings");
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env::temp_dir;

    #[test]
    fn test_defaults() {
        let settings = EngineSettings::default();
        assert_eq!(settings.fraction_digits, 10);
        assert_eq!(settings.max_rewrites, 64);
        assert_eq!(settings.default_radix, Radix::Dec);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings: EngineSettings =
            serde_json::from_str(r#"{"fraction_digits": 4, "default_radix": "HEX"}"#).unwrap();
        assert_eq!(settings.fraction_digits, 4);
        assert_eq!(settings.default_radix, Radix::Hex);
        assert_eq!(settings.max_rewrites, 64);
        assert_eq!(settings.constants, Constants::default());
    }

    #[test]
    fn test_load_settings_file() {
        let path = temp_dir().join("calc_core_test_settings.json");
        fs::write(&path, r#"{"history_limit": 3}"#).unwrap();

        let settings = load_settings(&path).unwrap();
        assert_eq!(settings.history_limit, 3);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_load_settings_errors() {
        let missing = temp_dir().join("calc_core_test_settings_missing.json");
        assert_eq!(load_settings(&missing).unwrap_err().error_code(), "FILE_ERROR");

        let path = temp_dir().join("calc_core_test_settings_bad.json");
        fs::write(&path, "not json").unwrap();
        assert_eq!(load_settings(&path).unwrap_err().error_code(), "SERIALIZATION_ERROR");
        let _ = fs::remove_file(&path);
    }
}
