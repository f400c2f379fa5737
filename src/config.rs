//! Native stage configuration.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Where the bundled native modules live and how to register them.
///
/// Loaded from TOML; every field has a default, so an empty document is a
/// valid configuration.
///
/// ```toml
/// bundle_dir = "C:/tools/dmsoft/native"
/// loader_modules = ["vcruntime140.dll"]
/// automation_module = "dm.dll"
/// apartment = "mta"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StageConfig {
    /// Directory containing the bundled modules.
    pub bundle_dir: PathBuf,
    /// Prefix for the temporary directory the modules are copied into.
    pub temp_prefix: String,
    /// Supporting modules copied before the automation module.
    pub loader_modules: Vec<String>,
    /// The module backing the automation object.
    pub automation_module: String,
    /// Module exporting the registration entry point.
    pub registrar_module: String,
    /// Registration entry point, `fn(path: *const c_char, mode: i32)`.
    pub register_symbol: String,
    /// Threading model the object is registered with.
    pub apartment: Apartment,
    /// Programmatic identifier of the automation object.
    pub prog_id: String,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            bundle_dir: PathBuf::from("native"),
            temp_prefix: "dmsoft-rs".to_string(),
            loader_modules: Vec::new(),
            automation_module: "dm.dll".to_string(),
            registrar_module: "DmReg.dll".to_string(),
            register_symbol: "SetDllPathA".to_string(),
            apartment: Apartment::default(),
            prog_id: "dm.dmsoft".to_string(),
        }
    }
}

/// COM threading model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Apartment {
    /// Single-threaded apartment.
    Sta,
    /// Multi-threaded apartment. The automation object requires this when
    /// used from several threads.
    #[default]
    Mta,
}

impl Apartment {
    /// Mode value expected by the registration entry point.
    pub fn mode(self) -> i32 {
        match self {
            Apartment::Sta => 0,
            Apartment::Mta => 1,
        }
    }
}

impl StageConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::Io(path.as_ref().display().to_string(), e))?;
        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::Parse)
    }

    /// Every module to copy out of the bundle, in load order.
    pub fn bundled_modules(&self) -> impl Iterator<Item = &str> {
        self.loader_modules
            .iter()
            .map(String::as_str)
            .chain([self.registrar_module.as_str(), self.automation_module.as_str()])
    }
}

/// Configuration error.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{0}': {1}")]
    Io(String, #[source] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = StageConfig::from_str("").unwrap();
        assert_eq!(config, StageConfig::default());
        assert_eq!(config.apartment.mode(), 1);
        assert_eq!(config.prog_id, "dm.dmsoft");
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
bundle_dir = "C:/tools/native"
loader_modules = ["msvcp140.dll", "vcruntime140.dll"]
automation_module = "dm7.dll"
apartment = "sta"
"#;
        let config = StageConfig::from_str(toml).unwrap();
        assert_eq!(config.bundle_dir, PathBuf::from("C:/tools/native"));
        assert_eq!(config.apartment, Apartment::Sta);
        assert_eq!(config.apartment.mode(), 0);
        assert_eq!(
            config.bundled_modules().collect::<Vec<_>>(),
            vec!["msvcp140.dll", "vcruntime140.dll", "DmReg.dll", "dm7.dll"]
        );
    }

    #[test]
    fn test_invalid_apartment() {
        assert!(matches!(
            StageConfig::from_str("apartment = \"free\""),
            Err(ConfigError::Parse(_))
        ));
    }
}
