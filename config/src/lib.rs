//! Umbra Configuration
//!
//! Shared configuration crate for the Umbra tools.
//!
//! Handles loading configuration from:
//! 1. UMBRA_CONFIG env var (explicit path)
//! 2. ./config.toml (current directory)
//! 3. ~/.umbra/config.toml (user home)
//!
//! Environment variables take precedence over TOML config.
//!
//! The privacy library never reads configuration itself; callers convert
//! the `[tree]` section with [`UmbraConfig::tree_params`] and pass it in.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::{env, fs};
use umbra_privacy::{TreeParams, field_from_decimal};

const CONFIG_FILE_NAME: &str = "config.toml";
const CONFIG_DIR_NAME: &str = ".umbra";

// ============================================================================
// Default Constants
// ============================================================================

const DEFAULT_TREE_DEPTH: usize = umbra_privacy::DEFAULT_DEPTH;
const DEFAULT_ZERO_VALUE: &str = "0";
const DEFAULT_PROTOCOL_VERSION: u64 = umbra_privacy::COMMITMENT_VERSION;
const DEFAULT_OUTPUT_DIR: &str = "./circuits";

// ============================================================================
// Config Structs
// ============================================================================

/// Root configuration structure (matches TOML layout)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UmbraConfig {
    #[serde(default)]
    pub tree: TreeConfig,
    #[serde(default)]
    pub protocol: ProtocolConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Merkle tree shape
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeConfig {
    #[serde(default = "default_tree_depth")]
    pub depth: usize,
    /// Empty-leaf value, decimal
    #[serde(default = "default_zero_value")]
    pub zero_value: String,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            depth: DEFAULT_TREE_DEPTH,
            zero_value: DEFAULT_ZERO_VALUE.into(),
        }
    }
}

fn default_tree_depth() -> usize {
    DEFAULT_TREE_DEPTH
}

fn default_zero_value() -> String {
    DEFAULT_ZERO_VALUE.into()
}

/// Protocol parameters bound into commitments
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtocolConfig {
    #[serde(default = "default_protocol_version")]
    pub version: u64,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            version: DEFAULT_PROTOCOL_VERSION,
        }
    }
}

fn default_protocol_version() -> u64 {
    DEFAULT_PROTOCOL_VERSION
}

/// Where generated witness files go
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub directory: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: DEFAULT_OUTPUT_DIR.into(),
        }
    }
}

fn default_output_dir() -> String {
    DEFAULT_OUTPUT_DIR.into()
}

// ============================================================================
// Environment Variable Helpers
// ============================================================================

/// Set field from env var if present
fn env_string(key: &str, field: &mut String) {
    if let Ok(v) = env::var(key) {
        *field = v;
    }
}

/// Set field from env var if present and parseable
fn env_parse<T: std::str::FromStr>(key: &str, field: &mut T) {
    if let Ok(v) = env::var(key) {
        match v.parse() {
            Ok(parsed) => *field = parsed,
            Err(_) => log::warn!("Ignoring unparseable {}={}", key, v),
        }
    }
}

// ============================================================================
// Implementation
// ============================================================================

impl UmbraConfig {
    /// Load configuration from config file with env var overrides
    pub fn load() -> Result<Self> {
        let mut config = match Self::find_config_file() {
            Some(path) => {
                log::info!("Loading config from: {}", path.display());
                Self::parse_file(&path)?
            }
            None => {
                log::info!("No config file found, using defaults and environment variables");
                Self::default()
            }
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from a specific file path
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = Self::parse_file(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    fn parse_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Find the config file path
    fn find_config_file() -> Option<PathBuf> {
        // 1. Check UMBRA_CONFIG env var
        if let Ok(path) = env::var("UMBRA_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
            log::warn!("UMBRA_CONFIG points to missing file: {}", path.display());
        }

        // 2. Check ./config.toml (current directory)
        let local_path = PathBuf::from(CONFIG_FILE_NAME);
        if local_path.exists() {
            return Some(local_path);
        }

        // 3. Check ~/.umbra/config.toml
        Self::default_config_path().filter(|p| p.exists())
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        env_parse("UMBRA_TREE_DEPTH", &mut self.tree.depth);
        env_string("UMBRA_ZERO_VALUE", &mut self.tree.zero_value);
        env_parse("UMBRA_PROTOCOL_VERSION", &mut self.protocol.version);
        env_string("UMBRA_OUTPUT_DIR", &mut self.output.directory);
    }

    /// Get the default config file path
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Generate a sample config file
    pub fn generate_sample() -> Result<String> {
        toml::to_string_pretty(&Self::default()).context("Failed to render sample config")
    }

    /// Validated tree parameters for the privacy library.
    pub fn tree_params(&self) -> Result<TreeParams> {
        let zero_value = field_from_decimal(&self.tree.zero_value)
            .with_context(|| format!("Invalid tree.zero_value: {}", self.tree.zero_value))?;
        let params = TreeParams::new(self.tree.depth)
            .with_context(|| format!("Invalid tree.depth: {}", self.tree.depth))?;
        Ok(params.with_zero_value(zero_value))
    }

    pub fn output_dir(&self) -> PathBuf {
        PathBuf::from(&self.output.directory)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = UmbraConfig::default();
        assert_eq!(config.tree.depth, 20);
        assert_eq!(config.tree.zero_value, DEFAULT_ZERO_VALUE);
        assert_eq!(config.protocol.version, 1);
        assert_eq!(config.output.directory, DEFAULT_OUTPUT_DIR);
    }

    #[test]
    fn test_generate_sample() {
        let sample = UmbraConfig::generate_sample().unwrap();
        assert!(sample.contains("[tree]"));
        assert!(sample.contains("[protocol]"));
        assert!(sample.contains("[output]"));
    }

    #[test]
    fn test_parse_sample() {
        let sample = UmbraConfig::generate_sample().unwrap();
        let parsed: UmbraConfig = toml::from_str(&sample).unwrap();
        assert_eq!(parsed.tree.depth, DEFAULT_TREE_DEPTH);
        assert_eq!(parsed.output.directory, DEFAULT_OUTPUT_DIR);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let parsed: UmbraConfig = toml::from_str("[tree]\ndepth = 8\n").unwrap();
        assert_eq!(parsed.tree.depth, 8);
        assert_eq!(parsed.tree.zero_value, "0");
        assert_eq!(parsed.protocol.version, DEFAULT_PROTOCOL_VERSION);
    }

    #[test]
    fn test_tree_params() {
        let mut config = UmbraConfig::default();
        config.tree.depth = 4;
        config.tree.zero_value = "7".into();
        let params = config.tree_params().unwrap();
        assert_eq!(params.depth(), 4);
        assert_eq!(params.zero_value(), field_from_decimal("7").unwrap());
    }

    #[test]
    fn test_tree_params_rejects_invalid() {
        let mut config = UmbraConfig::default();
        config.tree.depth = 0;
        assert!(config.tree_params().is_err());

        let mut config = UmbraConfig::default();
        config.tree.zero_value = "not a number".into();
        assert!(config.tree_params().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = env::temp_dir().join(format!("umbra-config-test-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(CONFIG_FILE_NAME);
        fs::write(&path, "[output]\ndirectory = \"/tmp/witness\"\n").unwrap();

        let config = UmbraConfig::load_from(&path).unwrap();
        assert_eq!(config.tree.depth, DEFAULT_TREE_DEPTH);
        fs::remove_dir_all(&dir).unwrap();

        assert!(UmbraConfig::load_from(&path).is_err());
        assert!(config.output.directory == "/tmp/witness" || env::var("UMBRA_OUTPUT_DIR").is_ok());
    }
}
