//! Digest configuration types.

use std::path::PathBuf;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::filter::{DEFAULT_IGNORE_PATTERNS, FilterPolicy};

/// Cryptographic digest function applied to file content and compositions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum DigestAlgorithm {
    /// SHA-256.
    #[default]
    Sha256,
    /// BLAKE3.
    Blake3,
}

/// How child digests are fed into the hash of their parent directory.
///
/// This is part of the digest format: switching it changes every
/// directory digest while leaving file digests untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Composition {
    /// Concatenate the raw 32-byte child digests.
    #[default]
    RawBytes,
    /// Concatenate the lowercase hex text of each child digest.
    HexText,
}

/// Configuration for a digest build.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct DigestConfig {
    /// Root path to digest.
    pub root: PathBuf,

    /// Digest function.
    #[builder(default)]
    #[serde(default)]
    pub algorithm: DigestAlgorithm,

    /// Composition rule for directory digests.
    #[builder(default)]
    #[serde(default)]
    pub composition: Composition,

    /// Entry-name glob patterns excluded before visiting.
    #[builder(default = "default_ignore_patterns()")]
    #[serde(default = "default_ignore_patterns")]
    pub ignore_patterns: Vec<String>,

    /// Follow symbolic links instead of recording them as leaves.
    #[builder(default = "false")]
    #[serde(default)]
    pub follow_symlinks: bool,

    /// Number of worker threads (0 = auto-detect).
    #[builder(default = "0")]
    #[serde(default)]
    pub threads: usize,

    /// Emit one diagnostic line per visited node.
    #[builder(default = "false")]
    #[serde(default)]
    pub verbose: bool,
}

fn default_ignore_patterns() -> Vec<String> {
    DEFAULT_IGNORE_PATTERNS.iter().map(|p| (*p).to_string()).collect()
}

impl DigestConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        match self.root {
            Some(ref root) if root.as_os_str().is_empty() => {
                return Err("Root path cannot be empty".to_string());
            }
            None => return Err("Root path is required".to_string()),
            _ => {}
        }
        if let Some(ref patterns) = self.ignore_patterns {
            FilterPolicy::new(patterns).map_err(|e| e.to_string())?;
        }
        Ok(())
    }
}

impl DigestConfig {
    /// Create a new config builder.
    pub fn builder() -> DigestConfigBuilder {
        DigestConfigBuilder::default()
    }

    /// Create a config with defaults for digesting a path.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            algorithm: DigestAlgorithm::default(),
            composition: Composition::default(),
            ignore_patterns: default_ignore_patterns(),
            follow_symlinks: false,
            threads: 0,
            verbose: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = DigestConfig::builder()
            .root("/data/photos")
            .threads(4usize)
            .algorithm(DigestAlgorithm::Blake3)
            .verbose(true)
            .build()
            .unwrap();

        assert_eq!(config.root, PathBuf::from("/data/photos"));
        assert_eq!(config.threads, 4);
        assert_eq!(config.algorithm, DigestAlgorithm::Blake3);
        assert_eq!(config.composition, Composition::RawBytes);
        assert!(config.verbose);
        assert_eq!(config.ignore_patterns, vec![".DS_Store", "@eaDir"]);
    }

    #[test]
    fn test_config_simple() {
        let config = DigestConfig::new("/data");
        assert_eq!(config.algorithm, DigestAlgorithm::Sha256);
        assert!(!config.follow_symlinks);
        assert!(!config.verbose);
        assert_eq!(config.threads, 0);
    }

    #[test]
    fn test_builder_rejects_missing_or_empty_root() {
        assert!(DigestConfig::builder().build().is_err());
        assert!(DigestConfig::builder().root("").build().is_err());
    }

    #[test]
    fn test_builder_rejects_bad_pattern() {
        let result = DigestConfig::builder()
            .root("/data")
            .ignore_patterns(vec!["[unclosed".to_string()])
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_enum_names() {
        assert_eq!("hex-text".parse::<Composition>().unwrap(), Composition::HexText);
        assert_eq!("blake3".parse::<DigestAlgorithm>().unwrap(), DigestAlgorithm::Blake3);
        assert_eq!(Composition::RawBytes.to_string(), "raw-bytes");
        assert_eq!(DigestAlgorithm::Sha256.to_string(), "sha256");
    }
}
