//! # ballexp-cli — Ball Matrix Exponential Command-Line Interface
//!
//! Provides the `ballexp` binary on top of `ballexp-mat`.
//!
//! ## Subcommands
//!
//! - `ballexp exp`: enclosure of `exp(A)` for a matrix read from JSON,
//!   optionally with the evaluation plan.
//! - `ballexp structure`: reachability pattern of the nonzero entries.
//!
//! ```bash
//! ballexp exp matrix.json --prec 256 --digits 30 --plan
//! ballexp --config exp.yaml exp matrix.json
//! ballexp structure matrix.json
//! ```
//!
//! ## Crate Policy
//!
//! - CLI construction (argument parsing) is separated from the handlers.
//! - Handlers write to a caller-supplied writer so they can be tested
//!   without a process boundary.
//! - All numerical work is delegated to `ballexp-mat`.

pub mod exp;
pub mod input;
pub mod structure;

use std::path::Path;

use anyhow::{ensure, Context, Result};
use ballexp_mat::{ExpConfig, MAX_GUARD_BITS_FACTOR};

/// Load an [`ExpConfig`] from a YAML file, or the defaults when no file
/// is given. Missing fields take their default values.
pub fn load_config(path: Option<&Path>) -> Result<ExpConfig> {
    let Some(path) = path else {
        return Ok(ExpConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config: ExpConfig = serde_yaml::from_str(&text)
        .with_context(|| format!("invalid config {}", path.display()))?;
    ensure!(
        config.is_valid(),
        "invalid config {}: guard_bits_factor must be at most {MAX_GUARD_BITS_FACTOR}, got {}",
        path.display(),
        config.guard_bits_factor
    );
    tracing::debug!(path = %path.display(), ?config, "loaded configuration");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_without_path() {
        assert_eq!(load_config(None).unwrap(), ExpConfig::default());
    }

    #[test]
    fn partial_yaml_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("exp.yaml");
        std::fs::write(&path, "guard_bits_factor: 4\ndiagonal_fast_path: false\n").unwrap();
        let c = load_config(Some(&path)).unwrap();
        assert_eq!(c.guard_bits_factor, 4);
        assert!(!c.diagonal_fast_path);
        assert!(c.detect_structure);
    }

    #[test]
    fn invalid_yaml_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("exp.yaml");
        std::fs::write(&path, "guard_bits_factor: lots\n").unwrap();
        assert!(load_config(Some(&path)).is_err());
        assert!(load_config(Some(&dir.path().join("none.yaml"))).is_err());
    }

    #[test]
    fn oversized_guard_bits_factor_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("exp.yaml");
        std::fs::write(&path, "guard_bits_factor: 65\n").unwrap();
        let err = load_config(Some(&path)).unwrap_err();
        assert!(format!("{err:#}").contains("at most 64"), "{err:#}");

        std::fs::write(&path, "guard_bits_factor: 64\n").unwrap();
        assert_eq!(load_config(Some(&path)).unwrap().guard_bits_factor, 64);
    }
}
