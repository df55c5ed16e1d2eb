// src/config.rs
use anyhow::{bail, Result};
use std::path::PathBuf;

/// Where the device export lands when nobody says otherwise.
pub const DEFAULT_INPUT: &str = "attached_assets/devices-export-2025-07-08_1752032004646.csv";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// CSV export to read.
    pub input: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
        }
    }
}

impl Config {
    /// Build from the process arguments, program name already stripped.
    /// Accepts at most one positional argument: the input path.
    pub fn from_args<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut args = args.into_iter().map(Into::into);
        let mut config = Self::default();
        if let Some(path) = args.next() {
            config.input = PathBuf::from(path);
        }
        if let Some(extra) = args.next() {
            bail!("unexpected argument `{}`; usage: deptroster [CSV_PATH]", extra);
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_args_uses_default_path() {
        let cfg = Config::from_args(Vec::<String>::new()).unwrap();
        assert_eq!(cfg.input, PathBuf::from(DEFAULT_INPUT));
    }

    #[test]
    fn test_positional_overrides_path() {
        let cfg = Config::from_args(["exports/today.csv"]).unwrap();
        assert_eq!(cfg.input, PathBuf::from("exports/today.csv"));
    }

    #[test]
    fn test_extra_args_rejected() {
        let err = Config::from_args(["a.csv", "b.csv"]).unwrap_err();
        assert!(err.to_string().contains("b.csv"));
    }
}
