//! Mapper configuration: corpus layout, marker tokens and token conventions.
//!
//! Loaded from TOML. Every field has a default, so an absent file or an
//! absent section means "use the regression-test framework's conventions".

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "rtmap.toml";

pub const DEFAULT_SOURCE_PREFIXES: [&str; 10] = [
    "@[INPUTDATA_ROOT_WW3]",
    "@[INPUTDATA_ROOT_BMIC]",
    "@[INPUTDATA_ROOT]",
    "${FILEDIR}",
    "${PATHRT}",
    "${FV3_IC}",
    "${MOM_IC}",
    "${ICE_IC}",
    "../",
    "$RFILE",
];

pub const DEFAULT_DATASET_EXTENSIONS: [&str; 3] = [".nc", ".grib", ".grb"];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid toml at {path}: {source}")]
    ParseToml {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct MapperConfig {
    pub corpus: CorpusLayout,
    pub markers: MarkerTokens,
    pub transfer: TransferConventions,
    pub namelist: NamelistConventions,
    pub join: JoinOptions,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct CorpusLayout {
    pub root: PathBuf,
    pub tests_dir: PathBuf,
    pub model_conf_dir: PathBuf,
    pub namelist_dir: PathBuf,
    pub reference_table: PathBuf,
}

impl Default for CorpusLayout {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            tests_dir: PathBuf::from("tests/tests"),
            model_conf_dir: PathBuf::from("tests/fv3_conf"),
            namelist_dir: PathBuf::from("tests/parm"),
            reference_table: PathBuf::from("AppSuiteCombo2Test.csv"),
        }
    }
}

impl CorpusLayout {
    pub fn tests_path(&self) -> PathBuf {
        self.under_root(&self.tests_dir)
    }

    pub fn model_conf_path(&self) -> PathBuf {
        self.under_root(&self.model_conf_dir)
    }

    pub fn namelist_path(&self) -> PathBuf {
        self.under_root(&self.namelist_dir)
    }

    fn under_root(&self, dir: &Path) -> PathBuf {
        if dir.is_absolute() {
            dir.to_path_buf()
        } else {
            self.root.join(dir)
        }
    }
}

/// Fixed keywords the test-definition scripts use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct MarkerTokens {
    /// Assignment keyword naming the baseline dataset folder.
    pub baseline: String,
    /// Prefix of the default-setup calls (`export_fv3`, `export_cpl`, ...).
    pub invocation: String,
    pub model_conf_variable: String,
    pub namelist_variable: String,
}

impl Default for MarkerTokens {
    fn default() -> Self {
        Self {
            baseline: "CNTL_DIR".to_string(),
            invocation: "export_".to_string(),
            model_conf_variable: "FV3_RUN".to_string(),
            namelist_variable: "INPUT_NML".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct TransferConventions {
    /// Prefixes marking a `cp` argument as a tracked external source path.
    pub source_prefixes: Vec<String>,
}

impl Default for TransferConventions {
    fn default() -> Self {
        Self {
            source_prefixes: DEFAULT_SOURCE_PREFIXES
                .iter()
                .map(|prefix| prefix.to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct NamelistConventions {
    pub dataset_extensions: Vec<String>,
}

impl Default for NamelistConventions {
    fn default() -> Self {
        Self {
            dataset_extensions: DEFAULT_DATASET_EXTENSIONS
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct JoinOptions {
    /// Attach namelist dataset filenames parsed straight from the namelist
    /// corpus during dependency resolution.
    pub namelist_enrichment: bool,
}

impl Default for JoinOptions {
    fn default() -> Self {
        Self {
            namelist_enrichment: true,
        }
    }
}

impl MapperConfig {
    pub fn from_toml_str(text: &str, origin: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|source| ConfigError::ParseToml {
            path: origin.to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file. A missing file at the default location yields
    /// defaults; a missing file that was asked for explicitly is an error.
    pub fn load(path: impl AsRef<Path>, explicit: bool) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !explicit && !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_toml_str(&text, &path.display().to_string())?;
        tracing::info!(path = %path.display(), "config loaded");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let markers = [
            ("markers.baseline", &self.markers.baseline),
            ("markers.invocation", &self.markers.invocation),
            ("markers.model_conf_variable", &self.markers.model_conf_variable),
            ("markers.namelist_variable", &self.markers.namelist_variable),
        ];
        for (field, value) in markers {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("`{field}` must not be empty")));
            }
        }
        if self
            .transfer
            .source_prefixes
            .iter()
            .all(|prefix| prefix.is_empty())
        {
            return Err(ConfigError::Invalid(
                "`transfer.source_prefixes` must list at least one prefix".to_string(),
            ));
        }
        if self
            .namelist
            .dataset_extensions
            .iter()
            .all(|ext| ext.is_empty())
        {
            return Err(ConfigError::Invalid(
                "`namelist.dataset_extensions` must list at least one extension".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = MapperConfig::from_toml_str("", "<inline>").expect("empty config parses");
        assert_eq!(config, MapperConfig::default());
        assert_eq!(config.markers.baseline, "CNTL_DIR");
        assert_eq!(config.transfer.source_prefixes.len(), 10);
        assert!(config.join.namelist_enrichment);
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config = MapperConfig::from_toml_str(
            r#"
[corpus]
root = "/srv/ufs-weather-model"

[namelist]
dataset_extensions = [".nc"]
"#,
            "<inline>",
        )
        .expect("config parses");
        assert_eq!(config.corpus.root, PathBuf::from("/srv/ufs-weather-model"));
        assert_eq!(
            config.corpus.tests_path(),
            PathBuf::from("/srv/ufs-weather-model/tests/tests")
        );
        assert_eq!(config.namelist.dataset_extensions, vec![".nc".to_string()]);
        assert_eq!(config.markers, MarkerTokens::default());
    }

    #[test]
    fn empty_marker_is_rejected() {
        let err = MapperConfig::from_toml_str("[markers]\nbaseline = \" \"\n", "<inline>")
            .expect_err("blank marker must be rejected");
        assert!(matches!(err, ConfigError::Invalid(message) if message.contains("baseline")));
    }

    #[test]
    fn malformed_toml_reports_origin() {
        let err = MapperConfig::from_toml_str("[corpus\n", "rtmap.toml")
            .expect_err("broken toml must fail");
        assert!(err.to_string().contains("rtmap.toml"));
    }

    #[test]
    fn absolute_directories_ignore_root() {
        let layout = CorpusLayout {
            root: PathBuf::from("/repo"),
            namelist_dir: PathBuf::from("/elsewhere/parm"),
            ..CorpusLayout::default()
        };
        assert_eq!(layout.namelist_path(), PathBuf::from("/elsewhere/parm"));
        assert_eq!(layout.model_conf_path(), PathBuf::from("/repo/tests/fv3_conf"));
    }

    #[test]
    fn missing_default_file_falls_back_to_defaults() {
        let config = MapperConfig::load("/nonexistent/rtmap.toml", false)
            .expect("missing implicit config is fine");
        assert_eq!(config, MapperConfig::default());
        assert!(MapperConfig::load("/nonexistent/rtmap.toml", true).is_err());
    }
}
