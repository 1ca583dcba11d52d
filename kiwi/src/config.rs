//! Project configuration read from `kiwi-config.json`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::object_literal::ModuleFormat;

/// File name looked up at the project root.
pub const CONFIG_FILE: &str = "kiwi-config.json";

fn one_or_many<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(s) if s.is_empty() => Vec::new(),
        OneOrMany::One(s) => vec![s],
        OneOrMany::Many(v) => v,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectConfig {
    /// Dictionary store directory, relative to the project root.
    pub kiwi_dir: String,
    pub src_lang: String,
    pub dist_langs: Vec<String>,
    /// Statement inserted into files that gain their first key reference.
    #[serde(rename = "importI18N")]
    pub import_i18n: String,
    #[serde(deserialize_with = "one_or_many")]
    pub ignore_dir: Vec<String>,
    #[serde(deserialize_with = "one_or_many")]
    pub ignore_file: Vec<String>,
    /// Calls whose arguments extraction leaves alone.
    pub ignore_fn_list: Vec<String>,
    /// Extension for newly created dictionary modules.
    pub file_type: String,
    /// Source file extensions that are scanned.
    pub extensions: Vec<String>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        ProjectConfig {
            kiwi_dir: "./.kiwi".to_string(),
            src_lang: "zh-CN".to_string(),
            dist_langs: vec!["en-US".to_string()],
            import_i18n: "import I18N from 'src/utils/I18N';".to_string(),
            ignore_dir: Vec::new(),
            ignore_file: Vec::new(),
            ignore_fn_list: Vec::new(),
            file_type: "ts".to_string(),
            extensions: ["ts", "tsx", "js", "jsx", "vue"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl ProjectConfig {
    /// Reads `kiwi-config.json` under `root`; all defaults when it is absent.
    pub fn load(root: &Path) -> Result<ProjectConfig> {
        let path = root.join(CONFIG_FILE);
        if !path.is_file() {
            debug!(root = %root.display(), "no {CONFIG_FILE}, using defaults");
            return Ok(ProjectConfig::default());
        }
        let content = fs::read_to_string(&path)?;
        let config: ProjectConfig = serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.kiwi_dir.trim().is_empty() {
            return Err(Error::Config("kiwiDir must not be empty".to_string()));
        }
        if self.src_lang.trim().is_empty() {
            return Err(Error::Config("srcLang must not be empty".to_string()));
        }
        self.module_format()?;
        Ok(())
    }

    /// Absolute location of the dictionary store.
    pub fn kiwi_dir_path(&self, root: &Path) -> PathBuf {
        root.join(&self.kiwi_dir)
    }

    pub fn module_format(&self) -> Result<ModuleFormat> {
        ModuleFormat::from_extension(&self.file_type).ok_or_else(|| {
            Error::Config(format!(
                "fileType `{}` is not one of ts, js, json",
                self.file_type
            ))
        })
    }
}
