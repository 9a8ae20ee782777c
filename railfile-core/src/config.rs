use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CoreConfig {
    #[serde(default)]
    pub system: SystemConfig,
    #[serde(default)]
    pub catalogue: CatalogueConfig,
    #[serde(default)]
    pub vocabulary: VocabularyConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub logbook: LogbookConfig,
}

impl CoreConfig {
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join("config.toml");
        let mut cfg = if path.exists() {
            let text = fs::read_to_string(&path)
                .with_context(|| format!("reading config file {}", path.display()))?;
            Self::from_toml_str(&text)
                .with_context(|| format!("parsing config file {}", path.display()))?
        } else {
            tracing::info!(
                "No config file found at {}. Using CoreConfig::default().",
                path.display()
            );
            CoreConfig::default()
        };
        cfg.resolve_paths(root);
        Ok(cfg)
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str::<CoreConfig>(text)?)
    }

    fn resolve_paths(&mut self, root: &Path) {
        self.catalogue.db_path = absolutize(root, &self.catalogue.db_path);
        self.catalogue.media_path = absolutize(root, &self.catalogue.media_path);
        self.vocabulary.context_path = absolutize(root, &self.vocabulary.context_path);
        self.vocabulary.train_path = absolutize(root, &self.vocabulary.train_path);
        self.logbook.path = absolutize(root, &self.logbook.path);
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SystemConfig {
    #[serde(default = "SystemConfig::default_name")]
    pub name: String,
    #[serde(default = "SystemConfig::default_version")]
    pub version: String,
}

impl SystemConfig {
    fn default_name() -> String {
        "railfile".to_string()
    }

    fn default_version() -> String {
        "0.1.0".to_string()
    }
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            name: Self::default_name(),
            version: Self::default_version(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogueConfig {
    #[serde(default = "CatalogueConfig::default_db_path")]
    pub db_path: PathBuf,
    #[serde(default = "CatalogueConfig::default_media_path")]
    pub media_path: PathBuf,
    /// Relative folder prefixes skipped while scanning.
    #[serde(default)]
    pub excluded_folders: Vec<String>,
    /// Relative file paths skipped while scanning.
    #[serde(default)]
    pub excluded_files: Vec<String>,
    #[serde(default = "CatalogueConfig::default_extensions")]
    pub extensions: Vec<String>,
    #[serde(default = "CatalogueConfig::default_video_extensions")]
    pub video_extensions: Vec<String>,
}

impl CatalogueConfig {
    fn default_db_path() -> PathBuf {
        PathBuf::from("cache/catalogue.db")
    }

    fn default_media_path() -> PathBuf {
        PathBuf::from("media")
    }

    fn default_extensions() -> Vec<String> {
        [".jpg", ".jpeg", ".png", ".webp", ".mp4", ".mov"]
            .into_iter()
            .map(String::from)
            .collect()
    }

    fn default_video_extensions() -> Vec<String> {
        vec![".mp4".to_string(), ".mov".to_string()]
    }

    /// Lowercased extension of `path` with its leading dot, if any.
    pub fn extension_of(path: &Path) -> Option<String> {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e.to_ascii_lowercase()))
    }

    pub fn is_video(&self, path: &Path) -> bool {
        Self::extension_of(path)
            .map(|ext| self.video_extensions.iter().any(|v| v.eq_ignore_ascii_case(&ext)))
            .unwrap_or(false)
    }

    pub fn is_media(&self, path: &Path) -> bool {
        Self::extension_of(path)
            .map(|ext| self.extensions.iter().any(|v| v.eq_ignore_ascii_case(&ext)))
            .unwrap_or(false)
    }
}

impl Default for CatalogueConfig {
    fn default() -> Self {
        Self {
            db_path: Self::default_db_path(),
            media_path: Self::default_media_path(),
            excluded_folders: vec![],
            excluded_files: vec![],
            extensions: Self::default_extensions(),
            video_extensions: Self::default_video_extensions(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct VocabularyConfig {
    #[serde(default = "VocabularyConfig::default_context_path")]
    pub context_path: PathBuf,
    #[serde(default = "VocabularyConfig::default_train_path")]
    pub train_path: PathBuf,
}

impl VocabularyConfig {
    fn default_context_path() -> PathBuf {
        PathBuf::from("vocabulary/context.toml")
    }

    fn default_train_path() -> PathBuf {
        PathBuf::from("vocabulary/train.toml")
    }
}

impl Default for VocabularyConfig {
    fn default() -> Self {
        Self {
            context_path: Self::default_context_path(),
            train_path: Self::default_train_path(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    #[serde(default = "LimitsConfig::default_max_tag_len")]
    pub max_tag_len: usize,
    /// Tags in one train.
    #[serde(default = "LimitsConfig::default_max_train_tags")]
    pub max_train_tags: usize,
    /// Trains per item; matches the upper bound of the query's train range.
    #[serde(default = "LimitsConfig::default_max_trains")]
    pub max_trains: usize,
}

impl LimitsConfig {
    fn default_max_tag_len() -> usize {
        50
    }

    fn default_max_train_tags() -> usize {
        10
    }

    fn default_max_trains() -> usize {
        10
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_tag_len: Self::default_max_tag_len(),
            max_train_tags: Self::default_max_train_tags(),
            max_trains: Self::default_max_trains(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogbookConfig {
    #[serde(default = "LogbookConfig::default_path")]
    pub path: PathBuf,
}

impl LogbookConfig {
    fn default_path() -> PathBuf {
        PathBuf::from("logbook.jsonl")
    }
}

impl Default for LogbookConfig {
    fn default() -> Self {
        Self {
            path: Self::default_path(),
        }
    }
}

fn absolutize(root: &Path, value: &Path) -> PathBuf {
    if value.is_absolute() {
        value.to_path_buf()
    } else {
        root.join(value)
    }
}
