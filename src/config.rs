//! Importer configuration
//!
//! Every recognized option is enumerated here with its default. A config is
//! validated once, when a session is built from it.

use crate::error::{ImportError, ImportResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Display locale. Only affects default display texts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    EnUs,
    PtBr,
}

impl Language {
    /// Parse a locale tag such as `en-US` or `pt-br`
    pub fn parse(tag: &str) -> Option<Self> {
        match tag.trim().to_lowercase().as_str() {
            "en-us" => Some(Language::EnUs),
            "pt-br" => Some(Language::PtBr),
            _ => None,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Language::EnUs => "en-US",
            Language::PtBr => "pt-BR",
        }
    }

    pub fn button_text(&self) -> &'static str {
        match self {
            Language::EnUs => "Do it!",
            Language::PtBr => "Processar!",
        }
    }

    pub fn extra_button_text(&self) -> &'static str {
        match self {
            Language::EnUs => "Cancel",
            Language::PtBr => "Cancelar",
        }
    }

    pub fn input_file_text(&self) -> &'static str {
        match self {
            Language::EnUs => "List",
            Language::PtBr => "Lista",
        }
    }

    pub fn input_file_inside_text(&self) -> &'static str {
        match self {
            Language::EnUs => "Choose a file",
            Language::PtBr => "Escolha um arquivo",
        }
    }
}

/// Attribute as supplied by the caller; `is_image` may be omitted or null
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AttributeSpec {
    pub value_key: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub is_image: Option<bool>,
}

impl AttributeSpec {
    pub fn new(value_key: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            value_key: value_key.into(),
            title: title.into(),
            is_image: None,
        }
    }

    pub fn image(value_key: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            is_image: Some(true),
            ..Self::new(value_key, title)
        }
    }

    /// Parse the command-line form `key=Title` (title defaults to the key)
    pub fn parse_cli(spec: &str, is_image: bool) -> ImportResult<Self> {
        let (key, title) = match spec.split_once('=') {
            Some((key, title)) => (key.trim(), title.trim()),
            None => (spec.trim(), spec.trim()),
        };
        if key.is_empty() {
            return Err(ImportError::Config(format!(
                "attribute '{spec}' has an empty value key"
            )));
        }
        Ok(Self {
            value_key: key.to_string(),
            title: title.to_string(),
            is_image: Some(is_image),
        })
    }
}

const DEFAULT_MAX_VERTICAL_ROWS: usize = 5;

fn default_true() -> bool {
    true
}

fn default_max_rows() -> usize {
    DEFAULT_MAX_VERTICAL_ROWS
}

fn default_button_class() -> String {
    "blue".to_string()
}

fn default_extra_button_class() -> String {
    "red".to_string()
}

/// Options recognized by an import session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImporterConfig {
    #[serde(default)]
    pub attributes: Vec<AttributeSpec>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default = "default_true")]
    pub has_header: bool,
    #[serde(default = "default_max_rows")]
    pub max_vertical_rows_to_display: usize,
    #[serde(default = "default_button_class")]
    pub color_button_class: String,
    #[serde(default = "default_extra_button_class")]
    pub color_extra_button_class: String,
    #[serde(default)]
    pub button_text: Option<String>,
    #[serde(default)]
    pub extra_button_text: Option<String>,
    #[serde(default)]
    pub input_file_text: Option<String>,
    #[serde(default)]
    pub input_file_inside_text: Option<String>,
    #[serde(default)]
    pub show_extra_button: bool,
}

impl Default for ImporterConfig {
    fn default() -> Self {
        Self {
            attributes: Vec::new(),
            language: None,
            has_header: true,
            max_vertical_rows_to_display: DEFAULT_MAX_VERTICAL_ROWS,
            color_button_class: default_button_class(),
            color_extra_button_class: default_extra_button_class(),
            button_text: None,
            extra_button_text: None,
            input_file_text: None,
            input_file_inside_text: None,
            show_extra_button: false,
        }
    }
}

impl ImporterConfig {
    pub fn with_attributes(attributes: Vec<AttributeSpec>) -> Self {
        Self {
            attributes,
            ..Self::default()
        }
    }

    /// Load a YAML (`.yaml`/`.yml`) or JSON (`.json`) config file
    pub fn from_path(path: &Path) -> ImportResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        let config: Self = match extension.as_str() {
            "json" => serde_json::from_str(&content)
                .map_err(|e| ImportError::Config(format!("{}: {}", path.display(), e)))?,
            "yaml" | "yml" => serde_yaml::from_str(&content)
                .map_err(|e| ImportError::Config(format!("{}: {}", path.display(), e)))?,
            other => {
                return Err(ImportError::Config(format!(
                    "unsupported config format '{}' (expected .yaml, .yml or .json)",
                    other
                )))
            }
        };
        config.validate()?;
        Ok(config)
    }

    /// Check option ranges. Language support is checked by the session,
    /// since an unknown language is only a warning.
    pub fn validate(&self) -> ImportResult<()> {
        if self.max_vertical_rows_to_display == 0 {
            return Err(ImportError::Config(
                "max_vertical_rows_to_display must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Resolve the configured language; `Err` carries the unsupported tag
    pub fn resolve_language(&self) -> Result<Language, String> {
        match &self.language {
            None => Ok(Language::default()),
            Some(tag) => Language::parse(tag).ok_or_else(|| tag.clone()),
        }
    }
}
