use crate::core::ConfigProvider;
use crate::domain::model::{DataFormat, NanPolicy};
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub pipeline: PipelineConfig,
    pub source: SourceConfig,
    #[serde(default)]
    pub coercion: CoercionConfig,
    pub load: LoadConfig,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub input_path: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoercionConfig {
    #[serde(default)]
    pub numeric_fields: Vec<String>,
    pub default_value: Option<f64>,
    pub nan_policy: Option<NanPolicy>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_path: String,
    pub output_formats: Vec<DataFormat>,
    pub filenames: Option<FilenameConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilenameConfig {
    pub csv: Option<String>,
    pub json: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub verbose: bool,
    #[serde(default)]
    pub json: bool,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${INPUT_DIR})，找不到的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| EtlError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validation::validate_non_empty_string("pipeline.name", &self.pipeline.name)?;

        validation::validate_path("source.input_path", &self.source.input_path)?;
        validation::validate_file_extensions(
            "source.input_path",
            std::slice::from_ref(&self.source.input_path),
            &["csv", "json"],
        )?;

        validation::validate_unique_fields(
            "coercion.numeric_fields",
            &self.coercion.numeric_fields,
        )?;
        validation::validate_not_nan("coercion.default_value", self.default_value())?;

        validation::validate_path("load.output_path", &self.load.output_path)?;
        if self.load.output_formats.is_empty() {
            return Err(EtlError::MissingConfigError {
                field: "load.output_formats".to_string(),
            });
        }

        if let Some(filenames) = &self.load.filenames {
            for (field, name) in [
                ("load.filenames.csv", &filenames.csv),
                ("load.filenames.json", &filenames.json),
            ] {
                if let Some(name) = name {
                    validation::validate_path(field, name)?;
                }
            }
        }

        Ok(())
    }

    pub fn default_value(&self) -> f64 {
        self.coercion.default_value.unwrap_or(0.0)
    }

    pub fn verbose_logging(&self) -> bool {
        self.logging.as_ref().map(|l| l.verbose).unwrap_or(false)
    }

    pub fn json_logging(&self) -> bool {
        self.logging.as_ref().map(|l| l.json).unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    fn input_path(&self) -> &str {
        &self.source.input_path
    }

    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn numeric_fields(&self) -> &[String] {
        &self.coercion.numeric_fields
    }

    fn default_value(&self) -> f64 {
        self.default_value()
    }

    fn nan_policy(&self) -> NanPolicy {
        self.coercion.nan_policy.unwrap_or_default()
    }

    fn output_formats(&self) -> &[DataFormat] {
        &self.load.output_formats
    }

    fn output_filename(&self, format: DataFormat) -> String {
        let configured = self.load.filenames.as_ref().and_then(|f| match format {
            DataFormat::Csv => f.csv.clone(),
            DataFormat::Json => f.json.clone(),
        });
        configured.unwrap_or_else(|| format!("coerced.{}", format.extension()))
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
