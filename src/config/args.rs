use crate::core::ConfigProvider;
use crate::domain::model::{DataFormat, NanPolicy};
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{self, Validate};
use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "coerce-etl")]
#[command(about = "Coerce loosely-typed fields of CSV/JSON data into numbers")]
pub struct CliConfig {
    #[arg(long, help = "Input file (.csv or .json)")]
    pub input: Option<String>,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, value_delimiter = ',', help = "Fields to coerce to numbers")]
    pub fields: Vec<String>,

    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    pub default: f64,

    #[arg(long, value_enum, default_value = "preserve")]
    pub nan_policy: NanPolicy,

    #[arg(long, value_enum, value_delimiter = ',', default_value = "csv")]
    pub formats: Vec<DataFormat>,

    #[arg(long, allow_hyphen_values = true, help = "Coerce a single value and print it")]
    pub value: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,
}

impl ConfigProvider for CliConfig {
    fn input_path(&self) -> &str {
        self.input.as_deref().unwrap_or_default()
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn numeric_fields(&self) -> &[String] {
        &self.fields
    }

    fn default_value(&self) -> f64 {
        self.default
    }

    fn nan_policy(&self) -> NanPolicy {
        self.nan_policy
    }

    fn output_formats(&self) -> &[DataFormat] {
        &self.formats
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_not_nan("default", self.default)?;

        // 單值模式不需要輸入檔
        if self.value.is_some() {
            return Ok(());
        }

        let input = validation::validate_required_field("input", &self.input)?;
        validation::validate_path("input", input)?;
        validation::validate_file_extensions(
            "input",
            std::slice::from_ref(input),
            &["csv", "json"],
        )?;
        validation::validate_path("output_path", &self.output_path)?;
        validation::validate_unique_fields("fields", &self.fields)?;

        if self.formats.is_empty() {
            return Err(EtlError::MissingConfigError {
                field: "formats".to_string(),
            });
        }

        Ok(())
    }
}
