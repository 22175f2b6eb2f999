use crate::core::coerce::{format_number, number_to_json, Coercer};
use crate::core::{ConfigProvider, Pipeline, Record, Storage, TransformResult};
use crate::domain::model::{CoercionStats, DataFormat};
use crate::utils::error::{EtlError, Result};
use serde_json::Value;
use std::collections::HashSet;
use std::path::Path;

/// Reads a CSV or JSON dataset and coerces the configured fields to numbers.
pub struct CoercionPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    coercer: Coercer,
}

impl<S: Storage, C: ConfigProvider> CoercionPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        let coercer = Coercer::new(config.default_value()).with_nan_policy(config.nan_policy());
        Self {
            storage,
            config,
            coercer,
        }
    }

    fn input_format(&self) -> Result<DataFormat> {
        let path = self.config.input_path();
        let extension = Path::new(path)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        match extension.as_deref() {
            Some("csv") => Ok(DataFormat::Csv),
            Some("json") => Ok(DataFormat::Json),
            _ => Err(EtlError::InvalidConfigValueError {
                field: "input_path".to_string(),
                value: path.to_string(),
                reason: "Input must be a .csv or .json file".to_string(),
            }),
        }
    }

    fn coerce_record(&self, mut record: Record, stats: &mut CoercionStats) -> Record {
        for field in self.config.numeric_fields() {
            let coercion = self.coercer.coerce_json(record.data.get(field));
            if coercion.is_default() {
                stats.defaulted += 1;
                tracing::debug!("Field '{}' fell back to default {}", field, coercion.value);
            }
            if !coercion.value.is_finite() {
                stats.non_finite += 1;
            }
            stats.fields_coerced += 1;
            record
                .data
                .insert(field.clone(), number_to_json(coercion.value));
        }
        record
    }
}

/// 依第一次出現的順序收集欄位，最後補上未出現過的數值欄位
pub fn collect_columns(records: &[Record], numeric_fields: &[String]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for key in records
        .iter()
        .flat_map(|r| r.data.keys())
        .chain(numeric_fields.iter())
    {
        if !columns.iter().any(|c| c == key) {
            columns.push(key.clone());
        }
    }
    columns
}

pub fn parse_csv_records(data: &[u8]) -> Result<Vec<Record>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::None)
        .from_reader(data);

    let headers = reader.headers()?.clone();

    // 重複的欄位名稱會互相覆蓋，直接拒絕
    let mut seen = HashSet::new();
    if let Some(duplicate) = headers.iter().find(|name| !seen.insert(*name)) {
        return Err(EtlError::ProcessingError {
            message: format!("CSV header repeats column '{}'", duplicate),
        });
    }

    let mut records = Vec::new();

    for row in reader.records() {
        let row = row?;
        let mut record = Record::new();
        // 短列的尾端欄位視為缺值，不寫入
        for (header, cell) in headers.iter().zip(row.iter()) {
            record
                .data
                .insert(header.to_string(), Value::String(cell.to_string()));
        }
        records.push(record);
    }

    Ok(records)
}

pub fn parse_json_records(data: &[u8]) -> Result<Vec<Record>> {
    let json: Value = serde_json::from_slice(data)?;

    let records = match json {
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .filter_map(|(index, item)| match item {
                Value::Object(data) => Some(Record { data }),
                other => {
                    tracing::warn!(
                        "⚠️ Skipping element {}: expected an object, got {}",
                        index,
                        json_type_name(&other)
                    );
                    None
                }
            })
            .collect(),
        Value::Object(data) => vec![Record { data }],
        other => {
            return Err(EtlError::ProcessingError {
                message: format!(
                    "Expected a JSON array of objects, got {}",
                    json_type_name(&other)
                ),
            })
        }
    };

    Ok(records)
}

pub fn render_csv(columns: &[String], records: &[Record]) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(columns)?;

    for record in records {
        let row: Vec<String> = columns
            .iter()
            .map(|column| record.data.get(column).map(cell_text).unwrap_or_default())
            .collect();
        writer.write_record(&row)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| EtlError::ProcessingError {
            message: format!("Failed to flush CSV output: {}", e),
        })?;

    String::from_utf8(bytes).map_err(|e| EtlError::ProcessingError {
        message: format!("CSV output is not valid UTF-8: {}", e),
    })
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.as_f64().map(format_number).unwrap_or_else(|| n.to_string()),
        other => other.to_string(),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for CoercionPipeline<S, C> {
    async fn extract(&self) -> Result<Vec<Record>> {
        let format = self.input_format()?;
        tracing::debug!("Reading {:?} input from: {}", format, self.config.input_path());

        let data = self.storage.read_file(self.config.input_path()).await?;
        tracing::debug!("Read {} bytes", data.len());

        match format {
            DataFormat::Csv => parse_csv_records(&data),
            DataFormat::Json => parse_json_records(&data),
        }
    }

    async fn transform(&self, data: Vec<Record>) -> Result<TransformResult> {
        let mut stats = CoercionStats {
            records: data.len(),
            ..CoercionStats::default()
        };

        if self.config.numeric_fields().is_empty() {
            tracing::warn!("⚠️ No numeric fields configured, records pass through unchanged");
        }

        let processed_records: Vec<Record> = data
            .into_iter()
            .map(|record| self.coerce_record(record, &mut stats))
            .collect();

        let columns = collect_columns(&processed_records, self.config.numeric_fields());

        let formats = self.config.output_formats();
        let csv_output = if formats.contains(&DataFormat::Csv) {
            Some(render_csv(&columns, &processed_records)?)
        } else {
            None
        };
        let json_output = if formats.contains(&DataFormat::Json) {
            Some(serde_json::to_string_pretty(&processed_records)?)
        } else {
            None
        };

        Ok(TransformResult {
            columns,
            processed_records,
            csv_output,
            json_output,
            stats,
        })
    }

    async fn load(&self, result: TransformResult) -> Result<String> {
        let outputs = [
            (DataFormat::Csv, result.csv_output),
            (DataFormat::Json, result.json_output),
        ];

        let mut written = Vec::new();
        for (format, content) in outputs {
            let Some(content) = content else { continue };
            let filename = self.config.output_filename(format);
            tracing::debug!("Writing {} ({} bytes)", filename, content.len());
            self.storage
                .write_file(&filename, content.as_bytes())
                .await?;
            written.push(
                Path::new(self.config.output_path())
                    .join(&filename)
                    .to_string_lossy()
                    .into_owned(),
            );
        }

        written
            .into_iter()
            .next()
            .ok_or_else(|| EtlError::MissingConfigError {
                field: "output_formats".to_string(),
            })
    }
}
