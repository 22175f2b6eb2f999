use anyhow::Result;
use coerce_etl::core::Pipeline;
use coerce_etl::{CoercionPipeline, EtlEngine, LocalStorage, TomlConfig};
use tempfile::TempDir;

fn write_config(dir: &TempDir, input_path: &str, extra: &str) -> Result<TomlConfig> {
    let output_path = dir.path().join("out");
    let config_content = format!(
        r#"
[pipeline]
name = "integration"

[source]
input_path = "{}"

[coercion]
numeric_fields = ["price", "qty"]
default_value = 0.0

[load]
output_path = "{}"
output_formats = ["csv", "json"]
{}
"#,
        input_path.replace('\\', "/"),
        output_path.to_str().unwrap().replace('\\', "/"),
        extra
    );

    let config_path = dir.path().join("coerce.toml");
    std::fs::write(&config_path, config_content)?;
    Ok(TomlConfig::from_file(&config_path)?)
}

#[tokio::test]
async fn test_end_to_end_csv_coercion() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let input_path = temp_dir.path().join("items.csv");
    std::fs::write(
        &input_path,
        "sku,price,qty\nA-1,$19.99,3 boxes\nB-2,12.50,\nC-3,n/a,  7\n",
    )?;

    let config = write_config(&temp_dir, input_path.to_str().unwrap(), "")?;
    let output_dir = temp_dir.path().join("out");

    let storage = LocalStorage::new(output_dir.clone());
    let engine = EtlEngine::new(CoercionPipeline::new(storage, config));
    let output_path = engine.run().await?;

    assert!(output_path.ends_with("coerced.csv"));

    let csv = std::fs::read_to_string(output_dir.join("coerced.csv"))?;
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(
        lines,
        vec!["sku,price,qty", "A-1,0,3", "B-2,12.5,0", "C-3,0,7"]
    );

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(output_dir.join("coerced.json"))?)?;
    assert_eq!(json[1]["sku"], "B-2");
    assert_eq!(json[1]["price"], 12.5);
    assert_eq!(json[2]["qty"], 7.0);

    Ok(())
}

#[tokio::test]
async fn test_json_input_with_custom_filenames() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let input_path = temp_dir.path().join("orders.json");
    std::fs::write(
        &input_path,
        r#"[
            {"id": 1, "price": 4.5, "qty": "2"},
            {"id": 2, "price": null},
            {"id": 3, "price": "1e2 cents", "qty": true}
        ]"#,
    )?;

    let config = write_config(
        &temp_dir,
        input_path.to_str().unwrap(),
        "[load.filenames]\ncsv = \"orders.csv\"\njson = \"orders.json\"",
    )?;
    let output_dir = temp_dir.path().join("out");

    let pipeline = CoercionPipeline::new(LocalStorage::new(output_dir.clone()), config);
    let records = pipeline.extract().await?;
    let result = pipeline.transform(records).await?;

    assert_eq!(result.stats.records, 3);
    assert_eq!(result.stats.fields_coerced, 6);
    // price null, qty missing, qty true
    assert_eq!(result.stats.defaulted, 3);

    pipeline.load(result).await?;

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(output_dir.join("orders.json"))?)?;
    assert_eq!(
        json,
        serde_json::json!([
            {"id": 1, "price": 4.5, "qty": 2.0},
            {"id": 2, "price": 0.0, "qty": 0.0},
            {"id": 3, "price": 100.0, "qty": 0.0}
        ])
    );

    let csv = std::fs::read_to_string(output_dir.join("orders.csv"))?;
    assert!(csv.starts_with("id,price,qty\n"));
    assert!(csv.contains("3,100,0"));

    Ok(())
}

#[tokio::test]
async fn test_missing_input_file_is_io_error() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let missing = temp_dir.path().join("missing.csv");
    let config = write_config(&temp_dir, missing.to_str().unwrap(), "")?;

    let engine = EtlEngine::new(CoercionPipeline::new(
        LocalStorage::new(temp_dir.path().join("out")),
        config,
    ));

    let err = engine.run().await.unwrap_err();
    assert!(matches!(err, coerce_etl::EtlError::IoError(_)));
    assert_eq!(
        err.severity(),
        coerce_etl::utils::error::ErrorSeverity::Critical
    );

    Ok(())
}

#[test]
fn test_storage_future_runs_on_test_runtime() -> Result<()> {
    use coerce_etl::core::Storage;

    let temp_dir = TempDir::new()?;
    let storage = LocalStorage::new(temp_dir.path());
    tokio_test::block_on(storage.write_file("nested/data.csv", b"a\n1\n"))?;

    let read_path = temp_dir.path().join("nested/data.csv");
    let data = tokio_test::block_on(storage.read_file(read_path.to_str().unwrap()))?;
    assert_eq!(data, b"a\n1\n");

    Ok(())
}
