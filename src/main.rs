use clap::Parser;
use coerce_etl::core::coerce::format_number;
use coerce_etl::utils::{logger, validation::Validate};
use coerce_etl::{CliConfig, Coercer, CoercionPipeline, EtlEngine, LocalStorage, RawValue};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    // 初始化日誌
    if config.log_json {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting coerce-etl CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    // 單值模式：直接輸出結果
    if let Some(value) = &config.value {
        let coercer = Coercer::new(config.default).with_nan_policy(config.nan_policy);
        let coercion = coercer.coerce_detailed(&RawValue::from(value));
        tracing::debug!("Coerced {:?} via {:?}", value, coercion.source);
        println!("{}", format_number(coercion.value));
        return Ok(());
    }

    let storage = LocalStorage::new(config.output_path.clone());
    let pipeline = CoercionPipeline::new(storage, config);
    let engine = EtlEngine::new(pipeline);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ Coercion completed successfully!");
            println!("✅ Coercion completed successfully!");
            println!("📁 Output saved to: {}", output_path);
        }
        Err(e) => {
            tracing::error!(
                "❌ Coercion failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());

            let code = e.severity().exit_code();
            if code > 0 {
                std::process::exit(code);
            }
        }
    }

    Ok(())
}
