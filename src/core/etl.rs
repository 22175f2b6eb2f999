use crate::core::Pipeline;
use crate::utils::error::Result;
use std::time::Instant;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<String> {
        let started = Instant::now();
        tracing::info!("🚀 Starting coercion run");

        // Extract
        tracing::info!("📥 Extracting records...");
        let raw_data = self.pipeline.extract().await?;
        tracing::info!("Extracted {} records", raw_data.len());

        // Transform
        tracing::info!("🔄 Coercing numeric fields...");
        let transformed_result = self.pipeline.transform(raw_data).await?;
        let stats = transformed_result.stats;
        tracing::info!(
            "Coerced {} fields across {} records ({} defaulted, {} non-finite)",
            stats.fields_coerced,
            stats.records,
            stats.defaulted,
            stats.non_finite
        );

        // Load
        tracing::info!("💾 Writing output...");
        let output_path = self.pipeline.load(transformed_result).await?;
        tracing::info!("Output saved to: {} in {:?}", output_path, started.elapsed());

        Ok(output_path)
    }
}
