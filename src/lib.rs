pub mod config;
pub mod core;
pub mod domain;
pub mod runtime;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use config::{cli::LocalStorage, toml_config::TomlConfig};
pub use crate::core::{
    coerce::{coerce_or_zero, coerce_to_number, parse_leading_number, Coercer},
    etl::EtlEngine,
    pipeline::CoercionPipeline,
};
pub use domain::model::{DataFormat, NanPolicy, RawValue};
pub use runtime::{assets::AssetSlot, request::RequestContext};
pub use utils::error::{EtlError, Result};
