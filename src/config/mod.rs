//! Configuration: settings structs, TOML persistence, and platform paths.

pub mod paths;
pub mod settings;

pub use paths::AppPaths;
pub use settings::{AccumulatorConfig, AppConfig, CatalogConfig, RecognitionConfig};
