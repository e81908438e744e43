pub mod forecast;
pub mod scenario;

// Re-export
pub use forecast::{load_forecast, parse_forecast, ForecastImportError};
pub use scenario::{FileScenarioRepository, ScenarioRepository, ScenarioSnapshot};
