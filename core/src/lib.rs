pub mod format;
pub mod input;
pub mod model;
pub mod repository;
pub mod service;
pub mod usecase;

pub use input::{expand_key, overrides_to_actions, parse_args, ParsedInput};
pub use model::allocation::{AllocationPreset, AllocationTable};
pub use model::category::{Category, CategorySplit, SplitNormalization};
pub use model::error::{ModelError, ModelResult};
pub use model::forecast::{ForecastOverride, OverrideScope};
pub use model::options::{BenefitMode, EngineOptions};
pub use model::process::{OperatingModel, ProcessKey, Unit};
pub use model::state::{ModelAction, ModelState};
pub use repository::{FileScenarioRepository, ScenarioRepository, ScenarioSnapshot};
pub use service::dto::{ComputedTotals, ProcessRow};
pub use service::engine::compute_model;
pub use service::scenario_service::ScenarioService;
