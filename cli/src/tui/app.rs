use std::path::Path;

use ratatui::widgets::TableState;
use storeops_core::format::{format_number, format_percent};
use storeops_core::{
    compute_model, AllocationPreset, BenefitMode, Category, ComputedTotals, FileScenarioRepository,
    ModelAction, ModelState, OperatingModel, ProcessKey, ScenarioService, SplitNormalization, Unit,
};
use tracing::debug;

pub enum InputMode {
    Normal,
    Command,
    Importing,
    Saving,
}

/// One editable row in the input panel.
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    Cartons,
    OnlineUnits,
    HourlyRate,
    Stores,
    WeeksPerYear,
    Share(Category),
    Mitigation,
    Issue(String),
    Preset,
    Benefit,
    Normalization,
    Rate(ProcessKey),
}

pub struct App {
    pub service: ScenarioService<FileScenarioRepository>,
    pub state: ModelState,
    pub totals: ComputedTotals,
    /// Model whose process rates the editor shows.
    pub model: OperatingModel,
    pub table_state: TableState,
    pub input: String,
    pub input_mode: InputMode,
    pub cursor_position: usize,
    pub status: Option<String>,
    pub scenario: Option<String>,
}

fn next_preset(current: Option<AllocationPreset>, forward: bool) -> AllocationPreset {
    let all = AllocationPreset::ALL;
    let Some(i) = current.and_then(|p| all.iter().position(|q| *q == p)) else {
        return AllocationPreset::default();
    };
    if forward {
        all[(i + 1) % all.len()]
    } else {
        all[(i + all.len() - 1) % all.len()]
    }
}

impl App {
    pub fn new(service: ScenarioService<FileScenarioRepository>, state: ModelState, scenario: Option<String>) -> App {
        let totals = compute_model(&state);
        let mut table_state = TableState::default();
        table_state.select(Some(0));
        App {
            service,
            state,
            totals,
            model: OperatingModel::New,
            table_state,
            input: String::new(),
            input_mode: InputMode::Normal,
            cursor_position: 0,
            status: None,
            scenario,
        }
    }

    pub fn fields(&self) -> Vec<Field> {
        let mut fields = vec![
            Field::Cartons,
            Field::OnlineUnits,
            Field::HourlyRate,
            Field::Stores,
            Field::WeeksPerYear,
        ];
        fields.extend(Category::ALL.map(Field::Share));
        fields.push(Field::Mitigation);
        fields.extend(self.state.issues.issues().iter().map(|i| Field::Issue(i.id.clone())));
        fields.extend([Field::Preset, Field::Benefit, Field::Normalization]);
        fields.extend(ProcessKey::ALL.map(Field::Rate));
        fields
    }

    pub fn selected_field(&self) -> Option<Field> {
        self.table_state
            .selected()
            .and_then(|i| self.fields().get(i).cloned())
    }

    pub fn label(&self, field: &Field) -> String {
        match field {
            Field::Cartons => "Cartons / week".to_string(),
            Field::OnlineUnits => "Online units / week".to_string(),
            Field::HourlyRate => "Hourly rate (A$)".to_string(),
            Field::Stores => "Stores".to_string(),
            Field::WeeksPerYear => "Weeks / year".to_string(),
            Field::Share(c) => format!("Split: {}", c.label()),
            Field::Mitigation => "Mitigation".to_string(),
            Field::Issue(id) => match self.state.issues.get(id) {
                Some(issue) => format!("Issue: {}", issue.name),
                None => format!("Issue: {}", id),
            },
            Field::Preset => "Allocation".to_string(),
            Field::Benefit => "Benefit mode".to_string(),
            Field::Normalization => "Split normalisation".to_string(),
            Field::Rate(p) => format!("{} rate ({})", p.label(), self.model),
        }
    }

    pub fn value(&self, field: &Field) -> String {
        let s = &self.state;
        match field {
            Field::Cartons => format_number(s.inputs.cartons_delivered, 0),
            Field::OnlineUnits => format_number(s.inputs.online_units, 0),
            Field::HourlyRate => format_number(s.inputs.hourly_rate, 2),
            Field::Stores => s.inputs.stores.to_string(),
            Field::WeeksPerYear => format_number(s.inputs.weeks_per_year, 0),
            Field::Share(c) => format_percent(s.split.share(*c)),
            Field::Mitigation => format_percent(s.mitigation),
            Field::Issue(id) => {
                let on = s.toggles.is_enabled(id);
                (if on { "on" } else { "off" }).to_string()
            }
            Field::Preset => s.allocation.label(),
            Field::Benefit => format!("{:?}", s.options.benefit).to_lowercase(),
            Field::Normalization => match s.options.normalization {
                SplitNormalization::CapAtOne => "cap at one".to_string(),
                SplitNormalization::Proportional => "proportional".to_string(),
            },
            Field::Rate(p) => {
                let cfg = s.table(self.model).get(*p);
                if cfg.use_roster {
                    format!("roster {} h", format_number(cfg.roster_hours, 1))
                } else {
                    let unit = match cfg.unit {
                        Unit::Cartons => "ctn",
                        Unit::Online => "online",
                    };
                    format!("{} / 1000 {}", format_number(cfg.rate_per_thousand, 2), unit)
                }
            }
        }
    }

    pub fn next(&mut self) {
        let len = self.fields().len();
        let i = match self.table_state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.table_state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.fields().len();
        let i = match self.table_state.selected() {
            Some(0) | None => len.saturating_sub(1),
            Some(i) => i - 1,
        };
        self.table_state.select(Some(i));
    }

    pub fn switch_model(&mut self) {
        self.model = match self.model {
            OperatingModel::Current => OperatingModel::New,
            OperatingModel::New => OperatingModel::Current,
        };
    }

    /// Applies `action`, recomputing on success. Failures go to the status line.
    pub fn dispatch(&mut self, action: ModelAction) {
        match self.state.apply(action) {
            Ok(next) => {
                self.state = next;
                self.totals = compute_model(&self.state);
                self.status = None;
            }
            Err(e) => {
                debug!(error = %e, "Rejected edit");
                self.status = Some(e.to_string());
            }
        }
    }

    /// Nudges the selected field by `steps` increments (negative to lower).
    pub fn adjust(&mut self, steps: f64) {
        let Some(field) = self.selected_field() else { return };
        let s = &self.state;
        let forward = steps > 0.0;
        let action = match field {
            Field::Cartons => ModelAction::SetCartons(s.inputs.cartons_delivered + 500.0 * steps),
            Field::OnlineUnits => ModelAction::SetOnlineUnits(s.inputs.online_units + 100.0 * steps),
            Field::HourlyRate => ModelAction::SetHourlyRate(s.inputs.hourly_rate + 0.5 * steps),
            Field::Stores => ModelAction::SetStores(f64::from(s.inputs.stores) + 10.0 * steps),
            Field::WeeksPerYear => ModelAction::SetWeeksPerYear(s.inputs.weeks_per_year + steps),
            Field::Share(c) => ModelAction::SetShare(c, s.split.share(c) + 0.01 * steps),
            Field::Mitigation => ModelAction::SetMitigation(s.mitigation + 0.05 * steps),
            Field::Issue(id) => ModelAction::ToggleIssue(id, forward),
            Field::Preset => ModelAction::SelectPreset(next_preset(s.allocation.preset, forward)),
            Field::Benefit => ModelAction::SetBenefitMode(match s.options.benefit {
                BenefitMode::Signed => BenefitMode::Clamped,
                BenefitMode::Clamped => BenefitMode::Signed,
            }),
            Field::Normalization => ModelAction::SetNormalization(match s.options.normalization {
                SplitNormalization::CapAtOne => SplitNormalization::Proportional,
                SplitNormalization::Proportional => SplitNormalization::CapAtOne,
            }),
            Field::Rate(p) => {
                let cfg = s.table(self.model).get(p);
                if cfg.use_roster {
                    ModelAction::SetRosterHours(self.model, p, cfg.roster_hours + 5.0 * steps)
                } else {
                    ModelAction::SetRate(self.model, p, cfg.rate_per_thousand + steps)
                }
            }
        };
        self.dispatch(action);
    }

    /// Space: flips issues, and roster mode on process rows.
    pub fn toggle(&mut self) {
        match self.selected_field() {
            Some(Field::Issue(id)) => {
                let on = !self.state.toggles.is_enabled(&id);
                self.dispatch(ModelAction::ToggleIssue(id, on));
            }
            Some(Field::Rate(p)) => {
                let cfg = self.state.table(self.model).get(p);
                self.dispatch(ModelAction::SetUseRoster(self.model, p, !cfg.use_roster));
            }
            _ => self.adjust(1.0),
        }
    }

    pub fn toggle_unit(&mut self) {
        if let Some(Field::Rate(p)) = self.selected_field() {
            let unit = self.state.table(self.model).get(p).unit.toggled();
            self.dispatch(ModelAction::SetUnit(self.model, p, unit));
        }
    }

    pub fn reset(&mut self) {
        self.dispatch(ModelAction::Reset);
        self.status = Some("Reset to defaults".to_string());
    }

    pub fn clear_forecast(&mut self) {
        if self.state.forecast.is_some() {
            self.dispatch(ModelAction::ClearForecast);
            self.status = Some("Forecast override cleared".to_string());
        }
    }

    pub fn enter_mode(&mut self, mode: InputMode) {
        self.input_mode = mode;
        self.input.clear();
        self.cursor_position = 0;
        if let (InputMode::Saving, Some(name)) = (&self.input_mode, &self.scenario) {
            self.input = name.clone();
            self.cursor_position = self.input.chars().count();
        }
    }

    pub fn exit_input_mode(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    pub fn input_char(&mut self, c: char) {
        let byte_index = self.input.chars().take(self.cursor_position).map(|c| c.len_utf8()).sum();
        self.input.insert(byte_index, c);
        self.cursor_position += 1;
    }

    pub fn delete_char(&mut self) {
        if self.cursor_position > 0 {
            let byte_index: usize = self.input.chars().take(self.cursor_position - 1).map(|c| c.len_utf8()).sum();
            self.input.remove(byte_index);
            self.cursor_position -= 1;
        }
    }

    pub fn move_cursor_left(&mut self) {
        if self.cursor_position > 0 {
            self.cursor_position -= 1;
        }
    }

    pub fn move_cursor_right(&mut self) {
        if self.cursor_position < self.input.chars().count() {
            self.cursor_position += 1;
        }
    }

    pub fn submit_command(&mut self) {
        let input = self.input.trim().to_string();
        if input.is_empty() {
            self.exit_input_mode();
            return;
        }

        match self.input_mode {
            InputMode::Command => self.submit_overrides(&input),
            InputMode::Importing => self.submit_import(&input),
            InputMode::Saving => self.submit_save(&input),
            InputMode::Normal => {}
        }

        self.input.clear();
        self.cursor_position = 0;
        self.exit_input_mode();
    }

    fn submit_overrides(&mut self, input: &str) {
        let args: Vec<String> = input.split_whitespace().map(|s| s.to_string()).collect();
        match self.service.apply_overrides(&self.state, &args) {
            Ok(next) => {
                self.state = next;
                self.totals = compute_model(&self.state);
                self.status = None;
            }
            Err(e) => self.status = Some(format!("{:#}", e)),
        }
    }

    fn submit_import(&mut self, path: &str) {
        match self.service.import_forecast(&self.state, Path::new(path)) {
            Ok(next) => {
                let count = next.forecast.as_ref().map(|f| f.hours.len()).unwrap_or(0);
                self.state = next;
                self.totals = compute_model(&self.state);
                self.status = Some(format!("Imported forecast for {} processes", count));
            }
            Err(e) => self.status = Some(format!("Import failed: {:#}", e)),
        }
    }

    fn submit_save(&mut self, name: &str) {
        match self.service.save(name, &self.state) {
            Ok(snapshot) => {
                self.status = Some(format!("Saved scenario '{}'", snapshot.name));
                self.scenario = Some(snapshot.name);
            }
            Err(e) => self.status = Some(format!("Save failed: {:#}", e)),
        }
    }
}
