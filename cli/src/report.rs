use storeops_core::format::{format_dollars, format_hours, format_number, format_percent};
use storeops_core::model::allocation::Routing;
use storeops_core::usecase::breakdown::{benefit_by_process, new_hours_per_thousand};
use storeops_core::{
    AllocationPreset, Category, ComputedTotals, ForecastOverride, ModelState, OperatingModel,
    ScenarioSnapshot,
};
use tabled::settings::object::Rows;
use tabled::settings::{Color, Modify, Style};
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct StatRow {
    #[tabled(rename = "Metric")]
    metric: String,
    #[tabled(rename = "Value")]
    value: String,
}

#[derive(Tabled)]
struct ProcessTableRow {
    #[tabled(rename = "Process")]
    process: String,
    #[tabled(rename = "Current")]
    current: String,
    #[tabled(rename = "New")]
    new: String,
    #[tabled(rename = "Saved")]
    saved: String,
    #[tabled(rename = "Issue x (cur/new)")]
    multipliers: String,
}

#[derive(Tabled)]
struct BenefitRow {
    #[tabled(rename = "Process")]
    process: String,
    #[tabled(rename = "Saved (h)")]
    saved: String,
    #[tabled(rename = "Saved (A$)")]
    dollars: String,
}

#[derive(Tabled)]
struct RateRow {
    #[tabled(rename = "Process")]
    process: String,
    #[tabled(rename = "New h / 1000 cartons")]
    rate: String,
}

#[derive(Tabled)]
struct RoutingRow {
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Current")]
    current: String,
    #[tabled(rename = "New")]
    new: String,
}

#[derive(Tabled)]
struct ScenarioRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Saved")]
    saved_at: String,
    #[tabled(rename = "Allocation")]
    allocation: String,
    #[tabled(rename = "Weekly benefit")]
    benefit: String,
}

fn render<T: Tabled>(rows: Vec<T>) -> String {
    let mut table = Table::new(rows);
    table
        .with(Style::modern())
        .with(Modify::new(Rows::first()).with(Color::FG_CYAN));
    table.to_string()
}

fn heading(text: &str) {
    println!("\n\x1b[1;36m{}\x1b[0m", text);
}

fn stat_rows(state: &ModelState, totals: &ComputedTotals) -> Vec<StatRow> {
    let enabled: Vec<&str> = state.toggles.enabled_ids().collect();
    let row = |metric: &str, value: String| StatRow { metric: metric.to_string(), value };
    vec![
        row("Cartons / week", format_number(totals.cartons, 0)),
        row("Online units / week", format_number(totals.online_units, 0)),
        row("Allocation", state.allocation.label()),
        row(
            "Issues",
            if enabled.is_empty() { "-".to_string() } else { enabled.join(", ") },
        ),
        row("Mitigation", format_percent(state.mitigation)),
        row("Current hours", format_hours(totals.total_current_hours)),
        row("New hours", format_hours(totals.total_new_hours)),
        row("Benefit / store / week", format_hours(totals.benefit_hours)),
        row("Savings / store / week", format_dollars(totals.weekly_savings)),
        row("Network hours / week", format_hours(totals.network_weekly_hours)),
        row("Network savings / week", format_dollars(totals.network_weekly_savings)),
        row("Network hours / year", format_hours(totals.network_annual_hours)),
        row("Network savings / year", format_dollars(totals.network_annual_savings)),
    ]
}

fn process_rows(totals: &ComputedTotals) -> Vec<ProcessTableRow> {
    totals
        .rows
        .iter()
        .map(|r| ProcessTableRow {
            process: r.process.label().to_string(),
            current: format_number(r.current_hours, 1),
            new: format_number(r.new_hours, 1),
            saved: format_number(r.delta(), 1),
            multipliers: format!(
                "{} / {}",
                format_number(r.current_multiplier, 3),
                format_number(r.new_multiplier, 3)
            ),
        })
        .collect()
}

fn benefit_rows(state: &ModelState, totals: &ComputedTotals) -> Vec<BenefitRow> {
    benefit_by_process(totals)
        .iter()
        .map(|r| BenefitRow {
            process: r.process.label().to_string(),
            saved: format_number(r.delta(), 1),
            dollars: format_dollars(r.delta() * state.inputs.hourly_rate),
        })
        .collect()
}

pub fn print_compute(state: &ModelState, totals: &ComputedTotals) {
    heading("Summary");
    println!("{}", render(stat_rows(state, totals)));

    heading("Weekly hours by process");
    println!("{}", render(process_rows(totals)));

    heading("Benefit by process");
    println!("{}", render(benefit_rows(state, totals)));

    heading("New model rates");
    let rates: Vec<RateRow> = new_hours_per_thousand(state)
        .into_iter()
        .map(|(p, rate)| RateRow {
            process: p.label().to_string(),
            rate: format_number(rate, 2),
        })
        .collect();
    println!("{}", render(rates));

    if let Some(forecast) = &state.forecast {
        println!("Forecast override active ({} processes)", forecast.hours.len());
    }
}

pub fn print_forecast(forecast: &ForecastOverride) {
    let rows: Vec<StatRow> = forecast
        .hours
        .iter()
        .map(|(p, h)| StatRow {
            metric: p.label().to_string(),
            value: format_hours(*h),
        })
        .collect();
    println!("{}", render(rows));
}

fn describe_routing(routing: Option<&Routing>) -> String {
    match routing {
        Some(routing) if !routing.is_empty() => routing
            .iter()
            .map(|(p, f)| format!("{} {}", p.label(), format_percent(*f)))
            .collect::<Vec<_>>()
            .join(", "),
        _ => "-".to_string(),
    }
}

fn routing_rows(preset: AllocationPreset) -> Vec<RoutingRow> {
    let table = preset.table();
    Category::ALL
        .iter()
        .map(|&c| RoutingRow {
            category: c.label().to_string(),
            current: describe_routing(table.for_model(OperatingModel::Current).route(c)),
            new: describe_routing(table.for_model(OperatingModel::New).route(c)),
        })
        .collect()
}

pub fn print_presets() {
    for preset in AllocationPreset::ALL {
        let marker = if preset == AllocationPreset::default() { " (default)" } else { "" };
        heading(&format!("{}{}", preset.name(), marker));
        println!("{}", render(routing_rows(preset)));
    }
}

pub fn print_scenarios(snapshots: &[ScenarioSnapshot]) {
    if snapshots.is_empty() {
        println!("No saved scenarios.");
        return;
    }
    let rows: Vec<ScenarioRow> = snapshots
        .iter()
        .map(|s| {
            let totals = storeops_core::compute_model(&s.state);
            ScenarioRow {
                name: s.name.clone(),
                saved_at: s.saved_at.format("%Y-%m-%d %H:%M").to_string(),
                allocation: s.state.allocation.label(),
                benefit: format_dollars(totals.network_weekly_savings),
            }
        })
        .collect();
    println!("{}", render(rows));
}

#[cfg(test)]
mod tests {
    use super::*;
    use storeops_core::compute_model;

    #[test]
    fn test_stat_rows_pinned_scenario() {
        let state = ModelState::default();
        let totals = compute_model(&state);
        let rows = stat_rows(&state, &totals);
        let value = |name: &str| rows.iter().find(|r| r.metric == name).unwrap().value.clone();
        assert_eq!(value("Current hours"), "820 h");
        assert_eq!(value("Benefit / store / week"), "94 h");
        assert_eq!(value("Network savings / year"), "A$42,038,231");
        assert_eq!(value("Issues"), "-");
        assert_eq!(value("Allocation"), "prototype");
    }

    #[test]
    fn test_routing_rows() {
        let rows = routing_rows(AllocationPreset::Prototype);
        assert_eq!(rows.len(), Category::ALL.len());
        let nd = rows.iter().find(|r| r.category == "Non-demand").unwrap();
        assert_eq!(nd.current, "Packaway 60%, Backfill 40%");
        assert_eq!(nd.new, "Loadfill 20%, Packaway 80%");
    }

    #[test]
    fn test_benefit_rows_sorted() {
        let state = ModelState::default();
        let totals = compute_model(&state);
        let rows = benefit_rows(&state, &totals);
        assert_eq!(rows[0].process, "Loadfill");
        assert_eq!(rows.last().unwrap().process, "Digital Shopkeeping");
    }
}
