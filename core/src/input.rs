use anyhow::{anyhow, Context, Result};

use crate::model::allocation::AllocationPreset;
use crate::model::category::{Category, SplitNormalization};
use crate::model::options::BenefitMode;
use crate::model::process::{OperatingModel, ProcessKey, Unit};
use crate::model::state::{ModelAction, ModelState};

pub const OVERRIDE_KEYS: [&str; 18] = [
    "cartons",
    "online",
    "ahr",
    "stores",
    "weeks",
    "mitigation",
    "preset",
    "benefit",
    "normalize",
    "issue",
    "add-issue",
    "demand",
    "non-demand",
    "markup",
    "clearance",
    "new-lines",
    "lp",
    "oms",
];

const PROCESS_FIELDS: [&str; 3] = ["rate", "roster", "unit"];
const MODEL_KEYS: [&str; 2] = ["current", "new"];
const PROCESS_KEYS: [&str; 6] = ["decant", "loadfill", "packaway", "digital", "online", "backfill"];

#[derive(Debug, PartialEq)]
pub struct ParsedInput {
    /// Bare words, in order.
    pub words: Vec<String>,
    /// `key:value` pairs, in order.
    pub overrides: Vec<(String, String)>,
}

pub fn parse_args(args: &[String]) -> ParsedInput {
    let mut words = Vec::new();
    let mut overrides = Vec::new();

    for arg in args {
        if let Some((key, value)) = arg.split_once(':') {
            if !key.is_empty() {
                overrides.push((key.to_lowercase(), value.trim().to_string()));
                continue;
            }
        }
        words.push(arg.clone());
    }

    ParsedInput { words, overrides }
}

pub fn expand_key(key: &str, candidates: &[&str]) -> Result<String> {
    if candidates.contains(&key) {
        return Ok(key.to_string());
    }

    let matches: Vec<&str> = candidates
        .iter()
        .filter(|&&c| c.starts_with(key))
        .cloned()
        .collect();

    match matches.len() {
        1 => Ok(matches[0].to_string()),
        0 => Err(anyhow!("Unknown key: '{}'", key)),
        _ => Err(anyhow!("Ambiguous key: '{}' matches {:?}", key, matches)),
    }
}

/// Parses "0.68", "68%" or "1,200" into a number. Percent signs divide by 100.
pub fn parse_number(raw: &str) -> Result<f64> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    let (digits, scale) = match cleaned.strip_suffix('%') {
        Some(d) => (d.trim(), 0.01),
        None => (cleaned.as_str(), 1.0),
    };
    let value: f64 = digits
        .parse()
        .map_err(|_| anyhow!("Invalid number: '{}'", raw))?;
    if !value.is_finite() {
        return Err(anyhow!("Invalid number: '{}'", raw));
    }
    Ok(value * scale)
}

fn parse_flag(raw: &str) -> Result<bool> {
    match raw.trim().to_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Ok(true),
        "off" | "false" | "no" | "0" => Ok(false),
        _ => Err(anyhow!("Expected on/off, got '{}'", raw)),
    }
}

fn category_for_key(key: &str) -> Option<Category> {
    Category::ALL.into_iter().find(|c| c.key() == key)
}

fn process_for_key(key: &str) -> Result<ProcessKey> {
    Ok(match expand_key(key, &PROCESS_KEYS)?.as_str() {
        "decant" => ProcessKey::Decant,
        "loadfill" => ProcessKey::Loadfill,
        "packaway" => ProcessKey::Packaway,
        "digital" => ProcessKey::Digital,
        "online" => ProcessKey::Online,
        _ => ProcessKey::Backfill,
    })
}

/// `impact.late.decant:0.1` sets an issue's impact; `...:off` removes it.
/// Issue ids are matched exactly.
fn impact_action(issue: &str, process: &str, value: &str) -> Result<ModelAction> {
    let process = process_for_key(process)?;
    let issue = issue.to_string();
    if matches!(parse_flag(value), Ok(false)) && value.trim() != "0" {
        return Ok(ModelAction::RemoveImpact { issue, process });
    }
    Ok(ModelAction::AddImpact { issue, process, delta: parse_number(value)? })
}

/// `rate.new.decant:12`, `roster.current.lf:300` (use `roster...:off` to
/// switch roster mode off), `unit.new.digital:cartons`.
fn process_action(key: &str, value: &str) -> Result<ModelAction> {
    let parts: Vec<&str> = key.split('.').collect();
    if let ["impact", issue, process] = parts.as_slice() {
        return impact_action(issue, process, value);
    }
    let [field, model, process] = parts.as_slice() else {
        return Err(anyhow!("Expected <field>.<model>.<process>, got '{}'", key));
    };
    let field = expand_key(field, &PROCESS_FIELDS)?;
    let model = match expand_key(model, &MODEL_KEYS)?.as_str() {
        "current" => OperatingModel::Current,
        _ => OperatingModel::New,
    };
    let process = process_for_key(process)?;

    match field.as_str() {
        "rate" => Ok(ModelAction::SetRate(model, process, parse_number(value)?)),
        "unit" => match expand_key(&value.to_lowercase(), &["cartons", "online"])?.as_str() {
            "cartons" => Ok(ModelAction::SetUnit(model, process, Unit::Cartons)),
            _ => Ok(ModelAction::SetUnit(model, process, Unit::Online)),
        },
        _ => match parse_flag(value) {
            Ok(on) => Ok(ModelAction::SetUseRoster(model, process, on)),
            Err(_) => Ok(ModelAction::SetRosterHours(model, process, parse_number(value)?)),
        },
    }
}

/// Turns parsed overrides into model actions against `state`.
///
/// Bare words are issue ids to switch on. Category shares are applied with
/// decreases first, so raising one share while lowering another in the same
/// command is not blocked by the sum-to-one clamp.
pub fn overrides_to_actions(parsed: &ParsedInput, state: &ModelState) -> Result<Vec<ModelAction>> {
    let mut actions = Vec::new();
    let mut shares: Vec<(Category, f64)> = Vec::new();

    for word in &parsed.words {
        actions.push(ModelAction::ToggleIssue(word.clone(), true));
    }

    for (key, value) in &parsed.overrides {
        if key.contains('.') {
            actions.push(
                process_action(key, value).with_context(|| format!("In override '{}:{}'", key, value))?,
            );
            continue;
        }
        let key = expand_key(key, &OVERRIDE_KEYS)?;
        if let Some(category) = category_for_key(&key) {
            shares.push((category, parse_number(value)?));
            continue;
        }
        let action = match key.as_str() {
            "cartons" => ModelAction::SetCartons(parse_number(value)?),
            "online" => ModelAction::SetOnlineUnits(parse_number(value)?),
            "ahr" => ModelAction::SetHourlyRate(parse_number(value)?),
            "stores" => ModelAction::SetStores(parse_number(value)?),
            "weeks" => ModelAction::SetWeeksPerYear(parse_number(value)?),
            "mitigation" => ModelAction::SetMitigation(parse_number(value)?),
            "preset" => ModelAction::SelectPreset(value.parse::<AllocationPreset>().map_err(|e| anyhow!(e))?),
            "benefit" => ModelAction::SetBenefitMode(value.parse::<BenefitMode>().map_err(|e| anyhow!(e))?),
            "normalize" => {
                ModelAction::SetNormalization(value.parse::<SplitNormalization>().map_err(|e| anyhow!(e))?)
            }
            "add-issue" => ModelAction::AddIssue(value.to_string()),
            "issue" => match value.split_once('=') {
                Some((id, flag)) => ModelAction::ToggleIssue(id.to_string(), parse_flag(flag)?),
                None => ModelAction::ToggleIssue(value.to_string(), true),
            },
            other => return Err(anyhow!("Unhandled key: '{}'", other)),
        };
        actions.push(action);
    }

    shares.sort_by(|(a, va), (b, vb)| {
        let da = va - state.split.share(*a);
        let db = vb - state.split.share(*b);
        da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
    });
    actions.extend(shares.into_iter().map(|(c, v)| ModelAction::SetShare(c, v)));

    Ok(actions)
}
