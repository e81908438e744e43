use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::error::ModelError;
use crate::model::state::ModelState;

const SCENARIO_EXTENSION: &str = "json";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ScenarioSnapshot {
    pub name: String,
    pub saved_at: DateTime<Utc>,
    pub state: ModelState,
}

pub trait ScenarioRepository {
    fn save(&self, name: &str, state: &ModelState) -> Result<ScenarioSnapshot>;
    fn load(&self, name: &str) -> Result<ScenarioSnapshot>;
    fn list(&self) -> Result<Vec<ScenarioSnapshot>>;
}

pub fn validate_name(name: &str) -> Result<(), ModelError> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(ModelError::InvalidScenarioName(name.to_string()))
    }
}

#[derive(Clone)]
pub struct FileScenarioRepository {
    base_dir: PathBuf,
}

impl FileScenarioRepository {
    pub fn new(base_dir: Option<PathBuf>) -> Result<Self> {
        let path = match base_dir {
            Some(dir) => dir,
            None => {
                let home_dir = dirs::home_dir()
                    .ok_or_else(|| anyhow!("Could not determine home directory"))?;
                home_dir.join(".storeops").join("scenarios")
            }
        };
        fs::create_dir_all(&path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        Ok(Self { base_dir: path })
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.base_dir.join(format!("{}.{}", name, SCENARIO_EXTENSION))
    }

    fn read_snapshot(&self, path: &Path) -> Result<ScenarioSnapshot> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let mut snapshot: ScenarioSnapshot = serde_json::from_reader(reader)
            .with_context(|| format!("Malformed scenario file {}", path.display()))?;
        snapshot.state = snapshot.state.sanitized();
        Ok(snapshot)
    }
}

impl ScenarioRepository for FileScenarioRepository {
    fn save(&self, name: &str, state: &ModelState) -> Result<ScenarioSnapshot> {
        validate_name(name)?;
        let snapshot = ScenarioSnapshot {
            name: name.to_string(),
            saved_at: Utc::now(),
            state: state.clone(),
        };
        let path = self.path_for(name);
        let file = File::create(&path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &snapshot)?;
        writer.flush()?;
        debug!(path = %path.display(), "Saved scenario");
        Ok(snapshot)
    }

    fn load(&self, name: &str) -> Result<ScenarioSnapshot> {
        validate_name(name)?;
        let path = self.path_for(name);
        if !path.exists() {
            return Err(anyhow!("Scenario '{}' not found", name));
        }
        self.read_snapshot(&path)
    }

    fn list(&self) -> Result<Vec<ScenarioSnapshot>> {
        let mut snapshots = Vec::new();
        for entry in fs::read_dir(&self.base_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|s| s.to_str()) != Some(SCENARIO_EXTENSION) {
                continue;
            }
            match self.read_snapshot(&path) {
                Ok(snapshot) => snapshots.push(snapshot),
                Err(e) => debug!(path = %path.display(), error = %e, "Skipping unreadable scenario"),
            }
        }
        snapshots.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(snapshots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::state::ModelAction;

    fn repo() -> (tempfile::TempDir, FileScenarioRepository) {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileScenarioRepository::new(Some(dir.path().to_path_buf())).unwrap();
        (dir, repo)
    }

    #[test]
    fn test_save_and_load() {
        let (_dir, repo) = repo();
        let state = ModelState::default()
            .apply_all([
                ModelAction::SetCartons(9000.0),
                ModelAction::ToggleIssue("late".into(), true),
            ])
            .unwrap();
        repo.save("north-region", &state).unwrap();

        let loaded = repo.load("north-region").unwrap();
        assert_eq!(loaded.name, "north-region");
        assert_eq!(loaded.state, state);
    }

    #[test]
    fn test_list_sorted_and_skips_junk() {
        let (dir, repo) = repo();
        repo.save("b", &ModelState::default()).unwrap();
        repo.save("a", &ModelState::default()).unwrap();
        fs::write(dir.path().join("broken.json"), "{not json").unwrap();
        fs::write(dir.path().join("notes.txt"), "hello").unwrap();

        let names: Vec<String> = repo.list().unwrap().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_rejects_bad_names_and_missing() {
        let (_dir, repo) = repo();
        assert!(repo.save("../escape", &ModelState::default()).is_err());
        assert!(repo.save("", &ModelState::default()).is_err());
        assert!(repo.load("missing").is_err());
    }

    #[test]
    fn test_load_sanitizes_hand_edited_file() {
        let (dir, repo) = repo();
        let json = r#"{
            "name": "edited",
            "saved_at": "2025-01-01T00:00:00Z",
            "state": { "inputs": { "cartons_delivered": -40, "online_units": 10, "hourly_rate": 30, "stores": 0 }, "mitigation": 3 }
        }"#;
        fs::write(dir.path().join("edited.json"), json).unwrap();
        let snapshot = repo.load("edited").unwrap();
        assert_eq!(snapshot.state.inputs.cartons_delivered, 0.0);
        assert_eq!(snapshot.state.inputs.stores, 1);
        assert_eq!(snapshot.state.mitigation, 1.0);
    }

    #[test]
    fn test_load_coerces_bad_store_count() {
        let (dir, repo) = repo();
        let json = r#"{
            "name": "stores",
            "saved_at": "2025-01-01T00:00:00Z",
            "state": { "inputs": { "cartons_delivered": 100, "online_units": 10, "hourly_rate": 30, "stores": -5 } }
        }"#;
        fs::write(dir.path().join("stores.json"), json).unwrap();
        assert_eq!(repo.load("stores").unwrap().state.inputs.stores, 1);

        let json = json.replace("-5", "270.5");
        fs::write(dir.path().join("stores.json"), json).unwrap();
        assert_eq!(repo.load("stores").unwrap().state.inputs.stores, 271);
    }
}
