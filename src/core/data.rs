/// Scenario and principle data: loaded once, validated before any session starts.

use rustc_hash::FxHashSet;
use std::path::Path;
use thiserror::Error;

use crate::schema::principle::PrincipleGroup;
use crate::schema::scenario::Scenario;

pub const SCENARIOS_FILE: &str = "scenarios.json";
pub const PRINCIPLES_FILE: &str = "principles.json";

#[derive(Debug, Error)]
pub enum DataError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("scenario list is empty")]
    NoScenarios,
    #[error("duplicate scenario id: {0}")]
    DuplicateScenario(String),
}

/// Everything a session needs from the outside world.
///
/// Only obtainable through the validating constructors, so a held value
/// always has at least one scenario and unique scenario ids.
#[derive(Debug, Clone)]
pub struct SessionData {
    scenarios: Vec<Scenario>,
    principles: Vec<PrincipleGroup>,
}

impl SessionData {
    /// Build from already-parsed records, validating them.
    pub fn new(
        scenarios: Vec<Scenario>,
        principles: Vec<PrincipleGroup>,
    ) -> Result<SessionData, DataError> {
        let data = SessionData {
            scenarios,
            principles,
        };
        data.validate()?;
        Ok(data)
    }

    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    pub fn principles(&self) -> &[PrincipleGroup] {
        &self.principles
    }

    /// Parse scenario and principle JSON documents.
    pub fn parse_json(scenarios: &str, principles: &str) -> Result<SessionData, DataError> {
        let scenarios: Vec<Scenario> = serde_json::from_str(scenarios)?;
        let principles: Vec<PrincipleGroup> = serde_json::from_str(principles)?;
        Self::new(scenarios, principles)
    }

    /// Load `scenarios.json` and `principles.json` from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<SessionData, DataError> {
        let scenarios = std::fs::read_to_string(dir.join(SCENARIOS_FILE))?;
        let principles = std::fs::read_to_string(dir.join(PRINCIPLES_FILE))?;
        let data = Self::parse_json(&scenarios, &principles)?;
        tracing::debug!(
            dir = %dir.display(),
            scenarios = data.scenarios.len(),
            principle_groups = data.principles.len(),
            "loaded session data"
        );
        Ok(data)
    }

    fn validate(&self) -> Result<(), DataError> {
        if self.scenarios.is_empty() {
            return Err(DataError::NoScenarios);
        }
        let mut seen = FxHashSet::default();
        for scenario in &self.scenarios {
            if !seen.insert(scenario.id.as_str()) {
                return Err(DataError::DuplicateScenario(scenario.id.clone()));
            }
        }
        Ok(())
    }
}
