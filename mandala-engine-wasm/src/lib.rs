//! WASM bindings for mandala-engine: the in-process API the web view calls.

use wasm_bindgen::prelude::*;

use mandala_engine::core::data::SessionData;
use mandala_engine::core::oracle::Lexicon;
use mandala_engine::core::session::{Progress, Session};
use mandala_engine::core::visual::{mandala_spokes, MandalaGeometry, ParticleStyle};
use mandala_engine::schema::metric::MetricKey;
use mandala_engine::schema::scenario::Scenario;

// ---------------------------------------------------------------------------
// Embedded data: compiled into the WASM binary
// ---------------------------------------------------------------------------
mod data {
    pub const SCENARIOS: &str = include_str!("../../data/scenarios.json");
    pub const PRINCIPLES: &str = include_str!("../../data/principles.json");
    pub const LEXICON: &str = include_str!("../../data/oracle.ron");
}

// ---------------------------------------------------------------------------
// JSON helper types for communication across the WASM boundary
// ---------------------------------------------------------------------------
#[derive(serde::Serialize)]
struct ChoiceInfo<'a> {
    index: usize,
    id: &'a str,
    label: &'a str,
}

#[derive(serde::Serialize)]
struct ScenarioInfo<'a> {
    index: usize,
    total: usize,
    id: &'a str,
    title: &'a str,
    description: &'a str,
    choices: Vec<ChoiceInfo<'a>>,
}

#[derive(serde::Serialize)]
struct MetricInfo {
    key: &'static str,
    label: &'static str,
    icon: &'static str,
    value: f64,
}

#[derive(serde::Serialize)]
struct ChoiceOutcome<'a> {
    oracle: &'a str,
    finished: bool,
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, JsError> {
    serde_json::to_string(value).map_err(|e| JsError::new(&format!("Serialization error: {e}")))
}

fn scenario_info(index: usize, total: usize, s: &Scenario) -> ScenarioInfo<'_> {
    ScenarioInfo {
        index,
        total,
        id: &s.id,
        title: &s.title,
        description: &s.description,
        choices: s
            .choices
            .iter()
            .enumerate()
            .map(|(i, c)| ChoiceInfo {
                index: i,
                id: &c.id,
                label: &c.label,
            })
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// MandalaSession: the main exported struct
// ---------------------------------------------------------------------------
#[wasm_bindgen]
pub struct MandalaSession {
    session: Session,
}

#[wasm_bindgen]
impl MandalaSession {
    /// Create a session over the bundled scenarios. Fails if the bundled
    /// data does not load; no partial session is created.
    #[wasm_bindgen(constructor)]
    pub fn new(seed: u64) -> Result<MandalaSession, JsError> {
        Self::build(seed, data::SCENARIOS, data::PRINCIPLES)
    }

    /// Create a session from scenario and principle JSON fetched by the page.
    pub fn from_json(
        seed: u64,
        scenarios_json: &str,
        principles_json: &str,
    ) -> Result<MandalaSession, JsError> {
        Self::build(seed, scenarios_json, principles_json)
    }

    /// Current scenario as JSON, or `null` once the session is finished.
    pub fn current_scenario(&self) -> Result<String, JsError> {
        let total = self.session.scenarios().len();
        let index = self.session.scenario_index();
        match self.session.current_scenario() {
            Some(s) => to_json(&scenario_info(index, total, s)),
            None => Ok("null".to_string()),
        }
    }

    /// Metric values in schema order, with labels and icon ids.
    pub fn metrics(&self) -> Result<String, JsError> {
        let metrics: Vec<MetricInfo> = self
            .session
            .metrics()
            .iter()
            .map(|(key, value)| MetricInfo {
                key: key.name(),
                label: key.label(),
                icon: key.icon(),
                value,
            })
            .collect();
        to_json(&metrics)
    }

    /// Value of a single metric by wire name.
    pub fn metric(&self, key: &str) -> Result<f64, JsError> {
        let key: MetricKey = key.parse().map_err(|e| JsError::new(&format!("{e}")))?;
        Ok(self.session.metrics().get(key))
    }

    /// Apply choice 0 or 1 of the current scenario without moving on.
    /// Returns the new history entry as JSON.
    pub fn apply_choice(&mut self, index: usize) -> Result<String, JsError> {
        let entry = self
            .session
            .apply_choice(index)
            .map_err(|e| JsError::new(&format!("Choice error: {e}")))?;
        to_json(entry)
    }

    /// Move past the current scenario. Returns the new scenario index, or
    /// `undefined` once the session is finished.
    pub fn advance(&mut self) -> Option<usize> {
        match self.session.advance() {
            Progress::Next(index) => Some(index),
            Progress::Finished => None,
        }
    }

    /// Apply choice 0 or 1 of the current scenario and move on.
    ///
    /// Returns `{ "oracle": <line>, "finished": <bool> }`. Any index other
    /// than 0 or 1 is a caller bug and aborts.
    pub fn choose(&mut self, index: usize) -> Result<String, JsError> {
        self.session
            .apply_choice(index)
            .map_err(|e| JsError::new(&format!("Choice error: {e}")))?;
        let finished = self.session.advance() == Progress::Finished;
        to_json(&ChoiceOutcome {
            oracle: self.session.oracle_line(),
            finished,
        })
    }

    pub fn is_finished(&self) -> bool {
        self.session.is_finished()
    }

    pub fn oracle_line(&self) -> String {
        self.session.oracle_line().to_string()
    }

    pub fn reset(&mut self) {
        self.session.reset();
    }

    /// JSON array of the `n` largest cumulative shifts.
    pub fn summarize_bias(&self, n: usize) -> Result<String, JsError> {
        to_json(&self.session.summarize_bias(n))
    }

    pub fn debrief(&self) -> Result<String, JsError> {
        to_json(&self.session.debrief())
    }

    /// Full history ledger as JSON.
    pub fn history(&self) -> Result<String, JsError> {
        to_json(self.session.history())
    }

    pub fn principles(&self) -> Result<String, JsError> {
        to_json(&self.session.principles())
    }

    /// Mandala spokes for the default 600x600 view box.
    pub fn mandala(&self) -> Result<String, JsError> {
        to_json(&mandala_spokes(
            self.session.metrics(),
            &MandalaGeometry::default(),
        ))
    }

    /// Particle field parameters for the current metrics.
    pub fn particle_style(&self) -> Result<String, JsError> {
        to_json(&ParticleStyle::from_metrics(self.session.metrics()))
    }

    pub fn particle_color(&self) -> String {
        ParticleStyle::from_metrics(self.session.metrics()).css_color()
    }
}

// Private helpers
impl MandalaSession {
    fn build(seed: u64, scenarios: &str, principles: &str) -> Result<MandalaSession, JsError> {
        let loaded = SessionData::parse_json(scenarios, principles)
            .map_err(|e| JsError::new(&format!("Data load error: {e}")))?;
        let lexicon = Lexicon::parse_ron(data::LEXICON)
            .map_err(|e| JsError::new(&format!("Lexicon parse error: {e}")))?;
        let session = Session::builder()
            .seed(seed)
            .with_data(loaded)
            .with_lexicon(lexicon)
            .build()
            .map_err(|e| JsError::new(&format!("Session build error: {e}")))?;
        Ok(MandalaSession { session })
    }
}
