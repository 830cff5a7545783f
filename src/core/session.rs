/// Session controller: owns the state of one linear walk through the scenarios.
///
/// The view layer talks to a single `Session`: it reads the current scenario
/// and metrics, calls `apply_choice` on a selection, `advance` to move on and
/// `reset` to start over.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::choice;
use crate::core::data::{DataError, SessionData};
use crate::core::ledger::{BiasShift, HistoryEntry, HistoryLedger};
use crate::core::oracle::{Lexicon, LexiconError, Oracle};
use crate::schema::metric::MetricVector;
use crate::schema::principle::PrincipleGroup;
use crate::schema::scenario::{ChoiceSlot, Scenario};

/// Number of shifts the debrief reports unless configured otherwise.
pub const DEFAULT_BIAS_TOP_N: usize = 3;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("data error: {0}")]
    Data(#[from] DataError),
    #[error("lexicon error: {0}")]
    Lexicon(#[from] LexiconError),
    #[error("no scenario data was provided")]
    MissingScenarios,
    #[error("session is finished; reset before choosing again")]
    Finished,
    #[error("no scenario at index {0}")]
    NoScenarioAt(usize),
}

/// Result of moving past the current scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// Now on the scenario with this index.
    Next(usize),
    Finished,
}

/// The mutable part of a session. Reset returns it to exactly `new()`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SessionState {
    scenario_index: usize,
    finished: bool,
    metrics: MetricVector,
    history: HistoryLedger,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scenario_index(&self) -> usize {
        self.scenario_index
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn metrics(&self) -> &MetricVector {
        &self.metrics
    }

    pub fn history(&self) -> &HistoryLedger {
        &self.history
    }

    pub fn reset(&mut self) {
        self.scenario_index = 0;
        self.finished = false;
        self.metrics.reset();
        self.history.clear();
    }
}

/// End-of-session summary.
#[derive(Debug, Clone, Serialize)]
pub struct Debrief {
    pub turns: usize,
    pub metrics: MetricVector,
    pub top_shifts: Vec<BiasShift>,
}

pub struct Session {
    data: SessionData,
    oracle: Oracle,
    rng: StdRng,
    bias_top_n: usize,
    state: SessionState,
    oracle_line: String,
}

/// Builder for constructing a `Session`.
pub struct SessionBuilder {
    seed: u64,
    data_dir: Option<PathBuf>,
    data: Option<SessionData>,
    lexicon_path: Option<PathBuf>,
    lexicon: Option<Lexicon>,
    bias_top_n: usize,
}

impl Session {
    pub fn builder() -> SessionBuilder {
        SessionBuilder {
            seed: 0,
            data_dir: None,
            data: None,
            lexicon_path: None,
            lexicon: None,
            bias_top_n: DEFAULT_BIAS_TOP_N,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn metrics(&self) -> &MetricVector {
        &self.state.metrics
    }

    pub fn history(&self) -> &HistoryLedger {
        &self.state.history
    }

    pub fn scenario_index(&self) -> usize {
        self.state.scenario_index
    }

    pub fn is_finished(&self) -> bool {
        self.state.finished
    }

    pub fn scenarios(&self) -> &[Scenario] {
        self.data.scenarios()
    }

    pub fn principles(&self) -> &[PrincipleGroup] {
        self.data.principles()
    }

    /// The scenario awaiting a choice, or `None` once finished.
    pub fn current_scenario(&self) -> Option<&Scenario> {
        if self.state.finished {
            return None;
        }
        self.data.scenarios().get(self.state.scenario_index)
    }

    /// The most recent oracle line.
    pub fn oracle_line(&self) -> &str {
        &self.oracle_line
    }

    pub fn oracle(&self) -> &Oracle {
        &self.oracle
    }

    /// Apply choice `index` (0 or 1) of the current scenario.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not 0 or 1.
    pub fn apply_choice(&mut self, index: usize) -> Result<&HistoryEntry, SessionError> {
        self.choose(ChoiceSlot::from_index(index))
    }

    /// Apply one of the current scenario's choices and refresh the oracle
    /// line. Does not advance to the next scenario.
    pub fn choose(&mut self, slot: ChoiceSlot) -> Result<&HistoryEntry, SessionError> {
        if self.state.finished {
            return Err(SessionError::Finished);
        }
        let index = self.state.scenario_index;
        let scenario = self
            .data
            .scenarios()
            .get(index)
            .ok_or(SessionError::NoScenarioAt(index))?;
        let picked = scenario.choice(slot);

        let entry = choice::apply_choice(
            &mut self.state.metrics,
            picked,
            &mut self.state.history,
        );
        self.oracle_line =
            self.oracle
                .make_line(&self.state.metrics, Some(picked.label.as_str()), &mut self.rng);
        Ok(entry)
    }

    /// Move to the next scenario, finishing the session after the last one.
    pub fn advance(&mut self) -> Progress {
        if self.state.finished {
            return Progress::Finished;
        }
        self.state.scenario_index += 1;
        if self.state.scenario_index >= self.data.scenarios().len() {
            self.state.finished = true;
            tracing::info!(turns = self.state.history.len(), "session finished");
            Progress::Finished
        } else {
            Progress::Next(self.state.scenario_index)
        }
    }

    /// Reinitialise the session: first scenario, initial metrics, empty
    /// history, prologue oracle line.
    pub fn reset(&mut self) {
        self.state.reset();
        self.oracle_line = self.oracle.prologue();
        tracing::info!("session reset");
    }

    pub fn summarize_bias(&self, top_n: usize) -> Vec<BiasShift> {
        self.state.history.summarize_bias(top_n)
    }

    pub fn debrief(&self) -> Debrief {
        Debrief {
            turns: self.state.history.len(),
            metrics: self.state.metrics,
            top_shifts: self.summarize_bias(self.bias_top_n),
        }
    }
}

impl SessionBuilder {
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Directory holding `scenarios.json` and `principles.json`.
    pub fn data_dir(mut self, path: impl AsRef<Path>) -> Self {
        self.data_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Provide data directly (for testing without files).
    pub fn with_data(mut self, data: SessionData) -> Self {
        self.data = Some(data);
        self
    }

    pub fn lexicon_path(mut self, path: impl AsRef<Path>) -> Self {
        self.lexicon_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Provide a lexicon directly. Takes precedence over `lexicon_path`.
    pub fn with_lexicon(mut self, lexicon: Lexicon) -> Self {
        self.lexicon = Some(lexicon);
        self
    }

    pub fn bias_top_n(mut self, n: usize) -> Self {
        self.bias_top_n = n;
        self
    }

    pub fn build(self) -> Result<Session, SessionError> {
        let data = match (self.data, self.data_dir) {
            (Some(data), _) => data,
            (None, Some(dir)) => SessionData::load_from_dir(&dir)?,
            (None, None) => return Err(SessionError::MissingScenarios),
        };

        let lexicon = match (self.lexicon, self.lexicon_path) {
            (Some(lexicon), _) => lexicon,
            (None, Some(path)) => Lexicon::load_from_ron(&path)?,
            (None, None) => Lexicon::default(),
        };

        let oracle = Oracle::new(lexicon);
        let mut rng = StdRng::seed_from_u64(self.seed);
        let state = SessionState::new();
        let oracle_line = oracle.make_line(&state.metrics, None, &mut rng);

        tracing::info!(
            seed = self.seed,
            scenarios = data.scenarios().len(),
            "session ready"
        );

        Ok(Session {
            data,
            oracle,
            rng,
            bias_top_n: self.bias_top_n,
            state,
            oracle_line,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::metric::{MetricDeltas, MetricKey};
    use crate::schema::scenario::Choice;

    fn scenario(id: &str, a: MetricDeltas, b: MetricDeltas) -> Scenario {
        Scenario {
            id: id.to_string(),
            title: format!("Scenario {id}"),
            description: String::new(),
            choices: [
                Choice::new(&format!("{id}-a"), &format!("{id} first"), a),
                Choice::new(&format!("{id}-b"), &format!("{id} second"), b),
            ],
        }
    }

    fn build_test_session() -> Session {
        let scenarios = vec![
            scenario(
                "s1",
                MetricDeltas::new()
                    .with(MetricKey::Trust, 0.2)
                    .with(MetricKey::Privacy, -0.1),
                MetricDeltas::new().with(MetricKey::Exploitation, 0.9),
            ),
            scenario(
                "s2",
                MetricDeltas::new().with(MetricKey::Safety, 0.3),
                MetricDeltas::new().with(MetricKey::Loneliness, -0.2),
            ),
        ];
        Session::builder()
            .seed(42)
            .with_data(SessionData::new(scenarios, Vec::new()).unwrap())
            .build()
            .unwrap()
    }

    #[test]
    fn fresh_session() {
        let session = build_test_session();
        assert_eq!(session.scenario_index(), 0);
        assert!(!session.is_finished());
        assert_eq!(*session.metrics(), MetricVector::INITIAL);
        assert!(session.history().is_empty());
        assert_eq!(session.current_scenario().unwrap().id, "s1");
        assert!(session.oracle_line().starts_with("[Oracle] "));
    }

    #[test]
    fn build_without_data_fails() {
        let err = Session::builder().build().err().unwrap();
        assert!(matches!(err, SessionError::MissingScenarios));
    }

    #[test]
    fn empty_scenario_list_never_builds() {
        let dir = std::env::temp_dir().join(format!("mandala-empty-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("scenarios.json"), "[]").unwrap();
        std::fs::write(dir.join("principles.json"), "[]").unwrap();

        let result = Session::builder().data_dir(&dir).build();
        std::fs::remove_dir_all(&dir).unwrap();
        assert!(matches!(
            result.err(),
            Some(SessionError::Data(DataError::NoScenarios))
        ));
    }

    #[test]
    fn apply_records_and_updates_oracle() {
        let mut session = build_test_session();
        let entry = session.apply_choice(0).unwrap().clone();
        assert_eq!(entry.choice_id, "s1-a");
        assert!((session.metrics().get(MetricKey::Trust) - 0.7).abs() < 1e-9);
        assert!(session.oracle_line().ends_with("[Choice] s1 first"));
        // Choosing does not move on by itself.
        assert_eq!(session.scenario_index(), 0);
    }

    #[test]
    fn advance_until_finished() {
        let mut session = build_test_session();
        assert_eq!(session.advance(), Progress::Next(1));
        assert_eq!(session.advance(), Progress::Finished);
        assert!(session.is_finished());
        assert!(session.current_scenario().is_none());
        assert_eq!(session.advance(), Progress::Finished);
        assert!(matches!(session.apply_choice(0), Err(SessionError::Finished)));
    }

    #[test]
    #[should_panic(expected = "choice index must be 0 or 1")]
    fn out_of_range_choice_panics() {
        let mut session = build_test_session();
        let _ = session.apply_choice(2);
    }

    #[test]
    fn reset_restores_everything() {
        let mut session = build_test_session();
        session.apply_choice(1).unwrap();
        session.advance();
        session.apply_choice(0).unwrap();
        session.advance();
        assert!(session.is_finished());

        session.reset();
        assert_eq!(session.scenario_index(), 0);
        assert!(!session.is_finished());
        assert_eq!(*session.metrics(), MetricVector::INITIAL);
        assert!(session.history().is_empty());
        assert_eq!(session.oracle_line(), session.oracle().prologue());
        assert!(session.apply_choice(0).is_ok());
    }

    #[test]
    fn debrief_reports_top_shifts() {
        let mut session = build_test_session();
        session.apply_choice(1).unwrap();
        session.advance();
        session.apply_choice(0).unwrap();
        session.advance();

        let debrief = session.debrief();
        assert_eq!(debrief.turns, 2);
        assert_eq!(debrief.metrics.get(MetricKey::Exploitation), 1.0);
        let keys: Vec<MetricKey> = debrief.top_shifts.iter().map(|s| s.key).collect();
        assert_eq!(keys, vec![MetricKey::Exploitation, MetricKey::Safety]);
    }

    #[test]
    fn bias_top_n_configurable() {
        let scenarios = vec![scenario(
            "s1",
            MetricDeltas::new()
                .with(MetricKey::Trust, 0.2)
                .with(MetricKey::Privacy, -0.1),
            MetricDeltas::new(),
        )];
        let mut session = Session::builder()
            .bias_top_n(1)
            .with_data(SessionData::new(scenarios, Vec::new()).unwrap())
            .build()
            .unwrap();
        session.apply_choice(0).unwrap();
        assert_eq!(session.debrief().top_shifts.len(), 1);
    }

    #[test]
    fn same_seed_same_oracle_lines() {
        let mut a = build_test_session();
        let mut b = build_test_session();
        assert_eq!(a.oracle_line(), b.oracle_line());
        a.apply_choice(0).unwrap();
        b.apply_choice(0).unwrap();
        assert_eq!(a.oracle_line(), b.oracle_line());
    }

    #[test]
    fn explicit_lexicon_used() {
        let lexicon = Lexicon {
            fallback: "still waters".to_string(),
            ..Lexicon::default()
        };
        let scenarios = vec![scenario("s1", MetricDeltas::new(), MetricDeltas::new())];
        let session = Session::builder()
            .with_data(SessionData::new(scenarios, Vec::new()).unwrap())
            .with_lexicon(lexicon)
            .build()
            .unwrap();
        assert!(session.oracle_line().starts_with("[Oracle] still waters."));
    }
}
