/// Narrative oracle: threshold-driven aphorisms that react to the metrics.
///
/// A line is built from four fragments: one tone picked at random among the
/// tones whose thresholds currently hold, and three fixed binary motifs for
/// transparency, human agency and sustainability.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use thiserror::Error;

use crate::schema::metric::{MetricKey, MetricVector};

#[derive(Debug, Error)]
pub enum LexiconError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

const LOW: f64 = 0.35;
const HIGH: f64 = 0.65;
const STEADY: f64 = 0.6;

/// Threshold-gated tones, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tone {
    Surveillance,
    Seclusion,
    Suspicion,
    Solidarity,
    HiddenLabor,
    Balance,
    Isolation,
    Warmth,
}

impl Tone {
    pub const ALL: [Tone; 8] = [
        Tone::Surveillance,
        Tone::Seclusion,
        Tone::Suspicion,
        Tone::Solidarity,
        Tone::HiddenLabor,
        Tone::Balance,
        Tone::Isolation,
        Tone::Warmth,
    ];

    /// Whether this tone's threshold test holds for `m`.
    pub fn holds(self, m: &MetricVector) -> bool {
        use MetricKey::*;
        match self {
            Tone::Surveillance => m.get(Privacy) < LOW && m.get(Safety) > HIGH,
            Tone::Seclusion => m.get(Privacy) > HIGH,
            Tone::Suspicion => m.get(Trust) < LOW,
            Tone::Solidarity => m.get(Trust) > HIGH,
            Tone::HiddenLabor => m.get(Exploitation) > HIGH,
            Tone::Balance => m.get(Fairness) > HIGH,
            Tone::Isolation => m.get(Loneliness) > HIGH,
            Tone::Warmth => m.get(Wellbeing) > HIGH,
        }
    }
}

/// Tones whose thresholds hold, in evaluation order.
pub fn active_tones(m: &MetricVector) -> Vec<Tone> {
    Tone::ALL.iter().copied().filter(|t| t.holds(m)).collect()
}

/// A fixed pair of texts chosen by one metric crossing a threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotifPair {
    pub high: String,
    pub low: String,
}

impl MotifPair {
    fn new(high: &str, low: &str) -> Self {
        Self {
            high: high.to_string(),
            low: low.to_string(),
        }
    }

    fn select(&self, value: f64) -> &str {
        if value > STEADY {
            &self.high
        } else {
            &self.low
        }
    }
}

/// Texts for each tone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToneTexts {
    pub surveillance: String,
    pub seclusion: String,
    pub suspicion: String,
    pub solidarity: String,
    pub hidden_labor: String,
    pub balance: String,
    pub isolation: String,
    pub warmth: String,
}

impl ToneTexts {
    pub fn text(&self, tone: Tone) -> &str {
        match tone {
            Tone::Surveillance => &self.surveillance,
            Tone::Seclusion => &self.seclusion,
            Tone::Suspicion => &self.suspicion,
            Tone::Solidarity => &self.solidarity,
            Tone::HiddenLabor => &self.hidden_labor,
            Tone::Balance => &self.balance,
            Tone::Isolation => &self.isolation,
            Tone::Warmth => &self.warmth,
        }
    }
}

impl Default for ToneTexts {
    fn default() -> Self {
        Self {
            surveillance: "the shadow of surveillance lengthens".to_string(),
            seclusion: "a quiet secrecy breathes".to_string(),
            suspicion: "doubt drifts through the streets".to_string(),
            solidarity: "people believe in one another".to_string(),
            hidden_labor: "the groan of unseen labour".to_string(),
            balance: "the scales regain their balance".to_string(),
            isolation: "the crystal of loneliness shatters".to_string(),
            warmth: "a warm light glows in the heart".to_string(),
        }
    }
}

/// Every text the oracle can emit. Any field omitted from a RON file keeps
/// its built-in default, down to a single side of a motif pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "LexiconOverrides")]
pub struct Lexicon {
    pub tones: ToneTexts,
    pub fallback: String,
    pub transparency: MotifPair,
    pub agency: MotifPair,
    pub sustainability: MotifPair,
    pub prologue: String,
}

impl Default for Lexicon {
    fn default() -> Self {
        Self {
            tones: ToneTexts::default(),
            fallback: "the choice quietly sent ripples outward".to_string(),
            transparency: MotifPair::new(
                "transparent records refuse oblivion",
                "murky records breed myths",
            ),
            agency: MotifPair::new(
                "decisions still return to people",
                "the machine's hand takes the helm",
            ),
            sustainability: MotifPair::new(
                "the cycle carries on into the future",
                "resources begin to creak",
            ),
            prologue: "A quiet prologue.\n- Your choices shape society.".to_string(),
        }
    }
}

/// A motif pair as written in a lexicon file; either side may be left out.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MotifOverride {
    high: Option<String>,
    low: Option<String>,
}

impl MotifOverride {
    fn apply(self, pair: &mut MotifPair) {
        if let Some(high) = self.high {
            pair.high = high;
        }
        if let Some(low) = self.low {
            pair.low = low;
        }
    }
}

/// Wire form of [`Lexicon`], merged over the built-in texts.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LexiconOverrides {
    tones: ToneTexts,
    fallback: Option<String>,
    transparency: MotifOverride,
    agency: MotifOverride,
    sustainability: MotifOverride,
    prologue: Option<String>,
}

impl From<LexiconOverrides> for Lexicon {
    fn from(overrides: LexiconOverrides) -> Self {
        let mut lexicon = Lexicon {
            tones: overrides.tones,
            ..Lexicon::default()
        };
        if let Some(fallback) = overrides.fallback {
            lexicon.fallback = fallback;
        }
        if let Some(prologue) = overrides.prologue {
            lexicon.prologue = prologue;
        }
        overrides.transparency.apply(&mut lexicon.transparency);
        overrides.agency.apply(&mut lexicon.agency);
        overrides.sustainability.apply(&mut lexicon.sustainability);
        lexicon
    }
}

impl Lexicon {
    /// Load a lexicon from a RON file.
    pub fn load_from_ron(path: &Path) -> Result<Lexicon, LexiconError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    /// Parse a lexicon from a RON string.
    pub fn parse_ron(input: &str) -> Result<Lexicon, LexiconError> {
        Ok(ron::from_str(input)?)
    }
}

/// The four fragments of one oracle line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OracleReading<'a> {
    pub tone: &'a str,
    pub record: &'a str,
    pub agency: &'a str,
    pub cycle: &'a str,
}

impl fmt::Display for OracleReading<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[Oracle] {}.\n- {}. {}. {}.",
            self.tone, self.record, self.agency, self.cycle
        )
    }
}

/// Generates oracle lines from a lexicon. Never touches session state.
#[derive(Debug, Clone, Default)]
pub struct Oracle {
    lexicon: Lexicon,
}

impl Oracle {
    pub fn new(lexicon: Lexicon) -> Self {
        Self { lexicon }
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    /// Pick the four fragments for `metrics`. The tone is the only
    /// random part and comes from `rng`.
    pub fn read<R: Rng + ?Sized>(&self, metrics: &MetricVector, rng: &mut R) -> OracleReading<'_> {
        let candidates: Vec<&str> = active_tones(metrics)
            .into_iter()
            .map(|t| self.lexicon.tones.text(t))
            .collect();
        let tone = candidates
            .choose(rng)
            .copied()
            .unwrap_or(self.lexicon.fallback.as_str());

        OracleReading {
            tone,
            record: self.lexicon.transparency.select(metrics.get(MetricKey::Transparency)),
            agency: self.lexicon.agency.select(metrics.get(MetricKey::HumanAgency)),
            cycle: self
                .lexicon
                .sustainability
                .select(metrics.get(MetricKey::Sustainability)),
        }
    }

    /// Render a full oracle line, naming the last choice when given.
    pub fn make_line<R: Rng + ?Sized>(
        &self,
        metrics: &MetricVector,
        last_choice: Option<&str>,
        rng: &mut R,
    ) -> String {
        let mut line = self.read(metrics, rng).to_string();
        if let Some(label) = last_choice {
            line.push_str("\n[Choice] ");
            line.push_str(label);
        }
        line
    }

    /// The fixed line shown right after a reset.
    pub fn prologue(&self) -> String {
        format!("[Oracle] {}", self.lexicon.prologue)
    }
}
