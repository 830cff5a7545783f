/// Metric schema: the ten fixed societal dimensions and their values.

use serde::de::{IgnoredAny, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown metric: {0}")]
pub struct UnknownMetric(pub String);

/// One of the ten fixed metrics. Declaration order is the schema order used
/// for iteration, charting and bias tallies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MetricKey {
    Privacy,
    Safety,
    Fairness,
    Transparency,
    HumanAgency,
    Sustainability,
    Wellbeing,
    Trust,
    Exploitation,
    Loneliness,
}

impl MetricKey {
    pub const COUNT: usize = 10;

    pub const ALL: [MetricKey; Self::COUNT] = [
        Self::Privacy,
        Self::Safety,
        Self::Fairness,
        Self::Transparency,
        Self::HumanAgency,
        Self::Sustainability,
        Self::Wellbeing,
        Self::Trust,
        Self::Exploitation,
        Self::Loneliness,
    ];

    /// Wire name used in scenario data (e.g. "humanAgency").
    pub fn name(self) -> &'static str {
        match self {
            Self::Privacy => "privacy",
            Self::Safety => "safety",
            Self::Fairness => "fairness",
            Self::Transparency => "transparency",
            Self::HumanAgency => "humanAgency",
            Self::Sustainability => "sustainability",
            Self::Wellbeing => "wellbeing",
            Self::Trust => "trust",
            Self::Exploitation => "exploitation",
            Self::Loneliness => "loneliness",
        }
    }

    /// Human-facing label for charts and the metrics panel.
    pub fn label(self) -> &'static str {
        match self {
            Self::Privacy => "Privacy",
            Self::Safety => "Safety",
            Self::Fairness => "Fairness",
            Self::Transparency => "Transparency",
            Self::HumanAgency => "Human agency",
            Self::Sustainability => "Sustainability",
            Self::Wellbeing => "Wellbeing",
            Self::Trust => "Trust",
            Self::Exploitation => "Exploitation",
            Self::Loneliness => "Loneliness",
        }
    }

    /// Icon identifier understood by the view layer.
    pub fn icon(self) -> &'static str {
        match self {
            Self::HumanAgency => "agency",
            Self::Sustainability => "sustain",
            other => other.name(),
        }
    }

    pub fn from_name(name: &str) -> Option<MetricKey> {
        Self::ALL.iter().copied().find(|k| k.name() == name)
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for MetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MetricKey {
    type Err = UnknownMetric;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| UnknownMetric(s.to_string()))
    }
}

/// Clamp a value into the closed unit interval.
pub fn clamp01(x: f64) -> f64 {
    x.clamp(0.0, 1.0)
}

/// The live metric state. Every metric is always present and always in
/// `[0, 1]`; only the crate can write to it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricVector {
    privacy: f64,
    safety: f64,
    fairness: f64,
    transparency: f64,
    human_agency: f64,
    sustainability: f64,
    wellbeing: f64,
    trust: f64,
    exploitation: f64,
    loneliness: f64,
}

impl MetricVector {
    /// The documented starting state of every session.
    pub const INITIAL: MetricVector = MetricVector {
        privacy: 0.6,
        safety: 0.5,
        fairness: 0.5,
        transparency: 0.5,
        human_agency: 0.5,
        sustainability: 0.5,
        wellbeing: 0.5,
        trust: 0.5,
        exploitation: 0.4,
        loneliness: 0.4,
    };

    pub fn new() -> Self {
        Self::INITIAL
    }

    pub fn get(&self, key: MetricKey) -> f64 {
        match key {
            MetricKey::Privacy => self.privacy,
            MetricKey::Safety => self.safety,
            MetricKey::Fairness => self.fairness,
            MetricKey::Transparency => self.transparency,
            MetricKey::HumanAgency => self.human_agency,
            MetricKey::Sustainability => self.sustainability,
            MetricKey::Wellbeing => self.wellbeing,
            MetricKey::Trust => self.trust,
            MetricKey::Exploitation => self.exploitation,
            MetricKey::Loneliness => self.loneliness,
        }
    }

    fn slot_mut(&mut self, key: MetricKey) -> &mut f64 {
        match key {
            MetricKey::Privacy => &mut self.privacy,
            MetricKey::Safety => &mut self.safety,
            MetricKey::Fairness => &mut self.fairness,
            MetricKey::Transparency => &mut self.transparency,
            MetricKey::HumanAgency => &mut self.human_agency,
            MetricKey::Sustainability => &mut self.sustainability,
            MetricKey::Wellbeing => &mut self.wellbeing,
            MetricKey::Trust => &mut self.trust,
            MetricKey::Exploitation => &mut self.exploitation,
            MetricKey::Loneliness => &mut self.loneliness,
        }
    }

    /// Shift one metric by `delta`, clamping the result.
    pub(crate) fn shift(&mut self, key: MetricKey, delta: f64) {
        let slot = self.slot_mut(key);
        *slot = clamp01(*slot + delta);
    }

    /// Restore the initial values in place.
    pub fn reset(&mut self) {
        *self = Self::INITIAL;
    }

    /// Iterate `(key, value)` pairs in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (MetricKey, f64)> + '_ {
        MetricKey::ALL.iter().map(move |&k| (k, self.get(k)))
    }
}

impl Default for MetricVector {
    fn default() -> Self {
        Self::INITIAL
    }
}

/// A partial map of signed per-metric adjustments, kept in source order.
///
/// Keys absent from the map mean "no change". Unknown keys in serialized
/// data are dropped during deserialization rather than rejected.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricDeltas {
    entries: Vec<(MetricKey, f64)>,
}

impl MetricDeltas {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert. A repeated key replaces the earlier delta but
    /// keeps its original position.
    pub fn with(mut self, key: MetricKey, delta: f64) -> Self {
        self.insert(key, delta);
        self
    }

    pub fn insert(&mut self, key: MetricKey, delta: f64) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = delta,
            None => self.entries.push((key, delta)),
        }
    }

    /// The delta for `key`, or 0 when the map does not mention it.
    pub fn get(&self, key: MetricKey) -> f64 {
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, d)| *d)
            .unwrap_or(0.0)
    }

    pub fn contains(&self, key: MetricKey) -> bool {
        self.entries.iter().any(|(k, _)| *k == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (MetricKey, f64)> + '_ {
        self.entries.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(MetricKey, f64)> for MetricDeltas {
    fn from_iter<I: IntoIterator<Item = (MetricKey, f64)>>(iter: I) -> Self {
        let mut deltas = MetricDeltas::new();
        for (key, delta) in iter {
            deltas.insert(key, delta);
        }
        deltas
    }
}

impl Serialize for MetricDeltas {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, delta) in &self.entries {
            map.serialize_entry(key.name(), delta)?;
        }
        map.end()
    }
}

struct DeltasVisitor;

impl<'de> Visitor<'de> for DeltasVisitor {
    type Value = MetricDeltas;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of metric names to numeric deltas")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut deltas = MetricDeltas::new();
        while let Some(name) = access.next_key::<String>()? {
            let Some(key) = MetricKey::from_name(&name) else {
                access.next_value::<IgnoredAny>()?;
                tracing::debug!(key = %name, "ignoring unknown metric in delta map");
                continue;
            };
            // `null` reads as "no change" for that metric.
            let Some(delta) = access.next_value::<Option<f64>>()? else {
                continue;
            };
            if deltas.contains(key) {
                tracing::warn!(metric = %key, "duplicate metric in delta map, last value wins");
            }
            deltas.insert(key, delta);
        }
        Ok(deltas)
    }

    // `null` in place of a map reads as "no deltas".
    fn visit_unit<E: serde::de::Error>(self) -> Result<Self::Value, E> {
        Ok(MetricDeltas::new())
    }
}

impl<'de> Deserialize<'de> for MetricDeltas {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(DeltasVisitor)
    }
}
