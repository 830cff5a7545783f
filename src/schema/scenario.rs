use serde::{Deserialize, Serialize};

use super::metric::MetricDeltas;

/// One of the two options a scenario offers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub deltas: MetricDeltas,
}

impl Choice {
    pub fn new(id: &str, label: &str, deltas: MetricDeltas) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            deltas,
        }
    }
}

/// Which of a scenario's two choices was taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChoiceSlot {
    A,
    B,
}

impl ChoiceSlot {
    /// Map an ordinal choice index to a slot.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not 0 or 1. Only a caller bug can produce any
    /// other value.
    pub fn from_index(index: usize) -> ChoiceSlot {
        match index {
            0 => ChoiceSlot::A,
            1 => ChoiceSlot::B,
            other => panic!("choice index must be 0 or 1, got {other}"),
        }
    }

    pub fn index(self) -> usize {
        match self {
            ChoiceSlot::A => 0,
            ChoiceSlot::B => 1,
        }
    }
}

/// A narrative prompt with exactly two mutually exclusive choices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub id: String,
    pub title: String,
    #[serde(alias = "desc")]
    pub description: String,
    pub choices: [Choice; 2],
}

impl Scenario {
    pub fn choice(&self, slot: ChoiceSlot) -> &Choice {
        &self.choices[slot.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::metric::MetricKey;

    const CAMERAS: &str = r#"{
        "id": "cameras",
        "title": "Street cameras",
        "desc": "The council proposes facial recognition downtown.",
        "choices": [
            { "id": "install", "label": "Install them", "deltas": { "safety": 0.2, "privacy": -0.2 } },
            { "id": "refuse", "label": "Refuse" }
        ]
    }"#;

    #[test]
    fn parse_scenario_with_desc_alias() {
        let s: Scenario = serde_json::from_str(CAMERAS).unwrap();
        assert_eq!(s.description, "The council proposes facial recognition downtown.");
        assert_eq!(s.choice(ChoiceSlot::A).deltas.get(MetricKey::Safety), 0.2);
        assert!(s.choice(ChoiceSlot::B).deltas.is_empty());
    }

    #[test]
    fn three_choices_rejected() {
        let json = r#"{
            "id": "x", "title": "x", "description": "x",
            "choices": [
                { "id": "a", "label": "a" },
                { "id": "b", "label": "b" },
                { "id": "c", "label": "c" }
            ]
        }"#;
        assert!(serde_json::from_str::<Scenario>(json).is_err());
    }

    #[test]
    fn one_choice_rejected() {
        let json = r#"{
            "id": "x", "title": "x", "description": "x",
            "choices": [ { "id": "a", "label": "a" } ]
        }"#;
        assert!(serde_json::from_str::<Scenario>(json).is_err());
    }

    #[test]
    fn slot_from_index() {
        assert_eq!(ChoiceSlot::from_index(0), ChoiceSlot::A);
        assert_eq!(ChoiceSlot::from_index(1), ChoiceSlot::B);
        assert_eq!(ChoiceSlot::B.index(), 1);
    }

    #[test]
    #[should_panic(expected = "choice index must be 0 or 1")]
    fn slot_out_of_range_panics() {
        ChoiceSlot::from_index(2);
    }
}
