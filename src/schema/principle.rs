use serde::{Deserialize, Serialize};

/// A named group of reference principles shown in the ethics panel.
/// The engine never interprets these; they are passed through for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrincipleGroup {
    pub name: String,
    #[serde(default)]
    pub items: Vec<Principle>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Principle {
    pub title: String,
    /// Metric wire names this principle relates to. Free-form strings.
    #[serde(rename = "mapsTo", default)]
    pub maps_to: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_group() {
        let json = r#"[{
            "name": "OECD AI Principles",
            "items": [
                { "title": "Transparency and explainability", "mapsTo": ["transparency", "trust"] }
            ]
        }]"#;
        let groups: Vec<PrincipleGroup> = serde_json::from_str(json).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].items[0].maps_to, vec!["transparency", "trust"]);
    }

    #[test]
    fn missing_maps_to_defaults_empty() {
        let p: Principle = serde_json::from_str(r#"{ "title": "Do no harm" }"#).unwrap();
        assert!(p.maps_to.is_empty());
    }
}
