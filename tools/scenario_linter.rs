/// Scenario Linter: checks scenario and principle data before it ships.
///
/// Usage: scenario_linter <data_dir>
///
/// Errors: the data would not load (bad JSON, no scenarios, duplicate ids).
/// Warnings: unknown metric names, zero or oversized deltas, choices that
/// change nothing, duplicate choice ids, principles mapped to unknown metrics.

use mandala_engine::core::data::{SessionData, SCENARIOS_FILE};
use mandala_engine::schema::metric::MetricKey;
use rustc_hash::FxHashSet;
use std::path::Path;
use std::process;
use tracing_subscriber::{fmt, EnvFilter};

/// A delta this large swings a metric across most of its range at once.
const LARGE_DELTA: f64 = 0.5;

fn main() {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        println!("Usage: scenario_linter <data_dir>");
        process::exit(0);
    }
    let dir = Path::new(&args[1]);

    let data = match SessionData::load_from_dir(dir) {
        Ok(data) => data,
        Err(e) => {
            println!("ERROR: {}", e);
            println!("\nSummary: 1 errors, 0 warnings");
            process::exit(1);
        }
    };
    println!(
        "Loaded {} scenarios and {} principle groups",
        data.scenarios().len(),
        data.principles().len()
    );

    let mut warnings = lint_raw_deltas(&dir.join(SCENARIOS_FILE));
    warnings.extend(lint_data(&data));

    println!("\n=== Scenario Lint Report ===\n");
    if warnings.is_empty() {
        println!("All checks passed!");
    }
    for warning in &warnings {
        println!("WARNING: {}", warning);
    }
    println!("\nSummary: 0 errors, {} warnings", warnings.len());
}

/// Unknown keys are dropped when loading, so look for them in the raw JSON.
fn lint_raw_deltas(path: &Path) -> Vec<String> {
    let mut warnings = Vec::new();
    let Ok(text) = std::fs::read_to_string(path) else {
        return warnings;
    };
    let Ok(raw) = serde_json::from_str::<serde_json::Value>(&text) else {
        return warnings;
    };
    for scenario in raw.as_array().into_iter().flatten() {
        for choice in scenario["choices"].as_array().into_iter().flatten() {
            let Some(deltas) = choice["deltas"].as_object() else {
                continue;
            };
            for key in deltas.keys() {
                if MetricKey::from_name(key).is_none() {
                    warnings.push(format!(
                        "choice {} names unknown metric '{}' (ignored at runtime)",
                        choice["id"], key
                    ));
                }
            }
        }
    }
    warnings
}

fn lint_data(data: &SessionData) -> Vec<String> {
    let mut warnings = Vec::new();
    let mut choice_ids = FxHashSet::default();

    for scenario in data.scenarios() {
        if scenario.choices[0].deltas == scenario.choices[1].deltas {
            warnings.push(format!(
                "scenario '{}': both choices have identical effects",
                scenario.id
            ));
        }
        for choice in &scenario.choices {
            if !choice_ids.insert(choice.id.as_str()) {
                warnings.push(format!("duplicate choice id '{}'", choice.id));
            }
            if choice.deltas.is_empty() {
                warnings.push(format!("choice '{}' changes no metric", choice.id));
            }
            for (key, delta) in choice.deltas.iter() {
                if delta == 0.0 {
                    warnings.push(format!("choice '{}': zero delta for {}", choice.id, key));
                } else if delta.abs() > LARGE_DELTA {
                    warnings.push(format!(
                        "choice '{}': delta {:+} for {} exceeds {}",
                        choice.id, delta, key, LARGE_DELTA
                    ));
                }
            }
        }
    }

    for group in data.principles() {
        for item in &group.items {
            for name in &item.maps_to {
                if MetricKey::from_name(name).is_none() {
                    warnings.push(format!(
                        "principle '{}' ({}) maps to unknown metric '{}'",
                        item.title, group.name, name
                    ));
                }
            }
        }
    }

    warnings
}
