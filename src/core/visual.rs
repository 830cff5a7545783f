/// Derived visual parameters for the particle field and the mandala chart.
///
/// Renderers own the drawing; these functions only map metric state to the
/// numbers they draw with.

use serde::Serialize;
use std::f64::consts::{FRAC_PI_2, TAU};

use crate::schema::metric::{MetricKey, MetricVector};

/// Styling for the animated particle field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParticleStyle {
    /// Degrees; 0 is red-ish, 220 is blue.
    pub hue: f64,
    /// Percent.
    pub saturation: f64,
    /// Percent.
    pub lightness: f64,
    /// Multiplier on the number of particles drawn per frame.
    pub density: f64,
    pub radius: f64,
    pub alpha: f64,
    /// Per-frame random velocity kick.
    pub jitter: f64,
    /// Pull toward the centre; zero unless trust is above one half.
    pub cohesion: f64,
    pub shadow_patches: usize,
    /// (width, height) of each shadow patch.
    pub patch_size: (f64, f64),
    /// Probability that a link in the loneliness web is skipped, or `None`
    /// when the web is not drawn.
    pub link_break_chance: Option<f64>,
}

impl ParticleStyle {
    pub fn from_metrics(m: &MetricVector) -> Self {
        let trust = m.get(MetricKey::Trust);
        let exploitation = m.get(MetricKey::Exploitation);
        let loneliness = m.get(MetricKey::Loneliness);

        let shadow_patches = if exploitation > 0.4 {
            ((exploitation - 0.4) * 10.0).floor() as usize + 1
        } else {
            0
        };

        Self {
            hue: 220.0 * m.get(MetricKey::Privacy),
            saturation: 60.0 + m.get(MetricKey::Safety) * 40.0,
            lightness: 50.0 - exploitation * 25.0,
            density: 1.0 + trust * 2.0,
            radius: 1.0 + m.get(MetricKey::Wellbeing) * 2.0,
            alpha: 0.6 - loneliness * 0.4,
            jitter: 0.2 + loneliness * 0.4,
            cohesion: if trust > 0.5 { 0.0005 * (trust - 0.5) } else { 0.0 },
            shadow_patches,
            patch_size: (20.0 + exploitation * 80.0, 8.0 + exploitation * 50.0),
            link_break_chance: (loneliness > 0.5).then(|| (loneliness - 0.5) * 0.5),
        }
    }

    pub fn css_color(&self) -> String {
        format!(
            "hsl({}, {}%, {}%)",
            self.hue, self.saturation, self.lightness
        )
    }
}

/// Radii and centre of the mandala chart, in view-box units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MandalaGeometry {
    pub center: (f64, f64),
    pub inner_radius: f64,
    pub outer_radius: f64,
    pub label_radius: f64,
    /// Radial distance covered by a metric going from 0 to 1.
    pub value_scale: f64,
}

impl Default for MandalaGeometry {
    fn default() -> Self {
        Self {
            center: (300.0, 300.0),
            inner_radius: 40.0,
            outer_radius: 240.0,
            label_radius: 260.0,
            value_scale: 200.0,
        }
    }
}

impl MandalaGeometry {
    fn point(&self, radius: f64, angle: f64) -> (f64, f64) {
        (
            self.center.0 + radius * angle.cos(),
            self.center.1 + radius * angle.sin(),
        )
    }
}

/// One metric's spoke on the mandala.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Spoke {
    pub key: MetricKey,
    pub label: &'static str,
    pub value: f64,
    /// Radians; the first spoke points straight up.
    pub angle: f64,
    pub start: (f64, f64),
    pub end: (f64, f64),
    pub marker: (f64, f64),
    pub label_at: (f64, f64),
}

pub fn mandala_spokes(m: &MetricVector, geometry: &MandalaGeometry) -> Vec<Spoke> {
    let count = MetricKey::COUNT as f64;
    m.iter()
        .enumerate()
        .map(|(i, (key, value))| {
            let angle = (i as f64 / count) * TAU - FRAC_PI_2;
            Spoke {
                key,
                label: key.label(),
                value,
                angle,
                start: geometry.point(geometry.inner_radius, angle),
                end: geometry.point(geometry.outer_radius, angle),
                marker: geometry.point(
                    geometry.inner_radius + geometry.value_scale * value,
                    angle,
                ),
                label_at: geometry.point(geometry.label_radius, angle),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::choice::apply_choice;
    use crate::core::ledger::HistoryLedger;
    use crate::schema::metric::MetricDeltas;
    use crate::schema::scenario::Choice;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn initial_particle_style() {
        let style = ParticleStyle::from_metrics(&MetricVector::new());
        assert!(approx(style.hue, 132.0));
        assert!(approx(style.saturation, 80.0));
        assert!(approx(style.lightness, 40.0));
        assert!(approx(style.density, 2.0));
        assert!(approx(style.alpha, 0.44));
        assert_eq!(style.cohesion, 0.0);
        assert_eq!(style.shadow_patches, 0);
        assert_eq!(style.link_break_chance, None);
    }

    #[test]
    fn exploitation_and_loneliness_effects() {
        let mut m = MetricVector::new();
        let mut ledger = HistoryLedger::new();
        let choice = Choice::new(
            "x",
            "X",
            MetricDeltas::new()
                .with(MetricKey::Exploitation, 0.45)
                .with(MetricKey::Loneliness, 0.4)
                .with(MetricKey::Trust, 0.3),
        );
        apply_choice(&mut m, &choice, &mut ledger);

        let style = ParticleStyle::from_metrics(&m);
        // (0.85 - 0.4) * 10 = 4.5 -> 4 + 1
        assert_eq!(style.shadow_patches, 5);
        assert!(approx(style.link_break_chance.unwrap(), 0.15));
        assert!(approx(style.cohesion, 0.0005 * 0.3));
    }

    #[test]
    fn css_color_format() {
        let style = ParticleStyle::from_metrics(&MetricVector::new());
        assert!(style.css_color().starts_with("hsl("));
        assert!(style.css_color().ends_with("%)"));
    }

    #[test]
    fn spokes_follow_schema_order() {
        let spokes = mandala_spokes(&MetricVector::new(), &MandalaGeometry::default());
        assert_eq!(spokes.len(), MetricKey::COUNT);
        assert_eq!(spokes[0].key, MetricKey::Privacy);
        assert_eq!(spokes[9].key, MetricKey::Loneliness);
    }

    #[test]
    fn first_spoke_points_up() {
        let spokes = mandala_spokes(&MetricVector::new(), &MandalaGeometry::default());
        let privacy = &spokes[0];
        assert!(approx(privacy.start.0, 300.0));
        assert!(approx(privacy.start.1, 260.0));
        // inner 40 + 200 * 0.6 = 160 above centre
        assert!(approx(privacy.marker.1, 140.0));
        assert!(approx(privacy.label_at.1, 40.0));
    }
}
