use super::interactions::InteractionKind;
use super::render::Color;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Invalid value for '{parameter}': {reason}")]
    InvalidValue {
        parameter: &'static str,
        reason: String,
    },

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Which interaction types a detection run reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InteractionFilter {
    #[default]
    All,
    Only(InteractionKind),
}

impl InteractionFilter {
    pub fn includes(self, kind: InteractionKind) -> bool {
        match self {
            InteractionFilter::All => true,
            InteractionFilter::Only(only) => only == kind,
        }
    }
}

/// Geometric cutoffs used by the detection tasks.
///
/// Distances are in Angstroms and angles in degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InteractionCriteria {
    pub hbond_min_distance: f64,
    pub hbond_max_distance: f64,
    pub hbond_min_angle: f64,
    pub salt_bridge_max_distance: f64,
    pub hydrophobic_max_distance: f64,
    pub pi_stacking_max_distance: f64,
    /// Largest folded inter-normal angle still counted as parallel stacking.
    pub pi_parallel_max_angle: f64,
    /// Smallest folded inter-normal angle counted as T-shaped stacking.
    pub pi_tshape_min_angle: f64,
    /// Largest lateral centroid offset for parallel stacking.
    pub pi_max_offset: f64,
    pub cation_pi_max_distance: f64,
    pub cation_pi_max_angle: f64,
    /// Donor-hydrogen distance used when placing inferred hydrogens.
    pub inferred_hydrogen_length: f64,
}

impl Default for InteractionCriteria {
    fn default() -> Self {
        Self {
            hbond_min_distance: 2.5,
            hbond_max_distance: 3.5,
            hbond_min_angle: 120.0,
            salt_bridge_max_distance: 4.0,
            hydrophobic_max_distance: 5.0,
            pi_stacking_max_distance: 5.0,
            pi_parallel_max_angle: 30.0,
            pi_tshape_min_angle: 60.0,
            pi_max_offset: 2.0,
            cation_pi_max_distance: 6.0,
            cation_pi_max_angle: 30.0,
            inferred_hydrogen_length: 1.0,
        }
    }
}

impl InteractionCriteria {
    /// Parses criteria from TOML text; missing keys keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let criteria: Self = toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        criteria.validate()?;
        Ok(criteria)
    }

    /// Default maximum distance for an interaction type.
    pub fn max_distance_for(&self, kind: InteractionKind) -> f64 {
        match kind {
            InteractionKind::HydrogenBond => self.hbond_max_distance,
            InteractionKind::SaltBridge => self.salt_bridge_max_distance,
            InteractionKind::Hydrophobic => self.hydrophobic_max_distance,
            InteractionKind::PiStacking => self.pi_stacking_max_distance,
            InteractionKind::CationPi => self.cation_pi_max_distance,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (parameter, value) in [
            ("hbond_min_distance", self.hbond_min_distance),
            ("hbond_max_distance", self.hbond_max_distance),
            ("salt_bridge_max_distance", self.salt_bridge_max_distance),
            ("hydrophobic_max_distance", self.hydrophobic_max_distance),
            ("pi_stacking_max_distance", self.pi_stacking_max_distance),
            ("pi_max_offset", self.pi_max_offset),
            ("cation_pi_max_distance", self.cation_pi_max_distance),
            ("inferred_hydrogen_length", self.inferred_hydrogen_length),
        ] {
            require_positive(parameter, value)?;
        }
        for (parameter, value) in [
            ("hbond_min_angle", self.hbond_min_angle),
            ("cation_pi_max_angle", self.cation_pi_max_angle),
        ] {
            require_angle(parameter, value, 180.0)?;
        }
        for (parameter, value) in [
            ("pi_parallel_max_angle", self.pi_parallel_max_angle),
            ("pi_tshape_min_angle", self.pi_tshape_min_angle),
        ] {
            require_angle(parameter, value, 90.0)?;
        }
        if self.hbond_min_distance > self.hbond_max_distance {
            return Err(ConfigError::InvalidValue {
                parameter: "hbond_min_distance",
                reason: format!(
                    "must not exceed hbond_max_distance ({})",
                    self.hbond_max_distance
                ),
            });
        }
        if self.pi_parallel_max_angle > self.pi_tshape_min_angle {
            return Err(ConfigError::InvalidValue {
                parameter: "pi_parallel_max_angle",
                reason: format!(
                    "must not exceed pi_tshape_min_angle ({})",
                    self.pi_tshape_min_angle
                ),
            });
        }
        Ok(())
    }
}

/// Options of a single detection run.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionOptions {
    pub filter: InteractionFilter,
    /// Overrides the per-type default maximum distance when set.
    pub max_distance: Option<f64>,
    pub min_angle: f64,
    pub search_radius: f64,
    pub include_water: bool,
    pub infer_hydrogens: bool,
    pub criteria: InteractionCriteria,
}

impl Default for DetectionOptions {
    fn default() -> Self {
        let criteria = InteractionCriteria::default();
        Self {
            filter: InteractionFilter::All,
            max_distance: None,
            min_angle: criteria.hbond_min_angle,
            search_radius: 5.0,
            include_water: false,
            infer_hydrogens: true,
            criteria,
        }
    }
}

impl DetectionOptions {
    pub fn builder() -> DetectionOptionsBuilder {
        DetectionOptionsBuilder::new()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.criteria.validate()?;
        if let Some(distance) = self.max_distance {
            require_positive("max_distance", distance)?;
        }
        require_angle("min_angle", self.min_angle, 180.0)?;
        require_positive("search_radius", self.search_radius)
    }

    /// Effective maximum distance for `kind` in this run.
    pub fn max_distance_for(&self, kind: InteractionKind) -> f64 {
        self.max_distance
            .unwrap_or_else(|| self.criteria.max_distance_for(kind))
    }
}

#[derive(Default)]
pub struct DetectionOptionsBuilder {
    filter: Option<InteractionFilter>,
    max_distance: Option<f64>,
    min_angle: Option<f64>,
    search_radius: Option<f64>,
    include_water: Option<bool>,
    infer_hydrogens: Option<bool>,
    criteria: Option<InteractionCriteria>,
}

impl DetectionOptionsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, filter: InteractionFilter) -> Self {
        self.filter = Some(filter);
        self
    }
    pub fn only(self, kind: InteractionKind) -> Self {
        self.filter(InteractionFilter::Only(kind))
    }
    pub fn max_distance(mut self, distance: f64) -> Self {
        self.max_distance = Some(distance);
        self
    }
    pub fn min_angle(mut self, degrees: f64) -> Self {
        self.min_angle = Some(degrees);
        self
    }
    pub fn search_radius(mut self, radius: f64) -> Self {
        self.search_radius = Some(radius);
        self
    }
    pub fn include_water(mut self, include: bool) -> Self {
        self.include_water = Some(include);
        self
    }
    pub fn infer_hydrogens(mut self, infer: bool) -> Self {
        self.infer_hydrogens = Some(infer);
        self
    }
    pub fn criteria(mut self, criteria: InteractionCriteria) -> Self {
        self.criteria = Some(criteria);
        self
    }

    pub fn build(self) -> Result<DetectionOptions, ConfigError> {
        let defaults = DetectionOptions::default();
        let criteria = self.criteria.unwrap_or(defaults.criteria);
        let options = DetectionOptions {
            filter: self.filter.unwrap_or(defaults.filter),
            max_distance: self.max_distance,
            min_angle: self.min_angle.unwrap_or(criteria.hbond_min_angle),
            search_radius: self.search_radius.unwrap_or(defaults.search_radius),
            include_water: self.include_water.unwrap_or(defaults.include_water),
            infer_hydrogens: self.infer_hydrogens.unwrap_or(defaults.infer_hydrogens),
            criteria,
        };
        options.validate()?;
        Ok(options)
    }
}

/// Visual parameters for measurement and interaction primitives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StyleConfig {
    pub arc_radius: f64,
    pub arc_segments: u32,
    pub line_width: f32,
    /// Distance between a dihedral label and the central bond.
    pub label_offset: f64,
    pub label_size: f32,
    pub plane_opacity: f32,
    pub measurement_color: Color,
    pub label_color: Color,
    pub hydrogen_bond_color: Color,
    pub salt_bridge_color: Color,
    pub hydrophobic_color: Color,
    pub pi_stacking_color: Color,
    pub cation_pi_color: Color,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            arc_radius: 0.8,
            arc_segments: 32,
            line_width: 0.05,
            label_offset: 0.3,
            label_size: 14.0,
            plane_opacity: 0.4,
            measurement_color: Color::new(1.0, 1.0, 0.0),
            label_color: Color::WHITE,
            hydrogen_bond_color: Color::new(0.0, 0.75, 1.0),
            salt_bridge_color: Color::new(1.0, 0.27, 0.27),
            hydrophobic_color: Color::new(0.6, 0.6, 0.6),
            pi_stacking_color: Color::new(0.2, 0.8, 0.2),
            cation_pi_color: Color::new(1.0, 0.55, 0.0),
        }
    }
}

impl StyleConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let style: Self = toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        require_positive("arc_radius", style.arc_radius)?;
        if style.arc_segments == 0 {
            return Err(ConfigError::InvalidValue {
                parameter: "arc_segments",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(style)
    }

    pub fn interaction_color(&self, kind: InteractionKind) -> Color {
        match kind {
            InteractionKind::HydrogenBond => self.hydrogen_bond_color,
            InteractionKind::SaltBridge => self.salt_bridge_color,
            InteractionKind::Hydrophobic => self.hydrophobic_color,
            InteractionKind::PiStacking => self.pi_stacking_color,
            InteractionKind::CationPi => self.cation_pi_color,
        }
    }
}

fn require_positive(parameter: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            parameter,
            reason: format!("expected a positive finite number, got {value}"),
        })
    }
}

fn require_angle(parameter: &'static str, value: f64, max: f64) -> Result<(), ConfigError> {
    if value.is_finite() && (0.0..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            parameter,
            reason: format!("expected an angle in [0, {max}] degrees, got {value}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_with_no_parameters_uses_defaults() {
        let options = DetectionOptionsBuilder::new().build().unwrap();
        assert_eq!(options, DetectionOptions::default());
        assert_eq!(options.min_angle, 120.0);
        assert_eq!(options.search_radius, 5.0);
        assert!(options.infer_hydrogens);
        assert!(!options.include_water);
    }

    #[test]
    fn max_distance_falls_back_to_per_type_defaults() {
        let options = DetectionOptions::default();
        assert_eq!(options.max_distance_for(InteractionKind::HydrogenBond), 3.5);
        assert_eq!(options.max_distance_for(InteractionKind::SaltBridge), 4.0);
        assert_eq!(options.max_distance_for(InteractionKind::Hydrophobic), 5.0);
        assert_eq!(options.max_distance_for(InteractionKind::PiStacking), 5.0);
        assert_eq!(options.max_distance_for(InteractionKind::CationPi), 6.0);

        let overridden = DetectionOptions::builder().max_distance(3.0).build().unwrap();
        assert_eq!(overridden.max_distance_for(InteractionKind::CationPi), 3.0);
    }

    #[test]
    fn builder_rejects_invalid_values() {
        assert!(matches!(
            DetectionOptions::builder().max_distance(-1.0).build(),
            Err(ConfigError::InvalidValue {
                parameter: "max_distance",
                ..
            })
        ));
        assert!(matches!(
            DetectionOptions::builder().min_angle(200.0).build(),
            Err(ConfigError::InvalidValue {
                parameter: "min_angle",
                ..
            })
        ));
        assert!(matches!(
            DetectionOptions::builder().search_radius(f64::NAN).build(),
            Err(ConfigError::InvalidValue {
                parameter: "search_radius",
                ..
            })
        ));
    }

    #[test]
    fn filter_includes_only_selected_kind() {
        let filter = InteractionFilter::Only(InteractionKind::SaltBridge);
        assert!(filter.includes(InteractionKind::SaltBridge));
        assert!(!filter.includes(InteractionKind::HydrogenBond));
        assert!(InteractionFilter::All.includes(InteractionKind::CationPi));
    }

    #[test]
    fn criteria_from_toml_keeps_defaults_for_missing_keys() {
        let criteria = InteractionCriteria::from_toml_str(
            "hbond_max_distance = 3.2\npi_parallel_max_angle = 25.0\n",
        )
        .unwrap();
        assert_eq!(criteria.hbond_max_distance, 3.2);
        assert_eq!(criteria.pi_parallel_max_angle, 25.0);
        assert_eq!(criteria.salt_bridge_max_distance, 4.0);
    }

    #[test]
    fn criteria_from_toml_rejects_unknown_keys_and_bad_ranges() {
        assert!(matches!(
            InteractionCriteria::from_toml_str("hbond_max_distnce = 3.2"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            InteractionCriteria::from_toml_str("hbond_min_distance = 4.0"),
            Err(ConfigError::InvalidValue {
                parameter: "hbond_min_distance",
                ..
            })
        ));
    }

    #[test]
    fn style_from_toml_parses_colors() {
        let style = StyleConfig::from_toml_str(
            "arc_radius = 1.2\nmeasurement_color = { r = 0.0, g = 1.0, b = 0.5 }\n",
        )
        .unwrap();
        assert_eq!(style.arc_radius, 1.2);
        assert_eq!(style.measurement_color, Color::new(0.0, 1.0, 0.5));
        assert_eq!(style.arc_segments, 32);
        assert!(StyleConfig::from_toml_str("arc_radius = 0.0").is_err());
    }
}
