use anyhow::{Context, Result};
use std::collections::HashSet;
use thiserror::Error;

pub mod presets;
pub mod road;
pub mod vehicles;

pub use presets::*;
pub use road::*;
pub use vehicles::*;

/// Errors raised when the simulation configuration cannot describe a valid
/// road/fleet geometry. These are detected once, at construction.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be positive (got {value})")]
    NonPositive { field: &'static str, value: f32 },
    #[error("{field} must be non-negative (got {value})")]
    Negative { field: &'static str, value: f32 },
    #[error("{field} must be finite (got {value})")]
    NonFinite { field: &'static str, value: f32 },
    #[error("{field} must be between {min} and {max} (got {value})")]
    OutOfRange {
        field: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },
    #[error("road lower bound {lower} must be below upper bound {upper}")]
    InvalidBounds { lower: f32, upper: f32 },
    #[error("road must define at least one lane")]
    NoLanes,
    #[error("at least one vehicle must be defined")]
    NoVehicles,
    #[error("vehicle '{name}' is defined more than once")]
    DuplicateVehicle { name: String },
    #[error("vehicle '{vehicle}': {field} must be positive (got {value})")]
    VehicleNonPositive {
        vehicle: String,
        field: &'static str,
        value: f32,
    },
    #[error("vehicle '{vehicle}': {field} must be finite (got {value})")]
    VehicleNonFinite {
        vehicle: String,
        field: &'static str,
        value: f32,
    },
    #[error("vehicle '{vehicle}': initial speed {speed} outside [0, {max_speed}]")]
    InitialSpeed {
        vehicle: String,
        speed: f32,
        max_speed: f32,
    },
    #[error("vehicle '{vehicle}': lane {lane} does not exist ({lane_count} lanes)")]
    UnknownLane {
        vehicle: String,
        lane: usize,
        lane_count: usize,
    },
    #[error("vehicle '{vehicle}' needs {required} of lane '{lane}' but it is only {lane_width} wide")]
    LaneTooNarrow {
        vehicle: String,
        lane: String,
        lane_width: f32,
        required: f32,
    },
    #[error("vehicle '{vehicle}' starts {gap} behind '{ahead}', closer than the minimum safe distance {min_safe_distance}")]
    InitialSpacing {
        vehicle: String,
        ahead: String,
        gap: f32,
        min_safe_distance: f32,
    },
    #[error("overtake lateral step must be non-zero when a vehicle can overtake")]
    ZeroLateralStep,
}

#[derive(Debug, Clone)]
pub struct SimulationConfig {
    pub road: RoadConfig,
    pub vehicles: VehiclesConfig,
}

impl SimulationConfig {
    pub fn load_from_files(road_path: &str, vehicles_path: &str) -> Result<Self> {
        let road_content = std::fs::read_to_string(road_path)
            .with_context(|| format!("reading road configuration {road_path}"))?;
        let vehicles_content = std::fs::read_to_string(vehicles_path)
            .with_context(|| format!("reading vehicle configuration {vehicles_path}"))?;

        Self::from_toml_strs(&road_content, &vehicles_content)
    }

    pub fn from_toml_strs(road_toml: &str, vehicles_toml: &str) -> Result<Self> {
        let road: RoadConfig = toml::from_str(road_toml).context("parsing road configuration")?;
        let vehicles: VehiclesConfig =
            toml::from_str(vehicles_toml).context("parsing vehicle configuration")?;

        let config = SimulationConfig { road, vehicles };
        config.validate()?;

        Ok(config)
    }
}

pub trait Validate {
    fn validate(&self) -> Result<(), ConfigError>;
}

impl Validate for SimulationConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        self.road.validate()?;
        self.vehicles.validate()?;

        // Cross-checks between the fleet and the lanes it is placed on
        let lanes = &self.road.road.lanes;
        let margin = self.vehicles.overtake.edge_margin;
        let mut names = HashSet::new();

        for spec in &self.vehicles.vehicles {
            if !names.insert(spec.name.as_str()) {
                return Err(ConfigError::DuplicateVehicle {
                    name: spec.name.clone(),
                });
            }

            let lane = lanes.get(spec.lane).ok_or_else(|| ConfigError::UnknownLane {
                vehicle: spec.name.clone(),
                lane: spec.lane,
                lane_count: lanes.len(),
            })?;

            let required = spec.width + 2.0 * margin;
            if required > lane.width {
                return Err(ConfigError::LaneTooNarrow {
                    vehicle: spec.name.clone(),
                    lane: lane.name.clone(),
                    lane_width: lane.width,
                    required,
                });
            }
        }

        for (index, lane) in lanes.iter().enumerate() {
            self.check_spacing(index, lane.direction)?;
        }

        Ok(())
    }
}

impl SimulationConfig {
    /// Every vehicle starts centred in its lane, so any two in the same lane
    /// block each other. Consecutive pairs along the travel direction must be
    /// at least the minimum safe distance apart.
    fn check_spacing(&self, lane: usize, direction: Direction) -> Result<(), ConfigError> {
        let sign = direction.sign();
        let min_safe_distance = self.vehicles.acc.min_safe_distance;

        let mut queue: Vec<&VehicleSpec> = self
            .vehicles
            .vehicles
            .iter()
            .filter(|spec| spec.lane == lane)
            .collect();
        queue.sort_by(|a, b| (sign * a.position).total_cmp(&(sign * b.position)));

        for pair in queue.windows(2) {
            let (behind, ahead) = (pair[0], pair[1]);
            let gap = match direction {
                Direction::Forward => ahead.position - (behind.position + behind.length),
                Direction::Reverse => behind.position - (ahead.position + ahead.length),
            };

            if gap < min_safe_distance {
                return Err(ConfigError::InitialSpacing {
                    vehicle: behind.name.clone(),
                    ahead: ahead.name.clone(),
                    gap,
                    min_safe_distance,
                });
            }
        }

        Ok(())
    }
}

pub(crate) fn ensure_finite(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonFinite { field, value })
    }
}

/// Rejects zero, negative and non-finite values.
pub(crate) fn ensure_positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    ensure_finite(field, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}

pub(crate) fn ensure_non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    ensure_finite(field, value)?;
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { field, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nan_is_not_positive() {
        assert!(ensure_positive("gain", f32::NAN).is_err());
        assert!(ensure_non_negative("gain", f32::NAN).is_err());
        assert!(ensure_non_negative("gain", 0.0).is_ok());
        assert_eq!(
            ensure_positive("gain", f32::INFINITY),
            Err(ConfigError::NonFinite {
                field: "gain",
                value: f32::INFINITY
            })
        );
        assert!(ensure_non_negative("desired_speed", f32::INFINITY).is_err());
    }

    #[test]
    fn close_start_is_rejected_in_both_directions() {
        let mut config = Scenario::SingleLane.config();
        config.vehicles.vehicles[1].position = 200.0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::InitialSpacing {
                vehicle: "Red Car".to_string(),
                ahead: "Blue Car".to_string(),
                gap: 40.0,
                min_safe_distance: 100.0,
            })
        );

        // up lane runs toward smaller positions: Green at 300 trails Blue at 100
        let mut config = Scenario::TwoWay.config();
        config.vehicles.vehicles[2].position = 200.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InitialSpacing { ref vehicle, gap, .. })
                if vehicle == "Green Car" && gap == 40.0
        ));
    }

    #[test]
    fn shared_start_position_is_rejected() {
        let mut config = Scenario::SingleLane.config();
        config.vehicles.vehicles[2].position = 400.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InitialSpacing { gap, .. }) if gap == -60.0
        ));
    }

    #[test]
    fn spacing_is_per_lane() {
        // Red and Orange share a position but not a lane with Blue/Green
        let mut config = Scenario::TwoWay.config();
        config.vehicles.vehicles[0].position = 100.0;
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut config = Scenario::SingleLane.config();
        let copy = config.vehicles.vehicles[0].clone();
        config.vehicles.vehicles.push(copy);

        assert!(matches!(
            config.validate(),
            Err(ConfigError::DuplicateVehicle { .. })
        ));
    }

    #[test]
    fn narrow_lane_is_rejected() {
        let mut config = Scenario::TwoWay.config();
        config.road.road.lanes[0].width = 60.0;

        assert!(matches!(
            config.validate(),
            Err(ConfigError::LaneTooNarrow { .. })
        ));
    }

    #[test]
    fn unknown_lane_is_rejected() {
        let mut config = Scenario::SingleLane.config();
        config.vehicles.vehicles[1].lane = 4;

        assert_eq!(
            config.validate(),
            Err(ConfigError::UnknownLane {
                vehicle: config.vehicles.vehicles[1].name.clone(),
                lane: 4,
                lane_count: 1,
            })
        );
    }
}
