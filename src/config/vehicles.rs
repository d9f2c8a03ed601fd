use serde::Deserialize;
use super::{ensure_non_negative, ensure_positive, ConfigError, Validate};

#[derive(Debug, Clone, Deserialize)]
pub struct VehiclesConfig {
    pub vehicles: Vec<VehicleSpec>,
    #[serde(default)]
    pub acc: AccParams,
    #[serde(default)]
    pub overtake: OvertakeParams,
    #[serde(default)]
    pub sensors: SensorParams,
    #[serde(default)]
    pub random: RandomConfig,
}

/// Initial placement and fixed characteristics of one vehicle.
#[derive(Debug, Clone, Deserialize)]
pub struct VehicleSpec {
    pub name: String,
    /// Index into the road's lanes.
    pub lane: usize,
    /// Minimum-coordinate edge of the vehicle along the road axis.
    pub position: f32,
    /// Starting speed; defaults to `max_speed`.
    #[serde(default)]
    pub speed: Option<f32>,
    /// Base speed, also the hard upper bound on speed.
    pub max_speed: f32,
    #[serde(default = "default_length")]
    pub length: f32,
    #[serde(default = "default_width")]
    pub width: f32,
    #[serde(default)]
    pub policy: SpeedPolicy,
    #[serde(default)]
    pub sensor: SensorModel,
    #[serde(default)]
    pub can_overtake: bool,
}

fn default_length() -> f32 {
    60.0
}

fn default_width() -> f32 {
    30.0
}

/// How a vehicle turns a front-gap reading into a speed command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeedPolicy {
    /// Proportional safe-distance law with a hysteresis band.
    #[default]
    Adaptive,
    /// Always command the base speed; the safe-distance backstop stops the car.
    Constant,
    /// Base speed, scaled down while the front vehicle is inside the
    /// detection distance.
    Cautious,
    /// Match the front vehicle's speed while closer than the minimum safe
    /// distance, otherwise base speed.
    Matching,
}

/// Where the distance fed to the speed policy comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorModel {
    /// Exact bounding distance from the gap sensor.
    #[default]
    Exact,
    /// Mean of a precise and a coarse noisy reading of the bounding distance.
    Fused,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct AccParams {
    /// Safe gap at zero speed.
    pub min_safe_distance: f32,
    /// Speed units per unit of extra safe distance.
    pub speed_to_distance_ratio: f32,
    /// Proportional deceleration gain `k`.
    pub gain: f32,
    /// Width of the comfort band above the safe distance.
    pub hysteresis_margin: f32,
    /// Speed gained per tick when the road ahead is clear.
    pub acceleration_step: f32,
    pub desired_speed: f32,
    /// Gap under which a front vehicle counts as detected.
    pub detection_distance: f32,
    /// Fraction of base speed used by the cautious policy inside the
    /// detection distance.
    pub caution_factor: f32,
}

impl Default for AccParams {
    fn default() -> Self {
        Self {
            min_safe_distance: 100.0,
            speed_to_distance_ratio: 10.0,
            gain: 20.0,
            hysteresis_margin: 20.0,
            acceleration_step: 2.0,
            desired_speed: 50.0,
            detection_distance: 150.0,
            caution_factor: 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct OvertakeParams {
    /// Span ahead that must be empty before a pass starts.
    pub window_distance: f32,
    /// Extra longitudinal travel per tick while overtaking.
    pub overtake_speed: f32,
    /// Signed cross-axis displacement per tick; the sign picks the road edge.
    pub lateral_step: f32,
    /// Minimum clearance between a vehicle and its lane edge.
    pub edge_margin: f32,
    /// Travel since the start of a pass after which the vehicle returns.
    pub pass_distance: f32,
}

impl Default for OvertakeParams {
    fn default() -> Self {
        Self {
            window_distance: 200.0,
            overtake_speed: 5.0,
            lateral_step: -1.0,
            edge_margin: 20.0,
            pass_distance: 200.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct SensorParams {
    /// Noise half-width of the precise (lidar-like) sensor.
    pub precise_noise: f32,
    /// Noise half-width of the coarse (camera-like) sensor.
    pub coarse_noise: f32,
}

impl Default for SensorParams {
    fn default() -> Self {
        Self {
            precise_noise: 2.0,
            coarse_noise: 5.0,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RandomConfig {
    pub seed: Option<u64>,
}

impl Validate for VehiclesConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.vehicles.is_empty() {
            return Err(ConfigError::NoVehicles);
        }

        for spec in &self.vehicles {
            if !spec.position.is_finite() {
                return Err(ConfigError::VehicleNonFinite {
                    vehicle: spec.name.clone(),
                    field: "position",
                    value: spec.position,
                });
            }

            for (field, value) in [
                ("max_speed", spec.max_speed),
                ("length", spec.length),
                ("width", spec.width),
            ] {
                if !value.is_finite() {
                    return Err(ConfigError::VehicleNonFinite {
                        vehicle: spec.name.clone(),
                        field,
                        value,
                    });
                }
                if !(value > 0.0) {
                    return Err(ConfigError::VehicleNonPositive {
                        vehicle: spec.name.clone(),
                        field,
                        value,
                    });
                }
            }

            if let Some(speed) = spec.speed {
                if !(0.0..=spec.max_speed).contains(&speed) {
                    return Err(ConfigError::InitialSpeed {
                        vehicle: spec.name.clone(),
                        speed,
                        max_speed: spec.max_speed,
                    });
                }
            }
        }

        // ACC tunables
        let acc = &self.acc;
        ensure_positive("min_safe_distance", acc.min_safe_distance)?;
        ensure_positive("speed_to_distance_ratio", acc.speed_to_distance_ratio)?;
        ensure_positive("gain", acc.gain)?;
        ensure_non_negative("hysteresis_margin", acc.hysteresis_margin)?;
        ensure_non_negative("acceleration_step", acc.acceleration_step)?;
        ensure_non_negative("desired_speed", acc.desired_speed)?;
        ensure_non_negative("detection_distance", acc.detection_distance)?;
        if !(0.0..=1.0).contains(&acc.caution_factor) {
            return Err(ConfigError::OutOfRange {
                field: "caution_factor",
                value: acc.caution_factor,
                min: 0.0,
                max: 1.0,
            });
        }

        // Overtake tunables only matter once somebody may overtake
        let overtake = &self.overtake;
        ensure_non_negative("edge_margin", overtake.edge_margin)?;
        if self.vehicles.iter().any(|spec| spec.can_overtake) {
            ensure_positive("window_distance", overtake.window_distance)?;
            ensure_non_negative("overtake_speed", overtake.overtake_speed)?;
            ensure_positive("pass_distance", overtake.pass_distance)?;
            if overtake.lateral_step == 0.0 || !overtake.lateral_step.is_finite() {
                return Err(ConfigError::ZeroLateralStep);
            }
        }

        // Sensor noise
        ensure_non_negative("precise_noise", self.sensors.precise_noise)?;
        ensure_non_negative("coarse_noise", self.sensors.coarse_noise)?;

        Ok(())
    }
}
