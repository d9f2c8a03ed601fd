use serde::Deserialize;
use super::{ensure_finite, ensure_positive, ConfigError, Validate};

#[derive(Debug, Clone, Deserialize)]
pub struct RoadConfig {
    pub road: Road,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Road {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// World axis the lanes run along. Only used to place vehicles in world
    /// coordinates for snapshots.
    #[serde(default)]
    pub axis: Axis,
    /// Wrap-around boundaries along the travel axis.
    pub lower_bound: f32,
    pub upper_bound: f32,
    pub lanes: Vec<LaneConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    #[default]
    Horizontal,
    Vertical,
}

/// Travel direction of a lane along the road axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Toward increasing coordinates.
    #[default]
    Forward,
    /// Toward decreasing coordinates.
    Reverse,
}

impl Direction {
    pub fn sign(self) -> f32 {
        match self {
            Direction::Forward => 1.0,
            Direction::Reverse => -1.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LaneConfig {
    pub name: String,
    #[serde(default)]
    pub direction: Direction,
    /// Cross-axis coordinate of the lane centerline.
    pub center: f32,
    pub width: f32,
}

impl Road {
    /// Boundary a vehicle in `direction` leaves the road through.
    pub fn far_boundary(&self, direction: Direction) -> f32 {
        match direction {
            Direction::Forward => self.upper_bound,
            Direction::Reverse => self.lower_bound,
        }
    }

    /// Boundary a wrapped vehicle re-enters through.
    pub fn near_boundary(&self, direction: Direction) -> f32 {
        match direction {
            Direction::Forward => self.lower_bound,
            Direction::Reverse => self.upper_bound,
        }
    }

    pub fn length(&self) -> f32 {
        self.upper_bound - self.lower_bound
    }
}

impl Validate for RoadConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        let road = &self.road;

        ensure_finite("lower_bound", road.lower_bound)?;
        ensure_finite("upper_bound", road.upper_bound)?;
        if !(road.lower_bound < road.upper_bound) {
            return Err(ConfigError::InvalidBounds {
                lower: road.lower_bound,
                upper: road.upper_bound,
            });
        }

        if road.lanes.is_empty() {
            return Err(ConfigError::NoLanes);
        }

        for lane in &road.lanes {
            ensure_finite("lane center", lane.center)?;
            ensure_positive("lane width", lane.width)?;
        }

        Ok(())
    }
}
