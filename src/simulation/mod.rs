use nalgebra::{Point2, Vector2};

use crate::config::{
    ConfigError, Direction, SensorModel, SimulationConfig, SpeedPolicy, Validate,
};

pub mod behavior;
pub mod control;
pub mod geometry;
pub mod physics;
pub mod sensor;
pub mod traffic;

pub use behavior::*;
pub use control::*;
pub use geometry::*;
pub use physics::*;
pub use sensor::*;
pub use traffic::*;

pub type Vec2 = Vector2<f32>;
pub type Point = Point2<f32>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CarId(pub usize);

/// Lateral maneuver a vehicle is currently performing.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Maneuver {
    #[default]
    Cruising,
    /// Passing; `travelled` is the longitudinal distance covered since the
    /// pass started.
    Overtaking { travelled: f32 },
    /// Moving back to the lane centerline.
    Returning,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Car {
    pub id: CarId,
    pub name: String,
    pub lane: usize,
    pub direction: Direction,
    /// Minimum-coordinate edge along the road axis.
    pub position: f32,
    /// Cross-axis displacement from the lane centerline.
    pub lateral_offset: f32,
    pub speed: f32,
    pub max_speed: f32,
    pub length: f32,
    pub width: f32,
    pub policy: SpeedPolicy,
    pub sensor: SensorModel,
    pub can_overtake: bool,
    pub maneuver: Maneuver,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimulationState {
    pub cars: Vec<Car>,
    pub tick: u64,
}

impl SimulationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_car(&mut self, car: Car) {
        self.cars.push(car);
    }

    pub fn car_by_name(&self, name: &str) -> Option<&Car> {
        self.cars.iter().find(|c| c.name == name)
    }
}

/// Read-only per-vehicle view handed to renderers once a tick has committed.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleView {
    pub id: CarId,
    pub name: String,
    pub lane: usize,
    pub direction: Direction,
    pub position: f32,
    pub lateral_offset: f32,
    pub speed: f32,
    pub max_speed: f32,
    pub length: f32,
    pub width: f32,
    pub maneuver: Maneuver,
    /// Center of the vehicle in world coordinates.
    pub world_position: Point,
    /// Heading in radians, derived from the lane direction.
    pub heading: f32,
    pub bounds: BoundingBox,
    /// Bounding distance to the vehicle ahead, if any.
    pub front_gap: Option<f32>,
    /// A front vehicle is within the detection distance.
    pub alert: bool,
}

/// Owns the fleet and advances it one tick at a time.
pub struct Simulation {
    config: SimulationConfig,
    state: SimulationState,
    physics: PhysicsEngine,
}

impl Simulation {
    pub fn new(config: SimulationConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let state = TrafficManager::new(&config).populate();
        let physics = PhysicsEngine::new(&config);

        Ok(Self {
            config,
            state,
            physics,
        })
    }

    /// Runs a single tick.
    pub fn step(&mut self) {
        self.physics.update(&mut self.state);
    }

    /// Runs `ticks` consecutive ticks.
    pub fn advance(&mut self, ticks: u32) {
        for _ in 0..ticks {
            self.step();
        }
    }

    pub fn tick(&self) -> u64 {
        self.state.tick
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn snapshot(&self) -> Vec<VehicleView> {
        let road = &self.config.road.road;
        let detection_distance = self.config.vehicles.acc.detection_distance;

        self.state
            .cars
            .iter()
            .enumerate()
            .map(|(index, car)| {
                let lane = &road.lanes[car.lane];
                let bounds = world_bounds(car, lane, road.axis);
                let front_gap = nearest_ahead(&self.state.cars, index).map(|r| r.distance);
                let heading = {
                    let forward = travel_vector(road.axis, car.direction);
                    forward.y.atan2(forward.x)
                };

                VehicleView {
                    id: car.id,
                    name: car.name.clone(),
                    lane: car.lane,
                    direction: car.direction,
                    position: car.position,
                    lateral_offset: car.lateral_offset,
                    speed: car.speed,
                    max_speed: car.max_speed,
                    length: car.length,
                    width: car.width,
                    maneuver: car.maneuver,
                    world_position: bounds.center(),
                    heading,
                    bounds,
                    front_gap,
                    alert: front_gap.map_or(false, |gap| gap < detection_distance),
                }
            })
            .collect()
    }
}
