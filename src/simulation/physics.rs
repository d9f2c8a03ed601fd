use log::{debug, trace};
use rand::rngs::StdRng;
use rand::Rng;

use super::behavior::OvertakePlanner;
use super::control::{AccController, GapInput};
use super::geometry::{bounding_distance, lateral_limit, trailing_edge, wrap_position};
use super::sensor::{lateral_clear, nearest_ahead, rearmost_in_group, SensorFusion};
use super::{Maneuver, SimulationState};
use crate::config::{Direction, Road, SensorModel, SimulationConfig};

/// Advances every vehicle by one tick.
///
/// Vehicles are processed one after another in registration order, and each
/// one senses the fleet as it is at that moment: a car processed later in the
/// tick sees the already-moved positions of the cars before it.
pub struct PhysicsEngine<R = StdRng> {
    controller: AccController,
    planner: OvertakePlanner,
    fusion: SensorFusion<R>,
    road: Road,
}

/// Everything decided for one car before it is written back.
#[derive(Debug, Clone, Copy)]
struct CarUpdate {
    position: f32,
    lateral_offset: f32,
    speed: f32,
    maneuver: Maneuver,
}

impl PhysicsEngine<StdRng> {
    pub fn new(config: &SimulationConfig) -> Self {
        let fusion = SensorFusion::new(&config.vehicles.sensors, config.vehicles.random.seed);
        Self::with_fusion(config, fusion)
    }
}

impl<R: Rng> PhysicsEngine<R> {
    /// Uses a caller-provided sensor pair, e.g. one driven by a test RNG.
    pub fn with_fusion(config: &SimulationConfig, fusion: SensorFusion<R>) -> Self {
        Self {
            controller: AccController::new(config.vehicles.acc),
            planner: OvertakePlanner::new(config.vehicles.overtake),
            fusion,
            road: config.road.road.clone(),
        }
    }

    pub fn update(&mut self, state: &mut SimulationState) {
        for index in 0..state.cars.len() {
            let update = self.calculate_car_update(state, index);

            let car = &mut state.cars[index];
            car.position = update.position;
            car.lateral_offset = update.lateral_offset;
            car.speed = update.speed;
            car.maneuver = update.maneuver;
        }

        state.tick += 1;
    }

    fn calculate_car_update(&mut self, state: &SimulationState, index: usize) -> CarUpdate {
        let cars = &state.cars;
        let car = &cars[index];
        let sign = car.direction.sign();
        let min_safe_distance = self.controller.params().min_safe_distance;

        // Sense
        let front = nearest_ahead(cars, index);
        let gap = front.map(|reading| GapInput {
            distance: match car.sensor {
                SensorModel::Exact => reading.distance,
                SensorModel::Fused => self.fusion.fuse(reading.distance),
            },
            front_speed: cars[reading.index].speed,
        });

        // Decide
        let mut speed = self.controller.command(car, gap);
        let follow_distance = self.controller.follow_distance(car.speed);
        let step = self.planner.plan(cars, index, front, follow_distance);
        let mut travel = speed + step.nudge;
        let mut position = car.position + sign * travel;

        // Never close in below the minimum safe distance, whatever the
        // controller asked for
        if let Some(reading) = front {
            if reading.distance - travel < min_safe_distance {
                let ahead = &cars[reading.index];
                let leading = trailing_edge(ahead) - sign * min_safe_distance;
                position = match car.direction {
                    Direction::Forward => leading - car.length,
                    Direction::Reverse => leading,
                };
                travel = sign * (position - car.position);
                speed = 0.0;

                debug!(
                    "tick {}: {} held {:.1} behind {}",
                    state.tick, car.name, min_safe_distance, ahead.name
                );
            }
        }

        // Lateral motion stays inside the lane margins and never sideswipes.
        // Cutting back in also needs a full safe gap on both sides.
        let lane = &self.road.lanes[car.lane];
        let limit = lateral_limit(lane.width, car.width, self.planner.params().edge_margin);
        let clearance = match step.maneuver {
            Maneuver::Returning => min_safe_distance,
            _ => 0.0,
        };
        let mut lateral_offset = (car.lateral_offset + step.lateral_delta).clamp(-limit, limit);
        if lateral_offset != car.lateral_offset
            && !lateral_clear(cars, index, position, lateral_offset, clearance)
        {
            lateral_offset = car.lateral_offset.clamp(-limit, limit);
        }

        let maneuver = self.planner.settle(car, step.maneuver, travel, lateral_offset);

        let unwrapped = position;
        let mut position = wrap_position(
            unwrapped,
            car.direction,
            self.road.lower_bound,
            self.road.upper_bound,
        );

        // Re-entering at the near boundary: queue behind whoever is already there
        if position != unwrapped {
            let mut landed = car.clone();
            landed.position = position;
            landed.lateral_offset = lateral_offset;

            if let Some(tail) = rearmost_in_group(cars, index, &landed) {
                let ahead = &cars[tail];
                if bounding_distance(&landed, ahead) < min_safe_distance {
                    let leading = trailing_edge(ahead) - sign * min_safe_distance;
                    position = match car.direction {
                        Direction::Forward => leading - car.length,
                        Direction::Reverse => leading,
                    };
                    speed = 0.0;

                    debug!(
                        "tick {}: {} queued behind {} on re-entry",
                        state.tick, car.name, ahead.name
                    );
                }
            }
        }

        let speed = speed.clamp(0.0, car.max_speed);

        assert!(
            position.is_finite() && lateral_offset.is_finite() && speed.is_finite(),
            "non-finite state for {}: position {}, lateral {}, speed {}",
            car.name,
            position,
            lateral_offset,
            speed
        );

        trace!(
            "tick {}: {} gap {:?} speed {:.2} -> {:.2} at {:.1}",
            state.tick,
            car.name,
            front.map(|r| r.distance),
            car.speed,
            speed,
            position
        );

        CarUpdate {
            position,
            lateral_offset,
            speed,
            maneuver,
        }
    }
}
