use log::debug;

use super::{Car, CarId, Maneuver, SimulationState};
use crate::config::{Road, SimulationConfig, VehicleSpec};

/// Places the configured fleet on the road. Vehicles are registered in
/// configuration order, which is also the order they are updated in.
pub struct TrafficManager<'a> {
    road: &'a Road,
    specs: &'a [VehicleSpec],
}

impl<'a> TrafficManager<'a> {
    pub fn new(config: &'a SimulationConfig) -> Self {
        Self {
            road: &config.road.road,
            specs: &config.vehicles.vehicles,
        }
    }

    pub fn populate(&self) -> SimulationState {
        let mut state = SimulationState::new();

        for (id, spec) in self.specs.iter().enumerate() {
            let car = self.spawn_car(CarId(id), spec);
            debug!(
                "Spawned {} in lane '{}' at {:.1} ({:?}, {:.1}/{:.1})",
                car.name,
                self.road.lanes[car.lane].name,
                car.position,
                car.direction,
                car.speed,
                car.max_speed
            );
            state.add_car(car);
        }

        state
    }

    fn spawn_car(&self, id: CarId, spec: &VehicleSpec) -> Car {
        let lane = &self.road.lanes[spec.lane];

        Car {
            id,
            name: spec.name.clone(),
            lane: spec.lane,
            direction: lane.direction,
            position: spec.position,
            lateral_offset: 0.0,
            speed: spec.speed.unwrap_or(spec.max_speed),
            max_speed: spec.max_speed,
            length: spec.length,
            width: spec.width,
            policy: spec.policy,
            sensor: spec.sensor,
            can_overtake: spec.can_overtake,
            maneuver: Maneuver::Cruising,
        }
    }
}
