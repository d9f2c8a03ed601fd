//! Built-in scenarios. Each one is a plain configuration of the shared
//! kernel: lane topology, speed policy, sensor model and overtake capability
//! are the only things that differ.

use super::{
    AccParams, Axis, Direction, LaneConfig, OvertakeParams, RandomConfig, Road, RoadConfig,
    SensorModel, SensorParams, SimulationConfig, SpeedPolicy, VehicleSpec, VehiclesConfig,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    /// Three cars in one eastbound lane.
    SingleLane,
    /// Two opposing vertical lanes with two cars each.
    TwoWay,
    /// One wide lane where the middle car may pass the one ahead.
    Overtaking,
    /// A fused-sensor ACC car following a constant-speed target.
    SensorFusion,
}

impl Scenario {
    pub const ALL: [Scenario; 4] = [
        Scenario::SingleLane,
        Scenario::TwoWay,
        Scenario::Overtaking,
        Scenario::SensorFusion,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Scenario::SingleLane => "single-lane",
            Scenario::TwoWay => "two-way",
            Scenario::Overtaking => "overtaking",
            Scenario::SensorFusion => "sensor-fusion",
        }
    }

    pub fn config(self) -> SimulationConfig {
        match self {
            Scenario::SingleLane => single_lane(),
            Scenario::TwoWay => two_way(),
            Scenario::Overtaking => overtaking(),
            Scenario::SensorFusion => sensor_fusion(),
        }
    }
}

fn lane(name: &str, direction: Direction, center: f32, width: f32) -> LaneConfig {
    LaneConfig {
        name: name.to_string(),
        direction,
        center,
        width,
    }
}

fn vehicle(name: &str, lane: usize, position: f32, max_speed: f32, policy: SpeedPolicy) -> VehicleSpec {
    VehicleSpec {
        name: name.to_string(),
        lane,
        position,
        speed: None,
        max_speed,
        length: 60.0,
        width: 30.0,
        policy,
        sensor: SensorModel::Exact,
        can_overtake: false,
    }
}

fn fleet(vehicles: Vec<VehicleSpec>) -> VehiclesConfig {
    VehiclesConfig {
        vehicles,
        acc: AccParams::default(),
        overtake: OvertakeParams::default(),
        sensors: SensorParams::default(),
        random: RandomConfig::default(),
    }
}

fn single_lane() -> SimulationConfig {
    let road = Road {
        name: "Single lane".to_string(),
        description: "One eastbound lane, cars stop at the safe distance".to_string(),
        axis: Axis::Horizontal,
        lower_bound: -100.0,
        upper_bound: 1380.0,
        lanes: vec![lane("east", Direction::Forward, 360.0, 200.0)],
    };

    let vehicles = fleet(vec![
        vehicle("Red Car", 0, 100.0, 5.0, SpeedPolicy::Constant),
        vehicle("Blue Car", 0, 400.0, 3.0, SpeedPolicy::Constant),
        vehicle("Green Car", 0, 700.0, 4.0, SpeedPolicy::Constant),
    ]);

    SimulationConfig {
        road: RoadConfig { road },
        vehicles,
    }
}

fn two_way() -> SimulationConfig {
    let road = Road {
        name: "Two-way".to_string(),
        description: "Northbound and southbound lanes side by side".to_string(),
        axis: Axis::Vertical,
        lower_bound: -100.0,
        upper_bound: 820.0,
        lanes: vec![
            lane("up", Direction::Reverse, 590.0, 100.0),
            lane("down", Direction::Forward, 690.0, 100.0),
        ],
    };

    let mut specs = vec![
        vehicle("Red Car", 1, 500.0, 5.0, SpeedPolicy::Matching),
        vehicle("Blue Car", 0, 100.0, 3.0, SpeedPolicy::Matching),
        vehicle("Green Car", 0, 300.0, 4.0, SpeedPolicy::Matching),
        vehicle("Orange Car", 1, 700.0, 6.0, SpeedPolicy::Matching),
    ];
    for spec in &mut specs {
        spec.width = 40.0;
    }

    SimulationConfig {
        road: RoadConfig { road },
        vehicles: fleet(specs),
    }
}

fn overtaking() -> SimulationConfig {
    let road = Road {
        name: "Overtaking".to_string(),
        description: "Wide single lane with a passing car".to_string(),
        axis: Axis::Horizontal,
        lower_bound: -100.0,
        upper_bound: 1380.0,
        lanes: vec![lane("east", Direction::Forward, 360.0, 300.0)],
    };

    let mut passer = vehicle("Blue Car", 0, 400.0, 5.0, SpeedPolicy::Cautious);
    passer.can_overtake = true;

    let mut vehicles = fleet(vec![
        vehicle("Red Car", 0, 100.0, 3.0, SpeedPolicy::Constant),
        passer,
        vehicle("Green Car", 0, 700.0, 2.0, SpeedPolicy::Constant),
    ]);
    vehicles.overtake.pass_distance = 600.0;

    SimulationConfig {
        road: RoadConfig { road },
        vehicles,
    }
}

fn sensor_fusion() -> SimulationConfig {
    let road = Road {
        name: "Sensor fusion".to_string(),
        description: "Ego car with lidar/camera fusion behind a steady target".to_string(),
        axis: Axis::Vertical,
        lower_bound: -60.0,
        upper_bound: 660.0,
        lanes: vec![lane("south", Direction::Forward, 400.0, 200.0)],
    };

    let mut target = vehicle("Blue Car", 0, -80.0, 3.0, SpeedPolicy::Constant);
    target.width = 40.0;

    let mut ego = vehicle("Red Car", 0, -260.0, 5.0, SpeedPolicy::Adaptive);
    ego.width = 40.0;
    ego.speed = Some(0.0);
    ego.sensor = SensorModel::Fused;

    let mut vehicles = fleet(vec![ego, target]);
    vehicles.acc.min_safe_distance = 80.0;

    SimulationConfig {
        road: RoadConfig { road },
        vehicles,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Validate;

    #[test]
    fn every_preset_validates() {
        for scenario in Scenario::ALL {
            assert_eq!(scenario.config().validate(), Ok(()), "{}", scenario.name());
        }
    }

    #[test]
    fn only_overtaking_preset_has_a_passer() {
        for scenario in Scenario::ALL {
            let passers = scenario
                .config()
                .vehicles
                .vehicles
                .iter()
                .filter(|spec| spec.can_overtake)
                .count();
            assert_eq!(passers, usize::from(scenario == Scenario::Overtaking));
        }
    }
}
