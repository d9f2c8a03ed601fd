use super::Car;
use crate::config::{AccParams, SpeedPolicy};

/// What a speed policy gets to see about the vehicle ahead.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GapInput {
    /// Measured (possibly fused) bounding distance.
    pub distance: f32,
    pub front_speed: f32,
}

/// Stateless proportional safe-distance controller.
#[derive(Debug, Clone)]
pub struct AccController {
    params: AccParams,
}

impl AccController {
    pub fn new(params: AccParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &AccParams {
        &self.params
    }

    /// Gap to keep at `speed`; grows linearly from `min_safe_distance`.
    pub fn safe_distance(&self, speed: f32) -> f32 {
        self.params.min_safe_distance + speed / self.params.speed_to_distance_ratio
    }

    /// Upper edge of the comfort band at `speed`. Closer than this, the
    /// vehicle ahead is holding the car back.
    pub fn follow_distance(&self, speed: f32) -> f32 {
        self.safe_distance(speed) + self.params.hysteresis_margin
    }

    /// Decelerate in proportion to the shortfall below the safe distance,
    /// accelerate by a fixed step once clear of the comfort band, hold inside it.
    pub fn control_speed(&self, speed: f32, distance: f32, max_speed: f32) -> f32 {
        let safe_distance = self.safe_distance(speed);

        let command = if distance < safe_distance {
            let shortfall = (safe_distance - distance) / safe_distance;
            (speed - self.params.gain * shortfall).max(0.0)
        } else if distance > safe_distance + self.params.hysteresis_margin {
            let cap = self.params.desired_speed.min(max_speed);
            (speed + self.params.acceleration_step).min(cap)
        } else {
            speed
        };

        command.clamp(0.0, max_speed)
    }

    /// Speed command for `car` given what it senses ahead.
    ///
    /// With nothing ahead every policy jumps straight back to the base speed,
    /// there is no ramp.
    pub fn command(&self, car: &Car, gap: Option<GapInput>) -> f32 {
        let Some(gap) = gap else {
            return car.max_speed;
        };

        let command = match car.policy {
            SpeedPolicy::Adaptive => self.control_speed(car.speed, gap.distance, car.max_speed),
            SpeedPolicy::Constant => car.max_speed,
            SpeedPolicy::Cautious => {
                if gap.distance < self.params.detection_distance {
                    car.max_speed * self.params.caution_factor
                } else {
                    car.max_speed
                }
            }
            SpeedPolicy::Matching => {
                if gap.distance < self.params.min_safe_distance {
                    car.speed.min(gap.front_speed)
                } else {
                    car.max_speed
                }
            }
        };

        command.clamp(0.0, car.max_speed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Direction;
    use crate::simulation::test_support::car;

    fn controller() -> AccController {
        AccController::new(AccParams::default())
    }

    #[test]
    fn safe_distance_grows_with_speed() {
        let acc = controller();
        assert_eq!(acc.safe_distance(0.0), 100.0);
        assert_eq!(acc.safe_distance(5.0), 100.5);
        assert_eq!(acc.follow_distance(0.0), 120.0);
    }

    #[test]
    fn decelerates_proportionally_to_shortfall() {
        let acc = controller();
        // safe distance at 5 is 100.5; half of it short gives half the gain
        let speed = acc.control_speed(5.0, 50.25, 5.0);
        assert!((speed - (5.0 - 10.0f32).max(0.0)).abs() < 1e-6);

        let speed = acc.control_speed(5.0, 95.475, 5.0);
        assert!((speed - 4.0).abs() < 1e-4, "{speed}");
    }

    #[test]
    fn never_goes_negative() {
        assert_eq!(controller().control_speed(1.0, 0.0, 5.0), 0.0);
    }

    #[test]
    fn accelerates_by_step_up_to_the_lower_cap() {
        let acc = controller();
        assert_eq!(acc.control_speed(1.0, 500.0, 5.0), 3.0);
        assert_eq!(acc.control_speed(4.0, 500.0, 5.0), 5.0);

        let mut params = AccParams::default();
        params.desired_speed = 2.5;
        let acc = AccController::new(params);
        assert_eq!(acc.control_speed(2.0, 500.0, 5.0), 2.5);
    }

    #[test]
    fn holds_inside_comfort_band() {
        let acc = controller();
        let mut speed = 3.0;
        // band at 3 is [100.3, 120.3]
        for _ in 0..50 {
            let next = acc.control_speed(speed, 110.0, 5.0);
            assert_eq!(next, speed);
            speed = next;
        }
    }

    #[test]
    fn band_edges_hold() {
        let acc = controller();
        assert_eq!(acc.control_speed(0.0, 100.0, 5.0), 0.0);
        assert_eq!(acc.control_speed(0.0, 120.0, 5.0), 0.0);
        assert_eq!(acc.control_speed(0.0, 120.5, 5.0), 2.0);
    }

    #[test]
    fn free_road_resets_to_base_speed() {
        let acc = controller();
        let mut c = car(0, Direction::Forward, 0.0);
        c.speed = 0.5;
        assert_eq!(acc.command(&c, None), 5.0);
    }

    #[test]
    fn policies_differ_with_a_front_vehicle() {
        let acc = controller();
        let mut c = car(0, Direction::Forward, 0.0);
        c.speed = 4.0;
        let close = GapInput {
            distance: 90.0,
            front_speed: 3.0,
        };

        c.policy = SpeedPolicy::Constant;
        assert_eq!(acc.command(&c, Some(close)), 5.0);

        c.policy = SpeedPolicy::Cautious;
        assert_eq!(acc.command(&c, Some(close)), 2.5);

        c.policy = SpeedPolicy::Matching;
        assert_eq!(acc.command(&c, Some(close)), 3.0);

        c.policy = SpeedPolicy::Adaptive;
        assert!(acc.command(&c, Some(close)) < 4.0);
    }
}
