use log::debug;

use super::sensor::{in_window, FrontReading};
use super::{Car, Maneuver};
use crate::config::OvertakeParams;

/// Outcome of one planning step: the state to carry into the commit plus the
/// extra motion the maneuver asks for this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ManeuverStep {
    pub maneuver: Maneuver,
    /// Extra longitudinal travel on top of the speed command.
    pub nudge: f32,
    /// Requested change in lateral offset (before clamping).
    pub lateral_delta: f32,
}

impl ManeuverStep {
    fn hold(maneuver: Maneuver) -> Self {
        Self {
            maneuver,
            nudge: 0.0,
            lateral_delta: 0.0,
        }
    }
}

/// Cruising → Overtaking → Returning → Cruising.
#[derive(Debug, Clone)]
pub struct OvertakePlanner {
    params: OvertakeParams,
}

impl OvertakePlanner {
    pub fn new(params: OvertakeParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &OvertakeParams {
        &self.params
    }

    /// Plans the maneuver for `cars[index]`. `front` is the exact gap reading.
    ///
    /// A front vehicle within `follow_distance` (safe distance plus the
    /// hysteresis margin) is a reason to pass. This includes a car following
    /// steadily inside the comfort band, not only one closing in below the
    /// safe distance: a passer held in that band starts overtaking as soon as
    /// the window is clear.
    pub fn plan(
        &self,
        cars: &[Car],
        index: usize,
        front: Option<FrontReading>,
        follow_distance: f32,
    ) -> ManeuverStep {
        let car = &cars[index];
        if !car.can_overtake {
            return ManeuverStep::hold(car.maneuver);
        }

        match car.maneuver {
            Maneuver::Cruising => {
                let Some(front) = front else {
                    return ManeuverStep::hold(Maneuver::Cruising);
                };
                if front.distance > follow_distance {
                    return ManeuverStep::hold(Maneuver::Cruising);
                }
                if in_window(cars, index, self.params.window_distance, Some(front.index)) {
                    return ManeuverStep::hold(Maneuver::Cruising);
                }

                debug!(
                    "{} starts overtaking {} at gap {:.1}",
                    car.name, cars[front.index].name, front.distance
                );
                self.overtaking(0.0)
            }
            Maneuver::Overtaking { travelled } if travelled >= self.params.pass_distance => {
                debug!("{} returning after {:.1}", car.name, travelled);
                self.returning(car)
            }
            Maneuver::Overtaking { travelled } => self.overtaking(travelled),
            Maneuver::Returning => self.returning(car),
        }
    }

    /// Final state once the lateral offset has been committed.
    pub fn settle(&self, car: &Car, maneuver: Maneuver, travel: f32, lateral_offset: f32) -> Maneuver {
        match maneuver {
            Maneuver::Overtaking { travelled } => Maneuver::Overtaking {
                travelled: travelled + travel.max(0.0),
            },
            Maneuver::Returning if lateral_offset == 0.0 => {
                debug!("{} back in lane", car.name);
                Maneuver::Cruising
            }
            other => other,
        }
    }

    fn overtaking(&self, travelled: f32) -> ManeuverStep {
        ManeuverStep {
            maneuver: Maneuver::Overtaking { travelled },
            nudge: self.params.overtake_speed,
            lateral_delta: self.params.lateral_step,
        }
    }

    /// Steps toward the centerline without crossing it.
    fn returning(&self, car: &Car) -> ManeuverStep {
        let step = self.params.lateral_step.abs();
        let offset = car.lateral_offset;
        let lateral_delta = if offset.abs() <= step {
            -offset
        } else {
            -offset.signum() * step
        };

        ManeuverStep {
            maneuver: Maneuver::Returning,
            nudge: 0.0,
            lateral_delta,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Direction;
    use crate::simulation::test_support::car;

    fn planner() -> OvertakePlanner {
        OvertakePlanner::new(OvertakeParams::default())
    }

    fn passer(position: f32) -> Car {
        let mut c = car(0, Direction::Forward, position);
        c.can_overtake = true;
        c
    }

    #[test]
    fn incapable_vehicle_never_leaves_cruising() {
        let cars = vec![car(0, Direction::Forward, 0.0), car(1, Direction::Forward, 100.0)];
        let front = Some(FrontReading { index: 1, distance: 40.0 });

        let step = planner().plan(&cars, 0, front, 100.0);
        assert_eq!(step, ManeuverStep::hold(Maneuver::Cruising));
    }

    #[test]
    fn starts_when_blocked_and_window_clear() {
        let cars = vec![passer(0.0), car(1, Direction::Forward, 100.0)];
        let front = Some(FrontReading { index: 1, distance: 40.0 });

        let step = planner().plan(&cars, 0, front, 100.0);
        assert_eq!(step.maneuver, Maneuver::Overtaking { travelled: 0.0 });
        assert_eq!(step.nudge, 5.0);
        assert_eq!(step.lateral_delta, -1.0);
    }

    #[test]
    fn starts_from_inside_comfort_band() {
        // 110 is past the safe distance of 100 but within the 120 follow distance
        let cars = vec![passer(0.0), car(1, Direction::Forward, 170.0)];
        let front = Some(FrontReading { index: 1, distance: 110.0 });

        let step = planner().plan(&cars, 0, front, 120.0);
        assert_eq!(step.maneuver, Maneuver::Overtaking { travelled: 0.0 });

        let step = planner().plan(&cars, 0, front, 100.0);
        assert_eq!(step.maneuver, Maneuver::Cruising);
    }

    #[test]
    fn needs_a_reason_to_pass() {
        let cars = vec![passer(0.0), car(1, Direction::Forward, 300.0)];
        let front = Some(FrontReading { index: 1, distance: 240.0 });

        assert_eq!(planner().plan(&cars, 0, front, 100.0).maneuver, Maneuver::Cruising);
        assert_eq!(planner().plan(&cars, 0, None, 100.0).maneuver, Maneuver::Cruising);
    }

    #[test]
    fn blocked_window_prevents_start() {
        let mut oncoming = car(2, Direction::Reverse, 150.0);
        oncoming.lane = 1;
        let cars = vec![passer(0.0), car(1, Direction::Forward, 100.0), oncoming];
        let front = Some(FrontReading { index: 1, distance: 40.0 });

        assert_eq!(planner().plan(&cars, 0, front, 100.0).maneuver, Maneuver::Cruising);
    }

    #[test]
    fn switches_to_returning_after_pass_distance() {
        let mut c = passer(0.0);
        c.maneuver = Maneuver::Overtaking { travelled: 200.0 };
        c.lateral_offset = -40.0;

        let step = planner().plan(&[c], 0, None, 100.0);
        assert_eq!(step.maneuver, Maneuver::Returning);
        assert_eq!(step.nudge, 0.0);
        assert_eq!(step.lateral_delta, 1.0);
    }

    #[test]
    fn return_step_does_not_cross_centerline() {
        let mut c = passer(0.0);
        c.maneuver = Maneuver::Returning;
        c.lateral_offset = -0.25;

        let step = planner().plan(&[c.clone()], 0, None, 100.0);
        assert_eq!(step.lateral_delta, 0.25);
        assert_eq!(planner().settle(&c, step.maneuver, 0.0, 0.0), Maneuver::Cruising);
        assert_eq!(planner().settle(&c, step.maneuver, 0.0, -0.25), Maneuver::Returning);
    }

    #[test]
    fn settle_accumulates_forward_travel() {
        let c = passer(0.0);
        let p = planner();
        let m = p.settle(&c, Maneuver::Overtaking { travelled: 10.0 }, 8.0, -1.0);
        assert_eq!(m, Maneuver::Overtaking { travelled: 18.0 });

        let m = p.settle(&c, m, -2.0, -2.0);
        assert_eq!(m, Maneuver::Overtaking { travelled: 18.0 });
    }
}
