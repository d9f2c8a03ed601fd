use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Uniform};

use super::geometry::{
    bounding_distance, is_ahead, lateral_span, lateral_span_at, offset_ahead, spans_overlap,
};
use super::Car;
use crate::config::SensorParams;

/// Nearest vehicle ahead and the bounding distance to it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrontReading {
    /// Index of the front vehicle in the fleet.
    pub index: usize,
    pub distance: f32,
}

/// Vehicles that can block each other: same lane and overlapping laterally.
pub fn same_lane_group(car: &Car, other: &Car) -> bool {
    car.lane == other.lane && spans_overlap(lateral_span(car), lateral_span(other))
}

/// Nearest vehicle strictly ahead of `cars[index]` within its lane group.
pub fn nearest_ahead(cars: &[Car], index: usize) -> Option<FrontReading> {
    nearest_ahead_by(cars, index, same_lane_group)
}

/// Nearest vehicle strictly ahead of `cars[index]` among those accepted by
/// `same_group`. Overlapping candidates (negative distance) are skipped and
/// ties go to the earliest registered vehicle.
pub fn nearest_ahead_by<F>(cars: &[Car], index: usize, mut same_group: F) -> Option<FrontReading>
where
    F: FnMut(&Car, &Car) -> bool,
{
    let car = &cars[index];
    let mut closest: Option<FrontReading> = None;

    for (other_index, other) in cars.iter().enumerate() {
        if other_index == index || !same_group(car, other) || !is_ahead(car, other) {
            continue;
        }

        let distance = bounding_distance(car, other);
        if distance < 0.0 {
            continue;
        }

        if closest.map_or(true, |c| distance < c.distance) {
            closest = Some(FrontReading {
                index: other_index,
                distance,
            });
        }
    }

    closest
}

/// Whether any vehicle other than `cars[index]` and `exclude` sits strictly
/// ahead within `window`, regardless of lane.
pub fn in_window(cars: &[Car], index: usize, window: f32, exclude: Option<usize>) -> bool {
    let car = &cars[index];

    cars.iter().enumerate().any(|(other_index, other)| {
        if other_index == index || Some(other_index) == exclude {
            return false;
        }
        let ahead = offset_ahead(car, other);
        ahead > 0.0 && ahead < window
    })
}

/// Rearmost vehicle in `landed`'s lane group, ignoring `cars[index]`. This is
/// the first vehicle met after re-entering the road at the near boundary.
pub fn rearmost_in_group(cars: &[Car], index: usize, landed: &Car) -> Option<usize> {
    let sign = landed.direction.sign();
    let mut rearmost: Option<(usize, f32)> = None;

    for (other_index, other) in cars.iter().enumerate() {
        if other_index == index || !same_lane_group(landed, other) {
            continue;
        }
        let rank = sign * other.position;
        if rearmost.map_or(true, |(_, best)| rank < best) {
            rearmost = Some((other_index, rank));
        }
    }

    rearmost.map(|(other_index, _)| other_index)
}

/// Whether `cars[index]`, placed at `position` with `lateral_offset`, would
/// stay clear of every other vehicle in its lane, keeping at least
/// `clearance` between bumpers of any vehicle it overlaps laterally.
pub fn lateral_clear(
    cars: &[Car],
    index: usize,
    position: f32,
    lateral_offset: f32,
    clearance: f32,
) -> bool {
    let car = &cars[index];
    let along = (position - clearance, position + car.length + clearance);
    let across = lateral_span_at(car, lateral_offset);

    cars.iter().enumerate().all(|(other_index, other)| {
        other_index == index
            || other.lane != car.lane
            || !spans_overlap(along, (other.position, other.position + other.length))
            || !spans_overlap(across, lateral_span(other))
    })
}

/// Both raw readings and their fused value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FusedReading {
    pub precise: f32,
    pub coarse: f32,
    pub fused: f32,
}

/// Two independently noised distance sensors averaged into one reading.
pub struct SensorFusion<R = StdRng> {
    precise: Uniform<f32>,
    coarse: Uniform<f32>,
    rng: R,
}

impl SensorFusion<StdRng> {
    /// Seeded when `seed` is set, otherwise drawn from OS entropy.
    pub fn new(params: &SensorParams, seed: Option<u64>) -> Self {
        let rng = if let Some(seed) = seed {
            StdRng::seed_from_u64(seed)
        } else {
            StdRng::from_entropy()
        };

        Self::with_rng(params, rng)
    }
}

impl<R: Rng> SensorFusion<R> {
    pub fn with_rng(params: &SensorParams, rng: R) -> Self {
        let precise = params.precise_noise.abs();
        let coarse = params.coarse_noise.abs();

        Self {
            precise: Uniform::new_inclusive(-precise, precise),
            coarse: Uniform::new_inclusive(-coarse, coarse),
            rng,
        }
    }

    pub fn measure(&mut self, distance: f32) -> FusedReading {
        let precise = (distance + self.precise.sample(&mut self.rng)).max(0.0);
        let coarse = (distance + self.coarse.sample(&mut self.rng)).max(0.0);

        FusedReading {
            precise,
            coarse,
            fused: (precise + coarse) / 2.0,
        }
    }

    /// Fused reading of `distance`. An unbounded distance stays unbounded.
    pub fn fuse(&mut self, distance: f32) -> f32 {
        if !distance.is_finite() {
            return distance;
        }
        self.measure(distance).fused
    }
}
