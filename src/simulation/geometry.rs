//! Bounding model: where each vehicle's front and rear edges are along the
//! travel axis, how far apart two vehicles are, and where they sit in world
//! coordinates.

use super::{Car, Point, Vec2};
use crate::config::{Axis, Direction, LaneConfig};

/// Edge of the vehicle that faces its direction of travel.
pub fn leading_edge(car: &Car) -> f32 {
    match car.direction {
        Direction::Forward => car.position + car.length,
        Direction::Reverse => car.position,
    }
}

/// Edge of the vehicle facing away from its direction of travel.
pub fn trailing_edge(car: &Car) -> f32 {
    match car.direction {
        Direction::Forward => car.position,
        Direction::Reverse => car.position + car.length,
    }
}

/// Gap between `behind`'s leading edge and `ahead`'s trailing edge, measured
/// along `behind`'s travel direction. Zero means the two are just touching,
/// negative means they overlap.
pub fn bounding_distance(behind: &Car, ahead: &Car) -> f32 {
    behind.direction.sign() * (trailing_edge(ahead) - leading_edge(behind))
}

/// `other` is strictly ahead of `car` by position ordering.
pub fn is_ahead(car: &Car, other: &Car) -> bool {
    car.direction.sign() * (other.position - car.position) > 0.0
}

/// Signed longitudinal offset of `other` relative to `car`, positive ahead.
pub fn offset_ahead(car: &Car, other: &Car) -> f32 {
    car.direction.sign() * (other.position - car.position)
}

/// Cross-axis extent of the vehicle relative to its lane centerline.
pub fn lateral_span(car: &Car) -> (f32, f32) {
    lateral_span_at(car, car.lateral_offset)
}

pub fn lateral_span_at(car: &Car, lateral_offset: f32) -> (f32, f32) {
    let half = car.width / 2.0;
    (lateral_offset - half, lateral_offset + half)
}

pub fn longitudinal_span(car: &Car) -> (f32, f32) {
    (car.position, car.position + car.length)
}

/// Open-interval overlap; touching spans do not overlap.
pub fn spans_overlap(a: (f32, f32), b: (f32, f32)) -> bool {
    a.0 < b.1 && b.0 < a.1
}

/// Largest lateral offset that keeps a vehicle `edge_margin` inside its lane.
pub fn lateral_limit(lane_width: f32, car_width: f32, edge_margin: f32) -> f32 {
    (lane_width / 2.0 - car_width / 2.0 - edge_margin).max(0.0)
}

/// Wraps a position that ran past the far boundary back to the near one,
/// keeping the overshoot.
pub fn wrap_position(position: f32, direction: Direction, lower: f32, upper: f32) -> f32 {
    match direction {
        Direction::Forward if position > upper => lower + (position - upper),
        Direction::Reverse if position < lower => upper - (lower - position),
        _ => position,
    }
}

/// Unit vector of travel in world coordinates.
pub fn travel_vector(axis: Axis, direction: Direction) -> Vec2 {
    let sign = direction.sign();
    match axis {
        Axis::Horizontal => Vec2::new(sign, 0.0),
        Axis::Vertical => Vec2::new(0.0, sign),
    }
}

/// Axis-aligned world-space box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Point,
    pub max: Point,
}

impl BoundingBox {
    pub fn center(&self) -> Point {
        nalgebra::center(&self.min, &self.max)
    }

    pub fn extent(&self) -> Vec2 {
        self.max - self.min
    }
}

pub fn world_bounds(car: &Car, lane: &LaneConfig, axis: Axis) -> BoundingBox {
    let (along_min, along_max) = longitudinal_span(car);
    let (across_min, across_max) = lateral_span(car);
    let across_min = lane.center + across_min;
    let across_max = lane.center + across_max;

    match axis {
        Axis::Horizontal => BoundingBox {
            min: Point::new(along_min, across_min),
            max: Point::new(along_max, across_max),
        },
        Axis::Vertical => BoundingBox {
            min: Point::new(across_min, along_min),
            max: Point::new(across_max, along_max),
        },
    }
}
