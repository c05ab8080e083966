//! Integration of shaped step-acceleration profiles into motion primitives.
//!
//! Acceleration is constant between consecutive points, so velocity is
//! linear and the trapezoidal rule gives exact positions. The last primitive
//! is pinned to the commanded distance to absorb rounding drift.

use crate::{
    error::{Result, ShapingError, require_positive},
    profile::{AccelPoint, check_closed},
};
use serde::Serialize;

/// One leg of streamed motion.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct MotionSegment {
    /// Position at the end of the segment, relative to the move start.
    pub position: f64,
    /// Highest speed magnitude reached during the segment.
    pub speed_limit: f64,
    /// Acceleration magnitude held during the segment.
    pub acceleration: f64,
    pub duration: f64,
}

/// A position-velocity-time sample.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SampledPoint {
    pub position: f64,
    pub velocity: f64,
    /// Time elapsed since the previous sample.
    pub time: f64,
}

/// State at the end of one constant-acceleration interval.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Interval {
    pub dt: f64,
    pub acceleration: f64,
    pub start_velocity: f64,
    pub end_velocity: f64,
    pub end_position: f64,
}

/// Walks consecutive point pairs, starting from rest at the origin.
pub(crate) fn intervals(points: &[AccelPoint]) -> impl Iterator<Item = Interval> + '_ {
    let mut position = 0.0;
    let mut velocity = 0.0;
    points.windows(2).map(move |pair| {
        let (current, next) = (pair[0], pair[1]);
        let dt = next.time - current.time;
        let start_velocity = velocity;
        velocity += current.acceleration * dt;
        position += (velocity + start_velocity) / 2.0 * dt;
        Interval {
            dt,
            acceleration: current.acceleration,
            start_velocity,
            end_velocity: velocity,
            end_position: position,
        }
    })
}

/// Converts a shaped profile into stream segments ending exactly at
/// `distance`.
///
/// Intervals of zero length carry no motion and are skipped; every other
/// interval becomes a segment, however short.
pub fn integrate_segments(points: &[AccelPoint], distance: f64) -> Result<Vec<MotionSegment>> {
    check_closed(points)?;

    let mut segments: Vec<MotionSegment> = intervals(points)
        .filter(|interval| interval.dt > 0.0)
        .map(|interval| MotionSegment {
            position: interval.end_position,
            speed_limit: interval.end_velocity.abs().max(interval.start_velocity.abs()),
            acceleration: interval.acceleration.abs(),
            duration: interval.dt,
        })
        .collect();

    let Some(last) = segments.last_mut() else {
        return Err(ShapingError::infeasible("profile spans no time"));
    };
    last.position = distance;

    tracing::trace!(segments = segments.len(), "integrated stream segments");
    Ok(segments)
}

/// Converts a shaped profile into pvt samples at least `min_timestep` apart.
///
/// Intervals are accumulated until the elapsed time reaches `min_timestep`.
/// A shorter remainder at the end is folded into the last sample, which is
/// pinned to `distance` at rest.
pub fn integrate_samples(
    points: &[AccelPoint],
    distance: f64,
    min_timestep: f64,
) -> Result<Vec<SampledPoint>> {
    let min_timestep = require_positive("min_timestep", min_timestep)?;
    check_closed(points)?;

    let mut samples: Vec<SampledPoint> = Vec::new();
    let mut timestep = 0.0;
    for interval in intervals(points) {
        timestep += interval.dt;
        if timestep >= min_timestep {
            samples.push(SampledPoint {
                position: interval.end_position,
                velocity: interval.end_velocity,
                time: timestep,
            });
            timestep = 0.0;
        }
    }

    match samples.last_mut() {
        Some(last) => last.time += timestep,
        None if timestep > 0.0 => samples.push(SampledPoint {
            position: distance,
            velocity: 0.0,
            time: timestep,
        }),
        None => return Err(ShapingError::infeasible("profile spans no time")),
    }
    if let Some(last) = samples.last_mut() {
        last.position = distance;
        last.velocity = 0.0;
    }

    tracing::trace!(samples = samples.len(), "integrated pvt samples");
    Ok(samples)
}

/// Peak speed and total duration of a primitive sequence.
pub trait MotionSummary {
    fn max_speed(&self) -> f64;
    fn total_time(&self) -> f64;
}

impl MotionSummary for [MotionSegment] {
    fn max_speed(&self) -> f64 {
        self.iter().map(|s| s.speed_limit).fold(0.0, f64::max)
    }

    fn total_time(&self) -> f64 {
        self.iter().map(|s| s.duration).sum()
    }
}

impl MotionSummary for [SampledPoint] {
    fn max_speed(&self) -> f64 {
        self.iter().map(|p| p.velocity.abs()).fold(0.0, f64::max)
    }

    fn total_time(&self) -> f64 {
        self.iter().map(|p| p.time).sum()
    }
}
