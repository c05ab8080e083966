//! Straight-line moves in the XY plane with independently shaped axes.
//!
//! One tangential trapezoid is planned for the whole move and projected onto
//! each axis by direction cosine. Each axis is shaped for its own plant, on a
//! shared set of impulse times so the two shaped profiles line up event for
//! event and can be recombined into tangential segments.

use crate::{
    convolution::convolve,
    error::{Result, ShapingError},
    integrate::{MotionSummary, intervals},
    plant::PlantModel,
    profile::{TrapezoidalProfile, check_closed},
    shaper::{Impulse, ImpulseSet, ImpulseShaper, ShaperFamily},
};
use serde::Serialize;

/// One leg of a planar stream.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct MotionSegment2D {
    pub x_position: f64,
    pub y_position: f64,
    /// Highest tangential speed reached during the segment.
    pub speed_limit: f64,
    /// Tangential acceleration magnitude.
    pub acceleration: f64,
    pub duration: f64,
}

impl MotionSummary for [MotionSegment2D] {
    fn max_speed(&self) -> f64 {
        self.iter().map(|s| s.speed_limit).fold(0.0, f64::max)
    }

    fn total_time(&self) -> f64 {
        self.iter().map(|s| s.duration).sum()
    }
}

/// Impulse sets for both axes on the union of their impulse times.
///
/// A time missing from one axis is added to it with zero amplitude, so the
/// amplitude sums are unchanged.
pub fn merge_time_bases(x: &ImpulseSet, y: &ImpulseSet) -> (ImpulseSet, ImpulseSet) {
    let mut times: Vec<f64> = x.times().chain(y.times()).collect();
    times.sort_by(f64::total_cmp);
    times.dedup();

    let align = |set: &ImpulseSet| {
        let mut impulses = set.as_slice().to_vec();
        for &time in &times {
            if !impulses.iter().any(|i| i.time == time) {
                impulses.push(Impulse {
                    time,
                    amplitude: 0.0,
                });
            }
        }
        impulses.sort_by(|a, b| a.time.total_cmp(&b.time));
        ImpulseSet::from_sorted(impulses)
    };

    (align(x), align(y))
}

/// Produces zero-vibration planar stream segments.
#[derive(Clone, Debug)]
pub struct PlanarStreamGenerator {
    x: ImpulseShaper,
    y: ImpulseShaper,
}

impl PlanarStreamGenerator {
    pub fn new(
        x_plant: PlantModel,
        x_family: ShaperFamily,
        y_plant: PlantModel,
        y_family: ShaperFamily,
    ) -> Self {
        Self {
            x: ImpulseShaper::new(x_plant, x_family),
            y: ImpulseShaper::new(y_plant, y_family),
        }
    }

    pub fn x_shaper(&self) -> &ImpulseShaper {
        &self.x
    }

    pub fn y_shaper(&self) -> &ImpulseShaper {
        &self.y
    }

    pub fn set_x(&mut self, plant: PlantModel, family: ShaperFamily) {
        self.x.set_plant(plant);
        self.x.set_family(family);
    }

    pub fn set_y(&mut self, plant: PlantModel, family: ShaperFamily) {
        self.y.set_plant(plant);
        self.y.set_family(family);
    }

    /// Both axes' impulses on their merged time base.
    pub fn impulses(&self) -> (ImpulseSet, ImpulseSet) {
        merge_time_bases(self.x.impulses(), self.y.impulses())
    }

    /// Segments for a straight move by (`x_distance`, `y_distance`).
    ///
    /// `acceleration`, `deceleration` and `max_speed_limit` bound the
    /// tangential motion. The last segment ends exactly on the target.
    pub fn shape_trapezoidal_motion(
        &self,
        x_distance: f64,
        y_distance: f64,
        acceleration: f64,
        deceleration: f64,
        max_speed_limit: f64,
    ) -> Result<Vec<MotionSegment2D>> {
        let total_distance = x_distance.hypot(y_distance);
        if !total_distance.is_finite() || total_distance == 0.0 {
            return Err(ShapingError::DegenerateMove {
                x_distance,
                y_distance,
            });
        }
        let cos = x_distance / total_distance;
        let sin = y_distance / total_distance;

        let profile =
            TrapezoidalProfile::new(total_distance, acceleration, deceleration, max_speed_limit)?;
        let (x_impulses, y_impulses) = self.impulses();
        let x_points = convolve(&x_impulses, &profile.project(cos));
        let y_points = convolve(&y_impulses, &profile.project(sin));
        check_closed(&x_points)?;
        check_closed(&y_points)?;
        debug_assert_eq!(x_points.len(), y_points.len());

        let mut segments = Vec::with_capacity(x_points.len());
        let mut previous_speed = 0.0;
        for (x, y) in intervals(&x_points).zip(intervals(&y_points)) {
            if x.dt <= 0.0 {
                continue;
            }
            let speed = x.end_velocity.hypot(y.end_velocity);
            segments.push(MotionSegment2D {
                x_position: x.end_position,
                y_position: y.end_position,
                speed_limit: speed.max(previous_speed),
                acceleration: x.acceleration.hypot(y.acceleration),
                duration: x.dt,
            });
            previous_speed = speed;
        }

        let Some(last) = segments.last_mut() else {
            return Err(ShapingError::infeasible("profile spans no time"));
        };
        last.x_position = x_distance;
        last.y_position = y_distance;

        tracing::debug!(
            segments = segments.len(),
            duration = segments.total_time(),
            "shaped planar move"
        );
        Ok(segments)
    }
}
