//! Unshaped trapezoidal velocity profiles.
//!
//! A move is described by the times at which its (piecewise constant)
//! acceleration changes. Accelerate, optionally cruise, decelerate; the last
//! breakpoint always carries zero acceleration so the profile closes at rest.

use crate::error::{Result, ShapingError, require_positive};
use serde::Serialize;

/// Acceleration `acceleration` holds from `time` until the next point.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct AccelPoint {
    pub time: f64,
    pub acceleration: f64,
}

impl AccelPoint {
    pub const fn new(time: f64, acceleration: f64) -> Self {
        Self { time, acceleration }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileKind {
    /// Speed limit never reached; accelerate straight into deceleration.
    Triangle,
    /// Accelerate, cruise at the speed limit, decelerate.
    Trapezoid,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TrapezoidalProfile {
    pub kind: ProfileKind,
    /// Highest speed reached, unsigned.
    pub peak_speed: f64,
    pub breakpoints: Vec<AccelPoint>,
}

impl TrapezoidalProfile {
    /// Builds the step-acceleration profile covering `distance`.
    ///
    /// The sign of `distance` selects the direction; `acceleration`,
    /// `deceleration` and `max_speed_limit` are magnitudes.
    pub fn new(
        distance: f64,
        acceleration: f64,
        deceleration: f64,
        max_speed_limit: f64,
    ) -> Result<Self> {
        let accel = require_positive("acceleration", acceleration)?;
        let decel = require_positive("deceleration", deceleration)?;
        let max_speed = require_positive("max_speed_limit", max_speed_limit)?;
        if !distance.is_finite() {
            return Err(ShapingError::infeasible(format!(
                "distance must be finite, got {distance}"
            )));
        }
        if distance == 0.0 {
            return Err(ShapingError::infeasible("distance is zero"));
        }

        let direction = distance.signum();
        let magnitude = distance.abs();

        // speed reached by a pure accel/decel ramp over the whole distance
        let ramp_speed = (magnitude / (1.0 / (2.0 * accel) + 1.0 / (2.0 * decel))).sqrt();

        let profile = if ramp_speed <= max_speed {
            let accel_end = ramp_speed / accel;
            let decel_end = accel_end + ramp_speed / decel;
            Self {
                kind: ProfileKind::Triangle,
                peak_speed: ramp_speed,
                breakpoints: vec![
                    AccelPoint::new(0.0, accel * direction),
                    AccelPoint::new(accel_end, -decel * direction),
                    AccelPoint::new(decel_end, 0.0),
                ],
            }
        } else {
            let accel_distance = max_speed * max_speed / (2.0 * accel);
            let decel_distance = max_speed * max_speed / (2.0 * decel);
            let cruise_distance = magnitude - accel_distance - decel_distance;

            let accel_end = max_speed / accel;
            let cruise_end = accel_end + cruise_distance / max_speed;
            let decel_end = cruise_end + max_speed / decel;
            Self {
                kind: ProfileKind::Trapezoid,
                peak_speed: max_speed,
                breakpoints: vec![
                    AccelPoint::new(0.0, accel * direction),
                    AccelPoint::new(accel_end, 0.0),
                    AccelPoint::new(cruise_end, -decel * direction),
                    AccelPoint::new(decel_end, 0.0),
                ],
            }
        };

        tracing::debug!(
            kind = ?profile.kind,
            peak_speed = profile.peak_speed,
            duration = profile.duration(),
            "planned trapezoidal profile"
        );

        Ok(profile)
    }

    /// Total move time.
    pub fn duration(&self) -> f64 {
        self.breakpoints.last().map_or(0.0, |p| p.time)
    }

    /// The same time base with every acceleration multiplied by `ratio`.
    ///
    /// Used to project a tangential profile onto one axis.
    pub fn project(&self, ratio: f64) -> Vec<AccelPoint> {
        self.breakpoints
            .iter()
            .map(|p| AccelPoint::new(p.time, p.acceleration * ratio))
            .collect()
    }
}

/// Checks that `points` is a closed step-acceleration profile: sorted by time
/// and ending with zero acceleration.
pub fn check_closed(points: &[AccelPoint]) -> Result<()> {
    let Some(last) = points.last() else {
        return Err(ShapingError::infeasible("profile has no breakpoints"));
    };
    let out_of_order = |w: &[AccelPoint]| {
        w[0].time.is_nan() || w[1].time.is_nan() || w[0].time > w[1].time
    };
    if let Some(pair) = points.windows(2).find(|w| out_of_order(w)) {
        return Err(ShapingError::infeasible(format!(
            "breakpoint times out of order: {} then {}",
            pair[0].time, pair[1].time
        )));
    }
    if last.acceleration != 0.0 {
        return Err(ShapingError::infeasible(format!(
            "final acceleration must be 0, got {}",
            last.acceleration
        )));
    }
    Ok(())
}
