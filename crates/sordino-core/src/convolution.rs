//! Closed-form convolution of a step-acceleration profile with an impulse
//! train.
//!
//! A piecewise constant acceleration is a sum of steps, so convolving it with
//! impulses is the same as copying every step once per impulse (delayed and
//! scaled) and re-accumulating. No time discretization is involved. The input
//! must really be piecewise constant; that is the caller's precondition.

use crate::{profile::AccelPoint, shaper::ImpulseSet};

/// An acceleration change of `delta` at `time`.
#[derive(Clone, Copy, Debug, PartialEq)]
struct AccelStep {
    time: f64,
    delta: f64,
}

/// Shapes `profile` with `impulses`.
///
/// Returns one point per (breakpoint, impulse) pair, sorted by time. Points
/// sharing a time keep impulse order, so the result is reproducible. The
/// final point always carries zero acceleration.
pub fn convolve(impulses: &ImpulseSet, profile: &[AccelPoint]) -> Vec<AccelPoint> {
    let mut steps = Vec::with_capacity(profile.len() * impulses.len());

    for impulse in impulses.iter() {
        let mut previous = 0.0;
        for point in profile {
            steps.push(AccelStep {
                time: point.time + impulse.time,
                delta: (point.acceleration - previous) * impulse.amplitude,
            });
            previous = point.acceleration;
        }
    }

    // `sort_by` is stable: ties stay in impulse-major order
    steps.sort_by(|a, b| a.time.total_cmp(&b.time));

    let mut acceleration = 0.0;
    let mut shaped: Vec<AccelPoint> = steps
        .into_iter()
        .map(|step| {
            acceleration += step.delta;
            AccelPoint::new(step.time, acceleration)
        })
        .collect();

    // the steps of a closed profile cancel; drop the rounding residue
    if let Some(last) = shaped.last_mut() {
        last.acceleration = 0.0;
    }

    tracing::trace!(
        breakpoints = profile.len(),
        impulses = impulses.len(),
        events = shaped.len(),
        "convolved profile"
    );

    shaped
}
