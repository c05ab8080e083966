//! Boundary to the device executing shaped moves.
//!
//! The core never talks to hardware. An [`Actuator`] reports where it is and
//! what it can do, and accepts finished segment batches. [`ShapedAxis`]
//! turns relative or absolute move requests into shaped segments for it.
//! [`PlanarActuator`] and [`ShapedPlane`] do the same for an X/Y pair
//! driven along straight lines.

use crate::{
    error::{Result, ShapingError, require_positive},
    integrate::MotionSegment,
    planar::{MotionSegment2D, PlanarStreamGenerator},
    plant::PlantModel,
    shaper::ShaperFamily,
    stream::StreamGenerator,
};

/// Kinematic limits of an axis, in the same units as the requested moves.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AxisLimits {
    pub acceleration: f64,
    pub deceleration: f64,
    pub max_speed: f64,
    pub min_position: f64,
    pub max_position: f64,
    /// Smallest non-zero acceleration the device can be commanded.
    pub min_acceleration: f64,
    /// Smallest non-zero speed the device can be commanded.
    pub min_speed: f64,
}

impl AxisLimits {
    /// Checks that the limits describe a usable axis.
    pub fn validate(&self) -> Result<()> {
        require_positive("acceleration", self.acceleration)?;
        require_positive("deceleration", self.deceleration)?;
        require_positive("max_speed", self.max_speed)?;
        require_positive("min_acceleration", self.min_acceleration)?;
        require_positive("min_speed", self.min_speed)?;
        let (min, max) = (self.min_position, self.max_position);
        if min.is_nan() || max.is_nan() || min >= max {
            return Err(ShapingError::InvalidParameter {
                name: "max_position",
                value: self.max_position,
                reason: "must be greater than min_position",
            });
        }
        Ok(())
    }
}

pub trait Actuator {
    fn position(&self) -> Result<f64>;

    fn limits(&self) -> Result<AxisLimits>;

    /// Runs `segments` in order. Positions are absolute.
    fn execute(&mut self, segments: &[MotionSegment]) -> Result<()>;
}

/// In-memory actuator that records every batch it is asked to execute.
#[derive(Clone, Debug)]
pub struct RecordingActuator {
    pub position: f64,
    pub limits: AxisLimits,
    pub batches: Vec<Vec<MotionSegment>>,
}

impl RecordingActuator {
    pub fn new(position: f64, limits: AxisLimits) -> Self {
        Self {
            position,
            limits,
            batches: Vec::new(),
        }
    }
}

impl Actuator for RecordingActuator {
    fn position(&self) -> Result<f64> {
        Ok(self.position)
    }

    fn limits(&self) -> Result<AxisLimits> {
        Ok(self.limits)
    }

    fn execute(&mut self, segments: &[MotionSegment]) -> Result<()> {
        if let Some(last) = segments.last() {
            self.position = last.position;
        }
        self.batches.push(segments.to_vec());
        Ok(())
    }
}

/// An axis whose moves are input shaped for its resonance.
pub struct ShapedAxis<A> {
    actuator: A,
    generator: StreamGenerator,
    max_speed_limit: f64,
}

impl<A: Actuator> ShapedAxis<A> {
    pub fn new(actuator: A, plant: PlantModel, family: ShaperFamily) -> Result<Self> {
        let limits = actuator.limits()?;
        limits.validate()?;
        Ok(Self {
            actuator,
            generator: StreamGenerator::new(plant, family),
            max_speed_limit: limits.max_speed,
        })
    }

    pub fn actuator(&self) -> &A {
        &self.actuator
    }

    pub fn into_actuator(self) -> A {
        self.actuator
    }

    pub fn generator(&self) -> &StreamGenerator {
        &self.generator
    }

    pub fn generator_mut(&mut self) -> &mut StreamGenerator {
        &mut self.generator
    }

    /// Speed that shaped moves will not exceed.
    pub fn max_speed_limit(&self) -> f64 {
        self.max_speed_limit
    }

    pub fn set_max_speed_limit(&mut self, value: f64) -> Result<()> {
        self.max_speed_limit = require_positive("max_speed_limit", value)?;
        Ok(())
    }

    /// Restores the speed limit to the actuator's own maximum speed.
    pub fn reset_max_speed_limit(&mut self) -> Result<()> {
        self.max_speed_limit = self.actuator.limits()?.max_speed;
        Ok(())
    }

    /// Shaped move by `distance` from the current position.
    ///
    /// Without an explicit `acceleration` the actuator's acceleration and
    /// deceleration are used; an explicit value applies to both. Returns the
    /// segments handed to the actuator; a zero-length move sends nothing.
    pub fn move_relative(
        &mut self,
        distance: f64,
        acceleration: Option<f64>,
    ) -> Result<Vec<MotionSegment>> {
        let start = self.actuator.position()?;
        self.run(start, start + distance, distance, acceleration)
    }

    pub fn move_absolute(
        &mut self,
        position: f64,
        acceleration: Option<f64>,
    ) -> Result<Vec<MotionSegment>> {
        let start = self.actuator.position()?;
        self.run(start, position, position - start, acceleration)
    }

    /// Shaped move to the upper travel limit.
    pub fn move_max(&mut self, acceleration: Option<f64>) -> Result<Vec<MotionSegment>> {
        let limits = self.actuator.limits()?;
        self.move_absolute(limits.max_position, acceleration)
    }

    /// Shaped move to the lower travel limit.
    pub fn move_min(&mut self, acceleration: Option<f64>) -> Result<Vec<MotionSegment>> {
        let limits = self.actuator.limits()?;
        self.move_absolute(limits.min_position, acceleration)
    }

    fn run(
        &mut self,
        start: f64,
        target: f64,
        distance: f64,
        acceleration: Option<f64>,
    ) -> Result<Vec<MotionSegment>> {
        if distance == 0.0 {
            return Ok(Vec::new());
        }

        let limits = self.actuator.limits()?;
        let (accel, decel) = match acceleration {
            Some(value) => (value, value),
            None => (limits.acceleration, limits.deceleration),
        };

        let mut segments = self
            .generator
            .shape_trapezoidal_motion(distance, accel, decel, self.max_speed_limit)?
            .into_iter()
            .map(|segment| MotionSegment {
                position: start + segment.position,
                speed_limit: segment.speed_limit.max(limits.min_speed),
                acceleration: segment.acceleration.max(limits.min_acceleration),
                duration: segment.duration,
            })
            .collect::<Vec<_>>();
        if let Some(last) = segments.last_mut() {
            last.position = target;
        }

        tracing::debug!(start, target, segments = segments.len(), "executing shaped move");
        self.actuator.execute(&segments)?;
        Ok(segments)
    }
}

/// A pair of axes that executes straight X/Y lines together.
pub trait PlanarActuator {
    /// Current (x, y) position.
    fn position(&self) -> Result<(f64, f64)>;

    fn x_limits(&self) -> Result<AxisLimits>;

    fn y_limits(&self) -> Result<AxisLimits>;

    /// Runs `segments` in order. Positions are absolute.
    fn execute(&mut self, segments: &[MotionSegment2D]) -> Result<()>;
}

/// In-memory X/Y pair that records every batch it is asked to execute.
#[derive(Clone, Debug)]
pub struct RecordingPlanarActuator {
    pub position: (f64, f64),
    pub x_limits: AxisLimits,
    pub y_limits: AxisLimits,
    pub batches: Vec<Vec<MotionSegment2D>>,
}

impl RecordingPlanarActuator {
    pub fn new(position: (f64, f64), x_limits: AxisLimits, y_limits: AxisLimits) -> Self {
        Self {
            position,
            x_limits,
            y_limits,
            batches: Vec::new(),
        }
    }
}

impl PlanarActuator for RecordingPlanarActuator {
    fn position(&self) -> Result<(f64, f64)> {
        Ok(self.position)
    }

    fn x_limits(&self) -> Result<AxisLimits> {
        Ok(self.x_limits)
    }

    fn y_limits(&self) -> Result<AxisLimits> {
        Ok(self.y_limits)
    }

    fn execute(&mut self, segments: &[MotionSegment2D]) -> Result<()> {
        if let Some(last) = segments.last() {
            self.position = (last.x_position, last.y_position);
        }
        self.batches.push(segments.to_vec());
        Ok(())
    }
}

/// An X/Y pair whose straight-line moves are shaped per axis.
///
/// Tangential acceleration and deceleration default to the lower of the two
/// axes' values, and the tangential speed limit to the lower maximum speed.
pub struct ShapedPlane<A> {
    actuator: A,
    generator: PlanarStreamGenerator,
    max_speed_limit: f64,
}

impl<A: PlanarActuator> ShapedPlane<A> {
    pub fn new(
        actuator: A,
        x_plant: PlantModel,
        x_family: ShaperFamily,
        y_plant: PlantModel,
        y_family: ShaperFamily,
    ) -> Result<Self> {
        let (x, y) = (actuator.x_limits()?, actuator.y_limits()?);
        x.validate()?;
        y.validate()?;
        Ok(Self {
            actuator,
            generator: PlanarStreamGenerator::new(x_plant, x_family, y_plant, y_family),
            max_speed_limit: x.max_speed.min(y.max_speed),
        })
    }

    pub fn actuator(&self) -> &A {
        &self.actuator
    }

    pub fn into_actuator(self) -> A {
        self.actuator
    }

    pub fn generator(&self) -> &PlanarStreamGenerator {
        &self.generator
    }

    pub fn generator_mut(&mut self) -> &mut PlanarStreamGenerator {
        &mut self.generator
    }

    /// Tangential speed that shaped moves will not exceed.
    pub fn max_speed_limit(&self) -> f64 {
        self.max_speed_limit
    }

    pub fn set_max_speed_limit(&mut self, value: f64) -> Result<()> {
        self.max_speed_limit = require_positive("max_speed_limit", value)?;
        Ok(())
    }

    /// Restores the speed limit to the lower of the two axes' maximum speeds.
    pub fn reset_max_speed_limit(&mut self) -> Result<()> {
        let (x, y) = (self.actuator.x_limits()?, self.actuator.y_limits()?);
        self.max_speed_limit = x.max_speed.min(y.max_speed);
        Ok(())
    }

    /// Shaped line by (`x_distance`, `y_distance`) from the current position.
    ///
    /// An explicit `acceleration` applies to both acceleration and
    /// deceleration. A zero-length move sends nothing.
    pub fn move_relative(
        &mut self,
        x_distance: f64,
        y_distance: f64,
        acceleration: Option<f64>,
    ) -> Result<Vec<MotionSegment2D>> {
        let (x, y) = self.actuator.position()?;
        self.run(
            (x, y),
            (x + x_distance, y + y_distance),
            (x_distance, y_distance),
            acceleration,
        )
    }

    pub fn move_absolute(
        &mut self,
        x_position: f64,
        y_position: f64,
        acceleration: Option<f64>,
    ) -> Result<Vec<MotionSegment2D>> {
        let (x, y) = self.actuator.position()?;
        self.run(
            (x, y),
            (x_position, y_position),
            (x_position - x, y_position - y),
            acceleration,
        )
    }

    /// Shaped line to the upper travel limit of both axes.
    pub fn move_max(&mut self, acceleration: Option<f64>) -> Result<Vec<MotionSegment2D>> {
        let (x, y) = (self.actuator.x_limits()?, self.actuator.y_limits()?);
        self.move_absolute(x.max_position, y.max_position, acceleration)
    }

    /// Shaped line to the lower travel limit of both axes.
    pub fn move_min(&mut self, acceleration: Option<f64>) -> Result<Vec<MotionSegment2D>> {
        let (x, y) = (self.actuator.x_limits()?, self.actuator.y_limits()?);
        self.move_absolute(x.min_position, y.min_position, acceleration)
    }

    fn run(
        &mut self,
        start: (f64, f64),
        target: (f64, f64),
        distance: (f64, f64),
        acceleration: Option<f64>,
    ) -> Result<Vec<MotionSegment2D>> {
        if distance == (0.0, 0.0) {
            return Ok(Vec::new());
        }

        let (x, y) = (self.actuator.x_limits()?, self.actuator.y_limits()?);
        let (accel, decel) = match acceleration {
            Some(value) => (value, value),
            None => (
                x.acceleration.min(y.acceleration),
                x.deceleration.min(y.deceleration),
            ),
        };
        // a cap must be addressable on both axes
        let min_speed = x.min_speed.max(y.min_speed);
        let min_acceleration = x.min_acceleration.max(y.min_acceleration);

        let mut segments = self
            .generator
            .shape_trapezoidal_motion(distance.0, distance.1, accel, decel, self.max_speed_limit)?
            .into_iter()
            .map(|segment| MotionSegment2D {
                x_position: start.0 + segment.x_position,
                y_position: start.1 + segment.y_position,
                speed_limit: segment.speed_limit.max(min_speed),
                acceleration: segment.acceleration.max(min_acceleration),
                duration: segment.duration,
            })
            .collect::<Vec<_>>();
        if let Some(last) = segments.last_mut() {
            last.x_position = target.0;
            last.y_position = target.1;
        }

        tracing::debug!(
            ?start,
            ?target,
            segments = segments.len(),
            "executing shaped planar move"
        );
        self.actuator.execute(&segments)?;
        Ok(segments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits() -> AxisLimits {
        AxisLimits {
            acceleration: 2100.0,
            deceleration: 1500.0,
            max_speed: 1000.0,
            min_position: 0.0,
            max_position: 800.0,
            min_acceleration: 1.0,
            min_speed: 0.5,
        }
    }

    fn axis(position: f64) -> ShapedAxis<RecordingActuator> {
        ShapedAxis::new(
            RecordingActuator::new(position, limits()),
            PlantModel::new(4.64, 0.04).unwrap(),
            ShaperFamily::Zv,
        )
        .unwrap()
    }

    #[test]
    fn relative_move_is_offset_from_start() {
        let mut axis = axis(100.0);
        let sent = axis.move_relative(250.0, None).unwrap();
        assert_eq!(sent.last().unwrap().position, 350.0);
        assert_eq!(axis.actuator().position, 350.0);
        assert_eq!(axis.actuator().batches, vec![sent]);
    }

    #[test]
    fn default_accelerations_come_from_limits() {
        let mut axis = axis(0.0);
        let sent = axis.move_relative(600.0, None).unwrap();
        let expected = axis
            .generator()
            .shape_trapezoidal_motion(600.0, 2100.0, 1500.0, 1000.0)
            .unwrap();
        assert_eq!(sent.len(), expected.len());
        for (s, e) in sent.iter().zip(&expected) {
            assert_eq!(s.duration, e.duration);
        }
    }

    #[test]
    fn degenerate_caps_are_clamped() {
        let mut axis = axis(0.0);
        let sent = axis.move_relative(600.0, Some(2100.0)).unwrap();
        // the cruise section has zero acceleration before clamping
        assert!(sent.iter().any(|s| s.acceleration == 1.0));
        assert!(sent.iter().all(|s| s.acceleration >= 1.0));
        assert!(sent.iter().all(|s| s.speed_limit >= 0.5));
    }

    #[test]
    fn absolute_and_limit_moves() {
        let mut axis = axis(200.0);
        axis.move_absolute(50.0, None).unwrap();
        assert_eq!(axis.actuator().position, 50.0);

        axis.move_max(None).unwrap();
        assert_eq!(axis.actuator().position, 800.0);

        axis.move_min(Some(500.0)).unwrap();
        assert_eq!(axis.actuator().position, 0.0);
        assert_eq!(axis.actuator().batches.len(), 3);
    }

    #[test]
    fn zero_move_sends_nothing() {
        let mut axis = axis(42.0);
        assert!(axis.move_absolute(42.0, None).unwrap().is_empty());
        assert!(axis.actuator().batches.is_empty());
    }

    #[test]
    fn speed_limit_override_and_reset() {
        let mut axis = axis(0.0);
        assert_eq!(axis.max_speed_limit(), 1000.0);
        axis.set_max_speed_limit(200.0).unwrap();
        let sent = axis.move_relative(600.0, None).unwrap();
        assert!(sent.iter().all(|s| s.speed_limit <= 200.0 + 1e-9));

        assert!(axis.set_max_speed_limit(0.0).is_err());
        assert_eq!(axis.max_speed_limit(), 200.0);
        axis.reset_max_speed_limit().unwrap();
        assert_eq!(axis.max_speed_limit(), 1000.0);
    }

    struct Faulty;

    impl Actuator for Faulty {
        fn position(&self) -> Result<f64> {
            Ok(0.0)
        }

        fn limits(&self) -> Result<AxisLimits> {
            Ok(limits())
        }

        fn execute(&mut self, _segments: &[MotionSegment]) -> Result<()> {
            Err(ShapingError::Actuator("stream buffer full".into()))
        }
    }

    #[test]
    fn actuator_errors_propagate() {
        let mut axis = ShapedAxis::new(
            Faulty,
            PlantModel::new(4.64, 0.04).unwrap(),
            ShaperFamily::Zv,
        )
        .unwrap();
        assert_eq!(
            axis.move_relative(10.0, None),
            Err(ShapingError::Actuator("stream buffer full".into()))
        );
    }

    #[test]
    fn limits_validation() {
        assert!(limits().validate().is_ok());
        let mut bad = limits();
        bad.max_position = -1.0;
        assert!(bad.validate().is_err());
        let mut bad = limits();
        bad.min_speed = 0.0;
        assert!(bad.validate().is_err());
    }

    #[test]
    fn nan_travel_range_is_rejected() {
        let mut bad = limits();
        bad.min_position = f64::NAN;
        assert!(bad.validate().is_err());
        let mut bad = limits();
        bad.max_position = f64::NAN;
        assert!(bad.validate().is_err());
    }

    fn y_limits() -> AxisLimits {
        AxisLimits {
            acceleration: 1000.0,
            deceleration: 900.0,
            max_speed: 800.0,
            min_position: -100.0,
            max_position: 400.0,
            min_acceleration: 2.5,
            min_speed: 0.25,
        }
    }

    fn plane(position: (f64, f64)) -> ShapedPlane<RecordingPlanarActuator> {
        ShapedPlane::new(
            RecordingPlanarActuator::new(position, limits(), y_limits()),
            PlantModel::new(3.0, 0.04).unwrap(),
            ShaperFamily::Zv,
            PlantModel::new(8.0, 0.04).unwrap(),
            ShaperFamily::Zvd,
        )
        .unwrap()
    }

    #[test]
    fn planar_relative_move_is_offset_from_start() {
        let mut plane = plane((100.0, 50.0));
        let sent = plane.move_relative(300.0, -120.0, None).unwrap();
        let last = sent.last().unwrap();
        assert_eq!((last.x_position, last.y_position), (400.0, -70.0));
        assert_eq!(plane.actuator().position, (400.0, -70.0));
        assert_eq!(plane.actuator().batches, vec![sent.clone()]);

        let unshifted = plane
            .generator()
            .shape_trapezoidal_motion(300.0, -120.0, 1000.0, 900.0, 800.0)
            .unwrap();
        assert_eq!(sent.len(), unshifted.len());
        for (s, u) in sent.iter().zip(&unshifted).take(sent.len() - 1) {
            assert_eq!(s.x_position, 100.0 + u.x_position);
            assert_eq!(s.y_position, 50.0 + u.y_position);
            assert_eq!(s.duration, u.duration);
        }
    }

    #[test]
    fn planar_absolute_and_limit_moves() {
        let mut plane = plane((10.0, 20.0));
        plane.move_absolute(-30.0, 75.5, Some(500.0)).unwrap();
        assert_eq!(plane.actuator().position, (-30.0, 75.5));

        plane.move_max(None).unwrap();
        assert_eq!(plane.actuator().position, (800.0, 400.0));

        plane.move_min(None).unwrap();
        assert_eq!(plane.actuator().position, (0.0, -100.0));
        assert_eq!(plane.actuator().batches.len(), 3);
    }

    #[test]
    fn planar_zero_move_sends_nothing() {
        let mut plane = plane((5.0, 6.0));
        assert!(plane.move_absolute(5.0, 6.0, None).unwrap().is_empty());
        assert!(plane.move_relative(0.0, 0.0, None).unwrap().is_empty());
        assert!(plane.actuator().batches.is_empty());

        // one axis at rest is still a move
        let sent = plane.move_relative(0.0, 12.0, None).unwrap();
        assert!(sent.iter().all(|s| s.x_position == 5.0));
        assert_eq!(plane.actuator().position, (5.0, 18.0));
    }

    #[test]
    fn planar_caps_use_both_axes() {
        let mut plane = plane((0.0, 0.0));
        assert_eq!(plane.max_speed_limit(), 800.0);
        let sent = plane.move_relative(1200.0, 600.0, None).unwrap();
        assert!(sent.iter().all(|s| s.speed_limit <= 800.0 + 1e-9));
        assert!(sent.iter().all(|s| s.speed_limit >= 0.5));
        // the cruise section is clamped to the larger minimum acceleration
        assert!(sent.iter().any(|s| s.acceleration == 2.5));
        assert!(sent.iter().all(|s| s.acceleration >= 2.5));

        plane.set_max_speed_limit(150.0).unwrap();
        let sent = plane.move_relative(-1200.0, -600.0, None).unwrap();
        assert!(sent.iter().all(|s| s.speed_limit <= 150.0 + 1e-9));
        assert!(plane.set_max_speed_limit(f64::NAN).is_err());
        plane.reset_max_speed_limit().unwrap();
        assert_eq!(plane.max_speed_limit(), 800.0);
    }
}
