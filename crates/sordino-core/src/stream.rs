//! Single-axis shaping pipelines.

use crate::{
    convolution::convolve,
    error::{Result, require_positive},
    integrate::{MotionSegment, SampledPoint, integrate_samples, integrate_segments},
    plant::PlantModel,
    profile::{AccelPoint, TrapezoidalProfile},
    shaper::{ImpulseSet, ImpulseShaper, ShaperFamily},
};

pub const DEFAULT_MIN_TIMESTEP: f64 = 0.001;

/// Shapes a trapezoidal move and returns the shaped step-acceleration
/// profile.
pub fn shape_profile(
    impulses: &ImpulseSet,
    distance: f64,
    acceleration: f64,
    deceleration: f64,
    max_speed_limit: f64,
) -> Result<Vec<AccelPoint>> {
    let profile = TrapezoidalProfile::new(distance, acceleration, deceleration, max_speed_limit)?;
    Ok(convolve(impulses, &profile.breakpoints))
}

/// Produces zero-vibration stream segments for one axis.
#[derive(Clone, Debug)]
pub struct StreamGenerator {
    shaper: ImpulseShaper,
}

impl StreamGenerator {
    pub fn new(plant: PlantModel, family: ShaperFamily) -> Self {
        Self {
            shaper: ImpulseShaper::new(plant, family),
        }
    }

    pub fn plant(&self) -> &PlantModel {
        self.shaper.plant()
    }

    pub fn family(&self) -> ShaperFamily {
        self.shaper.family()
    }

    pub fn set_plant(&mut self, plant: PlantModel) {
        self.shaper.set_plant(plant);
    }

    pub fn set_family(&mut self, family: ShaperFamily) {
        self.shaper.set_family(family);
    }

    pub fn impulses(&self) -> &ImpulseSet {
        self.shaper.impulses()
    }

    /// Segments for a move of `distance` from rest to rest. The last segment
    /// ends exactly on `distance`.
    pub fn shape_trapezoidal_motion(
        &self,
        distance: f64,
        acceleration: f64,
        deceleration: f64,
        max_speed_limit: f64,
    ) -> Result<Vec<MotionSegment>> {
        let shaped = shape_profile(
            self.impulses(),
            distance,
            acceleration,
            deceleration,
            max_speed_limit,
        )?;
        integrate_segments(&shaped, distance)
    }
}

/// Produces zero-vibration position-velocity-time samples for one axis.
#[derive(Clone, Debug)]
pub struct PvtGenerator {
    shaper: ImpulseShaper,
    min_timestep: f64,
}

impl PvtGenerator {
    pub fn new(plant: PlantModel, family: ShaperFamily) -> Self {
        Self {
            shaper: ImpulseShaper::new(plant, family),
            min_timestep: DEFAULT_MIN_TIMESTEP,
        }
    }

    pub fn with_min_timestep(mut self, min_timestep: f64) -> Result<Self> {
        self.set_min_timestep(min_timestep)?;
        Ok(self)
    }

    pub fn plant(&self) -> &PlantModel {
        self.shaper.plant()
    }

    pub fn family(&self) -> ShaperFamily {
        self.shaper.family()
    }

    pub fn set_plant(&mut self, plant: PlantModel) {
        self.shaper.set_plant(plant);
    }

    pub fn set_family(&mut self, family: ShaperFamily) {
        self.shaper.set_family(family);
    }

    pub fn impulses(&self) -> &ImpulseSet {
        self.shaper.impulses()
    }

    /// Minimum time between samples, in seconds.
    pub fn min_timestep(&self) -> f64 {
        self.min_timestep
    }

    pub fn set_min_timestep(&mut self, min_timestep: f64) -> Result<()> {
        self.min_timestep = require_positive("min_timestep", min_timestep)?;
        Ok(())
    }

    /// Samples for a move of `distance`; the last one is at rest exactly on
    /// `distance`.
    pub fn shape_trapezoidal_motion(
        &self,
        distance: f64,
        acceleration: f64,
        deceleration: f64,
        max_speed_limit: f64,
    ) -> Result<Vec<SampledPoint>> {
        let shaped = shape_profile(
            self.impulses(),
            distance,
            acceleration,
            deceleration,
            max_speed_limit,
        )?;
        integrate_samples(&shaped, distance, self.min_timestep)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::ShapingError, integrate::MotionSummary};

    fn reference() -> StreamGenerator {
        StreamGenerator::new(PlantModel::new(4.64, 0.04).unwrap(), ShaperFamily::Zv)
    }

    #[test]
    fn reference_move_lands_on_target() {
        let segments = reference()
            .shape_trapezoidal_motion(600.0, 2100.0, 2100.0, 1000.0)
            .unwrap();
        assert_eq!(segments.len(), 7);
        assert_eq!(segments.last().unwrap().position, 600.0);
        assert!(segments.max_speed() <= 1000.0 + 1e-9);

        let unshaped = TrapezoidalProfile::new(600.0, 2100.0, 2100.0, 1000.0)
            .unwrap()
            .duration();
        let delay = segments.total_time() - unshaped;
        assert!((delay - 0.5 / 4.64).abs() < 1e-9, "delay {delay}");
    }

    #[test]
    fn positions_are_monotonic_for_forward_move() {
        let segments = reference()
            .shape_trapezoidal_motion(600.0, 2100.0, 2100.0, 1000.0)
            .unwrap();
        assert!(segments.windows(2).all(|w| w[0].position <= w[1].position));
        assert!(segments.iter().all(|s| s.duration > 0.0));
    }

    #[test]
    fn backward_move_mirrors_forward() {
        let generator = reference();
        let forward = generator
            .shape_trapezoidal_motion(250.0, 800.0, 1200.0, 300.0)
            .unwrap();
        let backward = generator
            .shape_trapezoidal_motion(-250.0, 800.0, 1200.0, 300.0)
            .unwrap();
        assert_eq!(forward.len(), backward.len());
        for (f, b) in forward.iter().zip(&backward) {
            assert_eq!(f.position, -b.position);
            assert_eq!(f.speed_limit, b.speed_limit);
            assert_eq!(f.acceleration, b.acceleration);
            assert_eq!(f.duration, b.duration);
        }
    }

    #[test]
    fn zero_distance_is_infeasible() {
        assert!(matches!(
            reference().shape_trapezoidal_motion(0.0, 2100.0, 2100.0, 1000.0),
            Err(ShapingError::InfeasibleMove { .. })
        ));
    }

    #[test]
    fn family_change_lengthens_move() {
        let mut generator = reference();
        let zv = generator
            .shape_trapezoidal_motion(600.0, 2100.0, 2100.0, 1000.0)
            .unwrap()
            .total_time();
        generator.set_family(ShaperFamily::Zvdd);
        assert_eq!(generator.impulses().len(), 4);
        let zvdd = generator
            .shape_trapezoidal_motion(600.0, 2100.0, 2100.0, 1000.0)
            .unwrap()
            .total_time();
        assert!((zvdd - zv - 1.0 / 4.64).abs() < 1e-9);
    }

    #[test]
    fn pvt_ends_at_rest_on_target() {
        let generator =
            PvtGenerator::new(PlantModel::new(4.64, 0.04).unwrap(), ShaperFamily::Zvd)
                .with_min_timestep(0.01)
                .unwrap();
        let samples = generator
            .shape_trapezoidal_motion(680.0, 2100.0, 2100.0, 1000.0)
            .unwrap();
        let last = samples.last().unwrap();
        assert_eq!(last.position, 680.0);
        assert_eq!(last.velocity, 0.0);
        assert!(samples.iter().all(|p| p.time >= 0.01));
        assert!(samples.max_speed() <= 1000.0 + 1e-9);
    }

    #[test]
    fn pvt_timestep_validation() {
        let mut generator =
            PvtGenerator::new(PlantModel::new(4.64, 0.04).unwrap(), ShaperFamily::Zv);
        assert_eq!(generator.min_timestep(), DEFAULT_MIN_TIMESTEP);
        assert!(generator.set_min_timestep(-0.1).is_err());
        assert_eq!(generator.min_timestep(), DEFAULT_MIN_TIMESTEP);
        generator.set_min_timestep(0.002).unwrap();
        assert_eq!(generator.min_timestep(), 0.002);
    }
}
