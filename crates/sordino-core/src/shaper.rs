//! Zero-vibration impulse shapers.
//!
//! A shaper replaces a step command with a train of delayed, scaled copies of
//! itself. For a single second-order mode with period `T` and damping ratio
//! `ζ`, the ZV family places impulses half a damped period apart, weighted
//! by the decay factor `k = exp(-πζ / √(1-ζ²))`. ZVD and ZVDD convolve the
//! ZV shaper with itself once and twice, trading a longer shaper for more
//! robustness to modelling error.

use crate::{
    error::{Result, ShapingError},
    plant::PlantModel,
};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr, sync::OnceLock};

const AMPLITUDE_TOLERANCE: f64 = 1e-9;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ShaperFamily {
    #[default]
    Zv,
    Zvd,
    Zvdd,
}

impl ShaperFamily {
    pub const ALL: [ShaperFamily; 3] = [ShaperFamily::Zv, ShaperFamily::Zvd, ShaperFamily::Zvdd];

    /// Number of impulses emitted by this family.
    pub const fn impulse_count(self) -> usize {
        match self {
            ShaperFamily::Zv => 2,
            ShaperFamily::Zvd => 3,
            ShaperFamily::Zvdd => 4,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            ShaperFamily::Zv => "zv",
            ShaperFamily::Zvd => "zvd",
            ShaperFamily::Zvdd => "zvdd",
        }
    }

    /// Closed-form impulses for `plant`.
    pub fn impulses(self, plant: &PlantModel) -> ImpulseSet {
        let zeta = plant.damping_ratio();
        let k = (-std::f64::consts::PI * zeta / (1.0 - zeta * zeta).sqrt()).exp();
        let half_period = plant.resonant_period() / 2.0;

        // Binomial weights of (1 + k)^n, n = 1, 2, 3.
        let weights: &[f64] = match self {
            ShaperFamily::Zv => &[1.0, k],
            ShaperFamily::Zvd => &[1.0, 2.0 * k, k * k],
            ShaperFamily::Zvdd => &[1.0, 3.0 * k, 3.0 * k * k, k * k * k],
        };
        let total: f64 = weights.iter().sum();

        let impulses = weights
            .iter()
            .enumerate()
            .map(|(idx, weight)| Impulse {
                time: half_period * idx as f64,
                amplitude: weight / total,
            })
            .collect();
        ImpulseSet { impulses }
    }
}

impl fmt::Display for ShaperFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShaperFamily {
    type Err = ShapingError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "zv" => Ok(ShaperFamily::Zv),
            "zvd" => Ok(ShaperFamily::Zvd),
            "zvdd" => Ok(ShaperFamily::Zvdd),
            _ => Err(ShapingError::UnsupportedShaperFamily(s.to_string())),
        }
    }
}

impl TryFrom<String> for ShaperFamily {
    type Error = ShapingError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<ShaperFamily> for String {
    fn from(family: ShaperFamily) -> Self {
        family.as_str().to_string()
    }
}

/// A single shaper impulse: `amplitude` applied `time` seconds after the
/// original command.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Impulse {
    pub time: f64,
    pub amplitude: f64,
}

/// Ordered impulses whose amplitudes sum to one, starting at `t = 0`.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ImpulseSet {
    impulses: Vec<Impulse>,
}

impl ImpulseSet {
    /// Validates a caller supplied impulse train.
    pub fn new(impulses: Vec<Impulse>) -> Result<Self> {
        let invalid = |reason: String| Err(ShapingError::InvalidImpulses { reason });

        let Some(first) = impulses.first() else {
            return invalid("at least one impulse is required".into());
        };
        if first.time != 0.0 {
            return invalid(format!("first impulse must be at t=0, got {}", first.time));
        }
        if let Some(bad) = impulses
            .iter()
            .find(|i| !i.time.is_finite() || !i.amplitude.is_finite())
        {
            return invalid(format!("non-finite impulse {bad:?}"));
        }
        if let Some(pair) = impulses.windows(2).find(|w| w[1].time < w[0].time) {
            return invalid(format!(
                "impulse times must be non-decreasing, {} follows {}",
                pair[1].time, pair[0].time
            ));
        }
        let sum: f64 = impulses.iter().map(|i| i.amplitude).sum();
        if (sum - 1.0).abs() > AMPLITUDE_TOLERANCE {
            return invalid(format!("amplitudes sum to {sum}, expected 1"));
        }

        Ok(Self { impulses })
    }

    /// The identity shaper: one unit impulse at `t = 0`.
    pub fn unshaped() -> Self {
        Self {
            impulses: vec![Impulse {
                time: 0.0,
                amplitude: 1.0,
            }],
        }
    }

    pub(crate) fn from_sorted(impulses: Vec<Impulse>) -> Self {
        debug_assert!(impulses.windows(2).all(|w| w[0].time <= w[1].time));
        Self { impulses }
    }

    pub fn as_slice(&self) -> &[Impulse] {
        &self.impulses
    }

    pub fn iter(&self) -> impl Iterator<Item = &Impulse> {
        self.impulses.iter()
    }

    pub fn len(&self) -> usize {
        self.impulses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.impulses.is_empty()
    }

    pub fn times(&self) -> impl Iterator<Item = f64> + '_ {
        self.impulses.iter().map(|i| i.time)
    }

    /// Delay added to a move by this shaper.
    pub fn duration(&self) -> f64 {
        self.impulses.last().map_or(0.0, |i| i.time)
    }

    pub fn amplitude_sum(&self) -> f64 {
        self.impulses.iter().map(|i| i.amplitude).sum()
    }
}

/// Impulses for a plant and family, computed on first use and cached until
/// either input is replaced.
#[derive(Clone, Debug)]
pub struct ImpulseShaper {
    plant: PlantModel,
    family: ShaperFamily,
    cache: OnceLock<ImpulseSet>,
}

impl ImpulseShaper {
    pub fn new(plant: PlantModel, family: ShaperFamily) -> Self {
        Self {
            plant,
            family,
            cache: OnceLock::new(),
        }
    }

    pub fn plant(&self) -> &PlantModel {
        &self.plant
    }

    pub fn family(&self) -> ShaperFamily {
        self.family
    }

    pub fn set_plant(&mut self, plant: PlantModel) {
        if plant != self.plant {
            self.plant = plant;
            self.cache = OnceLock::new();
        }
    }

    pub fn set_family(&mut self, family: ShaperFamily) {
        if family != self.family {
            self.family = family;
            self.cache = OnceLock::new();
        }
    }

    pub fn impulses(&self) -> &ImpulseSet {
        self.cache.get_or_init(|| {
            let impulses = self.family.impulses(&self.plant);
            tracing::debug!(
                family = %self.family,
                frequency = self.plant.resonant_frequency(),
                damping = self.plant.damping_ratio(),
                count = impulses.len(),
                "computed shaper impulses"
            );
            impulses
        })
    }

    #[cfg(test)]
    fn is_cached(&self) -> bool {
        self.cache.get().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plant(freq: f64, damping: f64) -> PlantModel {
        PlantModel::new(freq, damping).unwrap()
    }

    #[test]
    fn undamped_zv_splits_evenly() {
        let set = ShaperFamily::Zv.impulses(&plant(5.0, 0.0));
        assert_eq!(
            set.as_slice(),
            &[
                Impulse {
                    time: 0.0,
                    amplitude: 0.5
                },
                Impulse {
                    time: 0.1,
                    amplitude: 0.5
                },
            ]
        );
    }

    #[test]
    fn reference_zv_amplitudes() {
        let set = ShaperFamily::Zv.impulses(&plant(4.64, 0.04));
        let [a, b] = set.as_slice() else {
            panic!("expected two impulses, got {set:?}");
        };
        assert!((a.amplitude - 0.531_40).abs() < 1e-5, "{a:?}");
        assert!((b.amplitude - 0.468_60).abs() < 1e-5, "{b:?}");
        assert!((b.time - 0.107_758_6).abs() < 1e-6, "{b:?}");
    }

    #[test]
    fn families_have_expected_shape() {
        let p = plant(3.0, 0.1);
        for family in ShaperFamily::ALL {
            let set = family.impulses(&p);
            assert_eq!(set.len(), family.impulse_count());
            assert!((set.amplitude_sum() - 1.0).abs() < 1e-12);
            assert_eq!(set.as_slice()[0].time, 0.0);
            for (idx, impulse) in set.iter().enumerate() {
                let expected = p.resonant_period() * idx as f64 / 2.0;
                assert!((impulse.time - expected).abs() < 1e-15);
            }
            assert!(ImpulseSet::new(set.as_slice().to_vec()).is_ok());
        }
    }

    #[test]
    fn zvd_weights_are_binomial() {
        let set = ShaperFamily::Zvd.impulses(&plant(2.0, 0.0));
        let amps: Vec<f64> = set.iter().map(|i| i.amplitude).collect();
        assert_eq!(amps, vec![0.25, 0.5, 0.25]);

        let set = ShaperFamily::Zvdd.impulses(&plant(2.0, 0.0));
        let amps: Vec<f64> = set.iter().map(|i| i.amplitude).collect();
        assert_eq!(amps, vec![0.125, 0.375, 0.375, 0.125]);
        assert_eq!(set.duration(), 0.75);
    }

    #[test]
    fn family_parse() {
        assert_eq!("ZV".parse::<ShaperFamily>(), Ok(ShaperFamily::Zv));
        assert_eq!("zvd".parse::<ShaperFamily>(), Ok(ShaperFamily::Zvd));
        assert_eq!(" Zvdd ".parse::<ShaperFamily>(), Ok(ShaperFamily::Zvdd));
        assert_eq!(
            "ei".parse::<ShaperFamily>(),
            Err(ShapingError::UnsupportedShaperFamily("ei".into()))
        );
    }

    #[test]
    fn rejects_invalid_impulse_sets() {
        let imp = |time, amplitude| Impulse { time, amplitude };
        assert!(ImpulseSet::new(vec![]).is_err());
        assert!(ImpulseSet::new(vec![imp(0.1, 1.0)]).is_err());
        assert!(ImpulseSet::new(vec![imp(0.0, 0.5), imp(0.2, 0.4)]).is_err());
        assert!(ImpulseSet::new(vec![imp(0.0, 0.5), imp(0.2, 0.25), imp(0.1, 0.25)]).is_err());
        assert!(ImpulseSet::new(vec![imp(0.0, f64::NAN)]).is_err());
        assert_eq!(
            ImpulseSet::new(vec![imp(0.0, 1.0)]).unwrap(),
            ImpulseSet::unshaped()
        );
    }

    #[test]
    fn cache_is_lazy_and_invalidated() {
        let mut shaper = ImpulseShaper::new(plant(4.0, 0.0), ShaperFamily::Zv);
        assert!(!shaper.is_cached());
        assert_eq!(shaper.impulses().duration(), 0.125);
        assert!(shaper.is_cached());

        // same value keeps the cache
        shaper.set_plant(plant(4.0, 0.0));
        assert!(shaper.is_cached());

        shaper.set_plant(plant(2.0, 0.0));
        assert!(!shaper.is_cached());
        assert_eq!(shaper.impulses().duration(), 0.25);

        shaper.set_family(ShaperFamily::Zvdd);
        assert!(!shaper.is_cached());
        assert_eq!(shaper.impulses().len(), 4);
        assert_eq!(shaper.impulses().duration(), 0.75);
    }

    #[test]
    fn shared_shaper_computes_once() {
        let shaper = ImpulseShaper::new(plant(4.64, 0.04), ShaperFamily::Zvd);
        let shared = &shaper;
        let durations: Vec<f64> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| scope.spawn(move || shared.impulses().duration()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert!(durations.iter().all(|&d| d == durations[0]));
        assert!(shaper.is_cached());
    }
}
