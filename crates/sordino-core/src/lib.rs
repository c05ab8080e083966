//! Zero-vibration input shaping for streamed point-to-point moves.
//!
//! A move is planned as an ordinary trapezoid, convolved in closed form
//! with the impulses of a ZV/ZVD/ZVDD shaper tuned to the driven
//! structure's resonance, and integrated into segments an actuator can
//! stream. Everything here is pure computation; device access goes through
//! the [`actuator::Actuator`] trait.

pub mod actuator;
pub mod convolution;
pub mod error;
pub mod integrate;
pub mod planar;
pub mod plant;
pub mod profile;
pub mod shaper;
pub mod stream;

pub use error::{Result, ShapingError};
pub use integrate::{MotionSegment, MotionSummary, SampledPoint};
pub use planar::{MotionSegment2D, PlanarStreamGenerator};
pub use plant::PlantModel;
pub use profile::{AccelPoint, TrapezoidalProfile};
pub use shaper::{Impulse, ImpulseSet, ImpulseShaper, ShaperFamily};
pub use stream::{PvtGenerator, StreamGenerator};
