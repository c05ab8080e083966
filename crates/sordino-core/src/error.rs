use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ShapingError {
    #[error("invalid {name}: {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },
    #[error("unsupported shaper family '{0}', expected one of zv, zvd, zvdd")]
    UnsupportedShaperFamily(String),
    #[error("infeasible move: {reason}")]
    InfeasibleMove { reason: String },
    #[error("degenerate planar move x={x_distance} y={y_distance}: direction is undefined")]
    DegenerateMove { x_distance: f64, y_distance: f64 },
    #[error("invalid impulse set: {reason}")]
    InvalidImpulses { reason: String },
    #[error("actuator failure: {0}")]
    Actuator(String),
}

pub type Result<T> = std::result::Result<T, ShapingError>;

impl ShapingError {
    pub(crate) fn infeasible(reason: impl Into<String>) -> Self {
        Self::InfeasibleMove {
            reason: reason.into(),
        }
    }
}

/// Fails unless `value` is finite and strictly positive.
pub(crate) fn require_positive(name: &'static str, value: f64) -> Result<f64> {
    if !value.is_finite() {
        return Err(ShapingError::InvalidParameter {
            name,
            value,
            reason: "must be finite",
        });
    }
    if value <= 0.0 {
        return Err(ShapingError::InvalidParameter {
            name,
            value,
            reason: "must be greater than 0",
        });
    }
    Ok(value)
}
