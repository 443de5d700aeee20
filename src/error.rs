use thiserror::Error;

/// Errors raised by the solver pipeline and its math kernel.
#[derive(Debug, Error)]
pub enum ReverseError {
    /// A caller-supplied argument is outside the supported domain.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// An index was outside the bounds of a vector, matrix, or view.
    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// Phase one of the simplex could not drive the artificial variables to
    /// zero: the constraint system has no feasible point.
    #[error("constraint system is infeasible")]
    InfeasibleConstraints,

    /// A negative step was requested but the multiplier has no inverse
    /// modulo the modulus.
    #[error("multiplier {multiplier:#x} is not invertible modulo {modulus:#x}")]
    UnsupportedStep { multiplier: i64, modulus: i64 },
}
