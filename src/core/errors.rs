use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum GateError {
    #[error("Matrix is not Unitary (U†U != I)")]
    NonUnitary,

    #[error("Matrix must be square")]
    NotSquareMatrix,

    #[error("Invalid Dimensions")]
    InvalidDimensions,

    #[error("Qubit {0} cannot be both control and target")]
    ControlTargetOverlap(usize),

    #[error("Duplicate qubit index found: {0}")]
    DuplicateQubit(usize),
}

#[derive(Error, Debug, Clone)]
pub enum StateError {
    /// The amplitude vector drifted away from unit norm.
    #[error("Numerical instability: norm squared drifted to {norm_sqr}")]
    NumericalInstability { norm_sqr: f64 },

    #[error("Invalid dimensions")]
    InvalidDimensions,

    #[error("Dimension mismatch: expected {expected}, got {got_rows}x{got_cols}")]
    DimensionMismatch {
        expected: usize,
        got_rows: usize,
        got_cols: usize,
    },

    #[error("Qubit index {index} out of bounds for {num_qubits} qubits")]
    IndexOutOfBounds { index: usize, num_qubits: usize },

    #[error("Gate error: {0}")]
    GateError(#[from] GateError),
}

/// Errors surfaced by the protocol engines.
///
/// A QKD session whose QBER exceeds the threshold is not an error; it is
/// reported through `QkdResult::secure`.
#[derive(Error, Debug, Clone)]
pub enum ProtocolError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Insufficient key material: {available} bit(s) available, {required} required")]
    InsufficientKeyMaterial { available: usize, required: usize },

    #[error("Simulation error: {0}")]
    Simulation(#[from] StateError),
}

impl ProtocolError {
    /// True when the error comes from a broken simulator invariant rather than
    /// from caller input.
    pub fn is_defect(&self) -> bool {
        matches!(self, ProtocolError::Simulation(_))
    }
}
