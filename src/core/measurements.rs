use crate::core::Gate;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Single-qubit measurement basis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Basis {
    /// Z basis (Computational) -> {|0>, |1>}.
    #[serde(rename = "Z")]
    Rectilinear,
    /// X basis (Hadamard) -> {|+>, |->}.
    #[serde(rename = "X")]
    Diagonal,
}

impl Basis {
    /// Draws a uniformly random basis.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        if rng.random_bool(0.5) {
            Basis::Diagonal
        } else {
            Basis::Rectilinear
        }
    }

    /// Unitary that maps this basis onto the computational one, if any.
    ///
    /// Hadamard is self-inverse so the same gate rotates back.
    pub fn rotation(self) -> Option<Gate> {
        match self {
            Basis::Rectilinear => None,
            Basis::Diagonal => Some(Gate::h()),
        }
    }
}

impl fmt::Display for Basis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Basis::Rectilinear => write!(f, "Z"),
            Basis::Diagonal => write!(f, "X"),
        }
    }
}
