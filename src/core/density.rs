//! Read-only projections of a register onto a single qubit.
//!
//! Nothing here mutates the register, so the projections can be taken on
//! intermediate, pre-measurement states.

use crate::core::Gate;
use crate::core::errors::StateError;
use crate::core::state::Register;
use crate::core::utils;
use ndarray::Array2;
use num_complex::Complex64;
use serde::Serialize;

/// Pauli expectation values of a single-qubit reduced state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BlochVector {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl BlochVector {
    /// Euclidean length: 1 for pure states, 0 for the maximally mixed state.
    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

/// Everything reported about one qubit of a register.
#[derive(Debug, Clone, Serialize)]
pub struct QubitProjection {
    pub qubit: usize,
    pub density_matrix: Array2<Complex64>,
    pub bloch: BlochVector,
    /// Von Neumann entropy of the reduced state, in bits.
    pub entropy: f64,
}

/// Reduced density matrix of `keep_qubit`, tracing out every other qubit.
pub fn reduce(register: &Register, keep_qubit: usize) -> Result<Array2<Complex64>, StateError> {
    let n = register.num_qubits();
    if keep_qubit >= n {
        return Err(StateError::IndexOutOfBounds {
            index: keep_qubit,
            num_qubits: n,
        });
    }
    let trace_out: Vec<usize> = (0..n).filter(|&q| q != keep_qubit).collect();
    utils::partial_trace(&register.density_matrix(), n, &trace_out)
}

/// Expectation value tr(rho · P) for each Pauli operator.
pub fn bloch_vector(rho: &Array2<Complex64>) -> Result<BlochVector, StateError> {
    let (rows, cols) = rho.dim();
    if rows != 2 || cols != 2 {
        return Err(StateError::DimensionMismatch {
            expected: 2,
            got_rows: rows,
            got_cols: cols,
        });
    }
    let expectation = |pauli: Gate| utils::trace(&rho.dot(&pauli.matrix)).re;

    Ok(BlochVector {
        x: expectation(Gate::x()),
        y: expectation(Gate::y()),
        z: expectation(Gate::z()),
    })
}

/// tr(rho²): 1 for pure states, 1/d for the maximally mixed state.
pub fn purity(rho: &Array2<Complex64>) -> f64 {
    utils::trace(&rho.dot(rho)).re
}

/// Reduced state, Bloch vector and entropy of one qubit.
pub fn project(register: &Register, qubit: usize) -> Result<QubitProjection, StateError> {
    let density_matrix = reduce(register, qubit)?;
    let bloch = bloch_vector(&density_matrix)?;
    let entropy = utils::von_neumann_entropy(&density_matrix);
    Ok(QubitProjection {
        qubit,
        density_matrix,
        bloch,
        entropy,
    })
}

/// Projections of every qubit in the register, in index order.
pub fn project_all(register: &Register) -> Result<Vec<QubitProjection>, StateError> {
    (0..register.num_qubits())
        .map(|q| project(register, q))
        .collect()
}
