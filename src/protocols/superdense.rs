//! Superdense coding over a pre-shared |Φ+> pair.
//!
//! The sender masks a 2-bit message with two key bits, encodes the result on
//! qubit 0 with a local Pauli, and the receiver recovers both bits with a
//! Bell-basis measurement.

use crate::core::density;
use crate::core::errors::ProtocolError;
use crate::protocols::{Eavesdropper, Interference};
use crate::{Bit, BitPair, BlochVector, Circuit, Register};
use ndarray::Array2;
use num_complex::Complex64;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Whether the shared pair was still coherent when the receiver decoded it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntanglementStatus {
    Intact,
    Destroyed,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SuperdenseConfig {
    /// Adversary model used when eavesdropping is enabled.
    pub eavesdropper: Eavesdropper,
}

impl Default for SuperdenseConfig {
    fn default() -> Self {
        Self {
            eavesdropper: Eavesdropper::intercept_reset(),
        }
    }
}

impl SuperdenseConfig {
    pub fn with_eavesdropper(mut self, eavesdropper: Eavesdropper) -> Self {
        self.eavesdropper = eavesdropper;
        self
    }
}

/// Outcome of one channel use.
#[derive(Debug, Clone, Serialize)]
pub struct SuperdenseResult {
    pub message: BitPair,
    /// Message XOR the first two key bits; what actually travels.
    pub encrypted: BitPair,
    /// Raw Bell-measurement outcome.
    pub received: BitPair,
    /// `received` XOR the key bits.
    pub decoded: BitPair,
    pub success: bool,
    pub entanglement_status: EntanglementStatus,
    pub interference: Option<Interference>,
    /// Two-qubit state right before decoding.
    pub statevector: Vec<Complex64>,
    /// Full 4x4 density matrix of the pair before decoding.
    pub density_matrix: Array2<Complex64>,
    /// Reduced density matrix of qubit 0 and qubit 1 before decoding.
    pub density_matrices: Vec<Array2<Complex64>>,
    pub bloch_vectors: Vec<BlochVector>,
    /// Entanglement entropy (bits) of each reduced state before decoding.
    pub entropies: Vec<f64>,
    /// tr(rho²) of each reduced state before decoding.
    pub purities: Vec<f64>,
}

/// Hadamard on qubit 0 then CNOT(0→1).
pub fn entangle_circuit() -> Circuit {
    Circuit::new().h(0).cnot(0, 1)
}

/// Local Pauli on qubit 0 selected by `pair`: second bit → X, first bit → Z.
pub fn encode_circuit(pair: BitPair) -> Circuit {
    let mut circuit = Circuit::new();
    if pair.second().is_one() {
        circuit = circuit.x(0);
    }
    if pair.first().is_one() {
        circuit = circuit.z(0);
    }
    circuit
}

/// Bell-basis measurement: CNOT(0→1), Hadamard on qubit 0, measure both.
pub fn decode_circuit() -> Circuit {
    Circuit::new().cnot(0, 1).h(0).measure(0).measure(1)
}

#[derive(Debug, Clone, Default)]
pub struct SuperdenseEngine {
    pub config: SuperdenseConfig,
}

impl SuperdenseEngine {
    pub fn new(config: SuperdenseConfig) -> Self {
        Self { config }
    }

    /// Sends `message` through one channel use keyed by the first two bits of `key`.
    pub fn encode_and_decode<R: Rng + ?Sized>(
        &self,
        message: BitPair,
        key: &[Bit],
        eavesdropper: bool,
        rng: &mut R,
    ) -> Result<SuperdenseResult, ProtocolError> {
        let key_pair = BitPair::from_prefix(key)?;
        self.config.eavesdropper.validate()?;

        let encrypted = message ^ key_pair;

        let mut state = Register::new(2);
        state.run(&entangle_circuit().then(&encode_circuit(encrypted)), rng)?;

        // Interception in transit, before the receiver decodes
        let interference = if eavesdropper {
            self.config.eavesdropper.intercept(&mut state, 0, rng)?
        } else {
            None
        };
        let entanglement_status = if interference.is_some() {
            EntanglementStatus::Destroyed
        } else {
            EntanglementStatus::Intact
        };

        let projections = density::project_all(&state)?;
        let statevector = state.amplitudes().to_vec();
        let density_matrix = state.density_matrix();

        let bits = state.run(&decode_circuit(), rng)?;
        let received = BitPair::from_prefix(&bits)?;
        let decoded = received ^ key_pair;
        let success = decoded == message;

        debug!(
            %message,
            %encrypted,
            %received,
            %decoded,
            success,
            status = ?entanglement_status,
            "superdense channel use"
        );

        Ok(SuperdenseResult {
            message,
            encrypted,
            received,
            decoded,
            success,
            entanglement_status,
            interference,
            statevector,
            density_matrix,
            density_matrices: projections
                .iter()
                .map(|p| p.density_matrix.clone())
                .collect(),
            bloch_vectors: projections.iter().map(|p| p.bloch).collect(),
            entropies: projections.iter().map(|p| p.entropy).collect(),
            purities: projections
                .iter()
                .map(|p| density::purity(&p.density_matrix))
                .collect(),
        })
    }
}
