//! Simulation of a BB84/E91 quantum key exchange whose key masks messages
//! sent over a superdense-coding channel, with an optional intercepting
//! eavesdropper.

mod core;
pub mod protocols;
mod sampler;
mod simulator;

pub use crate::core::{
    Basis, Bit, BitPair, BlochVector, Circuit, Gate, Operation, QubitProjection, Register, bits,
    density, errors, utils,
};
pub use crate::protocols::qkd::{QkdConfig, QkdEngine, QkdMode, QkdResult, RoundRecord};
pub use crate::protocols::superdense::{
    EntanglementStatus, SuperdenseConfig, SuperdenseEngine, SuperdenseResult,
};
pub use crate::protocols::transmission::TransmissionResult;
pub use crate::protocols::{Eavesdropper, EveBasis, Interception};
pub use crate::sampler::{Sampler, ShotStatistics};
pub use crate::simulator::{
    FullSimulationResult, QuantumSimulator, TextSimulationResult, rng_from_seed,
    run_full_simulation, run_qkd, run_superdense, sample_superdense, transmit_text,
};
