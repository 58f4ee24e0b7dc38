//! Quantum communication protocols.
//!
//! This module contains the QKD key exchange, the superdense-coding channel
//! it keys, text transmission over that channel, and the shared adversary model.

pub mod eavesdropper;
pub mod qkd;
pub mod superdense;
pub mod transmission;

pub use eavesdropper::{Eavesdropper, EveBasis, Interception, Interference};
pub use qkd::{bb84, e91};
