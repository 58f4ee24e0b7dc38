use crate::core::errors::ProtocolError;
use crate::protocols::superdense::{SuperdenseConfig, SuperdenseEngine};
use crate::{Bit, BitPair};
use rand::Rng;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::info;

/// Distribution of received and decoded pairs over repeated channel uses.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShotStatistics {
    pub message: BitPair,
    pub shots: usize,
    /// Decoded pair -> number of shots. Every pair is present, possibly with 0.
    pub counts: BTreeMap<BitPair, usize>,
    /// Raw Bell-measurement outcome (still masked by the key) -> number of shots.
    pub raw_counts: BTreeMap<BitPair, usize>,
    /// Fraction of shots whose decoded pair equals the message.
    pub success_rate: f64,
    /// Fraction of individual decoded bits equal to the message bits.
    pub bit_match_rate: f64,
}

/// A simulator for sampling the superdense channel.
///
/// The `Sampler` repeats the full circuit (entangle, encode, optional
/// interception, decode) once per shot, since interception is not unitary.
#[derive(Debug, Clone, Default)]
pub struct Sampler {
    pub engine: SuperdenseEngine,
}

impl Sampler {
    /// Creates a new `Sampler` with the default channel configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the channel configuration for the sampler.
    pub fn with_config(mut self, config: SuperdenseConfig) -> Self {
        self.engine = SuperdenseEngine::new(config);
        self
    }

    /// Sends `message` `num_shots` times with the same key bits and tallies
    /// both the raw and the decoded pairs.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for zero shots, `InsufficientKeyMaterial` for a key
    /// shorter than 2 bits.
    pub fn run<R: Rng + ?Sized>(
        &self,
        message: BitPair,
        key: &[Bit],
        eavesdropper: bool,
        num_shots: usize,
        rng: &mut R,
    ) -> Result<ShotStatistics, ProtocolError> {
        if num_shots == 0 {
            return Err(ProtocolError::InvalidInput(
                "number of shots must be positive".to_string(),
            ));
        }

        let empty: BTreeMap<BitPair, usize> = BitPair::ALL.iter().map(|&p| (p, 0)).collect();
        let mut counts = empty.clone();
        let mut raw_counts = empty;
        let mut matching_bits = 0;

        for _ in 0..num_shots {
            let result = self
                .engine
                .encode_and_decode(message, key, eavesdropper, rng)?;
            *counts.entry(result.decoded).or_insert(0) += 1;
            *raw_counts.entry(result.received).or_insert(0) += 1;
            matching_bits += result.decoded.matching_bits(message);
        }

        let hits = counts.get(&message).copied().unwrap_or(0);
        let success_rate = hits as f64 / num_shots as f64;
        let bit_match_rate = matching_bits as f64 / (2 * num_shots) as f64;

        info!(
            %message,
            shots = num_shots,
            success_rate,
            bit_match_rate,
            eavesdropper,
            "sampling completed"
        );

        Ok(ShotStatistics {
            message,
            shots: num_shots,
            counts,
            raw_counts,
            success_rate,
            bit_match_rate,
        })
    }
}
