//! Plain-parameter entry points for callers outside the crate.
//!
//! Every call owns its own random generator. Passing the same seed and inputs
//! reproduces the same output bit for bit.

use crate::BitPair;
use crate::core::bits::{chunk_pairs, parse_bits, text_to_bits};
use crate::core::errors::ProtocolError;
use crate::protocols::qkd::{QkdConfig, QkdEngine, QkdResult};
use crate::protocols::superdense::{SuperdenseConfig, SuperdenseEngine, SuperdenseResult};
use crate::protocols::transmission::{self, TransmissionResult};
use crate::sampler::{Sampler, ShotStatistics};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::info;

/// QKD session followed by one superdense channel use keyed by its first two bits.
#[derive(Debug, Clone, Serialize)]
pub struct FullSimulationResult {
    pub qkd: QkdResult,
    pub sdc: SuperdenseResult,
}

/// QKD key assembly followed by a text transmission using that key.
#[derive(Debug, Clone, Serialize)]
pub struct TextSimulationResult {
    pub qkd: QkdResult,
    pub transmission: TransmissionResult,
}

/// Seeded generator, or one drawn from the OS when no seed is given.
pub fn rng_from_seed(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

/// Both protocol engines with their configurations.
#[derive(Debug, Clone, Default)]
pub struct QuantumSimulator {
    pub qkd: QkdEngine,
    pub superdense: SuperdenseEngine,
}

impl QuantumSimulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_qkd_config(mut self, config: QkdConfig) -> Self {
        self.qkd = QkdEngine::new(config);
        self
    }

    pub fn with_superdense_config(mut self, config: SuperdenseConfig) -> Self {
        self.superdense = SuperdenseEngine::new(config);
        self
    }

    pub fn qkd<R: Rng + ?Sized>(
        &self,
        num_rounds: usize,
        eavesdropper: bool,
        rng: &mut R,
    ) -> Result<QkdResult, ProtocolError> {
        self.qkd.run(num_rounds, eavesdropper, rng)
    }

    pub fn superdense<R: Rng + ?Sized>(
        &self,
        message: &str,
        key: &str,
        eavesdropper: bool,
        rng: &mut R,
    ) -> Result<SuperdenseResult, ProtocolError> {
        let message: BitPair = message.parse()?;
        let key = parse_bits(key)?;
        self.superdense
            .encode_and_decode(message, &key, eavesdropper, rng)
    }

    /// Assembles at least two key bits, then sends `message` with them.
    ///
    /// The eavesdropper flag applies to both stages. An insecure key is still
    /// used; the verdict is reported in `qkd.secure`.
    pub fn full<R: Rng + ?Sized>(
        &self,
        message: &str,
        num_rounds: usize,
        eavesdropper: bool,
        rng: &mut R,
    ) -> Result<FullSimulationResult, ProtocolError> {
        let message: BitPair = message.parse()?;
        let qkd = self.qkd.assemble_key(2, num_rounds, eavesdropper, rng)?;
        info!(key = %qkd.key_string(), secure = qkd.secure, "QKD stage completed");
        let sdc = self
            .superdense
            .encode_and_decode(message, &qkd.key, eavesdropper, rng)?;
        Ok(FullSimulationResult { qkd, sdc })
    }

    /// Assembles exactly the key needed for `text` and transmits it.
    pub fn text<R: Rng + ?Sized>(
        &self,
        text: &str,
        num_rounds: usize,
        eavesdropper: bool,
        rng: &mut R,
    ) -> Result<TextSimulationResult, ProtocolError> {
        if text.is_empty() {
            return Err(ProtocolError::InvalidInput(
                "cannot transmit empty text".to_string(),
            ));
        }
        let required = chunk_pairs(&text_to_bits(text)).len() * 2;
        let qkd = self
            .qkd
            .assemble_key(required, num_rounds, eavesdropper, rng)?;
        let transmission =
            transmission::transmit_text(&self.superdense, text, &qkd.key, eavesdropper, rng)?;
        Ok(TextSimulationResult { qkd, transmission })
    }

    pub fn sample<R: Rng + ?Sized>(
        &self,
        message: &str,
        key: &str,
        eavesdropper: bool,
        num_shots: usize,
        rng: &mut R,
    ) -> Result<ShotStatistics, ProtocolError> {
        let message: BitPair = message.parse()?;
        let key = parse_bits(key)?;
        let sampler = Sampler {
            engine: self.superdense.clone(),
        };
        sampler.run(message, &key, eavesdropper, num_shots, rng)
    }
}

/// One QKD session with the default configuration.
pub fn run_qkd(
    num_rounds: usize,
    eavesdropper: bool,
    rng_seed: Option<u64>,
) -> Result<QkdResult, ProtocolError> {
    QuantumSimulator::new().qkd(num_rounds, eavesdropper, &mut rng_from_seed(rng_seed))
}

/// One superdense channel use. `message` must be a 2-bit string and `key` a
/// bit string of at least 2 bits.
pub fn run_superdense(
    message: &str,
    key: &str,
    eavesdropper: bool,
    rng_seed: Option<u64>,
) -> Result<SuperdenseResult, ProtocolError> {
    QuantumSimulator::new().superdense(message, key, eavesdropper, &mut rng_from_seed(rng_seed))
}

/// QKD followed by a superdense channel use keyed by the resulting key.
pub fn run_full_simulation(
    message: &str,
    num_rounds: usize,
    eavesdropper: bool,
    rng_seed: Option<u64>,
) -> Result<FullSimulationResult, ProtocolError> {
    QuantumSimulator::new().full(message, num_rounds, eavesdropper, &mut rng_from_seed(rng_seed))
}

/// QKD key assembly followed by a block-wise text transmission.
pub fn transmit_text(
    text: &str,
    num_rounds: usize,
    eavesdropper: bool,
    rng_seed: Option<u64>,
) -> Result<TextSimulationResult, ProtocolError> {
    QuantumSimulator::new().text(text, num_rounds, eavesdropper, &mut rng_from_seed(rng_seed))
}

/// Repeated superdense channel uses of the same message and key.
pub fn sample_superdense(
    message: &str,
    key: &str,
    eavesdropper: bool,
    num_shots: usize,
    rng_seed: Option<u64>,
) -> Result<ShotStatistics, ProtocolError> {
    QuantumSimulator::new().sample(
        message,
        key,
        eavesdropper,
        num_shots,
        &mut rng_from_seed(rng_seed),
    )
}
