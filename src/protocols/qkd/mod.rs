//! Quantum Key Distribution (QKD).
//!
//! Two round generators feed the same sifting and verdict stage:
//! - **BB84**: prepare-and-measure single qubits.
//! - **E91**: entangled pairs measured by both parties.

pub mod bb84;
pub mod e91;

use crate::core::bits::format_bits;
use crate::core::errors::ProtocolError;
use crate::protocols::Eavesdropper;
use crate::{Basis, Bit, BlochVector};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// QBER at or above which a session is judged insecure.
pub const DEFAULT_QBER_THRESHOLD: f64 = 0.11;

/// Upper bound on sessions run while assembling a longer key.
pub const DEFAULT_MAX_SESSIONS: usize = 64;

/// How rounds are generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum QkdMode {
    #[default]
    PrepareAndMeasure,
    Entanglement,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QkdConfig {
    pub mode: QkdMode,
    pub qber_threshold: f64,
    /// Adversary model used when eavesdropping is enabled for a session.
    pub eavesdropper: Eavesdropper,
    pub max_sessions: usize,
}

impl Default for QkdConfig {
    fn default() -> Self {
        Self {
            mode: QkdMode::default(),
            qber_threshold: DEFAULT_QBER_THRESHOLD,
            eavesdropper: Eavesdropper::intercept_resend(),
            max_sessions: DEFAULT_MAX_SESSIONS,
        }
    }
}

impl QkdConfig {
    pub fn with_mode(mut self, mode: QkdMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_threshold(mut self, qber_threshold: f64) -> Self {
        self.qber_threshold = qber_threshold;
        self
    }

    pub fn with_eavesdropper(mut self, eavesdropper: Eavesdropper) -> Self {
        self.eavesdropper = eavesdropper;
        self
    }

    pub fn with_max_sessions(mut self, max_sessions: usize) -> Self {
        self.max_sessions = max_sessions;
        self
    }

    pub fn validate(&self) -> Result<(), ProtocolError> {
        if !(0.0..=1.0).contains(&self.qber_threshold) {
            return Err(ProtocolError::InvalidInput(format!(
                "QBER threshold {} must be between 0.0 and 1.0",
                self.qber_threshold
            )));
        }
        if self.max_sessions == 0 {
            return Err(ProtocolError::InvalidInput(
                "max_sessions must be at least 1".to_string(),
            ));
        }
        self.eavesdropper.validate()
    }
}

/// One protocol iteration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RoundRecord {
    pub sender_bit: Bit,
    pub sender_basis: Basis,
    pub receiver_basis: Basis,
    pub receiver_bit: Bit,
    pub eavesdropper_intercepted: bool,
    /// Bloch vector of the qubit in transit as it leaves its source, before
    /// any interception.
    pub prepared_bloch: BlochVector,
}

/// Outcome of basis reconciliation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sifting {
    /// (sender_bit, receiver_bit) for every round with matching bases.
    pub sifted: Vec<(Bit, Bit)>,
    /// Matching-basis rounds where both bits agree.
    pub key: Vec<Bit>,
    pub mismatches: usize,
}

impl Sifting {
    /// Mismatches over matched rounds; 1.0 when nothing survived sifting.
    pub fn qber(&self) -> f64 {
        if self.sifted.is_empty() {
            1.0
        } else {
            self.mismatches as f64 / self.sifted.len() as f64
        }
    }
}

/// Keeps rounds with matching bases and splits them into key bits and errors.
pub fn sift(rounds: &[RoundRecord]) -> Sifting {
    let mut out = Sifting::default();
    for r in rounds.iter().filter(|r| r.sender_basis == r.receiver_basis) {
        out.sifted.push((r.sender_bit, r.receiver_bit));
        if r.sender_bit == r.receiver_bit {
            out.key.push(r.sender_bit);
        } else {
            out.mismatches += 1;
        }
    }
    out
}

/// Result of a key exchange.
///
/// When produced by [`QkdEngine::assemble_key`], `key`, `rounds` and `sifted`
/// span every session while `qber`, `mismatches` and `secure` describe only
/// the most recent session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QkdResult {
    pub key: Vec<Bit>,
    pub qber: f64,
    pub secure: bool,
    /// Whether eavesdropping was enabled by the caller.
    pub eavesdropper: bool,
    pub mismatches: usize,
    pub sifted: Vec<(Bit, Bit)>,
    pub rounds: Vec<RoundRecord>,
    pub sessions: usize,
}

impl QkdResult {
    pub fn key_string(&self) -> String {
        format_bits(&self.key)
    }

    pub fn matched_rounds(&self) -> usize {
        self.sifted.len()
    }

    pub fn intercepted_rounds(&self) -> usize {
        self.rounds
            .iter()
            .filter(|r| r.eavesdropper_intercepted)
            .count()
    }
}

/// Runs key-exchange sessions with a fixed configuration.
#[derive(Debug, Clone, Default)]
pub struct QkdEngine {
    pub config: QkdConfig,
}

impl QkdEngine {
    pub fn new(config: QkdConfig) -> Self {
        Self { config }
    }

    /// Runs one session of `num_rounds` rounds.
    pub fn run<R: Rng + ?Sized>(
        &self,
        num_rounds: usize,
        eavesdropper: bool,
        rng: &mut R,
    ) -> Result<QkdResult, ProtocolError> {
        self.config.validate()?;
        if num_rounds == 0 {
            return Err(ProtocolError::InvalidInput(
                "number of rounds must be positive".to_string(),
            ));
        }

        let eve = eavesdropper.then_some(&self.config.eavesdropper);
        let mut rounds = Vec::with_capacity(num_rounds);
        for _ in 0..num_rounds {
            let round = match self.config.mode {
                QkdMode::PrepareAndMeasure => bb84::run_round(eve, rng)?,
                QkdMode::Entanglement => e91::run_round(eve, rng)?,
            };
            rounds.push(round);
        }

        let sifting = sift(&rounds);
        let qber = sifting.qber();
        let secure = qber < self.config.qber_threshold && !eavesdropper;

        info!(
            mode = ?self.config.mode,
            rounds = num_rounds,
            sifted = sifting.sifted.len(),
            key_len = sifting.key.len(),
            qber,
            secure,
            "QKD session completed"
        );
        if !secure {
            warn!(
                qber,
                threshold = self.config.qber_threshold,
                eavesdropper,
                "QKD session is not secure"
            );
        }

        Ok(QkdResult {
            key: sifting.key,
            qber,
            secure,
            eavesdropper,
            mismatches: sifting.mismatches,
            sifted: sifting.sifted,
            rounds,
            sessions: 1,
        })
    }

    /// Repeats sessions until at least `required_len` key bits exist, then
    /// truncates the key to exactly `required_len`.
    ///
    /// The security fields of the result come from the last session only.
    pub fn assemble_key<R: Rng + ?Sized>(
        &self,
        required_len: usize,
        num_rounds: usize,
        eavesdropper: bool,
        rng: &mut R,
    ) -> Result<QkdResult, ProtocolError> {
        if required_len == 0 {
            return Err(ProtocolError::InvalidInput(
                "required key length must be positive".to_string(),
            ));
        }

        let mut assembled = self.run(num_rounds, eavesdropper, rng)?;
        while assembled.key.len() < required_len {
            if assembled.sessions >= self.config.max_sessions {
                return Err(ProtocolError::InsufficientKeyMaterial {
                    available: assembled.key.len(),
                    required: required_len,
                });
            }
            warn!(
                have = assembled.key.len(),
                required = required_len,
                "key too short, running another QKD session"
            );
            let next = self.run(num_rounds, eavesdropper, rng)?;
            assembled.key.extend(next.key);
            assembled.sifted.extend(next.sifted);
            assembled.rounds.extend(next.rounds);
            assembled.qber = next.qber;
            assembled.secure = next.secure;
            assembled.mismatches = next.mismatches;
            assembled.sessions += 1;
        }
        assembled.key.truncate(required_len);
        Ok(assembled)
    }
}
