//! Intercepting adversary ("Eve") shared by the QKD and superdense engines.

use crate::core::errors::{ProtocolError, StateError};
use crate::{Basis, Bit, Register};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// What Eve sends on after measuring a qubit in transit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Interception {
    /// Re-prepare the classical state she observed.
    MeasureAndResend,
    /// Force the qubit to |0> regardless of the observed outcome.
    MeasureAndReset,
}

/// Basis Eve measures in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EveBasis {
    #[default]
    Rectilinear,
    Diagonal,
    Random,
}

impl EveBasis {
    fn pick<R: Rng + ?Sized>(self, rng: &mut R) -> Basis {
        match self {
            EveBasis::Rectilinear => Basis::Rectilinear,
            EveBasis::Diagonal => Basis::Diagonal,
            EveBasis::Random => Basis::random(rng),
        }
    }
}

/// Record of one interception.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Interference {
    pub basis: Basis,
    pub observed: Bit,
}

/// Intercept model applied to qubits in transit when eavesdropping is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Eavesdropper {
    pub interception: Interception,
    pub basis: EveBasis,
    /// Probability that a given qubit is intercepted.
    pub rate: f64,
}

impl Default for Eavesdropper {
    fn default() -> Self {
        Self::intercept_resend()
    }
}

impl Eavesdropper {
    /// Measures every qubit in the rectilinear basis and resends what she saw.
    pub fn intercept_resend() -> Self {
        Self {
            interception: Interception::MeasureAndResend,
            basis: EveBasis::Rectilinear,
            rate: 1.0,
        }
    }

    /// Measures every qubit in the rectilinear basis and resets it to |0>.
    pub fn intercept_reset() -> Self {
        Self {
            interception: Interception::MeasureAndReset,
            basis: EveBasis::Rectilinear,
            rate: 1.0,
        }
    }

    pub fn with_basis(mut self, basis: EveBasis) -> Self {
        self.basis = basis;
        self
    }

    pub fn with_rate(mut self, rate: f64) -> Self {
        self.rate = rate;
        self
    }

    pub fn validate(&self) -> Result<(), ProtocolError> {
        if !(0.0..=1.0).contains(&self.rate) {
            return Err(ProtocolError::InvalidInput(format!(
                "interception rate {} must be between 0.0 and 1.0",
                self.rate
            )));
        }
        Ok(())
    }

    /// Decides whether the next qubit is intercepted.
    fn attacks<R: Rng + ?Sized>(&self, rng: &mut R) -> bool {
        self.rate > 1e-12 && rng.random_bool(self.rate.min(1.0))
    }

    /// Possibly intercepts `qubit` of `register` in transit.
    ///
    /// Returns `None` when the qubit passed untouched.
    pub fn intercept<R: Rng + ?Sized>(
        &self,
        register: &mut Register,
        qubit: usize,
        rng: &mut R,
    ) -> Result<Option<Interference>, StateError> {
        if !self.attacks(rng) {
            return Ok(None);
        }

        let basis = self.basis.pick(rng);
        // measure_in leaves the qubit in the observed eigenstate, which is the resend case
        let observed = register.measure_in(qubit, basis, rng)?;

        if self.interception == Interception::MeasureAndReset {
            if let Some(rotation) = basis.rotation() {
                register.apply(&rotation, &[qubit])?;
            }
            if observed.is_one() {
                register.apply(&crate::Gate::x(), &[qubit])?;
            }
        }

        tracing::debug!(
            qubit,
            %basis,
            %observed,
            interception = ?self.interception,
            "eavesdropper intercepted qubit"
        );
        Ok(Some(Interference { basis, observed }))
    }
}
