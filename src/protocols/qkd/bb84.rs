//! Prepare-and-measure rounds: the sender encodes a random bit in a random basis.

use super::RoundRecord;
use crate::core::density;
use crate::core::errors::StateError;
use crate::protocols::Eavesdropper;
use crate::{Basis, Bit, Register};
use rand::Rng;

/// Runs one BB84 round on a fresh single-qubit register.
pub fn run_round<R: Rng + ?Sized>(
    eavesdropper: Option<&Eavesdropper>,
    rng: &mut R,
) -> Result<RoundRecord, StateError> {
    // Sender and receiver choices
    let sender_bit = Bit::random(rng);
    let sender_basis = Basis::random(rng);
    let receiver_basis = Basis::random(rng);

    let mut state = Register::prepare(sender_bit, sender_basis)?;
    let prepared_bloch = density::project(&state, 0)?.bloch;

    // Eavesdropper intercepts in transit
    let eavesdropper_intercepted = match eavesdropper {
        Some(eve) => eve.intercept(&mut state, 0, rng)?.is_some(),
        None => false,
    };

    let receiver_bit = state.measure_in(0, receiver_basis, rng)?;

    Ok(RoundRecord {
        sender_bit,
        sender_basis,
        receiver_basis,
        receiver_bit,
        eavesdropper_intercepted,
        prepared_bloch,
    })
}
