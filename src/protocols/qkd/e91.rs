//! Entanglement-based rounds.
//!
//! A source distributes a |Φ+> pair; the sender keeps qubit 0 and qubit 1
//! travels to the receiver. Both parties measure in independently chosen
//! random bases, and the sender's outcome plays the role of the sender's bit.

use super::RoundRecord;
use crate::core::density;
use crate::core::errors::StateError;
use crate::protocols::Eavesdropper;
use crate::{Basis, Circuit, Register};
use rand::Rng;

/// Runs one entangled round on a fresh two-qubit register.
pub fn run_round<R: Rng + ?Sized>(
    eavesdropper: Option<&Eavesdropper>,
    rng: &mut R,
) -> Result<RoundRecord, StateError> {
    let sender_basis = Basis::random(rng);
    let receiver_basis = Basis::random(rng);

    // Create EPR pair from two independent qubits
    let mut state = Register::new(1).tensor(&Register::new(1));
    state.run(&Circuit::new().h(0).cnot(0, 1), rng)?;
    let prepared_bloch = density::project(&state, 1)?.bloch;

    // Eavesdropper intercepts the receiver's half
    let eavesdropper_intercepted = match eavesdropper {
        Some(eve) => eve.intercept(&mut state, 1, rng)?.is_some(),
        None => false,
    };

    let sender_bit = state.measure_in(0, sender_basis, rng)?;
    let receiver_bit = state.measure_in(1, receiver_basis, rng)?;

    Ok(RoundRecord {
        sender_bit,
        sender_basis,
        receiver_basis,
        receiver_bit,
        eavesdropper_intercepted,
        prepared_bloch,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn pair_is_correlated_in_both_bases() {
        let mut rng = StdRng::seed_from_u64(31);
        let mut matched = 0;
        for _ in 0..200 {
            let r = run_round(None, &mut rng).unwrap();
            if r.sender_basis == r.receiver_basis {
                matched += 1;
                assert_eq!(r.sender_bit, r.receiver_bit);
            }
        }
        assert!(matched > 50);
    }

    #[test]
    fn rectilinear_eve_breaks_diagonal_correlation() {
        let mut rng = StdRng::seed_from_u64(32);
        let eve = Eavesdropper::intercept_resend();
        let mut diagonal = 0;
        let mut errors = 0;
        for _ in 0..2000 {
            let r = run_round(Some(&eve), &mut rng).unwrap();
            if r.sender_basis == Basis::Diagonal && r.receiver_basis == Basis::Diagonal {
                diagonal += 1;
                errors += (r.sender_bit != r.receiver_bit) as usize;
            }
        }
        let rate = errors as f64 / diagonal as f64;
        assert!((rate - 0.5).abs() < 0.1, "diagonal error rate {rate}");
    }
}
