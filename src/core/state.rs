use crate::core::Gate;
use crate::core::bits::Bit;
use crate::core::circuit::{Circuit, Operation};
use crate::core::errors::StateError;
use crate::core::measurements::Basis;
use crate::core::utils;
use ndarray::{Array1, Array2};
use num_complex::Complex64;
use rand::Rng;

/// An n-qubit pure state stored as a normalized vector of 2^n amplitudes.
///
/// Qubit `q` corresponds to bit `q` of the basis-state index.
#[derive(Clone, Debug, PartialEq)]
pub struct Register {
    amplitudes: Array1<Complex64>,
    num_qubits: usize,
}

impl Register {
    /// Creates a new register initialized to |0...0>.
    pub fn new(num_qubits: usize) -> Self {
        let dim = 1 << num_qubits;
        let mut amplitudes = Array1::<Complex64>::zeros(dim);
        amplitudes[0] = Complex64::new(1.0, 0.0);

        Self {
            amplitudes,
            num_qubits,
        }
    }

    /// Creates a single-qubit register holding `bit` encoded in `basis`.
    pub fn prepare(bit: Bit, basis: Basis) -> Result<Self, StateError> {
        let mut register = Self::new(1);
        if bit.is_one() {
            register.apply(&Gate::x(), &[0])?;
        }
        if let Some(rotation) = basis.rotation() {
            register.apply(&rotation, &[0])?;
        }
        Ok(register)
    }

    /// Validates that the input vector is a valid state.
    fn check_vector_state(vector: &Array1<Complex64>) -> Result<(), StateError> {
        if !vector.len().is_power_of_two() {
            return Err(StateError::InvalidDimensions);
        }
        utils::check_normalized(vector)
    }

    /// Creates a register from an amplitude vector.
    pub fn from_state_vector(vector: Array1<Complex64>) -> Result<Self, StateError> {
        Self::check_vector_state(&vector)?;
        let num_qubits = vector.len().trailing_zeros() as usize;

        Ok(Self {
            amplitudes: vector,
            num_qubits,
        })
    }

    pub fn amplitudes(&self) -> &Array1<Complex64> {
        &self.amplitudes
    }

    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Born-rule probability of every basis state.
    pub fn probabilities(&self) -> Vec<f64> {
        self.amplitudes.iter().map(|c| c.norm_sqr()).collect()
    }

    /// Density matrix of the pure state: rho = |psi><psi|
    pub fn density_matrix(&self) -> Array2<Complex64> {
        utils::outer_product(&self.amplitudes, &self.amplitudes)
    }

    /// Checks if the register still holds a unit-norm state.
    pub fn is_valid(&self) -> Result<(), StateError> {
        Self::check_vector_state(&self.amplitudes)
    }

    /// Composes two independent registers.
    ///
    /// Qubits of `self` keep their indices; those of `other` are appended after them.
    pub fn tensor(&self, other: &Register) -> Register {
        Register {
            amplitudes: utils::kronecker_vector(&other.amplitudes, &self.amplitudes),
            num_qubits: self.num_qubits + other.num_qubits,
        }
    }

    /// Checks if a given index is within the register's range
    fn validate_qubit_index(&self, index: usize) -> Result<(), StateError> {
        if index >= self.num_qubits {
            return Err(StateError::IndexOutOfBounds {
                index,
                num_qubits: self.num_qubits,
            });
        }
        Ok(())
    }

    /// Apply already extended operator to the whole system
    fn apply_operator(&mut self, u: &Array2<Complex64>) -> Result<(), StateError> {
        let next = utils::apply_matrix(u, &self.amplitudes)?;
        utils::check_normalized(&next)?;
        self.amplitudes = next;
        Ok(())
    }

    /// Applies non controlled gate
    pub fn apply(&mut self, gate: &Gate, target_qubits: &[usize]) -> Result<(), StateError> {
        self.apply_controlled(gate, target_qubits, None)
    }

    /// Applies generic gate
    pub fn apply_controlled(
        &mut self,
        gate: &Gate,
        target_qubits: &[usize],
        control_qubits: Option<&[usize]>,
    ) -> Result<(), StateError> {
        if gate.num_qubits != target_qubits.len() {
            return Err(StateError::DimensionMismatch {
                expected: gate.num_qubits,
                got_rows: target_qubits.len(),
                got_cols: 0,
            });
        }

        for &q in target_qubits {
            self.validate_qubit_index(q)?;
        }

        let controls = control_qubits.unwrap_or(&[]);
        for &q in controls {
            self.validate_qubit_index(q)?;
        }

        let full_gate_operator = Gate::expand_gate(self.num_qubits, gate, target_qubits, controls)?;

        self.apply_operator(&full_gate_operator.matrix)
    }

    /// Applies one circuit step. Returns the observed bit for `Measure`.
    pub fn apply_operation<R: Rng + ?Sized>(
        &mut self,
        op: &Operation,
        rng: &mut R,
    ) -> Result<Option<Bit>, StateError> {
        match *op {
            Operation::Hadamard(q) => self.apply(&Gate::h(), &[q])?,
            Operation::PauliX(q) => self.apply(&Gate::x(), &[q])?,
            Operation::PauliZ(q) => self.apply(&Gate::z(), &[q])?,
            Operation::Cnot { control, target } => {
                self.apply_controlled(&Gate::x(), &[target], Some(&[control]))?
            }
            Operation::Measure(q) => return self.measure(q, rng).map(Some),
        }
        Ok(None)
    }

    /// Runs a circuit in order, returning the measured bits in measurement order.
    pub fn run<R: Rng + ?Sized>(
        &mut self,
        circuit: &Circuit,
        rng: &mut R,
    ) -> Result<Vec<Bit>, StateError> {
        let width = circuit.min_qubits();
        if width > self.num_qubits {
            return Err(StateError::IndexOutOfBounds {
                index: width - 1,
                num_qubits: self.num_qubits,
            });
        }
        let mut outcomes = Vec::new();
        for op in circuit.operations() {
            if let Some(bit) = self.apply_operation(op, rng)? {
                outcomes.push(bit);
            }
        }
        Ok(outcomes)
    }

    /// Probability of observing |1> on `qubit` in the computational basis.
    pub fn probability_of_one(&self, qubit: usize) -> Result<f64, StateError> {
        self.validate_qubit_index(qubit)?;
        let mask = 1 << qubit;
        Ok(self
            .amplitudes
            .iter()
            .enumerate()
            .filter(|(idx, _)| idx & mask != 0)
            .map(|(_, c)| c.norm_sqr())
            .sum())
    }

    /// Physical measurement in the computational basis, which changes the state irretrievably.
    pub fn measure<R: Rng + ?Sized>(
        &mut self,
        qubit: usize,
        rng: &mut R,
    ) -> Result<Bit, StateError> {
        let p_one = self.probability_of_one(qubit)?;
        let roll: f64 = rng.random();
        let outcome = Bit::from(roll < p_one);

        // Project onto the observed subspace and renormalize
        let mask = 1 << qubit;
        let projected = Array1::from_iter(self.amplitudes.iter().enumerate().map(|(idx, &c)| {
            if (idx & mask != 0) == outcome.is_one() {
                c
            } else {
                Complex64::new(0.0, 0.0)
            }
        }));
        self.amplitudes = utils::normalize(&projected)?;

        Ok(outcome)
    }

    /// Measures `qubit` in `basis`, leaving it in the matching eigenstate.
    pub fn measure_in<R: Rng + ?Sized>(
        &mut self,
        qubit: usize,
        basis: Basis,
        rng: &mut R,
    ) -> Result<Bit, StateError> {
        match basis.rotation() {
            None => self.measure(qubit, rng),
            Some(rotation) => {
                self.apply(&rotation, &[qubit])?;
                let bit = self.measure(qubit, rng)?;
                self.apply(&rotation, &[qubit])?;
                Ok(bit)
            }
        }
    }

    /// Measures `qubit` and then forces it to |0>. Returns the observed bit.
    pub fn reset<R: Rng + ?Sized>(&mut self, qubit: usize, rng: &mut R) -> Result<Bit, StateError> {
        let bit = self.measure(qubit, rng)?;
        if bit.is_one() {
            self.apply(&Gate::x(), &[qubit])?;
        }
        Ok(bit)
    }
}
