//! Immutable gate sequences applied to a [`Register`](crate::Register).

use serde::{Deserialize, Serialize};

/// One step of a circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    Hadamard(usize),
    PauliX(usize),
    PauliZ(usize),
    Cnot { control: usize, target: usize },
    Measure(usize),
}

impl Operation {
    /// Qubit indices touched by the operation.
    pub fn qubits(&self) -> Vec<usize> {
        match *self {
            Operation::Hadamard(q)
            | Operation::PauliX(q)
            | Operation::PauliZ(q)
            | Operation::Measure(q) => vec![q],
            Operation::Cnot { control, target } => vec![control, target],
        }
    }
}

/// Ordered list of operations. Operations are applied strictly in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Circuit {
    operations: Vec<Operation>,
}

impl Circuit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn h(self, qubit: usize) -> Self {
        self.push(Operation::Hadamard(qubit))
    }

    pub fn x(self, qubit: usize) -> Self {
        self.push(Operation::PauliX(qubit))
    }

    pub fn z(self, qubit: usize) -> Self {
        self.push(Operation::PauliZ(qubit))
    }

    pub fn cnot(self, control: usize, target: usize) -> Self {
        self.push(Operation::Cnot { control, target })
    }

    pub fn measure(self, qubit: usize) -> Self {
        self.push(Operation::Measure(qubit))
    }

    /// Appends every operation of `other`.
    pub fn then(mut self, other: &Circuit) -> Self {
        self.operations.extend_from_slice(&other.operations);
        self
    }

    fn push(mut self, op: Operation) -> Self {
        self.operations.push(op);
        self
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Smallest register width able to hold the circuit.
    pub fn min_qubits(&self) -> usize {
        self.operations
            .iter()
            .flat_map(|op| op.qubits())
            .max()
            .map_or(0, |q| q + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_keeps_insertion_order() {
        let c = Circuit::new().h(0).cnot(0, 1).measure(1);
        assert_eq!(
            c.operations(),
            &[
                Operation::Hadamard(0),
                Operation::Cnot {
                    control: 0,
                    target: 1
                },
                Operation::Measure(1),
            ]
        );
        assert_eq!(c.min_qubits(), 2);
    }

    #[test]
    fn then_concatenates() {
        let a = Circuit::new().x(0);
        let b = Circuit::new().z(2);
        let c = a.then(&b);
        assert_eq!(c.len(), 2);
        assert_eq!(c.min_qubits(), 3);
        assert!(Circuit::new().is_empty());
    }
}
