pub mod bits;
mod circuit;
pub mod density;
pub mod errors;
mod gates;
mod measurements;
mod state;
pub mod utils;

pub use bits::{Bit, BitPair};
pub use circuit::{Circuit, Operation};
pub use density::{BlochVector, QubitProjection};
pub use gates::Gate;
pub use measurements::Basis;
pub use state::Register;
