//! Linear-algebra kernel for the simulator.
//!
//! This module contains helper functions for:
//! - Kronecker products of vectors and matrices.
//! - Operator expansion to larger systems and matrix-vector application.
//! - Normalization checks on amplitude vectors.
//! - Partial traces and entropy of density matrices.
//! - Bit manipulation for basis-state indices.

use crate::core::errors::StateError;
use nalgebra::DMatrix;
use ndarray::{Array1, Array2, Axis};
use num_complex::Complex64;

/// Tolerance on `|‖ψ‖² - 1|` before a state is considered numerically unstable.
pub const NORM_TOLERANCE: f64 = 1e-9;

/// Computes the Kronecker (Tensor) product of two matrices.
///
/// If `A` is an $m \times n$ matrix and `B` is a $p \times q$ matrix,
/// the result is an $mp \times nq$ matrix.
pub fn kronecker_product(a: &Array2<Complex64>, b: &Array2<Complex64>) -> Array2<Complex64> {
    let (m, n) = a.dim();
    let (p, q) = b.dim();

    // A as (m, 1, n, 1) times B as (1, p, 1, q), broadcast to (m, p, n, q)
    let a_expanded = a.view().insert_axis(Axis(1)).insert_axis(Axis(3));
    let b_expanded = b.view().insert_axis(Axis(0)).insert_axis(Axis(2));
    let tensor_product = &a_expanded * &b_expanded;

    let mut out = Array2::<Complex64>::zeros((m * p, n * q));
    for ((i, k, j, l), val) in tensor_product.indexed_iter() {
        out[[i * p + k, j * q + l]] = *val;
    }
    out
}

/// Computes the Kronecker product of two state vectors.
///
/// `a` occupies the high-order bits of the resulting index, so with the
/// little-endian qubit convention the qubits of `b` keep their indices and
/// those of `a` are shifted up by `log2(b.len())`.
pub fn kronecker_vector(a: &Array1<Complex64>, b: &Array1<Complex64>) -> Array1<Complex64> {
    let p = b.len();
    let mut out = Array1::<Complex64>::zeros(a.len() * p);
    for (i, &x) in a.iter().enumerate() {
        for (k, &y) in b.iter().enumerate() {
            out[i * p + k] = x * y;
        }
    }
    out
}

/// Applies a square matrix to a state vector.
pub fn apply_matrix(
    matrix: &Array2<Complex64>,
    vector: &Array1<Complex64>,
) -> Result<Array1<Complex64>, StateError> {
    let (rows, cols) = matrix.dim();
    if rows != cols || cols != vector.len() {
        return Err(StateError::DimensionMismatch {
            expected: vector.len(),
            got_rows: rows,
            got_cols: cols,
        });
    }
    Ok(matrix.dot(vector))
}

/// Sum of squared amplitude magnitudes.
pub fn norm_sqr(vector: &Array1<Complex64>) -> f64 {
    vector.iter().map(|c| c.norm_sqr()).sum()
}

/// Fails with `NumericalInstability` if the vector is not unit norm.
pub fn check_normalized(vector: &Array1<Complex64>) -> Result<(), StateError> {
    let n = norm_sqr(vector);
    if (n - 1.0).abs() > NORM_TOLERANCE {
        return Err(StateError::NumericalInstability { norm_sqr: n });
    }
    Ok(())
}

/// Rescales a vector to unit norm.
pub fn normalize(vector: &Array1<Complex64>) -> Result<Array1<Complex64>, StateError> {
    let n = norm_sqr(vector);
    if !n.is_finite() || n < f64::EPSILON {
        return Err(StateError::NumericalInstability { norm_sqr: n });
    }
    let scale = Complex64::new(1.0 / n.sqrt(), 0.0);
    Ok(vector.mapv(|c| c * scale))
}

/// Computes the trace of a matrix (sum of diagonal elements).
pub fn trace(matrix: &Array2<Complex64>) -> Complex64 {
    matrix.diag().sum()
}

/// Generates the full operator matrix ($2^N \times 2^N$) for the whole system.
///
/// It expands a local operator acting on `targets` (and controlled by `controls`)
/// to an operator on the full system of `num_total_qubits`.
pub fn expand_operator(
    num_total_qubits: usize,
    matrix: &Array2<Complex64>,
    targets: &[usize],
    controls: &[usize],
) -> Array2<Complex64> {
    let dim = 1 << num_total_qubits;
    let mut full_matrix = Array2::<Complex64>::zeros((dim, dim));

    let mut control_mask = 0usize;
    for &c in controls {
        control_mask |= 1 << c;
    }
    let mut target_mask = 0usize;
    for &t in targets {
        target_mask |= 1 << t;
    }
    let passive_mask = !target_mask;

    for col_idx in 0..dim {
        // Column untouched unless every control bit is set
        if (col_idx & control_mask) != control_mask {
            full_matrix[[col_idx, col_idx]] = Complex64::new(1.0, 0.0);
            continue;
        }
        let small_col = extract_bits(col_idx, targets);
        for small_row in 0..matrix.nrows() {
            let val = matrix[[small_row, small_col]];
            if val.norm_sqr() < f64::EPSILON {
                continue;
            }
            // Keep passive bits, scatter the local row bits onto the targets
            let row_idx = (col_idx & passive_mask) | deposit_bits(small_row, targets);
            full_matrix[[row_idx, col_idx]] = val;
        }
    }
    full_matrix
}

/// Extracts the bits in positions `indices` of the sequence `value`
pub fn extract_bits(value: usize, indices: &[usize]) -> usize {
    let mut result = 0;
    for (i, &pos) in indices.iter().enumerate() {
        if (value >> pos) & 1 == 1 {
            result |= 1 << i;
        }
    }
    result
}

/// Scatters bits from `compact_value` into the positions specified by `indices`.
pub fn deposit_bits(compact_value: usize, indices: &[usize]) -> usize {
    let mut result = 0;
    for (i, &pos) in indices.iter().enumerate() {
        if (compact_value >> i) & 1 == 1 {
            result |= 1 << pos;
        }
    }
    result
}

/// Find duplicate in a slice of usize
pub fn find_duplicate(indices: &[usize]) -> Option<usize> {
    let mut seen = std::collections::HashSet::new();
    indices.iter().find(|&&idx| !seen.insert(idx)).copied()
}

/// Computes the outer product of two vectors $|a\rangle\langle b|$.
pub fn outer_product(a: &Array1<Complex64>, b: &Array1<Complex64>) -> Array2<Complex64> {
    let n = a.len();
    let m = b.len();
    let mut res = Array2::zeros((n, m));

    for i in 0..n {
        for j in 0..m {
            res[[i, j]] = a[i] * b[j].conj();
        }
    }
    res
}

/// Traces `trace_out` qubits out of a density matrix over `num_qubits` qubits.
///
/// The remaining qubits keep their relative order, lowest index in the lowest bit.
pub fn partial_trace(
    rho: &Array2<Complex64>,
    num_qubits: usize,
    trace_out: &[usize],
) -> Result<Array2<Complex64>, StateError> {
    let dim = 1 << num_qubits;
    let (rows, cols) = rho.dim();
    if rows != dim || cols != dim {
        return Err(StateError::DimensionMismatch {
            expected: dim,
            got_rows: rows,
            got_cols: cols,
        });
    }
    for &q in trace_out {
        if q >= num_qubits {
            return Err(StateError::IndexOutOfBounds {
                index: q,
                num_qubits,
            });
        }
    }
    if let Some(dup) = find_duplicate(trace_out) {
        return Err(StateError::GateError(
            crate::core::errors::GateError::DuplicateQubit(dup),
        ));
    }

    let keep: Vec<usize> = (0..num_qubits).filter(|q| !trace_out.contains(q)).collect();
    let keep_dim = 1 << keep.len();
    let trace_dim = 1 << trace_out.len();

    let mut reduced = Array2::<Complex64>::zeros((keep_dim, keep_dim));
    for i in 0..keep_dim {
        let row_keep = deposit_bits(i, &keep);
        for j in 0..keep_dim {
            let col_keep = deposit_bits(j, &keep);
            let mut sum = Complex64::new(0.0, 0.0);
            for k in 0..trace_dim {
                let traced = deposit_bits(k, trace_out);
                sum += rho[[row_keep | traced, col_keep | traced]];
            }
            reduced[[i, j]] = sum;
        }
    }
    Ok(reduced)
}

/// Checks if a matrix is Hermitian
#[cfg(test)]
pub fn is_hermitian(mat: &Array2<Complex64>, tol: f64) -> bool {
    mat.iter()
        .zip(mat.t().iter())
        .all(|(a, b)| (a - b.conj()).norm() < tol)
}

/// Von Neumann entropy $S(\rho) = -\sum_i \lambda_i \log_2 \lambda_i$ of a Hermitian matrix.
///
/// Uses the spectral decomposition from nalgebra; eigenvalues below `1e-12`
/// contribute nothing.
pub fn von_neumann_entropy(rho: &Array2<Complex64>) -> f64 {
    let (rows, cols) = rho.dim();
    let na_mat = DMatrix::from_fn(rows, cols, |r, c| rho[[r, c]]);
    let eigen = na_mat.symmetric_eigen();

    let entropy: f64 = eigen
        .eigenvalues
        .iter()
        .filter(|&&l| l > 1e-12)
        .map(|&l| l * (1.0 / l).log2())
        .sum();
    // Rounding on a pure state can leave -0.0 or a tiny negative sum
    if entropy > 0.0 { entropy } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, arr2};

    fn c(re: f64) -> Complex64 {
        Complex64::new(re, 0.0)
    }

    #[test]
    fn kronecker_of_identity_and_x() {
        let eye = Array2::<Complex64>::eye(2);
        let x = arr2(&[[c(0.0), c(1.0)], [c(1.0), c(0.0)]]);
        let k = kronecker_product(&eye, &x);

        assert_eq!(k.dim(), (4, 4));
        assert_eq!(k[[0, 1]], c(1.0));
        assert_eq!(k[[2, 3]], c(1.0));
        assert_eq!(k[[0, 3]], c(0.0));
    }

    #[test]
    fn kronecker_vector_places_first_operand_high() {
        let one = array![c(0.0), c(1.0)];
        let zero = array![c(1.0), c(0.0)];
        let v = kronecker_vector(&one, &zero);
        // |1> ⊗ |0> = index 0b10
        assert_eq!(v[2], c(1.0));
        assert!((norm_sqr(&v) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn normalize_rejects_zero_vector() {
        let v = Array1::<Complex64>::zeros(2);
        assert!(matches!(
            normalize(&v),
            Err(StateError::NumericalInstability { .. })
        ));
    }

    #[test]
    fn check_normalized_flags_drift() {
        let v = array![c(1.0), c(1e-3)];
        assert!(check_normalized(&v).is_err());
        let v = array![c(1.0), c(1e-6)];
        assert!(check_normalized(&v).is_err());
        let v = array![c(1.0), c(0.0)];
        assert!(check_normalized(&v).is_ok());
    }

    #[test]
    fn expand_cnot_flips_target_when_control_set() {
        let x = arr2(&[[c(0.0), c(1.0)], [c(1.0), c(0.0)]]);
        let cnot = expand_operator(2, &x, &[1], &[0]);
        // |01> (q0 = 1) -> |11>
        let v = array![c(0.0), c(1.0), c(0.0), c(0.0)];
        let out = apply_matrix(&cnot, &v).unwrap();
        assert_eq!(out[3], c(1.0));
    }

    #[test]
    fn apply_matrix_rejects_mismatched_dimensions() {
        let eye = Array2::<Complex64>::eye(4);
        let v = array![c(1.0), c(0.0)];
        assert!(matches!(
            apply_matrix(&eye, &v),
            Err(StateError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn partial_trace_of_bell_state_is_maximally_mixed() {
        let h = 1.0 / 2.0_f64.sqrt();
        let bell = array![c(h), c(0.0), c(0.0), c(h)];
        let rho = outer_product(&bell, &bell);

        for q in 0..2 {
            let reduced = partial_trace(&rho, 2, &[1 - q]).unwrap();
            assert!((reduced[[0, 0]].re - 0.5).abs() < 1e-12);
            assert!((reduced[[1, 1]].re - 0.5).abs() < 1e-12);
            assert!(reduced[[0, 1]].norm() < 1e-12);
            assert!((von_neumann_entropy(&reduced) - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn partial_trace_of_product_state_keeps_local_state() {
        // q0 = |1>, q1 = |0>
        let v = array![c(0.0), c(1.0), c(0.0), c(0.0)];
        let rho = outer_product(&v, &v);
        let q0 = partial_trace(&rho, 2, &[1]).unwrap();
        assert!((q0[[1, 1]].re - 1.0).abs() < 1e-12);
        let entropy = von_neumann_entropy(&q0);
        assert!(entropy < 1e-9);
        assert!(entropy.is_sign_positive());
        assert!(is_hermitian(&q0, 1e-12));
    }

    #[test]
    fn partial_trace_rejects_bad_index() {
        let rho = Array2::<Complex64>::eye(4);
        assert!(matches!(
            partial_trace(&rho, 2, &[2]),
            Err(StateError::IndexOutOfBounds { .. })
        ));
    }

    #[test]
    fn find_duplicate_reports_first_repeat() {
        assert_eq!(find_duplicate(&[0, 1, 2]), None);
        assert_eq!(find_duplicate(&[0, 1, 0]), Some(0));
    }
}
