//! Matrix exponential via scaling-and-squaring with a Padé(13) approximant.
//!
//! See Higham (2005), "The Scaling and Squaring Method for the Matrix
//! Exponential Revisited", SIAM J. Matrix Anal. Appl. 26(4), 1179.

use ndarray as nd;
use ndarray_linalg::{ Inverse, OperationNorm };
use num_complex::Complex64 as C64;
use crate::error::{ ChainError, ChainResult };

/// Padé(13, 13) numerator coefficients.
const PADE_13: [f64; 14] = [
    64764752532480000.0,
    32382376266240000.0,
    7771770303897600.0,
    1187353796428800.0,
    129060195264000.0,
    10559470521600.0,
    670442572800.0,
    33522128640.0,
    1323241920.0,
    40840800.0,
    960960.0,
    16380.0,
    182.0,
    1.0,
];

/// Largest 1-norm for which the unscaled Padé(13) approximant is accurate to
/// double precision.
const THETA_13: f64 = 5.371920351148152;

/// Compute `exp(A)` for a square complex matrix.
///
/// Fails if `A` is not square, contains non-finite elements, or the Padé
/// denominator is singular.
pub fn expm(A: &nd::Array2<C64>) -> ChainResult<nd::Array2<C64>> {
    let n = A.nrows();
    if n != A.ncols() {
        return Err(ChainError::ShapeMismatch(A.dim(), (n, n)));
    }
    if n == 0 { return Ok(nd::Array2::zeros((0, 0))); }
    if A.iter().any(|a| !a.is_finite()) {
        return Err(ChainError::NonFinite("matrix exponential"));
    }

    let norm: f64 = A.opnorm_one()?;
    let s: i32
        = if norm > THETA_13 {
            (norm / THETA_13).log2().ceil() as i32
        } else {
            0
        };
    let As: nd::Array2<C64> = A * C64::from(2.0_f64.powi(-s));

    let b = |k: usize| C64::from(PADE_13[k]);
    let eye: nd::Array2<C64> = nd::Array2::eye(n);
    let A2 = As.dot(&As);
    let A4 = A2.dot(&A2);
    let A6 = A2.dot(&A4);

    let W: nd::Array2<C64>
        = A6.dot(&(&A6 * b(13) + &A4 * b(11) + &A2 * b(9)))
        + &A6 * b(7) + &A4 * b(5) + &A2 * b(3) + &eye * b(1);
    let U: nd::Array2<C64> = As.dot(&W);
    let V: nd::Array2<C64>
        = A6.dot(&(&A6 * b(12) + &A4 * b(10) + &A2 * b(8)))
        + &A6 * b(6) + &A4 * b(4) + &A2 * b(2) + &eye * b(0);

    // r13 = (V - U)^-1 (V + U)
    let mut R: nd::Array2<C64> = (&V - &U).inv()?.dot(&(&V + &U));
    for _ in 0..s {
        R = R.dot(&R);
    }
    Ok(R)
}

#[cfg(test)]
mod tests {
    use std::f64::consts::{ E, PI };
    use super::*;

    fn assert_close(A: &nd::Array2<C64>, B: &nd::Array2<C64>, tol: f64) {
        assert_eq!(A.dim(), B.dim());
        for ((i, j), a) in A.indexed_iter() {
            let diff = (a - B[[i, j]]).norm();
            assert!(diff < tol, "mismatch at ({}, {}): {} vs {}", i, j, a, B[[i, j]]);
        }
    }

    #[test]
    fn zero_is_identity() {
        let zero: nd::Array2<C64> = nd::Array2::zeros((3, 3));
        assert_close(&expm(&zero).unwrap(), &nd::Array2::eye(3), 1e-15);
    }

    #[test]
    fn diagonal() {
        let d: nd::Array1<C64>
            = nd::array![C64::from(1.0), C64::new(0.0, PI), C64::from(-20.0)];
        let expected = nd::Array2::from_diag(&d.mapv(|a| a.exp()));
        assert_close(&expm(&nd::Array2::from_diag(&d)).unwrap(), &expected, 1e-12);
        let eye: nd::Array2<C64> = nd::Array2::eye(2);
        assert_close(&expm(&eye).unwrap(), &(eye.clone() * C64::from(E)), 1e-13);
    }

    #[test]
    fn rotation_with_squaring() {
        // exp(-i θ σx) = cos θ - i sin θ σx, large θ forces squaring
        let theta = 12.5;
        let o = C64::from(0.0);
        let sx = nd::array![[o, C64::from(1.0)], [C64::from(1.0), o]];
        let U = expm(&sx.mapv(|a| -C64::i() * theta * a)).unwrap();
        let expected
            = nd::Array2::<C64>::eye(2) * C64::from(theta.cos())
            - sx * (C64::i() * theta.sin());
        assert_close(&U, &expected, 1e-11);
    }

    #[test]
    fn rejects_bad_input() {
        let rect: nd::Array2<C64> = nd::Array2::zeros((2, 3));
        assert!(matches!(expm(&rect), Err(ChainError::ShapeMismatch(..))));
        let mut inf: nd::Array2<C64> = nd::Array2::zeros((2, 2));
        inf[[0, 1]] = C64::from(f64::INFINITY);
        assert!(matches!(expm(&inf), Err(ChainError::NonFinite(_))));
    }
}
