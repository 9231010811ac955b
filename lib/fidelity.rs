//! Distance measures between pairs of dense operators.
//!
//! All functions require both operators to have the same shape.

use ndarray as nd;
use num_complex::Complex64 as C64;
use crate::{
    error::{ ChainError, ChainResult },
    expm::expm,
};

fn check_shapes(M1: &nd::Array2<C64>, M2: &nd::Array2<C64>) -> ChainResult<()> {
    if M1.dim() != M2.dim() {
        Err(ChainError::ShapeMismatch(M1.dim(), M2.dim()))
    } else {
        Ok(())
    }
}

/// Compute `sqrt(|tr(M1† M2)|)`.
pub fn frobenius_norm(M1: &nd::Array2<C64>, M2: &nd::Array2<C64>)
    -> ChainResult<f64>
{
    check_shapes(M1, M2)?;
    let tr: C64
        = M1.iter().zip(M2.iter())
        .map(|(a, b)| a.conj() * b)
        .sum();
    Ok(tr.norm().sqrt())
}

/// Compute the normalized overlap loss
/// `1 - F(M1, M2) / sqrt(F(M1, M1) F(M2, M2))`, where `F` is
/// [`frobenius_norm`].
///
/// Identical inputs give zero. The zero operator gives NaN.
pub fn frobenius_loss(M1: &nd::Array2<C64>, M2: &nd::Array2<C64>)
    -> ChainResult<f64>
{
    let cross = frobenius_norm(M1, M2)?;
    let n1 = frobenius_norm(M1, M1)?;
    let n2 = frobenius_norm(M2, M2)?;
    Ok(1.0 - cross / (n1 * n2).sqrt())
}

/// Compare the unit-time evolution operators `U1 = exp(-i M1)` and
/// `U2 = exp(-i M2)`, returning the Frobenius norm of `U1† U2 - I`.
pub fn norm_identity_loss(M1: &nd::Array2<C64>, M2: &nd::Array2<C64>)
    -> ChainResult<f64>
{
    check_shapes(M1, M2)?;
    let U1 = expm(&M1.mapv(|a| -C64::i() * a))?;
    let U2 = expm(&M2.mapv(|a| -C64::i() * a))?;
    let eye: nd::Array2<C64> = nd::Array2::eye(M1.nrows());
    let D: nd::Array2<C64> = U1.t().mapv(|a| a.conj()).dot(&U2) - eye;
    frobenius_norm(&D, &D)
}
