//! Stroboscopic (Floquet) description of a periodic sequence of
//! piecewise-constant Hamiltonians.

use itertools::Itertools;
use ndarray as nd;
use ndarray_linalg::{ Eig, QR };
use num_complex::Complex64 as C64;
use tracing::debug;
use crate::{
    error::{ ChainError, ChainResult },
    operator::Hamiltonian,
};

/// An ordered list of `(Hamiltonian, duration)` steps making up one drive
/// period.
#[derive(Clone, Debug)]
pub struct FloquetSequence {
    steps: Vec<(Hamiltonian, f64)>,
    period: f64,
}

impl FloquetSequence {
    /// Create a new `FloquetSequence`.
    ///
    /// `period` is taken as given rather than summed from the step durations,
    /// so that steps standing in for instantaneous kicks can be given a
    /// nominal duration without lengthening the period.
    pub fn new(steps: Vec<(Hamiltonian, f64)>, period: f64) -> ChainResult<Self> {
        if steps.is_empty() {
            return Err(ChainError::Config("empty Floquet sequence".to_string()));
        }
        if !period.is_finite() || period <= 0.0 {
            return Err(ChainError::Config(
                format!("Floquet period must be positive, got {}", period)
            ));
        }
        let dim = steps[0].0.dim();
        if let Some((h, _)) = steps.iter().find(|(h, _)| h.dim() != dim) {
            return Err(ChainError::ShapeMismatch((dim, dim), (h.dim(), h.dim())));
        }
        if let Some((_, dt)) = steps.iter().find(|(_, dt)| !dt.is_finite() || *dt < 0.0) {
            return Err(ChainError::Config(
                format!("step durations must be non-negative, got {}", dt)
            ));
        }
        Ok(Self { steps, period })
    }

    pub fn steps(&self) -> &[(Hamiltonian, f64)] { &self.steps }

    pub fn period(&self) -> f64 { self.period }

    /// Hilbert space dimension of every step.
    pub fn dim(&self) -> usize { self.steps[0].0.dim() }

    /// Compute the one-period evolution operator
    /// `U = exp(-i H_n dt_n) ... exp(-i H_1 dt_1)`.
    pub fn unitary(&self) -> ChainResult<nd::Array2<C64>> {
        let mut U: nd::Array2<C64> = nd::Array2::eye(self.dim());
        for (h, dt) in self.steps.iter() {
            U = h.propagator(*dt)?.dot(&U);
        }
        Ok(U)
    }

    /// Diagonalize the one-period evolution operator and compute the effective
    /// Hamiltonian `H_F` satisfying `U = exp(-i H_F T)`.
    pub fn floquet(&self) -> ChainResult<Floquet> {
        let U = self.unitary()?;
        Floquet::from_unitary(U, self.period)
    }
}

/// Results of a Floquet analysis: effective Hamiltonian, quasienergies, and
/// Floquet states.
#[derive(Clone, Debug)]
pub struct Floquet {
    hf: nd::Array2<C64>,
    quasienergies: nd::Array1<f64>,
    states: nd::Array2<C64>,
    unitary: nd::Array2<C64>,
    period: f64,
}

impl Floquet {
    /// Diagonalize a one-period evolution operator.
    ///
    /// Eigenvectors are orthonormalized (including within degenerate
    /// subspaces) before the effective Hamiltonian is formed, and
    /// quasienergies are folded into `[-π/T, π/T)` and sorted in ascending
    /// order.
    pub fn from_unitary(unitary: nd::Array2<C64>, period: f64)
        -> ChainResult<Self>
    {
        if unitary.iter().any(|a| !a.is_finite()) {
            return Err(ChainError::NonFinite("Floquet evolution operator"));
        }
        let (lambda, V): (nd::Array1<C64>, nd::Array2<C64>) = unitary.eig()?;
        // QR keeps eigenvectors only while columns for distinct eigenvalues are
        // already near-orthogonal; nearly degenerate eigenvalues mix slightly
        let (Q, _): (nd::Array2<C64>, nd::Array2<C64>) = V.qr()?;
        let order: Vec<usize>
            = lambda.iter()
            .map(|l| -l.arg() / period)
            .enumerate()
            .sorted_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(k, _)| k)
            .collect();
        let quasienergies: nd::Array1<f64>
            = order.iter().map(|k| -lambda[*k].arg() / period).collect();
        let states: nd::Array2<C64> = Q.select(nd::Axis(1), &order);
        let scaled: nd::Array2<C64>
            = &states * &quasienergies.mapv(C64::from);
        let hf: nd::Array2<C64> = scaled.dot(&states.t().mapv(|a| a.conj()));
        debug!(
            dim = hf.nrows(),
            period,
            max_quasienergy = quasienergies.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            "computed Floquet Hamiltonian"
        );
        Ok(Self { hf, quasienergies, states, unitary, period })
    }

    /// Return the effective Hamiltonian.
    pub fn hf(&self) -> &nd::Array2<C64> { &self.hf }

    /// Consume `self`, returning only the effective Hamiltonian.
    pub fn into_hf(self) -> nd::Array2<C64> { self.hf }

    /// Return the quasienergies in ascending order.
    pub fn quasienergies(&self) -> &nd::Array1<f64> { &self.quasienergies }

    /// Return the Floquet states as columns, ordered by quasienergy.
    pub fn states(&self) -> &nd::Array2<C64> { &self.states }

    /// Return the one-period evolution operator.
    pub fn unitary(&self) -> &nd::Array2<C64> { &self.unitary }

    /// Return the drive period.
    pub fn period(&self) -> f64 { self.period }
}
