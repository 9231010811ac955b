//! Sparse many-body operators assembled from evaluated interaction terms.

use std::borrow::Cow;
use itertools::Itertools;
use ndarray as nd;
use num_complex::Complex64 as C64;
use num_traits::Zero;
use rustc_hash::FxHashMap as HashMap;
use tracing::debug;
use crate::{
    error::{ ChainError, ChainResult },
    expm::expm,
    graph::StaticTerms,
    hilbert::{ ChainState, SpinBasis },
    spin::Spin,
};

/// A single-site operator.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SiteOp {
    /// `S^x` (or `σ^x`)
    X,
    /// `S^y` (or `σ^y`)
    Y,
    /// `S^z` (or `σ^z`)
    Z,
    /// `S^+ = S^x + i S^y`
    Plus,
    /// `S^- = S^x - i S^y`
    Minus,
    /// Identity.
    Identity,
}

impl SiteOp {
    /// Parse a single operator letter, accepting `I` in either case.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'x' | 'X' => Some(Self::X),
            'y' | 'Y' => Some(Self::Y),
            'z' | 'Z' => Some(Self::Z),
            '+' => Some(Self::Plus),
            '-' => Some(Self::Minus),
            'i' | 'I' => Some(Self::Identity),
            _ => None,
        }
    }

    /// Apply `self` to a single-site state, returning the non-zero components
    /// of the result.
    ///
    /// With `pauli`, every operator except the identity carries an extra factor
    /// of 2, so that on spin-1/2 `x`, `y`, `z` act as Pauli matrices and `+`,
    /// `-` as `σ^± = σ^x ± i σ^y`.
    pub fn apply(self, spin: Spin, pauli: bool)
        -> impl Iterator<Item = (Spin, C64)>
    {
        let scale = if pauli { 2.0 } else { 1.0 };
        let up = spin.raised_checked().map(|s| (s, spin.ladder(true)));
        let dn = spin.lowered_checked().map(|s| (s, spin.ladder(false)));
        let half = C64::from(0.5 * scale);
        let (a, b): (Option<(Spin, C64)>, Option<(Spin, C64)>)
            = match self {
                Self::X => (
                    up.map(|(s, c)| (s, half * c)),
                    dn.map(|(s, c)| (s, half * c)),
                ),
                Self::Y => (
                    up.map(|(s, c)| (s, -C64::i() * half * c)),
                    dn.map(|(s, c)| (s, C64::i() * half * c)),
                ),
                Self::Z => {
                    let m = spin.proj().f() * scale;
                    ((m != 0.0).then(|| (spin, C64::from(m))), None)
                },
                Self::Plus => (up.map(|(s, c)| (s, C64::from(scale * c))), None),
                Self::Minus => (dn.map(|(s, c)| (s, C64::from(scale * c))), None),
                Self::Identity => (Some((spin, C64::from(1.0))), None),
            };
        a.into_iter().chain(b).filter(|(_, c)| !c.is_zero())
    }
}

/// Parse an operator label into single-site operators.
pub fn parse_label(operator: &str) -> ChainResult<Vec<SiteOp>> {
    operator.chars()
        .map(|c| {
            SiteOp::from_char(c)
                .ok_or_else(|| ChainError::UnknownOperator {
                    operator: operator.to_string(),
                    letter: c,
                })
        })
        .collect()
}

/// Apply a product of single-site operators, `ops[0]` on `sites[0]` and so on,
/// to a product state.
///
/// Operators are applied right to left, so that a label `"+-"` on a single
/// site acts as `S^+ S^-`.
fn apply_string(
    basis: &SpinBasis,
    ops: &[SiteOp],
    sites: &[usize],
    state: &ChainState,
) -> Vec<(ChainState, C64)>
{
    let pauli = basis.pauli();
    let mut acc: Vec<(ChainState, C64)> = vec![(state.clone(), C64::from(1.0))];
    for (op, &site) in ops.iter().zip(sites).rev() {
        acc = acc.into_iter()
            .flat_map(|(ss, amp)| {
                // states in `acc` always hold valid projections
                let Some(s) = basis.site_spin(&ss, site)
                    else { return Vec::new(); };
                op.apply(s, pauli)
                    .map(move |(s_new, c)| {
                        let mut ss_new = ss.clone();
                        ss_new[site] = s_new.proj();
                        (ss_new, amp * c)
                    })
                    .collect::<Vec<_>>()
            })
            .collect();
    }
    acc
}

/// A many-body operator stored as a sorted list of non-zero matrix elements.
#[derive(Clone, Debug, PartialEq)]
pub struct Hamiltonian {
    dim: usize,
    entries: Vec<(usize, usize, C64)>,
}

impl Hamiltonian {
    /// Create a new `Hamiltonian` from `(row, column, value)` elements.
    ///
    /// Duplicate positions are summed and zeros dropped.
    pub fn from_entries<I>(dim: usize, entries: I) -> ChainResult<Self>
    where I: IntoIterator<Item = (usize, usize, C64)>
    {
        let mut acc: HashMap<(usize, usize), C64> = HashMap::default();
        for (i, j, a) in entries.into_iter() {
            if i >= dim || j >= dim {
                return Err(ChainError::ShapeMismatch((dim, dim), (i + 1, j + 1)));
            }
            *acc.entry((i, j)).or_insert_with(C64::zero) += a;
        }
        Ok(Self::from_map(dim, acc))
    }

    fn from_map(dim: usize, acc: HashMap<(usize, usize), C64>) -> Self {
        let entries: Vec<(usize, usize, C64)>
            = acc.into_iter()
            .filter(|(_, a)| !a.is_zero())
            .map(|((i, j), a)| (i, j, a))
            .sorted_by_key(|(i, j, _)| (*i, *j))
            .collect();
        Self { dim, entries }
    }

    /// Assemble the operator `sum_k c_k O_k` for all evaluated terms over
    /// `basis`.
    ///
    /// Each operator label is split into single-site operators, paired with
    /// the term's sites in order.
    pub fn from_static(terms: &StaticTerms, basis: &SpinBasis)
        -> ChainResult<Self>
    {
        let num_sites = basis.num_sites();
        let mut acc: HashMap<(usize, usize), C64> = HashMap::default();
        for (label, op_terms) in terms.iter() {
            let ops = parse_label(label)?;
            for term in op_terms.iter() {
                if ops.len() != term.sites.len() {
                    return Err(ChainError::OperatorArity {
                        operator: label.clone(),
                        range: format!("{}-site term", term.sites.len()),
                        expected: term.sites.len(),
                    });
                }
                if let Some(&site) = term.sites.iter().find(|i| **i >= num_sites) {
                    return Err(ChainError::SiteOutOfRange { site, num_sites });
                }
                if term.coefficient == 0.0 { continue; }
                for (col, state) in basis.iter().enumerate() {
                    for (new, amp) in apply_string(basis, &ops, &term.sites, state) {
                        let row
                            = basis.index_of(&new)
                            .ok_or_else(|| ChainError::SymmetryViolation {
                                operator: label.clone(),
                                sites: term.sites.clone(),
                            })?;
                        *acc.entry((row, col)).or_insert_with(C64::zero)
                            += term.coefficient * amp;
                    }
                }
            }
        }
        let h = Self::from_map(basis.len(), acc);
        debug!(dim = h.dim, nnz = h.nnz(), "assembled hamiltonian");
        Ok(h)
    }

    /// Return the Hilbert space dimension.
    pub fn dim(&self) -> usize { self.dim }

    /// Return the number of stored non-zero elements.
    pub fn nnz(&self) -> usize { self.entries.len() }

    /// Return the stored `(row, column, value)` elements in row-major order.
    pub fn entries(&self) -> &[(usize, usize, C64)] { &self.entries }

    /// Convert to a dense 2D array.
    pub fn to_dense(&self) -> nd::Array2<C64> {
        let mut H: nd::Array2<C64> = nd::Array2::zeros((self.dim, self.dim));
        self.entries.iter()
            .for_each(|(i, j, a)| { H[[*i, *j]] += *a; });
        H
    }

    /// Return the conjugate transpose.
    pub fn adjoint(&self) -> Self {
        let entries: Vec<(usize, usize, C64)>
            = self.entries.iter()
            .map(|(i, j, a)| (*j, *i, a.conj()))
            .sorted_by_key(|(i, j, _)| (*i, *j))
            .collect();
        Self { dim: self.dim, entries }
    }

    /// Return `self` multiplied by a real number.
    pub fn scaled(&self, factor: f64) -> Self {
        let entries: Vec<(usize, usize, C64)>
            = self.entries.iter()
            .map(|(i, j, a)| (*i, *j, *a * factor))
            .filter(|(_, _, a)| !a.is_zero())
            .collect();
        Self { dim: self.dim, entries }
    }

    /// Return the sum of the main diagonal.
    pub fn trace(&self) -> C64 {
        self.entries.iter()
            .filter(|(i, j, _)| i == j)
            .map(|(_, _, a)| *a)
            .sum()
    }

    /// Return `true` if `self` equals its conjugate transpose to within `tol`
    /// in every element.
    pub fn is_hermitian(&self, tol: f64) -> bool {
        let H = self.to_dense();
        H.indexed_iter()
            .all(|((i, j), a)| (*a - H[[j, i]].conj()).norm() <= tol)
    }

    /// Compute the matrix-vector product `H ψ`.
    pub fn dot_vec(&self, psi: &nd::Array1<C64>) -> ChainResult<nd::Array1<C64>> {
        if psi.len() != self.dim {
            return Err(ChainError::ShapeMismatch((self.dim, self.dim), (psi.len(), 1)));
        }
        let mut out: nd::Array1<C64> = nd::Array1::zeros(self.dim);
        self.entries.iter()
            .for_each(|(i, j, a)| { out[*i] += *a * psi[*j]; });
        Ok(out)
    }

    /// Compute the matrix-matrix product `H B` for a dense `B`.
    pub fn dot_mat(&self, B: &nd::Array2<C64>) -> ChainResult<nd::Array2<C64>> {
        if B.nrows() != self.dim {
            return Err(ChainError::ShapeMismatch((self.dim, self.dim), B.dim()));
        }
        let mut out: nd::Array2<C64> = nd::Array2::zeros((self.dim, B.ncols()));
        for (i, j, a) in self.entries.iter() {
            out.row_mut(*i).scaled_add(*a, &B.row(*j));
        }
        Ok(out)
    }

    /// Compute the propagator `exp(-i H dt)`.
    pub fn propagator(&self, dt: f64) -> ChainResult<nd::Array2<C64>> {
        expm(&self.to_dense().mapv(|a| -C64::i() * dt * a))
    }
}

/// Conversion of any operator representation to a plain dense matrix.
pub trait AsDense {
    fn as_dense(&self) -> Cow<'_, nd::Array2<C64>>;
}

impl AsDense for nd::Array2<C64> {
    fn as_dense(&self) -> Cow<'_, nd::Array2<C64>> { Cow::Borrowed(self) }
}

impl AsDense for Hamiltonian {
    fn as_dense(&self) -> Cow<'_, nd::Array2<C64>> { Cow::Owned(self.to_dense()) }
}

impl<T> AsDense for &T
where T: AsDense + ?Sized
{
    fn as_dense(&self) -> Cow<'_, nd::Array2<C64>> { (**self).as_dense() }
}

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;
    use super::*;
    use crate::{
        graph::StaticTerm,
        hilbert::BasisParams,
        spin::{ SpinProj, SpinTotal },
    };

    fn basis(n: usize, halves: u32, pauli: bool) -> SpinBasis {
        let mut params = BasisParams::new(n, SpinTotal::new(halves), 1);
        params.pauli = pauli;
        SpinBasis::new(params).unwrap()
    }

    fn single(label: &str, c: f64, sites: Vec<usize>) -> StaticTerms {
        let mut terms: StaticTerms = IndexMap::new();
        terms.insert(label.to_string(), vec![StaticTerm { coefficient: c, sites }]);
        terms
    }

    fn close(A: &nd::Array2<C64>, B: &nd::Array2<C64>) -> bool {
        A.iter().zip(B.iter()).all(|(a, b)| (a - b).norm() < 1e-12)
    }

    #[test]
    fn pauli_matrices() {
        let b = basis(1, 1, true);
        let x = Hamiltonian::from_static(&single("x", 1.0, vec![0]), &b).unwrap();
        let y = Hamiltonian::from_static(&single("y", 1.0, vec![0]), &b).unwrap();
        let z = Hamiltonian::from_static(&single("z", 1.0, vec![0]), &b).unwrap();
        let i = C64::i();
        let o = C64::zero();
        let l = C64::from(1.0);
        // basis order is (up, down)
        assert_eq!(x.to_dense(), nd::array![[o, l], [l, o]]);
        assert_eq!(y.to_dense(), nd::array![[o, -i], [i, o]]);
        assert_eq!(z.to_dense(), nd::array![[l, o], [o, -l]]);
        assert!(x.is_hermitian(0.0) && y.is_hermitian(0.0));
    }

    #[test]
    fn spin_one_matrices() {
        let b = basis(1, 2, false);
        let z = Hamiltonian::from_static(&single("z", 1.0, vec![0]), &b).unwrap();
        assert_eq!(z.trace(), C64::zero());
        assert_eq!(z.to_dense()[[0, 0]], C64::from(1.0));
        let plus = Hamiltonian::from_static(&single("+", 1.0, vec![0]), &b).unwrap();
        let minus = plus.adjoint();
        // [S+, S-] = 2 Sz
        let pm = plus.dot_mat(&minus.to_dense()).unwrap();
        let mp = minus.dot_mat(&plus.to_dense()).unwrap();
        assert!(close(&(pm - mp), &z.scaled(2.0).to_dense()));
    }

    #[test]
    fn xx_from_ladders() {
        // σx σx = (σ+ + σ-)(σ+ + σ-) / 4
        let b = basis(2, 1, true);
        let xx = Hamiltonian::from_static(&single("xx", 1.0, vec![0, 1]), &b)
            .unwrap();
        let mut ladders: StaticTerms = IndexMap::new();
        for label in ["+-", "-+", "++", "--"] {
            ladders.insert(
                label.to_string(),
                vec![StaticTerm { coefficient: 0.25, sites: vec![0, 1] }],
            );
        }
        let ladders = Hamiltonian::from_static(&ladders, &b).unwrap();
        assert!(close(&xx.to_dense(), &ladders.to_dense()));
        assert_eq!(xx.nnz(), 4);
    }

    #[test]
    fn pauli_ladder_elements() {
        let o = C64::zero();
        let l = C64::from(1.0);
        let two = C64::from(2.0);
        let b = basis(1, 1, true);
        let plus = Hamiltonian::from_static(&single("+", 1.0, vec![0]), &b).unwrap();
        let minus = Hamiltonian::from_static(&single("-", 1.0, vec![0]), &b).unwrap();
        // basis order is (up, down): σ+ |down> = 2 |up>
        assert_eq!(plus.to_dense(), nd::array![[o, two], [o, o]]);
        assert_eq!(minus.to_dense(), nd::array![[o, o], [two, o]]);
        let spin = basis(1, 1, false);
        let plus = Hamiltonian::from_static(&single("+", 1.0, vec![0]), &spin).unwrap();
        assert_eq!(plus.to_dense(), nd::array![[o, l], [o, o]]);
        // σ+ σ- = 2 (1 + σz)
        let pm = Hamiltonian::from_static(&single("+-", 1.0, vec![0, 0]), &b).unwrap();
        assert_eq!(pm.to_dense(), nd::array![[C64::from(4.0), o], [o, o]]);
    }

    #[test]
    fn same_site_product() {
        let b = basis(2, 1, true);
        // σz σz on one site is the identity
        let zz = Hamiltonian::from_static(&single("zz", 0.5, vec![1, 1]), &b)
            .unwrap();
        assert_eq!(zz.to_dense(), nd::Array2::from_diag_elem(4, C64::from(0.5)));
    }

    #[test]
    fn sparse_products() {
        let b = basis(3, 1, true);
        let mut terms = single("xx", 0.7, vec![0, 2]);
        terms.insert(
            "z".to_string(), vec![StaticTerm { coefficient: -0.3, sites: vec![1] }]);
        let h = Hamiltonian::from_static(&terms, &b).unwrap();
        let dense = h.to_dense();
        let psi: nd::Array1<C64>
            = (0..8).map(|k| C64::new(k as f64, 1.0 - k as f64)).collect();
        let hpsi = h.dot_vec(&psi).unwrap();
        assert!(hpsi.iter().zip(dense.dot(&psi).iter()).all(|(a, b)| (a - b).norm() < 1e-12));
        assert!(close(&h.dot_mat(&dense).unwrap(), &dense.dot(&dense)));
        assert!(close(&h.adjoint().to_dense(), &dense.t().mapv(|a| a.conj())));
        assert!(h.dot_vec(&nd::Array1::zeros(3)).is_err());
    }

    #[test]
    fn sector_violation() {
        let mut params = BasisParams::new(2, SpinTotal::HALF, 1);
        params.magnetization = Some(SpinProj::new(0));
        let b = SpinBasis::new(params).unwrap();
        let flip_flop = Hamiltonian::from_static(&single("+-", 1.0, vec![0, 1]), &b);
        assert!(flip_flop.is_ok());
        let x = Hamiltonian::from_static(&single("x", 1.0, vec![0]), &b);
        assert!(matches!(x, Err(ChainError::SymmetryViolation { .. })));
    }

    #[test]
    fn bad_terms() {
        let b = basis(2, 1, true);
        assert!(matches!(
            Hamiltonian::from_static(&single("q", 1.0, vec![0]), &b),
            Err(ChainError::UnknownOperator { letter: 'q', .. }),
        ));
        assert!(matches!(
            Hamiltonian::from_static(&single("z", 1.0, vec![2]), &b),
            Err(ChainError::SiteOutOfRange { site: 2, .. }),
        ));
        assert!(matches!(
            Hamiltonian::from_static(&single("zz", 1.0, vec![0]), &b),
            Err(ChainError::OperatorArity { .. }),
        ));
    }
}
