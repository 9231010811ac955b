//! Many-body product-state bases for linear spin chains.

use ndarray as nd;
use indexmap::IndexSet;
use itertools::Itertools;
use num_complex::Complex64 as C64;
use num_traits::{ Zero, One };
use tracing::debug;
use crate::{
    error::{ ChainError, ChainResult },
    spin::{ Spin, SpinProj, SpinTotal },
};

/// Initialization data for [`SpinBasis`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BasisParams {
    /// Number of sites in the chain.
    pub num_sites: usize,
    /// Spin magnitude carried by every site.
    pub spin: SpinTotal,
    /// Translation period of the chain, in sites.
    pub unit_cell_length: usize,
    /// Restrict the basis to a fixed total magnetization, if `Some`.
    pub magnetization: Option<SpinProj>,
    /// Use Pauli matrices (σ) rather than spin matrices (S) for `x`, `y`, `z`,
    /// `+`, `-`.
    ///
    /// Only meaningful for spin-1/2.
    pub pauli: bool,
}

impl BasisParams {
    /// Create a new set of parameters for a full (unrestricted) basis, with
    /// Pauli normalization turned on for spin-1/2 only.
    pub fn new(num_sites: usize, spin: SpinTotal, unit_cell_length: usize)
        -> Self
    {
        Self {
            num_sites,
            spin,
            unit_cell_length,
            magnetization: None,
            pauli: spin == SpinTotal::HALF,
        }
    }

    /// Check that the parameters describe a non-empty chain that is tiled by
    /// its unit cell.
    pub fn validate(&self) -> ChainResult<()> {
        if self.num_sites == 0 { return Err(ChainError::EmptyLattice); }
        if self.unit_cell_length == 0
            || self.num_sites % self.unit_cell_length != 0
        {
            return Err(ChainError::UnitCell {
                num_sites: self.num_sites,
                unit_cell_length: self.unit_cell_length,
            });
        }
        if self.pauli && self.spin != SpinTotal::HALF {
            return Err(ChainError::InvalidSpin(
                format!("Pauli normalization requires spin 1/2, got {}", self.spin)
            ));
        }
        if let Some(m) = self.magnetization {
            let max = i64::from(self.spin.halves()) * self.num_sites as i64;
            let m = i64::from(m.halves());
            if m.abs() > max || (max - m) % 2 != 0 {
                return Err(ChainError::Config(
                    format!(
                        "magnetization {} is unreachable for {} sites of spin {}",
                        m as f64 / 2.0, self.num_sites, self.spin,
                    )
                ));
            }
        }
        Ok(())
    }
}

/// A product state of a spin chain, listing the spin projection on each site.
pub type ChainState = Vec<SpinProj>;

/// An ordered collection of chain product states.
///
/// States are ordered with site 0 as the most significant position, and each
/// site running from maximal to minimal projection, so that the fully
/// polarized "all up" state comes first.
#[derive(Clone, Debug, PartialEq)]
pub struct SpinBasis {
    params: BasisParams,
    states: IndexSet<ChainState>,
}

impl SpinBasis {
    /// Enumerate all states allowed by `params`.
    pub fn new(params: BasisParams) -> ChainResult<Self> {
        params.validate()?;
        let target = params.magnetization.map(|m| m.halves());
        let full_dim: Option<usize>
            = u32::try_from(params.num_sites).ok()
            .and_then(|n| params.spin.multiplicity().checked_pow(n));
        let mut states: IndexSet<ChainState>
            = IndexSet::with_capacity(
                if target.is_none() { full_dim.unwrap_or(0) } else { 0 });
        states.extend(
            (0..params.num_sites)
            .map(|_| params.spin.iter().map(|s| s.proj()))
            .multi_cartesian_product()
            .filter(|ss| {
                target.map_or(true, |m| {
                    ss.iter().map(|s| s.halves()).sum::<i32>() == m
                })
            })
        );
        debug!(
            num_sites = params.num_sites,
            spin = %params.spin,
            unit_cell_length = params.unit_cell_length,
            full_dim = ?full_dim,
            dim = states.len(),
            "built spin basis"
        );
        Ok(Self { params, states })
    }

    /// Return the parameters used to build `self`.
    pub fn params(&self) -> &BasisParams { &self.params }

    pub fn num_sites(&self) -> usize { self.params.num_sites }

    pub fn spin(&self) -> SpinTotal { self.params.spin }

    pub fn unit_cell_length(&self) -> usize { self.params.unit_cell_length }

    pub fn pauli(&self) -> bool { self.params.pauli }

    /// Return the Hilbert space dimension.
    pub fn len(&self) -> usize { self.states.len() }

    pub fn is_empty(&self) -> bool { self.states.is_empty() }

    /// Return `true` if the basis is restricted to a magnetization sector.
    pub fn is_restricted(&self) -> bool { self.params.magnetization.is_some() }

    /// Get the index of a product state.
    pub fn index_of(&self, state: &[SpinProj]) -> Option<usize> {
        self.states.get_index_of(state)
    }

    /// Get a product state by index.
    pub fn get(&self, index: usize) -> Option<&ChainState> {
        self.states.get_index(index)
    }

    /// Iterate over product states in basis order.
    pub fn iter(&self) -> indexmap::set::Iter<'_, ChainState> {
        self.states.iter()
    }

    /// Return the full [`Spin`] on a site of a product state.
    pub fn site_spin(&self, state: &[SpinProj], site: usize) -> Option<Spin> {
        state.get(site)
            .and_then(|m| Spin::new(self.params.spin.halves(), m.halves()))
    }

    /// Get an array representation of a particular product state.
    ///
    /// The array is sized to match the number of states in `self`.
    pub fn get_vector(&self, state: &[SpinProj]) -> Option<nd::Array1<C64>> {
        self.states.get_index_of(state)
            .and_then(|k| self.get_vector_index(k))
    }

    /// Get an array representation of a particular product state by index.
    pub fn get_vector_index(&self, index: usize) -> Option<nd::Array1<C64>> {
        let n = self.states.len();
        (index < n).then(|| {
            (0..n).map(|j| if j == index { C64::one() } else { C64::zero() })
                .collect()
        })
    }
}
