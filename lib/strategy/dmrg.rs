//! Placeholder for a density-matrix renormalization group backend, for chains
//! beyond the reach of exact diagonalization.

use crate::{
    error::ChainResult,
    graph::LatticeGraph,
    hilbert::BasisParams,
    operator::Hamiltonian,
    spin::SpinTotal,
    strategy::ComputationStrategy,
};

/// Binds the same state as [`DiagonEngine`][super::DiagonEngine] but does not
/// yet compute anything: [`ComputationStrategy::run_calculation`] always
/// fails with [`ChainError::NotImplemented`][crate::error::ChainError].
#[derive(Clone, Debug)]
pub struct DmrgEngine<'a> {
    graph: &'a LatticeGraph,
    params: BasisParams,
}

impl<'a> DmrgEngine<'a> {
    /// Create a new `DmrgEngine`.
    pub fn new(graph: &'a LatticeGraph, spin: SpinTotal, unit_cell_length: usize)
        -> ChainResult<Self>
    {
        let params = BasisParams::new(graph.num_sites(), spin, unit_cell_length);
        params.validate()?;
        Ok(Self { graph, params })
    }
}

impl<'a> ComputationStrategy for DmrgEngine<'a> {
    type Output = Hamiltonian;

    fn graph(&self) -> &LatticeGraph { self.graph }

    fn spin(&self) -> SpinTotal { self.params.spin }

    fn unit_cell_length(&self) -> usize { self.params.unit_cell_length }
}
