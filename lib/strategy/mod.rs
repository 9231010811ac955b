//! Computation strategies: backends that turn a [`LatticeGraph`] into
//! operators and compare them.

use crate::{
    error::{ ChainError, ChainResult },
    fidelity,
    graph::{ LatticeGraph, Param },
    operator::{ AsDense, Hamiltonian },
    spin::SpinTotal,
};

pub mod diagon;
pub use diagon::DiagonEngine;

pub mod dmrg;
pub use dmrg::DmrgEngine;

/// Basic requirements for any computation strategy.
///
/// Implementors bind a graph together with the physical parameters of the
/// chain and produce an operator at a given [`Param`]. The fidelity metrics
/// are shared by all strategies and convert their arguments to dense matrices
/// first.
pub trait ComputationStrategy {
    /// Operator representation produced by [`Self::run_calculation`].
    type Output;

    /// Return a reference to the bound graph.
    fn graph(&self) -> &LatticeGraph;

    /// Return the spin magnitude carried by every site.
    fn spin(&self) -> SpinTotal;

    /// Return the translation period of the chain, in sites.
    fn unit_cell_length(&self) -> usize;

    /// Evaluate the graph at `t` and build the corresponding operator.
    fn run_calculation(&self, _t: &Param) -> ChainResult<Self::Output> {
        Err(ChainError::NotImplemented("run_calculation"))
    }

    /// Compute `sqrt(|tr(M1† M2)|)`.
    ///
    /// See [`fidelity::frobenius_norm`].
    fn frobenius_norm<A, B>(&self, M1: &A, M2: &B) -> ChainResult<f64>
    where
        A: AsDense + ?Sized,
        B: AsDense + ?Sized,
    {
        fidelity::frobenius_norm(&M1.as_dense(), &M2.as_dense())
    }

    /// Compute the normalized overlap loss between `M1` and `M2`.
    ///
    /// See [`fidelity::frobenius_loss`].
    fn frobenius_loss<A, B>(&self, M1: &A, M2: &B) -> ChainResult<f64>
    where
        A: AsDense + ?Sized,
        B: AsDense + ?Sized,
    {
        fidelity::frobenius_loss(&M1.as_dense(), &M2.as_dense())
    }

    /// Compare the evolution operators generated by `M1` and `M2`.
    ///
    /// See [`fidelity::norm_identity_loss`].
    fn norm_identity_loss<A, B>(&self, M1: &A, M2: &B) -> ChainResult<f64>
    where
        A: AsDense + ?Sized,
        B: AsDense + ?Sized,
    {
        fidelity::norm_identity_loss(&M1.as_dense(), &M2.as_dense())
    }
}

/// Available computation strategies.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    /// Exact diagonalization in the full product basis.
    Diagonalization,
    /// Density-matrix renormalization group; not yet available.
    RenormalizationGroup,
}

/// A computation strategy selected at runtime.
#[derive(Debug)]
pub enum Strategy<'a> {
    Diagonalization(DiagonEngine<'a>),
    RenormalizationGroup(DmrgEngine<'a>),
}

impl<'a> Strategy<'a> {
    /// Create a new strategy of the given kind.
    pub fn new(
        kind: StrategyKind,
        graph: &'a LatticeGraph,
        spin: SpinTotal,
        unit_cell_length: usize,
    ) -> ChainResult<Self>
    {
        match kind {
            StrategyKind::Diagonalization
                => DiagonEngine::new(graph, spin, unit_cell_length)
                    .map(Self::Diagonalization),
            StrategyKind::RenormalizationGroup
                => DmrgEngine::new(graph, spin, unit_cell_length)
                    .map(Self::RenormalizationGroup),
        }
    }

    pub fn kind(&self) -> StrategyKind {
        match self {
            Self::Diagonalization(_) => StrategyKind::Diagonalization,
            Self::RenormalizationGroup(_) => StrategyKind::RenormalizationGroup,
        }
    }
}

impl<'a> ComputationStrategy for Strategy<'a> {
    type Output = Hamiltonian;

    fn graph(&self) -> &LatticeGraph {
        match self {
            Self::Diagonalization(engine) => engine.graph(),
            Self::RenormalizationGroup(engine) => engine.graph(),
        }
    }

    fn spin(&self) -> SpinTotal {
        match self {
            Self::Diagonalization(engine) => engine.spin(),
            Self::RenormalizationGroup(engine) => engine.spin(),
        }
    }

    fn unit_cell_length(&self) -> usize {
        match self {
            Self::Diagonalization(engine) => engine.unit_cell_length(),
            Self::RenormalizationGroup(engine) => engine.unit_cell_length(),
        }
    }

    fn run_calculation(&self, t: &Param) -> ChainResult<Hamiltonian> {
        match self {
            Self::Diagonalization(engine) => engine.run_calculation(t),
            Self::RenormalizationGroup(engine) => engine.run_calculation(t),
        }
    }
}
