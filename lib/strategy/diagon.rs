//! Exact diagonalization in the full (or magnetization-restricted) product
//! basis of a spin chain.

use std::cell::OnceCell;
use ndarray as nd;
use num_complex::Complex64 as C64;
use tracing::debug;
use crate::{
    error::{ ChainError, ChainResult },
    floquet::{ Floquet, FloquetSequence },
    graph::{ LatticeGraph, Param },
    hilbert::{ BasisParams, SpinBasis },
    operator::Hamiltonian,
    spin::{ SpinProj, SpinTotal },
    strategy::ComputationStrategy,
};

/// Builds many-body Hamiltonians from a [`LatticeGraph`] and composes them
/// into Floquet effective Hamiltonians.
///
/// The many-body basis is built on first use and cached for the lifetime of
/// the engine. Builder methods that change the basis parameters consume the
/// engine and return a fresh one with an empty cache.
#[derive(Clone, Debug)]
pub struct DiagonEngine<'a> {
    graph: &'a LatticeGraph,
    params: BasisParams,
    basis: OnceCell<SpinBasis>,
}

impl<'a> DiagonEngine<'a> {
    /// Create a new `DiagonEngine`.
    ///
    /// Fails if `unit_cell_length` does not divide the number of sites in
    /// `graph`.
    pub fn new(graph: &'a LatticeGraph, spin: SpinTotal, unit_cell_length: usize)
        -> ChainResult<Self>
    {
        let params = BasisParams::new(graph.num_sites(), spin, unit_cell_length);
        params.validate()?;
        Ok(Self { graph, params, basis: OnceCell::new() })
    }

    /// Restrict the basis to states with total magnetization `m`.
    pub fn with_magnetization(self, m: SpinProj) -> ChainResult<Self> {
        let params = BasisParams { magnetization: Some(m), ..self.params };
        params.validate()?;
        Ok(Self { graph: self.graph, params, basis: OnceCell::new() })
    }

    /// Select Pauli (`true`) or spin (`false`) normalization for all
    /// single-site operators other than the identity.
    pub fn with_pauli(self, pauli: bool) -> ChainResult<Self> {
        let params = BasisParams { pauli, ..self.params };
        params.validate()?;
        Ok(Self { graph: self.graph, params, basis: OnceCell::new() })
    }

    /// Return the basis parameters.
    pub fn params(&self) -> &BasisParams { &self.params }

    /// Return the many-body basis, building it if necessary.
    pub fn basis(&self) -> ChainResult<&SpinBasis> {
        if let Some(basis) = self.basis.get() {
            return Ok(basis);
        }
        let basis = SpinBasis::new(self.params)?;
        Ok(self.basis.get_or_init(|| basis))
    }

    /// Evaluate the graph at `t` and assemble the Hamiltonian over the cached
    /// basis.
    pub fn build_hamiltonian(&self, t: &Param) -> ChainResult<Hamiltonian> {
        let basis = self.basis()?;
        let terms = self.graph.evaluate(t);
        Hamiltonian::from_static(&terms, basis)
    }

    /// Build one Hamiltonian per drive parameter and compose them into a
    /// single drive period.
    ///
    /// The period is the sum of `durations` as given. Zero durations are then
    /// replaced with 1, so a step standing in for an instantaneous kick must
    /// already be scaled such that evolving under it for unit time produces
    /// the intended kick.
    pub fn build_floquet(&self, params: &[Param], durations: &[f64])
        -> ChainResult<Floquet>
    {
        if params.len() != durations.len() {
            return Err(ChainError::Config(
                format!(
                    "got {} drive parameters but {} durations",
                    params.len(), durations.len(),
                )
            ));
        }
        if let Some(dt) = durations.iter().find(|dt| !dt.is_finite() || **dt < 0.0) {
            return Err(ChainError::Config(
                format!("step durations must be non-negative, got {}", dt)
            ));
        }
        let period: f64 = durations.iter().sum();
        let steps: Vec<(Hamiltonian, f64)>
            = params.iter().zip(durations)
            .map(|(t, dt)| {
                let dt = if *dt == 0.0 { 1.0 } else { *dt };
                self.build_hamiltonian(t).map(|h| (h, dt))
            })
            .collect::<ChainResult<_>>()?;
        debug!(
            num_steps = steps.len(),
            num_kicks = durations.iter().filter(|dt| **dt == 0.0).count(),
            period,
            "composing Floquet sequence"
        );
        FloquetSequence::new(steps, period)?.floquet()
    }

    /// Like [`Self::build_floquet`], but return only the effective
    /// Hamiltonian.
    pub fn build_floquet_hamiltonian(&self, params: &[Param], durations: &[f64])
        -> ChainResult<nd::Array2<C64>>
    {
        self.build_floquet(params, durations).map(Floquet::into_hf)
    }
}

impl<'a> ComputationStrategy for DiagonEngine<'a> {
    type Output = Hamiltonian;

    fn graph(&self) -> &LatticeGraph { self.graph }

    fn spin(&self) -> SpinTotal { self.params.spin }

    fn unit_cell_length(&self) -> usize { self.params.unit_cell_length }

    fn run_calculation(&self, t: &Param) -> ChainResult<Hamiltonian> {
        self.build_hamiltonian(t)
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::PI;
    use super::*;
    use crate::{
        expm::expm,
        graph::{ Range, Strength },
    };

    fn assert_close(A: &nd::Array2<C64>, B: &nd::Array2<C64>, tol: f64) {
        assert_eq!(A.dim(), B.dim());
        for ((i, j), a) in A.indexed_iter() {
            assert!((a - B[[i, j]]).norm() < tol, "mismatch at ({}, {})", i, j);
        }
    }

    // XX + YY couplings that vanish during labelled kicks, plus z kicks
    fn driven_chain() -> LatticeGraph {
        let native = || Strength::pair(|t: &Param, _, _| {
            if t.time().is_some() { 0.5 } else { 0.0 }
        });
        let kick = Strength::on_site(|t: &Param, i| {
            if t.is("+DM") { PI / 2.0 * (i % 4) as f64 } else { 0.0 }
        });
        LatticeGraph::from_interactions(
            4,
            [
                ("XX", native(), Range::NearestNeighbor),
                ("YY", native(), Range::NearestNeighbor),
                ("z", kick, Range::OnSite),
            ],
            true,
        )
        .unwrap()
    }

    #[test]
    fn native_hamiltonian() {
        let graph = driven_chain();
        let engine = DiagonEngine::new(&graph, SpinTotal::HALF, 1).unwrap();
        let h = engine.run_calculation(&Param::Time(0.0)).unwrap();
        assert_eq!(h.dim(), 16);
        assert!(h.is_hermitian(1e-14));
        // XX + YY conserves magnetization: |up up up up> is an eigenstate
        let basis = engine.basis().unwrap();
        let psi = basis.get_vector_index(0).unwrap();
        let hpsi = h.dot_vec(&psi).unwrap();
        assert!(hpsi.iter().all(|a| a.norm() < 1e-14));
        let kick = engine.build_hamiltonian(&Param::from("+DM")).unwrap();
        assert!(kick.entries().iter().all(|(i, j, _)| i == j));
    }

    #[test]
    fn basis_is_cached() {
        let graph = driven_chain();
        let engine = DiagonEngine::new(&graph, SpinTotal::HALF, 2).unwrap();
        let first: *const SpinBasis = engine.basis().unwrap();
        engine.build_hamiltonian(&Param::Time(1.0)).unwrap();
        engine.build_hamiltonian(&Param::from("+DM")).unwrap();
        assert!(std::ptr::eq(first, engine.basis().unwrap()));
        assert_eq!(engine.basis().unwrap().unit_cell_length(), 2);

        let restricted = engine.with_magnetization(SpinProj::new(0)).unwrap();
        assert_eq!(restricted.basis().unwrap().len(), 6);
        assert_eq!(restricted.build_hamiltonian(&Param::Time(0.0)).unwrap().dim(), 6);
    }

    #[test]
    fn builder_validation() {
        let graph = driven_chain();
        assert!(matches!(
            DiagonEngine::new(&graph, SpinTotal::HALF, 3),
            Err(ChainError::UnitCell { .. }),
        ));
        assert!(matches!(
            DiagonEngine::new(&graph, SpinTotal::HALF, 0),
            Err(ChainError::UnitCell { .. }),
        ));
        assert!(matches!(
            DiagonEngine::new(&graph, SpinTotal::new(2), 1).unwrap().with_pauli(true),
            Err(ChainError::InvalidSpin(_)),
        ));
        assert!(matches!(
            DiagonEngine::new(&graph, SpinTotal::HALF, 1).unwrap()
                .with_magnetization(SpinProj::new(1)),
            Err(ChainError::Config(_)),
        ));
    }

    #[test]
    fn spin_normalization() {
        let graph = LatticeGraph::from_interactions(
            1, [("z", 1.0, Range::OnSite)], false).unwrap();
        let pauli = DiagonEngine::new(&graph, SpinTotal::HALF, 1).unwrap();
        let h = pauli.build_hamiltonian(&Param::default()).unwrap().to_dense();
        assert_eq!(h[[0, 0]], C64::from(1.0));
        assert_eq!(h[[1, 1]], C64::from(-1.0));
        let spin = pauli.with_pauli(false).unwrap();
        let h = spin.build_hamiltonian(&Param::default()).unwrap().to_dense();
        assert_eq!(h[[0, 0]], C64::from(0.5));
        assert_eq!(h[[1, 1]], C64::from(-0.5));
    }

    #[test]
    fn sector_violation() {
        let graph = LatticeGraph::from_interactions(
            4, [("x", 1.0, Range::OnSite)], false).unwrap();
        let engine
            = DiagonEngine::new(&graph, SpinTotal::HALF, 1).unwrap()
            .with_magnetization(SpinProj::new(0)).unwrap();
        assert!(matches!(
            engine.build_hamiltonian(&Param::default()),
            Err(ChainError::SymmetryViolation { .. }),
        ));
    }

    #[test]
    fn floquet_length_mismatch() {
        let graph = driven_chain();
        let engine = DiagonEngine::new(&graph, SpinTotal::HALF, 1).unwrap();
        let params = [Param::Time(0.0), Param::from("+DM")];
        assert!(matches!(
            engine.build_floquet_hamiltonian(&params, &[1.0]),
            Err(ChainError::Config(_)),
        ));
        assert!(matches!(
            engine.build_floquet_hamiltonian(&params, &[1.0, -1.0]),
            Err(ChainError::Config(_)),
        ));
        assert!(matches!(
            engine.build_floquet_hamiltonian(&params, &[0.0, 0.0]),
            Err(ChainError::Config(_)),
        ));
    }

    #[test]
    fn delta_kick_period() {
        let graph = driven_chain();
        let engine = DiagonEngine::new(&graph, SpinTotal::HALF, 1).unwrap();
        let params = [Param::Time(0.0), Param::from("+DM"), Param::Time(0.0)];
        let floquet = engine.build_floquet(&params, &[0.25, 0.0, 0.5]).unwrap();
        assert_eq!(floquet.period(), 0.75);

        // the kick is applied over unit time despite its zero duration
        let h0 = engine.build_hamiltonian(&Param::Time(0.0)).unwrap();
        let hk = engine.build_hamiltonian(&Param::from("+DM")).unwrap();
        let U
            = h0.propagator(0.5).unwrap()
            .dot(&hk.propagator(1.0).unwrap())
            .dot(&h0.propagator(0.25).unwrap());
        assert_close(floquet.unitary(), &U, 1e-10);
        let UF = expm(&floquet.hf().mapv(|a| -C64::i() * 0.75 * a)).unwrap();
        assert_close(&UF, &U, 1e-9);
    }

    #[test]
    fn commuting_kick_averages() {
        let native = Strength::pair(|t: &Param, _, _| {
            if t.time().is_some() { 0.3 } else { 0.0 }
        });
        let kick = Strength::on_site(|t: &Param, i| {
            if t.is("kick") { 0.2 * i as f64 } else { 0.0 }
        });
        let graph = LatticeGraph::from_interactions(
            3,
            [("zz", native, Range::NearestNeighbor), ("z", kick, Range::OnSite)],
            false,
        )
        .unwrap();
        let engine = DiagonEngine::new(&graph, SpinTotal::HALF, 1).unwrap();
        let hf = engine.build_floquet_hamiltonian(
            &[Param::Time(0.0), Param::from("kick")], &[2.0, 0.0]).unwrap();
        let h0 = engine.build_hamiltonian(&Param::Time(0.0)).unwrap().to_dense();
        let hk = engine.build_hamiltonian(&Param::from("kick")).unwrap().to_dense();
        let expected = &h0 + &hk.mapv(|a| a / 2.0);
        assert_close(&hf, &expected, 1e-10);
        assert!(engine.frobenius_loss(&hf, &expected).unwrap().abs() < 1e-10);
        assert!(engine.norm_identity_loss(&hf, &expected).unwrap() < 1e-8);
    }
}
