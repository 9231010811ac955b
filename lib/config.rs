//! Declarative chain descriptions in TOML.
//!
//! ```toml
//! num_sites = 4
//! periodic = true
//! spin = "1/2"
//!
//! [[interactions]]
//! operator = "XX"
//! strength = 0.5
//! range = "nearest-neighbor"
//!
//! [[interactions]]
//! operator = "zz"
//! strength = 1.0
//! range = 3.0
//! ```
//!
//! Only constant strengths can be described this way.

use serde::Deserialize;
use crate::{
    error::ChainResult,
    graph::{ InteractionSpec, LatticeGraph, Range },
    spin::{ SpinProj, SpinTotal },
    strategy::DiagonEngine,
};

fn default_spin() -> String { "1/2".to_string() }

fn default_unit_cell_length() -> usize { 1 }

/// Top-level chain description.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChainConfig {
    /// Number of sites in the chain.
    pub num_sites: usize,
    /// Close the chain into a ring.
    #[serde(default)]
    pub periodic: bool,
    /// Spin magnitude per site, e.g. `"1/2"` or `"1"`.
    #[serde(default = "default_spin")]
    pub spin: String,
    /// Translation period of the chain, in sites.
    #[serde(default = "default_unit_cell_length")]
    pub unit_cell_length: usize,
    /// Fixed total magnetization, if any.
    #[serde(default)]
    pub magnetization: Option<f64>,
    /// Override Pauli normalization of the single-site operators.
    #[serde(default)]
    pub pauli: Option<bool>,
    #[serde(default)]
    pub interactions: Vec<InteractionConfig>,
}

/// A single `[[interactions]]` table.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InteractionConfig {
    pub operator: String,
    pub strength: f64,
    pub range: RangeConfig,
}

/// A range given either as a token (`"nearest-neighbor"`, `"nnn"`, `"inf"`,
/// ...) or directly as a decay exponent.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum RangeConfig {
    Exponent(f64),
    Token(String),
}

impl RangeConfig {
    fn to_range(&self) -> ChainResult<Range> {
        match self {
            Self::Exponent(alpha) => Range::try_from(*alpha),
            Self::Token(token) => token.parse(),
        }
    }
}

impl InteractionConfig {
    fn to_spec(&self) -> ChainResult<InteractionSpec> {
        Ok(InteractionSpec::new(
            self.operator.as_str(), self.strength, self.range.to_range()?))
    }
}

impl ChainConfig {
    /// Parse a chain description from TOML.
    pub fn from_toml_str(s: &str) -> ChainResult<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Parse the spin magnitude.
    pub fn spin_total(&self) -> ChainResult<SpinTotal> { self.spin.parse() }

    /// Compile all interactions into a graph.
    pub fn graph(&self) -> ChainResult<LatticeGraph> {
        let specs: Vec<InteractionSpec>
            = self.interactions.iter()
            .map(InteractionConfig::to_spec)
            .collect::<ChainResult<_>>()?;
        LatticeGraph::from_interactions(self.num_sites, specs, self.periodic)
    }

    /// Create a [`DiagonEngine`] for `graph` with the basis settings of
    /// `self`.
    pub fn engine<'a>(&self, graph: &'a LatticeGraph)
        -> ChainResult<DiagonEngine<'a>>
    {
        let mut engine
            = DiagonEngine::new(graph, self.spin_total()?, self.unit_cell_length)?;
        if let Some(pauli) = self.pauli {
            engine = engine.with_pauli(pauli)?;
        }
        if let Some(m) = self.magnetization {
            engine = engine.with_magnetization(SpinProj::from_f64(m))?;
        }
        Ok(engine)
    }
}
