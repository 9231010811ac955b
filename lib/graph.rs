//! Declarative description of chain interactions and their expansion into
//! explicit, site-indexed terms.
//!
//! An interaction is specified by an operator label (e.g. `"xx"`, `"z"`), a
//! [`Strength`], and a [`Range`]. [`LatticeGraph::from_interactions`] expands a
//! list of these into one list of [`Term`]s per operator label, which can then
//! be [evaluated][LatticeGraph::evaluate] at a particular [`Param`] to give
//! plain numerical coefficients.

use std::{ fmt, rc::Rc, str::FromStr };
use indexmap::IndexMap;
use tracing::debug;
use crate::error::{ ChainError, ChainResult };

/// Value passed to time-dependent couplings.
///
/// This is usually a time, but couplings are free to branch on a named label
/// instead (e.g. the name of a pulse in a drive sequence).
#[derive(Clone, Debug, PartialEq)]
pub enum Param {
    /// A point in time.
    Time(f64),
    /// A named drive configuration.
    Label(String),
}

impl Default for Param {
    fn default() -> Self { Self::Time(0.0) }
}

impl From<f64> for Param {
    fn from(t: f64) -> Self { Self::Time(t) }
}

impl From<&str> for Param {
    fn from(label: &str) -> Self { Self::Label(label.to_string()) }
}

impl From<String> for Param {
    fn from(label: String) -> Self { Self::Label(label) }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Time(t) => write!(f, "{}", t),
            Self::Label(label) => write!(f, "{}", label),
        }
    }
}

impl Param {
    /// Return the time, if `self` is a time.
    pub fn time(&self) -> Option<f64> {
        match self {
            Self::Time(t) => Some(*t),
            Self::Label(_) => None,
        }
    }

    /// Return the label, if `self` is a label.
    pub fn label(&self) -> Option<&str> {
        match self {
            Self::Time(_) => None,
            Self::Label(label) => Some(label.as_str()),
        }
    }

    /// Return `true` if `self` is the label `name`.
    pub fn is(&self, name: &str) -> bool { self.label() == Some(name) }
}

/// Heap-allocated [`Fn`] trait object computing a coupling with all site
/// indices already bound.
pub type CouplingFn = Rc<dyn Fn(&Param) -> f64>;

/// Heap-allocated [`Fn`] trait object computing an on-site strength.
pub type OnSiteFn = Rc<dyn Fn(&Param, usize) -> f64>;

/// Heap-allocated [`Fn`] trait object computing a two-site strength.
pub type PairFn = Rc<dyn Fn(&Param, usize, usize) -> f64>;

/// Coefficient of a single compiled term.
#[derive(Clone)]
pub enum Coupling {
    /// A fixed number.
    Constant(f64),
    /// A function of the drive parameter.
    TimeFunction(CouplingFn),
}

impl fmt::Debug for Coupling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant(c) => write!(f, "Constant({:?})", c),
            Self::TimeFunction(_) => write!(f, "TimeFunction(...)"),
        }
    }
}

impl From<f64> for Coupling {
    fn from(c: f64) -> Self { Self::Constant(c) }
}

impl Coupling {
    /// Create a new [`Self::TimeFunction`].
    pub fn from_fn<F>(f: F) -> Self
    where F: Fn(&Param) -> f64 + 'static
    {
        Self::TimeFunction(Rc::new(f))
    }

    /// Resolve the coupling at `t`.
    pub fn evaluate(&self, t: &Param) -> f64 {
        match self {
            Self::Constant(c) => *c,
            Self::TimeFunction(f) => f(t),
        }
    }
}

/// User-facing interaction strength.
///
/// Functional strengths receive the drive parameter followed by the site
/// index (on-site) or pair of site indices (two-site).
#[derive(Clone)]
pub enum Strength {
    /// A fixed number.
    Constant(f64),
    /// A function `(t, i)` for on-site interactions.
    OnSite(OnSiteFn),
    /// A function `(t, i, j)` for two-site interactions.
    Pair(PairFn),
}

impl fmt::Debug for Strength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant(c) => write!(f, "Constant({:?})", c),
            Self::OnSite(_) => write!(f, "OnSite(...)"),
            Self::Pair(_) => write!(f, "Pair(...)"),
        }
    }
}

impl From<f64> for Strength {
    fn from(c: f64) -> Self { Self::Constant(c) }
}

impl Strength {
    /// Create a new [`Self::OnSite`].
    pub fn on_site<F>(f: F) -> Self
    where F: Fn(&Param, usize) -> f64 + 'static
    {
        Self::OnSite(Rc::new(f))
    }

    /// Create a new [`Self::Pair`].
    pub fn pair<F>(f: F) -> Self
    where F: Fn(&Param, usize, usize) -> f64 + 'static
    {
        Self::Pair(Rc::new(f))
    }

    fn num_sites(&self) -> Option<usize> {
        match self {
            Self::Constant(_) => None,
            Self::OnSite(_) => Some(1),
            Self::Pair(_) => Some(2),
        }
    }
}

/// Spatial extent of an interaction.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Range {
    /// Sites `i` and `i + 1`.
    NearestNeighbor,
    /// Sites `i` and `i + 2`.
    NextNearestNeighbor,
    /// All pairs of sites, with strength decaying as `1 / |i - j|^alpha`.
    PowerLaw(f64),
    /// Single-site terms on every site.
    OnSite,
}

impl Range {
    /// Number of sites acted on by each term of this range.
    pub fn arity(&self) -> usize {
        match self {
            Self::OnSite => 1,
            _ => 2,
        }
    }

    fn check(&self) -> ChainResult<()> {
        match self {
            Self::PowerLaw(alpha) if alpha.is_nan() || *alpha < 0.0 => {
                Err(ChainError::InvalidRange(alpha.to_string()))
            },
            Self::PowerLaw(alpha) if alpha.is_infinite() => {
                Err(ChainError::InvalidRange(
                    "infinite decay exponent; use Range::OnSite".to_string()
                ))
            },
            _ => Ok(()),
        }
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NearestNeighbor => write!(f, "nearest-neighbor"),
            Self::NextNearestNeighbor => write!(f, "next-nearest-neighbor"),
            Self::PowerLaw(alpha) => write!(f, "power-law (alpha = {})", alpha),
            Self::OnSite => write!(f, "on-site"),
        }
    }
}

/// Numeric ranges are decay exponents; `f64::INFINITY` is the on-site
/// sentinel.
impl TryFrom<f64> for Range {
    type Error = ChainError;

    fn try_from(alpha: f64) -> ChainResult<Self> {
        if alpha == f64::INFINITY { return Ok(Self::OnSite); }
        let range = Self::PowerLaw(alpha);
        range.check()?;
        Ok(range)
    }
}

impl FromStr for Range {
    type Err = ChainError;

    fn from_str(s: &str) -> ChainResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "nn" | "nearest-neighbor" => Ok(Self::NearestNeighbor),
            "nnn" | "next-nearest-neighbor" => Ok(Self::NextNearestNeighbor),
            "inf" | "on-site" => Ok(Self::OnSite),
            other => other.parse::<f64>()
                .map_err(|_| ChainError::InvalidRange(s.to_string()))
                .and_then(Self::try_from),
        }
    }
}

/// A single `(operator, strength, range)` interaction specification.
#[derive(Clone, Debug)]
pub struct InteractionSpec {
    pub operator: String,
    pub strength: Strength,
    pub range: Range,
}

impl InteractionSpec {
    /// Create a new `InteractionSpec`.
    pub fn new<O, S>(operator: O, strength: S, range: Range) -> Self
    where
        O: Into<String>,
        S: Into<Strength>,
    {
        Self { operator: operator.into(), strength: strength.into(), range }
    }
}

impl<O, S> From<(O, S, Range)> for InteractionSpec
where
    O: Into<String>,
    S: Into<Strength>,
{
    fn from(spec: (O, S, Range)) -> Self {
        let (operator, strength, range) = spec;
        Self::new(operator, strength, range)
    }
}

/// A compiled term: a coupling acting on one or two sites.
#[derive(Clone, Debug)]
pub struct Term {
    pub coupling: Coupling,
    sites: Vec<usize>,
}

impl Term {
    /// Create a new single-site term.
    pub fn one_site<C>(coupling: C, i: usize) -> Self
    where C: Into<Coupling>
    {
        Self { coupling: coupling.into(), sites: vec![i] }
    }

    /// Create a new two-site term.
    pub fn two_site<C>(coupling: C, i: usize, j: usize) -> Self
    where C: Into<Coupling>
    {
        Self { coupling: coupling.into(), sites: vec![i, j] }
    }

    /// Return the site indices acted on by `self`.
    pub fn sites(&self) -> &[usize] { &self.sites }

    /// Resolve the coupling at `t`.
    pub fn evaluate(&self, t: &Param) -> StaticTerm {
        StaticTerm {
            coefficient: self.coupling.evaluate(t),
            sites: self.sites.clone(),
        }
    }
}

/// A term with its coefficient resolved to a number.
#[derive(Clone, Debug, PartialEq)]
pub struct StaticTerm {
    pub coefficient: f64,
    pub sites: Vec<usize>,
}

/// Evaluated interaction dictionary: operator label to resolved terms.
pub type StaticTerms = IndexMap<String, Vec<StaticTerm>>;

/// A chain of sites together with all compiled interaction terms, keyed by
/// lower-case operator label.
#[derive(Clone, Debug)]
pub struct LatticeGraph {
    num_sites: usize,
    interaction_dict: IndexMap<String, Vec<Term>>,
}

impl LatticeGraph {
    /// Create a new `LatticeGraph` from pre-compiled terms.
    pub fn new(num_sites: usize, interaction_dict: IndexMap<String, Vec<Term>>)
        -> ChainResult<Self>
    {
        if num_sites == 0 { return Err(ChainError::EmptyLattice); }
        Ok(Self { num_sites, interaction_dict })
    }

    /// Expand a list of interaction specifications into explicit terms.
    ///
    /// Specifications sharing an operator label (after lower-casing) have their
    /// terms concatenated in order. Ranges expand as follows:
    /// - [`Range::NearestNeighbor`]: pairs `(i, i + 1)` for `i` in `0..N - 1`,
    ///   plus `(N - 1, 0)` if `periodic`.
    /// - [`Range::NextNearestNeighbor`]: likewise with offset 2.
    /// - [`Range::OnSite`]: one term per site.
    /// - [`Range::PowerLaw`]: every ordered pair `(i, j)`, including `i == j`,
    ///   with the strength divided by `|i - j|^alpha`. Self-pairs are kept as
    ///   is, so for `alpha > 0` their coefficients are infinite (or NaN for a
    ///   vanishing strength).
    pub fn from_interactions<I, T>(num_sites: usize, terms: I, periodic: bool)
        -> ChainResult<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<InteractionSpec>,
    {
        if num_sites == 0 { return Err(ChainError::EmptyLattice); }
        let mut interaction_dict: IndexMap<String, Vec<Term>>
            = IndexMap::new();
        for spec in terms.into_iter().map(Into::into) {
            let InteractionSpec { operator, strength, range } = spec;
            let operator = validate(operator, &strength, range)?;
            let expanded = expand(num_sites, &strength, range, periodic);
            interaction_dict.entry(operator).or_default().extend(expanded);
        }
        for (op, terms) in interaction_dict.iter() {
            debug!(operator = %op, num_terms = terms.len(), "compiled interaction");
        }
        Ok(Self { num_sites, interaction_dict })
    }

    pub fn num_sites(&self) -> usize { self.num_sites }

    /// Return a reference to all compiled terms.
    pub fn interaction_dict(&self) -> &IndexMap<String, Vec<Term>> {
        &self.interaction_dict
    }

    /// Return the terms for a single operator label.
    pub fn terms(&self, operator: &str) -> Option<&[Term]> {
        self.interaction_dict.get(operator).map(|terms| terms.as_slice())
    }

    /// Resolve every coupling at `t`.
    ///
    /// `self` is left untouched; the result has the same labels and term order.
    pub fn evaluate(&self, t: &Param) -> StaticTerms {
        self.interaction_dict.iter()
            .map(|(op, terms)| {
                (op.clone(), terms.iter().map(|term| term.evaluate(t)).collect())
            })
            .collect()
    }
}

fn validate(operator: String, strength: &Strength, range: Range)
    -> ChainResult<String>
{
    if operator.is_empty() {
        return Err(ChainError::InvalidOperator(operator));
    }
    range.check()?;
    let operator = operator.to_lowercase();
    let expected = range.arity();
    if operator.chars().count() != expected {
        return Err(ChainError::OperatorArity {
            operator,
            range: range.to_string(),
            expected,
        });
    }
    match strength.num_sites() {
        Some(found) if found != expected => {
            Err(ChainError::StrengthArity {
                operator,
                range: range.to_string(),
                expected,
                found,
            })
        },
        _ => Ok(operator),
    }
}

fn neighbor_pairs(num_sites: usize, offset: usize, periodic: bool)
    -> impl Iterator<Item = (usize, usize)>
{
    let count = (num_sites + usize::from(periodic)).saturating_sub(offset);
    (0..count).map(move |i| (i, (i + offset) % num_sites))
}

fn pair_term(strength: &Strength, i: usize, j: usize, scale: f64) -> Term {
    match strength {
        Strength::Constant(c) => Term::two_site(*c / scale, i, j),
        Strength::Pair(f) => {
            let f = Rc::clone(f);
            Term::two_site(Coupling::from_fn(move |t| f(t, i, j) / scale), i, j)
        },
        // excluded by `validate`
        Strength::OnSite(_) => unreachable!(),
    }
}

fn expand(num_sites: usize, strength: &Strength, range: Range, periodic: bool)
    -> Vec<Term>
{
    match range {
        Range::NearestNeighbor => {
            neighbor_pairs(num_sites, 1, periodic)
                .map(|(i, j)| pair_term(strength, i, j, 1.0))
                .collect()
        },
        Range::NextNearestNeighbor => {
            neighbor_pairs(num_sites, 2, periodic)
                .map(|(i, j)| pair_term(strength, i, j, 1.0))
                .collect()
        },
        Range::OnSite => {
            (0..num_sites)
                .map(|i| match strength {
                    Strength::Constant(c) => Term::one_site(*c, i),
                    Strength::OnSite(f) => {
                        let f = Rc::clone(f);
                        Term::one_site(Coupling::from_fn(move |t| f(t, i)), i)
                    },
                    // excluded by `validate`
                    Strength::Pair(_) => unreachable!(),
                })
                .collect()
        },
        Range::PowerLaw(alpha) => {
            (0..num_sites)
                .flat_map(|i| (0..num_sites).map(move |j| (i, j)))
                .map(|(i, j)| {
                    let dist = i.abs_diff(j) as f64;
                    pair_term(strength, i, j, dist.powf(alpha))
                })
                .collect()
        },
    }
}
