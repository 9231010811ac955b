//! Error type shared by all parts of the crate.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type ChainResult<T> = Result<T, ChainError>;

/// Failures raised while compiling interaction specifications, building
/// operators, or comparing them.
///
/// All failures are synchronous and deterministic; nothing here is worth
/// retrying.
#[derive(Debug, Error)]
pub enum ChainError {
    /// A lattice must contain at least one site.
    #[error("lattice must contain at least one site")]
    EmptyLattice,

    /// An interaction operator label was empty.
    #[error("invalid interaction operator, expected a non-empty string: {0:?}")]
    InvalidOperator(String),

    /// The operator label has the wrong number of single-site factors for the
    /// requested interaction range.
    #[error("{range} interaction requires a {expected}-site operator: {operator:?}")]
    OperatorArity {
        operator: String,
        range: String,
        expected: usize,
    },

    /// A strength function takes a different number of site indices than the
    /// requested interaction range supplies.
    #[error(
        "strength for {operator:?} takes {found} site index(es) but {range} \
        interactions supply {expected}"
    )]
    StrengthArity {
        operator: String,
        range: String,
        expected: usize,
        found: usize,
    },

    /// Unrecognized range cutoff token or invalid decay exponent.
    #[error("invalid range cutoff: {0}")]
    InvalidRange(String),

    /// Unparseable or unsupported spin magnitude.
    #[error("invalid spin magnitude: {0}")]
    InvalidSpin(String),

    /// The unit cell must tile the chain.
    #[error(
        "unit cell length {unit_cell_length} does not tile a chain of \
        {num_sites} sites"
    )]
    UnitCell {
        num_sites: usize,
        unit_cell_length: usize,
    },

    /// A single-site operator letter outside of `x y z + - I`.
    #[error("unknown single-site operator {letter:?} in {operator:?}")]
    UnknownOperator {
        operator: String,
        letter: char,
    },

    /// A term refers to a site outside of the chain.
    #[error("site index {site} out of range for a chain of {num_sites} sites")]
    SiteOutOfRange {
        site: usize,
        num_sites: usize,
    },

    /// A term maps states out of the restricted magnetization sector.
    #[error("term {operator:?} on sites {sites:?} does not conserve the magnetization sector")]
    SymmetryViolation {
        operator: String,
        sites: Vec<usize>,
    },

    /// Inconsistent call or configuration parameters.
    #[error("configuration error: {0}")]
    Config(String),

    /// Malformed TOML configuration.
    #[error("failed to parse configuration: {0}")]
    Toml(#[from] toml::de::Error),

    /// Two operators that must have identical shapes do not.
    #[error("operator shapes differ: {0:?} vs {1:?}")]
    ShapeMismatch((usize, usize), (usize, usize)),

    /// Infinite or NaN values reached a dense linear-algebra routine.
    #[error("non-finite values encountered in {0}")]
    NonFinite(&'static str),

    /// The computation strategy does not provide this operation.
    #[error("{0} is not implemented")]
    NotImplemented(&'static str),

    /// Failure inside LAPACK.
    #[error("linear algebra error: {0}")]
    Linalg(#[from] ndarray_linalg::error::LinalgError),
}
