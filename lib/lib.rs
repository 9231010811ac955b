#![allow(dead_code, non_snake_case, non_upper_case_globals)]

//! Periodically driven spin chains: interaction graphs, exact many-body
//! Hamiltonians, Floquet effective Hamiltonians, and operator fidelities.

pub mod error;
pub mod spin;
pub mod hilbert;
pub mod graph;
pub mod operator;
pub mod expm;
pub mod floquet;
pub mod fidelity;
pub mod strategy;
pub mod config;

pub use error::{ ChainError, ChainResult };
pub use graph::{ InteractionSpec, LatticeGraph, Param, Range, Strength };
pub use operator::{ AsDense, Hamiltonian };
pub use floquet::{ Floquet, FloquetSequence };
pub use strategy::{
    ComputationStrategy,
    DiagonEngine,
    DmrgEngine,
    Strategy,
    StrategyKind,
};
pub use config::ChainConfig;
