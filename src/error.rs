use crate::global_variables::*;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BoundaryError {
    #[error("direction {direction} cannot be classified for orientation {orientation} at node {node:?}")]
    Unclassifiable {
        node: [i64; 3],
        orientation: String,
        direction: usize,
    },

    #[error("wall density {density} at node {node:?} is not finite and positive")]
    InvalidWallDensity { node: [i64; 3], density: Float },

    #[error("population {value} of direction {direction} at node {node:?} is not finite and positive")]
    InvalidPopulation {
        node: [i64; 3],
        direction: usize,
        value: Float,
    },

    #[error("density sum {sum} at node {node:?} cannot be rescaled")]
    InvalidDensitySum { node: [i64; 3], sum: Float },

    #[error("neighbour {neighbour:?} of node {node:?} lies outside the grid and its halo")]
    MissingNeighbour {
        node: [i64; 3],
        neighbour: [i64; 3],
    },

    #[error("{kernel} is not defined for the {lattice} lattice")]
    UnsupportedLattice {
        kernel: &'static str,
        lattice: String,
    },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LatticeError {
    #[error("unknown lattice stencil: {0}")]
    UnknownStencil(String),

    #[error("direction {0} has no opposite direction")]
    MissingOpposite(usize),

    #[error("component {component} range [{start}, {end}] is invalid for {q} directions")]
    InvalidComponentRange {
        component: usize,
        start: usize,
        end: usize,
        q: usize,
    },

    #[error("direction {0} is not covered exactly once by the components")]
    ComponentCoverage(usize),

    #[error("weights of component {component} sum to {sum} instead of 1")]
    WeightSum { component: usize, sum: Float },

    #[error("a lattice needs between 1 and {max} directions, got {q}")]
    DirectionCount { q: usize, max: usize },
}

#[derive(Error, Debug)]
pub enum CaseError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("missing parameter: {0}")]
    MissingParameter(String),

    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error(transparent)]
    Lattice(#[from] LatticeError),
}

#[derive(Error, Debug)]
pub enum SimulationError {
    #[error("case setup: {0}")]
    Case(#[from] CaseError),

    #[error("boundary pass at step {step}: {source}")]
    Boundary { step: usize, source: BoundaryError },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
