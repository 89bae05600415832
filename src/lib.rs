pub mod bc;
pub mod classifier;
pub mod equilibrium;
pub mod error;
pub mod global_variables;
pub mod grid;
pub mod io;
pub mod lattice;
pub mod node;
pub mod simulation;

pub use bc::{BoundaryCondition, BoundaryFace, BoundaryNode, ExtrapolationOrder};
pub use classifier::{classify, Classification, DirectionClass};
pub use equilibrium::{Equilibrium, Moments, SecondOrderBgk};
pub use error::{BoundaryError, CaseError, LatticeError, SimulationError};
pub use global_variables::*;
pub use grid::Grid;
pub use lattice::{Component, LatticeDescriptor, Stencil};
pub use node::{CornerType, NodeKind, OrientationCode};

#[derive(Clone, Debug)]
pub struct Residuals {
    pub density: Float,
    pub velocity: [Float; 3],
}
