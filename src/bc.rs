pub mod bounce_back;
pub mod diffuse_reflection;
pub mod extrapolation;
pub mod free_flux;
pub mod periodic;
pub mod zou_he;

use crate::classifier::Classification;
use crate::equilibrium::Equilibrium;
use crate::error::BoundaryError;
use crate::global_variables::*;
use crate::grid::Grid;
use crate::lattice::{Component, LatticeDescriptor};
use crate::node::{NodeKind, OrientationCode};
use log::{debug, error};
use rayon::prelude::*;
use std::fmt;
use std::str::FromStr;

#[derive(Hash, Eq, PartialEq, Clone, Copy, Debug)]
pub enum BoundaryFace {
    West,
    East,
    South,
    North,
    Bottom,
    Top,
}

impl BoundaryFace {
    pub const ALL: [BoundaryFace; 6] = [
        BoundaryFace::West,
        BoundaryFace::East,
        BoundaryFace::South,
        BoundaryFace::North,
        BoundaryFace::Bottom,
        BoundaryFace::Top,
    ];

    pub fn axis(&self) -> usize {
        match self {
            BoundaryFace::West | BoundaryFace::East => 0,
            BoundaryFace::South | BoundaryFace::North => 1,
            BoundaryFace::Bottom | BoundaryFace::Top => 2,
        }
    }

    pub fn sign(&self) -> i8 {
        match self {
            BoundaryFace::West | BoundaryFace::South | BoundaryFace::Bottom => 1,
            BoundaryFace::East | BoundaryFace::North | BoundaryFace::Top => -1,
        }
    }

    pub fn plane(&self, n: usize) -> i64 {
        if self.sign() > 0 {
            0
        } else {
            n as i64 - 1
        }
    }

    pub fn orientation(&self) -> OrientationCode {
        OrientationCode::face(self.axis(), self.sign())
    }

    pub fn name(&self) -> &'static str {
        match self {
            BoundaryFace::West => "west",
            BoundaryFace::East => "east",
            BoundaryFace::South => "south",
            BoundaryFace::North => "north",
            BoundaryFace::Bottom => "bottom",
            BoundaryFace::Top => "top",
        }
    }
}

impl fmt::Display for BoundaryFace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for BoundaryFace {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|face| face.name() == s.trim())
            .ok_or(format!("Invalid boundary face: {s}."))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExtrapolationOrder {
    First,
    Second,
}

#[derive(Clone, Debug, PartialEq)]
pub enum BoundaryCondition {
    BounceBack,
    EquilibriumDiffuseReflection {
        velocity: [Float; 3],
    },
    ZouHeVelocity {
        velocity: [Float; 3],
    },
    ExtrapolatedPressure {
        order: ExtrapolationOrder,
        density: Float,
    },
    Periodic,
    FreeFlux,
}

impl BoundaryCondition {
    pub fn node_kind(&self) -> NodeKind {
        match self {
            BoundaryCondition::BounceBack => NodeKind::BounceBackWall,
            BoundaryCondition::EquilibriumDiffuseReflection { .. } => {
                NodeKind::EquilibriumDiffuseReflection
            }
            BoundaryCondition::ZouHeVelocity { .. } => NodeKind::ZouHeVelocity,
            BoundaryCondition::ExtrapolatedPressure {
                order: ExtrapolationOrder::First,
                ..
            } => NodeKind::ExtrapolatedPressure1st,
            BoundaryCondition::ExtrapolatedPressure {
                order: ExtrapolationOrder::Second,
                ..
            } => NodeKind::ExtrapolatedPressure2nd,
            BoundaryCondition::Periodic => NodeKind::Periodic,
            BoundaryCondition::FreeFlux => NodeKind::FreeFlux,
        }
    }

    pub fn halo_depth(&self) -> usize {
        match self {
            BoundaryCondition::ExtrapolatedPressure {
                order: ExtrapolationOrder::Second,
                ..
            } => 2,
            _ => 1,
        }
    }

    pub fn reconstruct(
        &self,
        node: &BoundaryNode,
        equilibrium: &dyn Equilibrium,
    ) -> Result<Option<[Float; MAX_Q]>, BoundaryError> {
        if node.kind != self.node_kind() {
            if cfg!(debug_assertions) {
                debug!(
                    "Node {:?} is a {} node, skipping the {} condition.",
                    node.coords,
                    node.kind,
                    self.node_kind()
                );
            }
            return Ok(None);
        }
        let f = match self {
            BoundaryCondition::BounceBack => bounce_back::reconstruct(node)?,
            BoundaryCondition::EquilibriumDiffuseReflection { velocity } => {
                diffuse_reflection::reconstruct(node, equilibrium, velocity)?
            }
            BoundaryCondition::ZouHeVelocity { velocity } => zou_he::reconstruct(node, velocity)?,
            BoundaryCondition::ExtrapolatedPressure { order, density } => {
                extrapolation::reconstruct(node, *order, *density)?
            }
            BoundaryCondition::Periodic => periodic::reconstruct(node)?,
            BoundaryCondition::FreeFlux => free_flux::reconstruct(node)?,
        };
        Ok(Some(f))
    }
}

pub struct BoundaryNode<'a> {
    pub grid: &'a Grid,
    pub lattice: &'a LatticeDescriptor,
    pub index: usize,
    pub coords: [i64; 3],
    pub kind: NodeKind,
    pub orientation: OrientationCode,
}

impl<'a> BoundaryNode<'a> {
    pub fn new(grid: &'a Grid, lattice: &'a LatticeDescriptor, index: usize) -> Self {
        Self {
            grid,
            lattice,
            index,
            coords: grid.coords(index),
            kind: grid.kind(index),
            orientation: grid.orientation(index),
        }
    }

    pub fn populations(&self) -> [Float; MAX_Q] {
        let mut f = [0.0; MAX_Q];
        let own = self.grid.populations(self.index);
        f[..own.len()].copy_from_slice(own);
        f
    }

    pub fn offset(&self, offset: [i64; 3]) -> [i64; 3] {
        [
            self.coords[0] + offset[0],
            self.coords[1] + offset[1],
            self.coords[2] + offset[2],
        ]
    }

    pub fn neighbour(&self, offset: [i64; 3]) -> Result<&'a [Float], BoundaryError> {
        let neighbour = self.offset(offset);
        self.grid
            .populations_at(neighbour)
            .ok_or(BoundaryError::MissingNeighbour {
                node: self.coords,
                neighbour,
            })
    }

    pub fn shares_kind_with(&self, offset: [i64; 3]) -> bool {
        self.grid.kind_at(self.offset(offset)) == Some(self.kind)
    }

    /// Axes whose face rule applies at this node.
    ///
    /// A face uses its own axis. At an edge or corner, axis `a` applies only
    /// if the node one step along every other contributing axis `b` shares
    /// this node's kind.
    pub fn applicable_axes(&self) -> impl Iterator<Item = (usize, i32)> + '_ {
        self.orientation.axes().filter(move |&(a, _)| {
            self.orientation
                .axes()
                .filter(|&(b, _)| b != a)
                .all(|(b, s_b)| self.shares_kind_with(step(b, s_b as i64)))
        })
    }

    pub fn classification(&self, component: Component) -> Result<Classification, BoundaryError> {
        Classification::new(self.lattice, &self.orientation, component, self.coords)
    }

    pub fn check_orientation(&self) -> Result<(), BoundaryError> {
        self.classification(Component::new(0, self.lattice.q - 1))
            .map(|_| ())
    }

    pub fn check_population(&self, q: usize, value: Float) -> Result<(), BoundaryError> {
        if value.is_finite() && value > 0.0 {
            return Ok(());
        }
        error!(
            "Population {q} at node {:?} ({}) is {value} after reconstruction.",
            self.coords, self.orientation
        );
        Err(BoundaryError::InvalidPopulation {
            node: self.coords,
            direction: q,
            value,
        })
    }
}

pub fn step(axis: usize, steps: i64) -> [i64; 3] {
    let mut offset = [0; 3];
    offset[axis] = steps;
    offset
}

impl Grid {
    /// Runs `condition` over `nodes` and returns how many nodes it rewrote.
    ///
    /// Every node is reconstructed from the grid as it was before the pass;
    /// nothing is written back unless all of them succeed.
    pub fn apply_boundary_condition(
        &mut self,
        lattice: &LatticeDescriptor,
        equilibrium: &dyn Equilibrium,
        condition: &BoundaryCondition,
        nodes: &[usize],
    ) -> Result<usize, BoundaryError> {
        let grid: &Grid = self;
        let updates = nodes
            .par_iter()
            .map(|&index| {
                let node = BoundaryNode::new(grid, lattice, index);
                condition
                    .reconstruct(&node, equilibrium)
                    .map(|f| f.map(|f| (index, f)))
            })
            .collect::<Result<Vec<_>, BoundaryError>>()?;
        let q = self.q;
        let mut rewritten = 0;
        for (index, f) in updates.into_iter().flatten() {
            self.populations_mut(index).copy_from_slice(&f[..q]);
            rewritten += 1;
        }
        Ok(rewritten)
    }

    pub fn apply_boundary_condition_on_face(
        &mut self,
        lattice: &LatticeDescriptor,
        equilibrium: &dyn Equilibrium,
        condition: &BoundaryCondition,
        face: BoundaryFace,
    ) -> Result<usize, BoundaryError> {
        let nodes = self.boundary_nodes(face);
        self.apply_boundary_condition(lattice, equilibrium, condition, &nodes)
    }
}
