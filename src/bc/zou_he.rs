//! Zou & He (1997) velocity boundary for D2Q9.
//!
//! Faces solve the node density from the known populations. Inner corners
//! cannot, so they read the macroscopic density supplied on the grid at the
//! diagonal interior neighbour. The closure assumes streaming and relaxation
//! are applied together at the boundary node.

use super::BoundaryNode;
use crate::error::BoundaryError;
use crate::global_variables::*;
use crate::lattice::Stencil;
use crate::node::CornerType;
use log::{error, warn};

pub fn reconstruct(
    node: &BoundaryNode,
    velocity: &[Float; 3],
) -> Result<[Float; MAX_Q], BoundaryError> {
    let lattice = node.lattice;
    if !lattice.is(Stencil::D2Q9) || lattice.q != 9 {
        return Err(BoundaryError::UnsupportedLattice {
            kernel: "Zou-He velocity",
            lattice: format!("{} ({} directions)", lattice.stencil, lattice.q),
        });
    }
    node.check_orientation()?;

    let mut f = node.populations();
    let [ux, uy, _] = *velocity;
    let Some(normal) = node.orientation.normal() else {
        return Ok(f);
    };
    let rewritten: &[usize] = match (normal, node.orientation.corner_type()) {
        ([1, 0, 0], _) => {
            let known = f[0] + f[2] + f[4] + 2.0 * (f[3] + f[6] + f[7]);
            let rho = face_density(node, known / (1.0 - ux))?;
            f[1] = f[3] + (2.0 / 3.0) * rho * ux;
            f[5] = f[7] - 0.5 * (f[2] - f[4]) + 0.5 * rho * uy + (1.0 / 6.0) * rho * ux;
            f[8] = f[6] + 0.5 * (f[2] - f[4]) - 0.5 * rho * uy + (1.0 / 6.0) * rho * ux;
            &[1, 5, 8]
        }
        ([-1, 0, 0], _) => {
            let known = f[0] + f[2] + f[4] + 2.0 * (f[1] + f[5] + f[8]);
            let rho = face_density(node, known / (1.0 + ux))?;
            f[3] = f[1] - (2.0 / 3.0) * rho * ux;
            f[7] = f[5] + 0.5 * (f[2] - f[4]) - 0.5 * rho * uy - (1.0 / 6.0) * rho * ux;
            f[6] = f[8] - 0.5 * (f[2] - f[4]) + 0.5 * rho * uy - (1.0 / 6.0) * rho * ux;
            &[3, 6, 7]
        }
        ([0, 1, 0], _) => {
            let known = f[0] + f[1] + f[3] + 2.0 * (f[4] + f[7] + f[8]);
            let rho = face_density(node, known / (1.0 - uy))?;
            f[2] = f[4] + (2.0 / 3.0) * rho * uy;
            f[5] = f[7] - 0.5 * (f[1] - f[3]) + 0.5 * rho * ux + (1.0 / 6.0) * rho * uy;
            f[6] = f[8] + 0.5 * (f[1] - f[3]) - 0.5 * rho * ux + (1.0 / 6.0) * rho * uy;
            &[2, 5, 6]
        }
        ([0, -1, 0], _) => {
            let known = f[0] + f[1] + f[3] + 2.0 * (f[2] + f[5] + f[6]);
            let rho = face_density(node, known / (1.0 + uy))?;
            f[4] = f[2] - (2.0 / 3.0) * rho * uy;
            f[7] = f[5] + 0.5 * (f[1] - f[3]) - 0.5 * rho * ux - (1.0 / 6.0) * rho * uy;
            f[8] = f[6] - 0.5 * (f[1] - f[3]) + 0.5 * rho * ux - (1.0 / 6.0) * rho * uy;
            &[4, 7, 8]
        }
        ([1, 1, 0], Some(CornerType::Inner)) => {
            let rho = corner_density(node, [1, 1, 0])?;
            let known = f[0] + 2.0 * (f[3] + f[4] + f[7]);
            f[1] = f[3] + (2.0 / 3.0) * rho * ux;
            f[2] = f[4] + (2.0 / 3.0) * rho * uy;
            f[5] = f[7] + (1.0 / 6.0) * rho * (ux + uy);
            f[6] = 0.5 * rho * (1.0 - ux - (2.0 / 3.0) * uy) - 0.5 * known;
            f[8] = 0.5 * rho * (1.0 - (2.0 / 3.0) * ux - uy) - 0.5 * known;
            &[1, 2, 5, 6, 8]
        }
        ([1, -1, 0], Some(CornerType::Inner)) => {
            let rho = corner_density(node, [1, -1, 0])?;
            let known = f[0] + 2.0 * (f[2] + f[3] + f[6]);
            f[1] = f[3] + (2.0 / 3.0) * rho * ux;
            f[4] = f[2] - (2.0 / 3.0) * rho * uy;
            f[8] = f[6] + (1.0 / 6.0) * rho * (ux - uy);
            f[5] = 0.5 * rho * (1.0 - (2.0 / 3.0) * ux + uy) - 0.5 * known;
            f[7] = 0.5 * rho * (1.0 - ux + (2.0 / 3.0) * uy) - 0.5 * known;
            &[1, 4, 5, 7, 8]
        }
        ([-1, 1, 0], Some(CornerType::Inner)) => {
            let rho = corner_density(node, [-1, 1, 0])?;
            let known = f[0] + 2.0 * (f[1] + f[4] + f[8]);
            f[3] = f[1] - (2.0 / 3.0) * rho * ux;
            f[2] = f[4] + (2.0 / 3.0) * rho * uy;
            f[6] = f[8] + (1.0 / 6.0) * rho * (uy - ux);
            f[5] = 0.5 * rho * (1.0 + ux - (2.0 / 3.0) * uy) - 0.5 * known;
            f[7] = 0.5 * rho * (1.0 + (2.0 / 3.0) * ux - uy) - 0.5 * known;
            &[2, 3, 5, 6, 7]
        }
        ([-1, -1, 0], Some(CornerType::Inner)) => {
            let rho = corner_density(node, [-1, -1, 0])?;
            let known = f[0] + 2.0 * (f[1] + f[2] + f[5]);
            f[3] = f[1] - (2.0 / 3.0) * rho * ux;
            f[4] = f[2] - (2.0 / 3.0) * rho * uy;
            f[7] = f[5] - (1.0 / 6.0) * rho * (ux + uy);
            f[6] = 0.5 * rho * (1.0 + (2.0 / 3.0) * ux + uy) - 0.5 * known;
            f[8] = 0.5 * rho * (1.0 + ux + (2.0 / 3.0) * uy) - 0.5 * known;
            &[3, 4, 6, 7, 8]
        }
        _ => {
            warn!(
                "Zou-He velocity is not defined for orientation {} at node {:?}.",
                node.orientation, node.coords
            );
            &[]
        }
    };
    for &q in rewritten {
        node.check_population(q, f[q])?;
    }
    Ok(f)
}

fn face_density(node: &BoundaryNode, density: Float) -> Result<Float, BoundaryError> {
    if density.is_finite() && density > 0.0 {
        return Ok(density);
    }
    error!(
        "Zou-He density at node {:?} ({}) is {density}.",
        node.coords, node.orientation
    );
    Err(BoundaryError::InvalidWallDensity {
        node: node.coords,
        density,
    })
}

fn corner_density(node: &BoundaryNode, diagonal: [i64; 3]) -> Result<Float, BoundaryError> {
    let neighbour = node.offset(diagonal);
    let density = node
        .grid
        .density_at(neighbour)
        .ok_or(BoundaryError::MissingNeighbour {
            node: node.coords,
            neighbour,
        })?;
    face_density(node, density)
}
