use super::{step, BoundaryNode};
use crate::error::BoundaryError;
use crate::global_variables::*;

/// Periodic wrap through the halo.
///
/// For every applicable axis `a` with sign `s`, the directions with
/// `c_a s > 0` are copied from the halo node at `x − s e_a`. The driver keeps
/// that halo node filled with the populations streamed in from the opposite
/// side of the domain.
pub fn reconstruct(node: &BoundaryNode) -> Result<[Float; MAX_Q], BoundaryError> {
    node.check_orientation()?;
    let lattice = node.lattice;
    let mut f = node.populations();
    for (a, s) in node.applicable_axes() {
        let image = node.neighbour(step(a, -s as i64))?;
        for q in 0..lattice.q {
            if lattice.velocities[q][a] * s > 0 {
                f[q] = image[q];
            }
        }
    }
    Ok(f)
}
