use super::{step, BoundaryNode};
use crate::error::BoundaryError;
use crate::global_variables::*;

pub fn reconstruct(node: &BoundaryNode) -> Result<[Float; MAX_Q], BoundaryError> {
    let lattice = node.lattice;
    let mut f = node.populations();
    for &component in &lattice.components {
        let classification = node.classification(component)?;
        for (a, s) in node.applicable_axes() {
            let near = node.neighbour(step(a, s as i64))?;
            for &q in classification.outgoing() {
                f[q] = near[q];
            }
        }
    }
    Ok(f)
}
