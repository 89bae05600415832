use super::BoundaryNode;
use crate::classifier::strictly_outgoing;
use crate::error::BoundaryError;
use crate::global_variables::*;

pub fn reconstruct(node: &BoundaryNode) -> Result<[Float; MAX_Q], BoundaryError> {
    let lattice = node.lattice;
    let source = node.populations();
    let mut f = source;
    let is_face = node.orientation.is_face();
    for &component in &lattice.components {
        let classification = node.classification(component)?;
        for &q in classification.outgoing() {
            let c = &lattice.velocities[q][..lattice.dimensions];
            if is_face || strictly_outgoing(&node.orientation, c) {
                f[q] = source[lattice.opposite[q]];
            }
        }
    }
    Ok(f)
}
