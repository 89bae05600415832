use super::{step, BoundaryNode, ExtrapolationOrder};
use crate::error::BoundaryError;
use crate::global_variables::*;
use log::error;

pub fn reconstruct(
    node: &BoundaryNode,
    order: ExtrapolationOrder,
    density: Float,
) -> Result<[Float; MAX_Q], BoundaryError> {
    let lattice = node.lattice;
    let mut f = node.populations();
    for &component in &lattice.components {
        let classification = node.classification(component)?;
        for (a, s) in node.applicable_axes() {
            let near = node.neighbour(step(a, s as i64))?;
            match order {
                ExtrapolationOrder::First => {
                    for &q in classification.outgoing() {
                        f[q] = near[q];
                    }
                }
                ExtrapolationOrder::Second => {
                    let far = node.neighbour(step(a, 2 * s as i64))?;
                    for &q in classification.outgoing() {
                        f[q] = 2.0 * near[q] - far[q];
                    }
                }
            }
        }
    }

    let sum: Float = f[..lattice.q].iter().sum();
    if !sum.is_finite() || sum <= 0.0 {
        error!(
            "Density sum at node {:?} ({}) is {sum} before rescaling.",
            node.coords, node.orientation
        );
        return Err(BoundaryError::InvalidDensitySum {
            node: node.coords,
            sum,
        });
    }
    let ratio = density / sum;
    for q in 0..lattice.q {
        f[q] *= ratio;
        node.check_population(q, f[q])?;
    }
    Ok(f)
}
