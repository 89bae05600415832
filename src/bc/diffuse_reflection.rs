use super::BoundaryNode;
use crate::equilibrium::Equilibrium;
use crate::error::BoundaryError;
use crate::global_variables::*;
use log::error;

/// Equilibrium diffuse reflection on a wall moving at `velocity`.
///
/// The wall density closes the zero mass flux condition
/// `ρ_w = 2 ρ_in / (1 − Δρ − ρ_tan)`; tangential populations become the wall
/// equilibrium and outgoing ones the reflected incoming population plus the
/// momentum of the moving wall.
pub fn reconstruct(
    node: &BoundaryNode,
    equilibrium: &dyn Equilibrium,
    velocity: &[Float; 3],
) -> Result<[Float; MAX_Q], BoundaryError> {
    let lattice = node.lattice;
    let mut f = node.populations();
    for &component in &lattice.components {
        let classification = node.classification(component)?;

        let incoming_density: Float = classification.incoming().iter().map(|&q| f[q]).sum();
        let outgoing_correction: Float = classification
            .outgoing()
            .iter()
            .map(|&q| 2.0 * lattice.weights[q] * CS_2_INV * lattice.c_dot(q, velocity))
            .sum();
        let tangential_density: Float = classification
            .tangential()
            .iter()
            .map(|&q| equilibrium.population(lattice, q, 1.0, velocity, 1.0))
            .sum();

        let wall_density =
            2.0 * incoming_density / (1.0 - outgoing_correction - tangential_density);
        if !wall_density.is_finite() || wall_density <= 0.0 {
            error!(
                "Wall density at node {:?} ({}) is {wall_density}.",
                node.coords, node.orientation
            );
            return Err(BoundaryError::InvalidWallDensity {
                node: node.coords,
                density: wall_density,
            });
        }

        for &q in classification.tangential() {
            f[q] = equilibrium.population(lattice, q, wall_density, velocity, 1.0);
            node.check_population(q, f[q])?;
        }
        for &q in classification.outgoing() {
            f[q] = f[lattice.opposite[q]]
                + 2.0 * wall_density * lattice.weights[q] * CS_2_INV * lattice.c_dot(q, velocity);
            node.check_population(q, f[q])?;
        }
    }
    Ok(f)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equilibrium::{Moments, SecondOrderBgk};
    use crate::grid::Grid;
    use crate::lattice::LatticeDescriptor;
    use crate::node::NodeKind;
    use approx::assert_relative_eq;

    fn reconstruct_at(
        lattice: &LatticeDescriptor,
        orientation: &str,
        f: &[Float],
        velocity: [Float; 3],
    ) -> Result<[Float; MAX_Q], BoundaryError> {
        let mut grid = Grid::new(lattice, [3, 3, 3], 1);
        let coords = [1, 1, if lattice.dimensions == 3 { 1 } else { 0 }];
        grid.set_node(
            coords,
            NodeKind::EquilibriumDiffuseReflection,
            orientation.parse().unwrap(),
        );
        let index = grid.index(coords).unwrap();
        grid.set_populations(index, f);
        reconstruct(
            &BoundaryNode::new(&grid, lattice, index),
            &SecondOrderBgk,
            &velocity,
        )
    }

    fn perturbed(lattice: &LatticeDescriptor) -> Vec<Float> {
        (0..lattice.q)
            .map(|q| {
                SecondOrderBgk.population(lattice, q, 1.0, &[0.0; 3], 1.0)
                    * (1.0 + 0.05 * ((q * 7 % 5) as Float - 2.0))
            })
            .collect()
    }

    #[test]
    fn moving_lid_velocity_is_recovered() {
        let lattice = LatticeDescriptor::d2q9();
        let velocity = [0.01, 0.0, 0.0];
        for orientation in ["JM", "IP", "IMJM_I", "IPJP_I"] {
            let f = reconstruct_at(&lattice, orientation, &perturbed(&lattice), velocity).unwrap();
            let moments = Moments::of(&lattice, &f[..lattice.q]);
            assert_relative_eq!(moments.velocity[0], velocity[0], max_relative = 1e-10);
            assert_relative_eq!(moments.velocity[1], velocity[1], epsilon = 1e-12);
        }
    }

    #[test]
    fn three_dimensional_wall_velocity_is_recovered() {
        let lattice = LatticeDescriptor::d3q27();
        let velocity = [0.02, -0.01, 0.0];
        for orientation in ["KP", "IPKM_I", "IMJPKP_I"] {
            let f = reconstruct_at(&lattice, orientation, &perturbed(&lattice), velocity).unwrap();
            let moments = Moments::of(&lattice, &f[..lattice.q]);
            for d in 0..3 {
                assert_relative_eq!(moments.velocity[d], velocity[d], epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn resting_wall_keeps_the_incoming_mass_balance() {
        let lattice = LatticeDescriptor::d2q9();
        let f0 = perturbed(&lattice);
        let f = reconstruct_at(&lattice, "JP", &f0, [0.0; 3]).unwrap();
        for q in [2, 5, 6] {
            assert_eq!(f[q], f[lattice.opposite[q]]);
        }
        let incoming: Float = [4, 7, 8].iter().map(|&q| f0[q]).sum();
        let wall_density = 2.0 * incoming / (1.0 - 4.0 / 9.0 - 2.0 / 9.0);
        assert_relative_eq!(f[0], 4.0 / 9.0 * wall_density, max_relative = 1e-14);
    }

    #[test]
    fn second_application_is_a_fixed_point() {
        let lattice = LatticeDescriptor::d2q9();
        let velocity = [0.01, 0.0, 0.0];
        let once = reconstruct_at(&lattice, "JM", &perturbed(&lattice), velocity).unwrap();
        let twice = reconstruct_at(&lattice, "JM", &once[..lattice.q], velocity).unwrap();
        for q in 0..lattice.q {
            assert_relative_eq!(once[q], twice[q], max_relative = 1e-14);
        }
    }

    #[test]
    fn empty_incoming_set_is_fatal() {
        let lattice = LatticeDescriptor::d2q9();
        let mut f = perturbed(&lattice);
        for q in [3, 6, 7] {
            f[q] = 0.0;
        }
        let result = reconstruct_at(&lattice, "IP", &f, [0.0; 3]);
        assert!(matches!(result, Err(BoundaryError::InvalidWallDensity { .. })));
    }
}
