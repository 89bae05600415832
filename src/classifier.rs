use crate::error::BoundaryError;
use crate::global_variables::*;
use crate::lattice::{Component, LatticeDescriptor};
use crate::node::OrientationCode;
use log::warn;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DirectionClass {
    Incoming,
    Outgoing,
    Tangential,
    Invalid,
}

/// Classifies the direction `c` for `orientation`.
///
/// With `p_a = c_a s_a` over the contributing axes `a`, a direction is
/// outgoing when no `p_a` is negative and one is positive, incoming in the
/// mirrored case, and tangential otherwise. `c` carries one entry per lattice
/// dimension.
pub fn classify(orientation: &OrientationCode, c: &[i32]) -> DirectionClass {
    if !orientation.is_surface() || orientation.required_dimensions() > c.len() {
        if cfg!(debug_assertions) {
            warn!("Direction {c:?} cannot be classified for orientation {orientation}.");
        }
        return DirectionClass::Invalid;
    }
    let mut along = false;
    let mut against = false;
    for (a, s) in orientation.axes() {
        let p = c[a] * s;
        along |= p > 0;
        against |= p < 0;
    }
    match (along, against) {
        (true, false) => DirectionClass::Outgoing,
        (false, true) => DirectionClass::Incoming,
        _ => DirectionClass::Tangential,
    }
}

pub fn strictly_outgoing(orientation: &OrientationCode, c: &[i32]) -> bool {
    orientation.is_surface()
        && orientation.required_dimensions() <= c.len()
        && orientation.axes().all(|(a, s)| c[a] * s > 0)
}

#[derive(Clone, Debug)]
pub struct Classification {
    incoming: [usize; MAX_Q],
    outgoing: [usize; MAX_Q],
    tangential: [usize; MAX_Q],
    n_incoming: usize,
    n_outgoing: usize,
    n_tangential: usize,
}

impl Classification {
    pub fn new(
        lattice: &LatticeDescriptor,
        orientation: &OrientationCode,
        component: Component,
        node: [i64; 3],
    ) -> Result<Self, BoundaryError> {
        let mut classification = Self {
            incoming: [0; MAX_Q],
            outgoing: [0; MAX_Q],
            tangential: [0; MAX_Q],
            n_incoming: 0,
            n_outgoing: 0,
            n_tangential: 0,
        };
        for q in component.range() {
            let c = &lattice.velocities[q][..lattice.dimensions];
            match classify(orientation, c) {
                DirectionClass::Incoming => {
                    classification.incoming[classification.n_incoming] = q;
                    classification.n_incoming += 1;
                }
                DirectionClass::Outgoing => {
                    classification.outgoing[classification.n_outgoing] = q;
                    classification.n_outgoing += 1;
                }
                DirectionClass::Tangential => {
                    classification.tangential[classification.n_tangential] = q;
                    classification.n_tangential += 1;
                }
                DirectionClass::Invalid => {
                    return Err(BoundaryError::Unclassifiable {
                        node,
                        orientation: orientation.to_string(),
                        direction: q,
                    })
                }
            }
        }
        Ok(classification)
    }

    pub fn incoming(&self) -> &[usize] {
        &self.incoming[..self.n_incoming]
    }

    pub fn outgoing(&self) -> &[usize] {
        &self.outgoing[..self.n_outgoing]
    }

    pub fn tangential(&self) -> &[usize] {
        &self.tangential[..self.n_tangential]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lattices() -> [LatticeDescriptor; 4] {
        [
            LatticeDescriptor::d2q9(),
            LatticeDescriptor::d3q15(),
            LatticeDescriptor::d3q19(),
            LatticeDescriptor::d3q27(),
        ]
    }

    #[test]
    fn reversing_a_direction_swaps_incoming_and_outgoing() {
        for lattice in lattices() {
            for orientation in OrientationCode::all_surfaces(lattice.dimensions) {
                for q in 0..lattice.q {
                    let c = &lattice.velocities[q][..lattice.dimensions];
                    let minus_c: Vec<i32> = c.iter().map(|x| -x).collect();
                    let forward = classify(&orientation, c);
                    let backward = classify(&orientation, &minus_c);
                    assert_ne!(forward, DirectionClass::Invalid);
                    assert_eq!(
                        forward == DirectionClass::Outgoing,
                        backward == DirectionClass::Incoming,
                        "{orientation} {c:?}"
                    );
                    assert_eq!(
                        forward == DirectionClass::Tangential,
                        backward == DirectionClass::Tangential
                    );
                }
            }
        }
    }

    #[test]
    fn rest_direction_is_tangential_everywhere() {
        for orientation in OrientationCode::all_surfaces(3) {
            assert_eq!(classify(&orientation, &[0, 0, 0]), DirectionClass::Tangential);
        }
    }

    #[test]
    fn d2q9_west_face() {
        let lattice = LatticeDescriptor::d2q9();
        let west = OrientationCode::face(0, 1);
        let classification =
            Classification::new(&lattice, &west, lattice.components[0], [0, 1, 0]).unwrap();
        assert_eq!(classification.outgoing(), &[1, 5, 8]);
        assert_eq!(classification.incoming(), &[3, 6, 7]);
        assert_eq!(classification.tangential(), &[0, 2, 4]);
    }

    #[test]
    fn d2q9_inner_corner() {
        let lattice = LatticeDescriptor::d2q9();
        let corner: OrientationCode = "IPJP_I".parse().unwrap();
        let classification =
            Classification::new(&lattice, &corner, lattice.components[0], [0, 0, 0]).unwrap();
        assert_eq!(classification.outgoing(), &[1, 2, 5]);
        assert_eq!(classification.incoming(), &[3, 4, 7]);
        assert_eq!(classification.tangential(), &[0, 6, 8]);
        let strict: Vec<usize> = (0..lattice.q)
            .filter(|&q| strictly_outgoing(&corner, &lattice.velocities[q][..2]))
            .collect();
        assert_eq!(strict, vec![5]);
    }

    #[test]
    fn inner_and_outer_corners_share_the_sign_logic() {
        let inner: OrientationCode = "IMJPKM_I".parse().unwrap();
        let outer: OrientationCode = "IMJPKM_O".parse().unwrap();
        for c in crate::lattice::C_D3Q27 {
            assert_eq!(classify(&inner, &c), classify(&outer, &c));
        }
    }

    #[test]
    fn three_dimensional_orientation_on_a_plane_lattice_is_invalid() {
        let lattice = LatticeDescriptor::d2q9();
        let top = OrientationCode::face(2, -1);
        assert_eq!(classify(&top, &[1, 0]), DirectionClass::Invalid);
        assert_eq!(classify(&OrientationCode::Fluid, &[1, 0]), DirectionClass::Invalid);
        let error = Classification::new(&lattice, &top, lattice.components[0], [3, 4, 0]);
        assert!(matches!(
            error,
            Err(BoundaryError::Unclassifiable { direction: 0, .. })
        ));
    }
}
