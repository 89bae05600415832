//! Structured grid holding populations and node metadata, with halo layers.
//!
//! Coordinates are signed: the interior spans `0..n` on every active axis and
//! the halo spans `-halo..0` and `n..n + halo`. In 2D the third axis has a
//! single plane and no halo.

use crate::bc::BoundaryFace;
use crate::equilibrium::Equilibrium;
use crate::global_variables::*;
use crate::lattice::LatticeDescriptor;
use crate::node::{CornerType, NodeKind, OrientationCode};
use rayon::prelude::*;
use std::collections::HashMap;

#[derive(Clone, Debug)]
pub struct Grid {
    pub dimensions: usize,
    pub size: [usize; 3],
    pub halo: usize,
    pub q: usize,
    extent: [usize; 3],
    offset: [i64; 3],
    populations: Vec<Float>,
    kinds: Vec<NodeKind>,
    orientations: Vec<OrientationCode>,
    densities: Vec<Float>,
}

impl Grid {
    pub fn new(lattice: &LatticeDescriptor, size: [usize; 3], halo: usize) -> Self {
        let dimensions = lattice.dimensions;
        let mut size = size;
        let mut extent = [1; 3];
        let mut offset = [0; 3];
        for d in 0..3 {
            if d < dimensions {
                extent[d] = size[d] + 2 * halo;
                offset[d] = halo as i64;
            } else {
                size[d] = 1;
            }
        }
        let node_count = extent.iter().product::<usize>();
        Self {
            dimensions,
            size,
            halo,
            q: lattice.q,
            extent,
            offset,
            populations: vec![0.0; node_count * lattice.q],
            kinds: vec![NodeKind::Fluid; node_count],
            orientations: vec![OrientationCode::Fluid; node_count],
            densities: vec![LATTICE_DENSITY; node_count],
        }
    }

    pub fn node_count(&self) -> usize {
        self.kinds.len()
    }

    pub fn index(&self, coords: [i64; 3]) -> Option<usize> {
        let mut index = 0;
        for d in (0..3).rev() {
            let shifted = coords[d] + self.offset[d];
            if shifted < 0 || shifted >= self.extent[d] as i64 {
                return None;
            }
            index = index * self.extent[d] + shifted as usize;
        }
        Some(index)
    }

    pub fn coords(&self, index: usize) -> [i64; 3] {
        let i = index % self.extent[0];
        let j = (index / self.extent[0]) % self.extent[1];
        let k = index / (self.extent[0] * self.extent[1]);
        [
            i as i64 - self.offset[0],
            j as i64 - self.offset[1],
            k as i64 - self.offset[2],
        ]
    }

    pub fn is_interior(&self, coords: [i64; 3]) -> bool {
        (0..3).all(|d| coords[d] >= 0 && coords[d] < self.size[d] as i64)
    }

    pub fn interior_nodes(&self) -> Vec<usize> {
        (0..self.node_count())
            .filter(|&index| self.is_interior(self.coords(index)))
            .collect()
    }

    pub fn wrap(&self, coords: [i64; 3], periodic: [bool; 3]) -> [i64; 3] {
        let mut wrapped = coords;
        for d in 0..self.dimensions {
            if periodic[d] {
                wrapped[d] = coords[d].rem_euclid(self.size[d] as i64);
            }
        }
        wrapped
    }

    pub fn clamp(&self, coords: [i64; 3]) -> [i64; 3] {
        let mut clamped = coords;
        for d in 0..3 {
            clamped[d] = coords[d].clamp(0, self.size[d] as i64 - 1);
        }
        clamped
    }

    pub fn populations(&self, index: usize) -> &[Float] {
        &self.populations[index * self.q..(index + 1) * self.q]
    }

    pub fn populations_mut(&mut self, index: usize) -> &mut [Float] {
        &mut self.populations[index * self.q..(index + 1) * self.q]
    }

    pub fn populations_at(&self, coords: [i64; 3]) -> Option<&[Float]> {
        self.index(coords).map(|index| self.populations(index))
    }

    pub fn field(&self) -> &[Float] {
        &self.populations
    }

    pub fn field_mut(&mut self) -> &mut [Float] {
        &mut self.populations
    }

    pub fn kind(&self, index: usize) -> NodeKind {
        self.kinds[index]
    }

    pub fn kind_at(&self, coords: [i64; 3]) -> Option<NodeKind> {
        self.index(coords).map(|index| self.kinds[index])
    }

    pub fn orientation(&self, index: usize) -> OrientationCode {
        self.orientations[index]
    }

    pub fn orientation_at(&self, coords: [i64; 3]) -> Option<OrientationCode> {
        self.index(coords).map(|index| self.orientations[index])
    }

    pub fn density(&self, index: usize) -> Float {
        self.densities[index]
    }

    pub fn density_at(&self, coords: [i64; 3]) -> Option<Float> {
        self.index(coords).map(|index| self.densities[index])
    }

    pub fn set_density(&mut self, index: usize, density: Float) {
        self.densities[index] = density;
    }

    pub fn set_populations(&mut self, index: usize, f: &[Float]) {
        let q = self.q;
        self.populations_mut(index).copy_from_slice(&f[..q]);
    }

    pub fn set_node(
        &mut self,
        coords: [i64; 3],
        kind: NodeKind,
        orientation: OrientationCode,
    ) -> bool {
        match self.index(coords) {
            Some(index) => {
                self.kinds[index] = kind;
                self.orientations[index] = orientation;
                true
            }
            None => false,
        }
    }

    pub fn fill_equilibrium(
        &mut self,
        lattice: &LatticeDescriptor,
        equilibrium: &dyn Equilibrium,
        density: Float,
        velocity: [Float; 3],
    ) {
        self.populations
            .par_chunks_mut(self.q)
            .for_each(|f| {
                for q in 0..f.len() {
                    f[q] = equilibrium.population(lattice, q, density, &velocity, 1.0);
                }
            });
        self.densities.iter_mut().for_each(|rho| *rho = density);
    }

    pub fn boundary_nodes(&self, face: BoundaryFace) -> Vec<usize> {
        let axis = face.axis();
        if axis >= self.dimensions {
            return Vec::new();
        }
        let plane = face.plane(self.size[axis]);
        (0..self.node_count())
            .filter(|&index| {
                let coords = self.coords(index);
                self.is_interior(coords) && coords[axis] == plane
            })
            .collect()
    }

    pub fn assign_block_boundary(&mut self, faces: &HashMap<BoundaryFace, NodeKind>) {
        for index in 0..self.node_count() {
            let coords = self.coords(index);
            if !self.is_interior(coords) {
                continue;
            }
            let touched: Vec<(BoundaryFace, NodeKind)> = faces
                .iter()
                .filter(|(face, _)| face.axis() < self.dimensions)
                .filter(|(face, _)| coords[face.axis()] == face.plane(self.size[face.axis()]))
                .map(|(&face, &kind)| (face, kind))
                .collect();
            let Some(kind) = touched
                .iter()
                .map(|&(_, kind)| kind)
                .max_by_key(|kind| kind.precedence())
            else {
                self.kinds[index] = NodeKind::Fluid;
                self.orientations[index] = OrientationCode::Fluid;
                continue;
            };
            let mut normal = [0i8; 3];
            for (face, face_kind) in &touched {
                if *face_kind == NodeKind::Periodic && kind != NodeKind::Periodic {
                    continue;
                }
                normal[face.axis()] = face.sign();
            }
            self.kinds[index] = kind;
            self.orientations[index] = OrientationCode::surface(normal, CornerType::Inner);
        }
    }
}
