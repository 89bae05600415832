use crate::global_variables::*;
use crate::lattice::{Component, LatticeDescriptor};

pub trait Equilibrium: Sync {
    fn population(
        &self,
        lattice: &LatticeDescriptor,
        q: usize,
        density: Float,
        velocity: &[Float; 3],
        temperature: Float,
    ) -> Float;
}

#[derive(Copy, Clone, Debug, Default)]
pub struct SecondOrderBgk;

impl Equilibrium for SecondOrderBgk {
    #[inline]
    fn population(
        &self,
        lattice: &LatticeDescriptor,
        q: usize,
        density: Float,
        velocity: &[Float; 3],
        _temperature: Float,
    ) -> Float {
        let u_dot_c = lattice.c_dot(q, velocity);
        let u_2 = velocity[0] * velocity[0] + velocity[1] * velocity[1] + velocity[2] * velocity[2];
        lattice.weights[q]
            * density
            * (1.0 + CS_2_INV * u_dot_c + 0.5 * CS_4_INV * u_dot_c * u_dot_c
                - 0.5 * CS_2_INV * u_2)
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Moments {
    pub density: Float,
    pub velocity: [Float; 3],
    pub temperature: Float,
    pub heat_flux: [Float; 3],
}

impl Moments {
    pub fn from_populations(lattice: &LatticeDescriptor, f: &[Float], component: Component) -> Self {
        let mut density = 0.0;
        let mut momentum = [0.0; 3];
        for q in component.range() {
            let c = lattice.velocity(q);
            density += f[q];
            for d in 0..3 {
                momentum[d] += (c[d] as Float) * f[q];
            }
        }
        let velocity = momentum.map(|m| m / density);

        let mut energy = 0.0;
        let mut heat_flux = [0.0; 3];
        for q in component.range() {
            let c = lattice.velocity(q);
            let peculiar = [
                c[0] as Float - velocity[0],
                c[1] as Float - velocity[1],
                c[2] as Float - velocity[2],
            ];
            let peculiar_2 =
                peculiar[0] * peculiar[0] + peculiar[1] * peculiar[1] + peculiar[2] * peculiar[2];
            energy += peculiar_2 * f[q];
            for d in 0..3 {
                heat_flux[d] += 0.5 * peculiar[d] * peculiar_2 * f[q];
            }
        }
        let temperature = energy / (lattice.dimensions as Float * density * lattice.cs_2);

        Self {
            density,
            velocity,
            temperature,
            heat_flux,
        }
    }

    pub fn of(lattice: &LatticeDescriptor, f: &[Float]) -> Self {
        Self::from_populations(lattice, f, Component::new(0, lattice.q - 1))
    }
}
