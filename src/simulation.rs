use crate::bc::{BoundaryCondition, BoundaryFace};
use crate::equilibrium::{Equilibrium, Moments, SecondOrderBgk};
use crate::error::SimulationError;
use crate::global_variables::*;
use crate::grid::Grid;
use crate::io::{self, CaseConditions};
use crate::lattice::LatticeDescriptor;
use crate::node::NodeKind;
use crate::Residuals;
use colored::*;
use log::{info, trace};
use rayon::prelude::*;
use std::collections::HashMap;
use std::time::Instant;

pub struct Simulation {
    pub case_name: String,
    pub time_step: usize,
    pub simulation_time: Instant,
    pub tolerance_density: Float,
    pub min_iter: usize,
    pub max_iter: usize,
    pub tau: Float,
    pub omega: Float,
    pub omega_prime: Float,
    pub lattice: LatticeDescriptor,
    pub grid: Grid,
    pub equilibrium: SecondOrderBgk,
    pub boundary_conditions: Vec<(BoundaryFace, BoundaryCondition)>,
    post_collision: Vec<Float>,
    face_nodes: Vec<Vec<usize>>,
    interior_nodes: Vec<usize>,
    stream_sources: Vec<usize>,
    halo_sources: Vec<(usize, usize)>,
    macroscopic: Vec<(Float, [Float; 3])>,
}

impl Simulation {
    pub fn new(case: &CaseConditions) -> Self {
        let lattice = LatticeDescriptor::build(case.stencil);
        let equilibrium = SecondOrderBgk;
        let mut grid = Grid::new(&lattice, case.size, case.halo_depth());
        let faces: HashMap<BoundaryFace, NodeKind> = case
            .boundary_conditions
            .iter()
            .map(|(face, condition)| (*face, condition.node_kind()))
            .collect();
        grid.assign_block_boundary(&faces);
        grid.fill_equilibrium(
            &lattice,
            &equilibrium,
            case.initial_density,
            case.initial_velocity,
        );

        let periodic = case.periodic_axes();
        let face_nodes = case
            .boundary_conditions
            .iter()
            .map(|(face, _)| grid.boundary_nodes(*face))
            .collect();
        let interior_nodes = grid.interior_nodes();
        let stream_sources = stream_sources(&grid, &lattice, periodic);
        let halo_sources = halo_sources(&grid, &lattice, periodic);
        let macroscopic = interior_nodes
            .iter()
            .map(|&index| {
                let moments = Moments::of(&lattice, grid.populations(index));
                (moments.density, moments.velocity)
            })
            .collect();
        let omega = 1.0 / case.tau;

        Self {
            case_name: case.case_name.clone(),
            time_step: 0,
            simulation_time: Instant::now(),
            tolerance_density: case.tolerance_density,
            min_iter: case.min_iter,
            max_iter: case.max_iter,
            tau: case.tau,
            omega,
            omega_prime: 1.0 - omega,
            post_collision: grid.field().to_vec(),
            lattice,
            grid,
            equilibrium,
            boundary_conditions: case.boundary_conditions.clone(),
            face_nodes,
            interior_nodes,
            stream_sources,
            halo_sources,
            macroscopic,
        }
    }

    pub fn next_step(&mut self) {
        self.time_step += 1;
    }

    pub fn stop_condition(&self, residuals: &Residuals) -> bool {
        let converged_density = residuals.density <= self.tolerance_density;
        let min_iterations = self.time_step > self.min_iter;
        let max_iterations = self.time_step > self.max_iter;
        (min_iterations && converged_density) || max_iterations
    }

    pub fn step(&mut self) -> Result<Residuals, SimulationError> {
        self.collision_step();
        self.streaming_step();
        self.fill_periodic_halo();
        self.boundary_condition()?;
        Ok(self.compute_residuals())
    }

    pub fn collision_step(&mut self) {
        let lattice = &self.lattice;
        let grid = &self.grid;
        let equilibrium = &self.equilibrium;
        let (omega, omega_prime) = (self.omega, self.omega_prime);
        self.post_collision
            .par_chunks_mut(lattice.q)
            .enumerate()
            .for_each(|(index, f_star)| {
                let f = grid.populations(index);
                if !grid.is_interior(grid.coords(index)) {
                    f_star.copy_from_slice(f);
                    return;
                }
                let moments = Moments::of(lattice, f);
                for q in 0..f.len() {
                    let f_eq = equilibrium.population(
                        lattice,
                        q,
                        moments.density,
                        &moments.velocity,
                        1.0,
                    );
                    f_star[q] = omega_prime * f[q] + omega * f_eq;
                }
            });
    }

    pub fn streaming_step(&mut self) {
        let post_collision = &self.post_collision;
        let sources = &self.stream_sources;
        let q = self.lattice.q;
        self.grid
            .field_mut()
            .par_chunks_mut(q)
            .enumerate()
            .for_each(|(index, f)| {
                for i in 0..q {
                    f[i] = post_collision[sources[index * q + i] * q + i];
                }
            });
    }

    pub fn fill_periodic_halo(&mut self) {
        let field = self.grid.field_mut();
        for &(target, source) in &self.halo_sources {
            field[target] = self.post_collision[source];
        }
    }

    pub fn boundary_condition(&mut self) -> Result<(), SimulationError> {
        let step = self.time_step;
        for ((face, condition), nodes) in self.boundary_conditions.iter().zip(&self.face_nodes) {
            let rewritten = self
                .grid
                .apply_boundary_condition(&self.lattice, &self.equilibrium, condition, nodes)
                .map_err(|source| SimulationError::Boundary { step, source })?;
            trace!("Step {step}: {face} pass rewrote {rewritten} nodes.");
        }
        Ok(())
    }

    pub fn compute_residuals(&mut self) -> Residuals {
        let lattice = &self.lattice;
        let grid = &self.grid;
        let macroscopic: Vec<(Float, [Float; 3])> = self
            .interior_nodes
            .par_iter()
            .map(|&index| {
                let moments = Moments::of(lattice, grid.populations(index));
                (moments.density, moments.velocity)
            })
            .collect();
        let density = macroscopic
            .par_iter()
            .zip(self.macroscopic.par_iter())
            .map(|(new, old)| (new.0 - old.0).powi(2))
            .sum::<Float>()
            .sqrt();
        let mut velocity = [0.0; 3];
        for d in 0..3 {
            velocity[d] = macroscopic
                .par_iter()
                .zip(self.macroscopic.par_iter())
                .map(|(new, old)| (new.1[d] - old.1[d]).powi(2))
                .sum::<Float>()
                .sqrt();
        }
        for (&index, &(rho, _)) in self.interior_nodes.iter().zip(&macroscopic) {
            self.grid.set_density(index, rho);
        }
        self.macroscopic = macroscopic;
        Residuals { density, velocity }
    }

    pub fn macroscopic_at(&self, coords: [i64; 3]) -> Option<(Float, [Float; 3])> {
        let index = self.grid.index(coords)?;
        let position = self.interior_nodes.binary_search(&index).ok()?;
        Some(self.macroscopic[position])
    }

    pub fn total_mass(&self) -> Float {
        self.interior_nodes
            .par_iter()
            .map(|&index| self.grid.populations(index).iter().sum::<Float>())
            .sum()
    }

    pub fn print_residuals(&self, residuals: &Residuals) {
        if self.time_step % 100 == 0 {
            let duration = self.simulation_time.elapsed().as_secs_f64();
            println!("\n{} {:.2} s.", "Elapsed time:".cyan().bold(), duration);
            println!(
                "\n{:>8} {:>16} {:>16} {:>16} {:>16}\n",
                "step".cyan().bold(),
                "density".cyan().bold(),
                "velocity_x".cyan().bold(),
                "velocity_y".cyan().bold(),
                "velocity_z".cyan().bold()
            );
        }
        println!(
            "{:>8} {:>16.8e} {:>16.8e} {:>16.8e} {:>16.8e}",
            self.time_step,
            residuals.density,
            residuals.velocity[0],
            residuals.velocity[1],
            residuals.velocity[2]
        );
    }
}

fn stream_sources(grid: &Grid, lattice: &LatticeDescriptor, periodic: [bool; 3]) -> Vec<usize> {
    let q = lattice.q;
    let mut sources = vec![0; grid.node_count() * q];
    for index in 0..grid.node_count() {
        let coords = grid.coords(index);
        let interior = grid.is_interior(coords);
        for i in 0..q {
            sources[index * q + i] = if interior {
                let c = lattice.velocities[i];
                let upstream = [
                    coords[0] - c[0] as i64,
                    coords[1] - c[1] as i64,
                    coords[2] - c[2] as i64,
                ];
                let source = grid.clamp(grid.wrap(upstream, periodic));
                grid.index(source).unwrap_or(index)
            } else {
                index
            };
        }
    }
    sources
}

/// `(target, source)` population offsets of the periodic halo.
///
/// A halo node `h` outside the interior along one periodic axis `a` receives
/// `f*_q(h + s e_a − c_q)` with `s` pointing back into the domain. Nodes
/// outside along several axes are left alone.
fn halo_sources(
    grid: &Grid,
    lattice: &LatticeDescriptor,
    periodic: [bool; 3],
) -> Vec<(usize, usize)> {
    let q = lattice.q;
    let mut sources = Vec::new();
    for index in 0..grid.node_count() {
        let coords = grid.coords(index);
        let outside: Vec<usize> = (0..grid.dimensions)
            .filter(|&d| coords[d] < 0 || coords[d] >= grid.size[d] as i64)
            .collect();
        let &[axis] = outside.as_slice() else {
            continue;
        };
        if !periodic[axis] {
            continue;
        }
        let sign = if coords[axis] < 0 { 1 } else { -1 };
        for i in 0..q {
            let c = lattice.velocities[i];
            let mut upstream = [
                coords[0] - c[0] as i64,
                coords[1] - c[1] as i64,
                coords[2] - c[2] as i64,
            ];
            upstream[axis] += sign;
            let source = grid.clamp(grid.wrap(upstream, periodic));
            if let Some(source) = grid.index(source) {
                sources.push((index * q + i, source * q + i));
            }
        }
    }
    sources
}

pub fn run() -> Result<(), SimulationError> {
    let case = io::build_case_conditions()?;
    let mut simulation = Simulation::new(&case);
    info!(
        "Running {} on a {} grid of {:?} nodes with tau = {}.",
        simulation.case_name, case.stencil, simulation.grid.size, simulation.tau
    );

    loop {
        let residuals = simulation.step()?;

        if simulation.stop_condition(&residuals) {
            break;
        }

        simulation.print_residuals(&residuals);
        io::write_residuals(simulation.time_step, &residuals)?;

        simulation.next_step();
    }

    info!(
        "Finished after {} steps in {:.2} s.",
        simulation.time_step,
        simulation.simulation_time.elapsed().as_secs_f64()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn case(conditions: &str) -> CaseConditions {
        conditions.parse().unwrap()
    }

    const RESTING_CAVITY: &str = r#"
        case_name = resting cavity
        lattice = d2q9
        nx = 8
        ny = 8
        tau = 0.8
        west_boundary_condition = diffuse_reflection 0.0 0.0
        east_boundary_condition = diffuse_reflection 0.0 0.0
        south_boundary_condition = diffuse_reflection 0.0 0.0
        north_boundary_condition = diffuse_reflection 0.0 0.0
    "#;

    #[test]
    fn resting_cavity_stays_at_rest() {
        let mut simulation = Simulation::new(&case(RESTING_CAVITY));
        let expected: Vec<Float> = (0..9)
            .map(|q| SecondOrderBgk.population(&simulation.lattice, q, 1.0, &[0.0; 3], 1.0))
            .collect();
        for _ in 0..20 {
            let residuals = simulation.step().unwrap();
            assert!(residuals.density < 1e-12);
            simulation.next_step();
        }
        for &index in &simulation.interior_nodes {
            for q in 0..9 {
                assert_relative_eq!(
                    simulation.grid.populations(index)[q],
                    expected[q],
                    epsilon = 1e-12
                );
            }
        }
    }

    #[test]
    fn fully_periodic_box_keeps_a_uniform_flow() {
        let mut simulation = Simulation::new(&case(
            r#"
            lattice = d2q9
            nx = 6
            ny = 5
            tau = 0.7
            initial_velocity = 0.04 -0.01
            west_boundary_condition = periodic
            east_boundary_condition = periodic
            south_boundary_condition = periodic
            north_boundary_condition = periodic
            "#,
        ));
        let mass = simulation.total_mass();
        for _ in 0..30 {
            simulation.step().unwrap();
            simulation.next_step();
        }
        assert_relative_eq!(simulation.total_mass(), mass, max_relative = 1e-12);
        let (density, velocity) = simulation.macroscopic_at([0, 4, 0]).unwrap();
        assert_relative_eq!(density, 1.0, epsilon = 1e-12);
        assert_relative_eq!(velocity[0], 0.04, epsilon = 1e-12);
        assert_relative_eq!(velocity[1], -0.01, epsilon = 1e-12);
    }

    #[test]
    fn periodic_face_receives_populations_from_the_opposite_face() {
        let mut simulation = Simulation::new(&case(
            r#"
            lattice = d2q9
            nx = 5
            ny = 4
            tau = 0.9
            initial_velocity = 0.02 0.0
            west_boundary_condition = periodic
            east_boundary_condition = periodic
            south_boundary_condition = bounce_back
            north_boundary_condition = bounce_back
            "#,
        ));
        for _ in 0..5 {
            simulation.step().unwrap();
            simulation.next_step();
        }
        let grid = &simulation.grid;
        for j in 1..3 {
            let west_halo = grid.populations_at([-1, j, 0]).unwrap();
            let west_face = grid.populations_at([0, j, 0]).unwrap();
            for q in [1, 5, 8] {
                let c_y = simulation.lattice.velocities[q][1] as i64;
                let source = grid.index([4, j - c_y, 0]).unwrap();
                let streamed = simulation.post_collision[source * 9 + q];
                assert_eq!(west_face[q], streamed);
                assert_eq!(west_halo[q], streamed);
            }
        }
    }

    #[test]
    fn moving_lid_drags_the_fluid_below_it() {
        let mut simulation = Simulation::new(&case(
            r#"
            lattice = d2q9
            nx = 12
            ny = 12
            tau = 0.8
            west_boundary_condition = diffuse_reflection 0.0 0.0
            east_boundary_condition = diffuse_reflection 0.0 0.0
            south_boundary_condition = diffuse_reflection 0.0 0.0
            north_boundary_condition = diffuse_reflection 0.05 0.0
            "#,
        ));
        for _ in 0..200 {
            simulation.step().unwrap();
            simulation.next_step();
        }
        let (_, velocity) = simulation.macroscopic_at([6, 10, 0]).unwrap();
        assert!(velocity[0] > 0.0);
        let (_, deep) = simulation.macroscopic_at([6, 2, 0]).unwrap();
        assert!(deep[0] < velocity[0]);
    }

    #[test]
    fn zou_he_cavity_stays_bounded() {
        let mut simulation = Simulation::new(&case(
            r#"
            lattice = d2q9
            nx = 12
            ny = 12
            tau = 0.8
            west_boundary_condition = zou_he 0.0 0.0
            east_boundary_condition = zou_he 0.0 0.0
            south_boundary_condition = zou_he 0.0 0.0
            north_boundary_condition = zou_he 0.02 0.0
            "#,
        ));
        for _ in 0..100 {
            simulation.step().unwrap();
            simulation.next_step();
        }
        let f = simulation.grid.populations(simulation.grid.index([5, 5, 0]).unwrap());
        assert!(f.iter().all(|value| value.is_finite() && *value > 0.0));
        let (_, lid) = simulation.macroscopic_at([6, 11, 0]).unwrap();
        assert_relative_eq!(lid[0], 0.02, epsilon = 1e-10);
    }

    #[test]
    fn stop_condition_honours_the_iteration_bounds() {
        let mut simulation = Simulation::new(&case(RESTING_CAVITY));
        simulation.min_iter = 2;
        simulation.max_iter = 4;
        let converged = Residuals {
            density: 0.0,
            velocity: [0.0; 3],
        };
        let diverging = Residuals {
            density: 1.0,
            velocity: [0.0; 3],
        };
        assert!(!simulation.stop_condition(&converged));
        simulation.time_step = 3;
        assert!(simulation.stop_condition(&converged));
        assert!(!simulation.stop_condition(&diverging));
        simulation.time_step = 5;
        assert!(simulation.stop_condition(&diverging));
    }
}
