pub const CASE_NAME: &'static str = "Lid Driven Cavity";

pub type Float = f64;

pub const MAX_Q: usize = 27;

pub const TOLERANCE_DENSITY: Float = 1e-7;

pub const TOLERANCE_WEIGHTS: Float = 1e-12;

pub const MIN_ITER: usize = 100;

pub const MAX_ITER: usize = 10_000;

pub const LATTICE_DENSITY: Float = 1.0;

pub const CS_2: Float = 1.0 / 3.0;

pub const CS_2_INV: Float = 3.0;

pub const CS_4_INV: Float = 9.0;
