use crate::bc::{BoundaryCondition, BoundaryFace, ExtrapolationOrder};
use crate::error::CaseError;
use crate::global_variables::*;
use crate::lattice::Stencil;
use crate::Residuals;
use colored::*;
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::Path;
use std::str::FromStr;

pub const DATA_PATH: &'static str = "./data";

pub const PRE_PROCESSING_PATH: &'static str = "./pre_processing";

pub const CASE_CONDITIONS_FILE: &'static str = "case_conditions.jou";

pub const RESIDUALS_FILE: &'static str = "residuals.dat";

pub const DEFAULT_CASE_CONDITIONS: &'static str = r#"# Lid driven cavity with diffuse reflection walls
case_name                        = Lid Driven Cavity
lattice                          = d2q9

nx                               = 51
ny                               = 51

tau                              = 0.8
min_iter                         = 100
max_iter                         = 10000
tolerance_density                = 1e-7

initial_density                  = 1.0
initial_velocity                 = 0.0 0.0

west_boundary_condition          = diffuse_reflection 0.0 0.0
east_boundary_condition          = diffuse_reflection 0.0 0.0
south_boundary_condition         = diffuse_reflection 0.0 0.0
north_boundary_condition         = diffuse_reflection 0.01 0.0
"#;

#[derive(Clone, Debug, PartialEq)]
pub struct CaseConditions {
    pub case_name: String,
    pub stencil: Stencil,
    pub size: [usize; 3],
    pub tau: Float,
    pub min_iter: usize,
    pub max_iter: usize,
    pub tolerance_density: Float,
    pub initial_density: Float,
    pub initial_velocity: [Float; 3],
    pub boundary_conditions: Vec<(BoundaryFace, BoundaryCondition)>,
}

impl CaseConditions {
    pub fn from_parameters(parameters: &HashMap<String, String>) -> Result<Self, CaseError> {
        let stencil: Stencil = required(parameters, "lattice")?
            .parse()
            .map_err(CaseError::Lattice)?;
        let dimensions = stencil.dimensions();
        if let Some(declared) = parameters.get("dimensions") {
            if declared.parse::<usize>().ok() != Some(dimensions) {
                return Err(invalid("dimensions", declared));
            }
        }

        let mut size = [1; 3];
        for (d, key) in ["nx", "ny", "nz"].into_iter().enumerate().take(dimensions) {
            size[d] = parse(parameters, key)?;
            if size[d] < 3 {
                return Err(invalid(key, &size[d].to_string()));
            }
        }

        let tau: Float = parse(parameters, "tau")?;
        if tau <= 0.5 {
            return Err(invalid("tau", &tau.to_string()));
        }

        let initial_velocity = match parameters.get("initial_velocity") {
            Some(value) => parse_vector("initial_velocity", value, dimensions)?,
            None => [0.0; 3],
        };

        let mut boundary_conditions = Vec::new();
        for face in BoundaryFace::ALL {
            if face.axis() >= dimensions {
                continue;
            }
            let key = format!("{}_boundary_condition", face.name());
            let condition = parse_boundary_condition(&key, required(parameters, &key)?, dimensions)?;
            boundary_conditions.push((face, condition));
        }
        for axis in 0..dimensions {
            let periodic = boundary_conditions
                .iter()
                .filter(|(face, condition)| {
                    face.axis() == axis && *condition == BoundaryCondition::Periodic
                })
                .count();
            if periodic == 1 {
                let key = format!("axis {axis} periodic faces");
                return Err(invalid(&key, "only one side is periodic"));
            }
        }

        Ok(Self {
            case_name: parameters
                .get("case_name")
                .cloned()
                .unwrap_or(String::from(CASE_NAME)),
            stencil,
            size,
            tau,
            min_iter: parse_or(parameters, "min_iter", MIN_ITER)?,
            max_iter: parse_or(parameters, "max_iter", MAX_ITER)?,
            tolerance_density: parse_or(parameters, "tolerance_density", TOLERANCE_DENSITY)?,
            initial_density: parse_or(parameters, "initial_density", LATTICE_DENSITY)?,
            initial_velocity,
            boundary_conditions,
        })
    }

    pub fn periodic_axes(&self) -> [bool; 3] {
        let mut periodic = [false; 3];
        for (face, condition) in &self.boundary_conditions {
            if *condition == BoundaryCondition::Periodic {
                periodic[face.axis()] = true;
            }
        }
        periodic
    }

    pub fn halo_depth(&self) -> usize {
        self.boundary_conditions
            .iter()
            .map(|(_, condition)| condition.halo_depth())
            .max()
            .unwrap_or(1)
    }
}

impl FromStr for CaseConditions {
    type Err = CaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_parameters(&extract_parameters(s))
    }
}

pub fn parse_boundary_condition(
    key: &str,
    value: &str,
    dimensions: usize,
) -> Result<BoundaryCondition, CaseError> {
    let mut words = value.split_whitespace();
    let name = words.next().ok_or(invalid(key, value))?;
    let arguments: Vec<&str> = words.collect();
    let arguments = arguments.join(" ");
    let condition = match name {
        "bounce_back" => BoundaryCondition::BounceBack,
        "free_flux" => BoundaryCondition::FreeFlux,
        "periodic" => BoundaryCondition::Periodic,
        "diffuse_reflection" => BoundaryCondition::EquilibriumDiffuseReflection {
            velocity: parse_vector(key, &arguments, dimensions)?,
        },
        "zou_he" if dimensions == 2 => BoundaryCondition::ZouHeVelocity {
            velocity: parse_vector(key, &arguments, dimensions)?,
        },
        "pressure_1st" | "pressure_2nd" => {
            let density = arguments
                .trim()
                .parse::<Float>()
                .map_err(|_| invalid(key, value))?;
            if density <= 0.0 {
                return Err(invalid(key, value));
            }
            let order = if name == "pressure_1st" {
                ExtrapolationOrder::First
            } else {
                ExtrapolationOrder::Second
            };
            BoundaryCondition::ExtrapolatedPressure { order, density }
        }
        _ => return Err(invalid(key, value)),
    };
    Ok(condition)
}

fn parse_vector(key: &str, value: &str, dimensions: usize) -> Result<[Float; 3], CaseError> {
    let components = value
        .split_whitespace()
        .map(|x| x.parse::<Float>())
        .collect::<Result<Vec<Float>, _>>()
        .map_err(|_| invalid(key, value))?;
    if components.len() != dimensions {
        return Err(invalid(key, value));
    }
    let mut vector = [0.0; 3];
    vector[..dimensions].copy_from_slice(&components);
    Ok(vector)
}

fn required<'a>(parameters: &'a HashMap<String, String>, key: &str) -> Result<&'a str, CaseError> {
    parameters
        .get(key)
        .map(|value| value.as_str())
        .ok_or(CaseError::MissingParameter(key.to_string()))
}

fn parse<T: FromStr>(parameters: &HashMap<String, String>, key: &str) -> Result<T, CaseError> {
    let value = required(parameters, key)?;
    value.parse::<T>().map_err(|_| invalid(key, value))
}

fn parse_or<T: FromStr>(
    parameters: &HashMap<String, String>,
    key: &str,
    default: T,
) -> Result<T, CaseError> {
    match parameters.get(key) {
        Some(value) => value.parse::<T>().map_err(|_| invalid(key, value)),
        None => Ok(default),
    }
}

fn invalid(key: &str, value: &str) -> CaseError {
    CaseError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}

pub fn create_case_directories() -> io::Result<()> {
    for path_str in [DATA_PATH, PRE_PROCESSING_PATH] {
        let path = Path::new(path_str);
        if !path.exists() {
            println!("Creating the {} path.\n", path_str.yellow().bold());
            fs::create_dir_all(path)?;
        }
    }
    Ok(())
}

pub fn build_case_conditions() -> Result<CaseConditions, CaseError> {
    create_case_directories()?;
    let path = Path::new(PRE_PROCESSING_PATH).join(CASE_CONDITIONS_FILE);
    let path_str = path.display().to_string();
    if path.exists() {
        println!(
            "Reading the case conditions file: {}.\n",
            path_str.yellow().bold()
        );
    } else {
        let mut file = File::create(&path)?;
        println!(
            "Creating the default case conditions file: {}.\n",
            path_str.yellow().bold()
        );
        write!(file, "{}", DEFAULT_CASE_CONDITIONS)?;
    }
    let parameters = read_case_conditions()?;
    CaseConditions::from_parameters(&parameters)
}

pub fn read_case_conditions() -> io::Result<HashMap<String, String>> {
    let path = Path::new(PRE_PROCESSING_PATH).join(CASE_CONDITIONS_FILE);
    let mut file = File::open(path)?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;
    Ok(extract_parameters(&contents))
}

pub fn extract_parameters(contents: &str) -> HashMap<String, String> {
    contents
        .lines()
        .map(|line| line.trim())
        .filter(|line| !line.starts_with("#"))
        .filter(|line| !line.is_empty())
        .map(|line| {
            let mut parts = line.splitn(2, "=");
            let key = parts.next().unwrap_or("").trim().to_string();
            let value = parts.next().unwrap_or("").trim().to_string();
            (key, value)
        })
        .collect::<HashMap<String, String>>()
}

pub fn write_residuals(time_step: usize, residuals: &Residuals) -> io::Result<()> {
    let path = Path::new(DATA_PATH).join(RESIDUALS_FILE);
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    if time_step == 0 {
        writeln!(
            file,
            "{:>8} {:>16} {:>16} {:>16} {:>16}",
            "step", "density", "velocity_x", "velocity_y", "velocity_z"
        )?;
    }
    writeln!(
        file,
        "{:>8} {:>16.8e} {:>16.8e} {:>16.8e} {:>16.8e}",
        time_step,
        residuals.density,
        residuals.velocity[0],
        residuals.velocity[1],
        residuals.velocity[2],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_case_is_a_lid_driven_cavity() {
        let case: CaseConditions = DEFAULT_CASE_CONDITIONS.parse().unwrap();
        assert_eq!(case.stencil, Stencil::D2Q9);
        assert_eq!(case.size, [51, 51, 1]);
        assert_eq!(case.boundary_conditions.len(), 4);
        let north = case
            .boundary_conditions
            .iter()
            .find(|(face, _)| *face == BoundaryFace::North)
            .map(|(_, condition)| condition.clone());
        assert_eq!(
            north,
            Some(BoundaryCondition::EquilibriumDiffuseReflection {
                velocity: [0.01, 0.0, 0.0]
            })
        );
        assert_eq!(case.periodic_axes(), [false; 3]);
        assert_eq!(case.halo_depth(), 1);
    }

    #[test]
    fn comments_and_blank_lines_are_ignored() {
        let parameters = extract_parameters("# comment\n\n  tau = 0.6  \nlattice=d3q19\n");
        assert_eq!(parameters.len(), 2);
        assert_eq!(parameters["tau"], "0.6");
        assert_eq!(parameters["lattice"], "d3q19");
    }

    #[test]
    fn boundary_condition_values() {
        assert_eq!(
            parse_boundary_condition("k", "pressure_2nd 1.01", 2).unwrap(),
            BoundaryCondition::ExtrapolatedPressure {
                order: ExtrapolationOrder::Second,
                density: 1.01
            }
        );
        assert_eq!(
            parse_boundary_condition("k", "zou_he 0.1 0.0", 2).unwrap(),
            BoundaryCondition::ZouHeVelocity {
                velocity: [0.1, 0.0, 0.0]
            }
        );
        assert!(parse_boundary_condition("k", "zou_he 0.1", 2).is_err());
        assert!(parse_boundary_condition("k", "zou_he 0.1 0.0 0.0", 3).is_err());
        assert!(parse_boundary_condition("k", "pressure_1st -1.0", 2).is_err());
        assert!(parse_boundary_condition("k", "no_slip", 2).is_err());
    }

    #[test]
    fn periodic_faces_come_in_pairs() {
        let case = DEFAULT_CASE_CONDITIONS.replace(
            "west_boundary_condition          = diffuse_reflection 0.0 0.0",
            "west_boundary_condition          = periodic",
        );
        assert!(matches!(
            case.parse::<CaseConditions>(),
            Err(CaseError::InvalidValue { .. })
        ));
        let case = case.replace(
            "east_boundary_condition          = diffuse_reflection 0.0 0.0",
            "east_boundary_condition          = periodic",
        );
        let case: CaseConditions = case.parse().unwrap();
        assert_eq!(case.periodic_axes(), [true, false, false]);
    }

    #[test]
    fn missing_faces_are_reported() {
        let case = "lattice = d3q19
nx = 5
ny = 5
nz = 5
tau = 0.7
initial_velocity = 0.0 0.0 0.0
west_boundary_condition = periodic
east_boundary_condition = periodic
south_boundary_condition = bounce_back
north_boundary_condition = bounce_back
top_boundary_condition = free_flux
";
        assert!(matches!(
            case.parse::<CaseConditions>(),
            Err(CaseError::MissingParameter(key)) if key == "bottom_boundary_condition"
        ));
    }
}
