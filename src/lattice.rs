//! Direction order for D2Q9:
//! ```text
//!   6   2   5
//!    \  |  /
//!   3 - 0 - 1
//!    /  |  \
//!   7   4   8
//! ```

use crate::error::LatticeError;
use crate::global_variables::*;
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

pub const C_D2Q9: [[i32; 2]; 9] = [
    [0, 0],
    [1, 0],
    [0, 1],
    [-1, 0],
    [0, -1],
    [1, 1],
    [-1, 1],
    [-1, -1],
    [1, -1],
];

pub const W_D2Q9: [Float; 9] = [
    4.0 / 9.0,
    1.0 / 9.0,
    1.0 / 9.0,
    1.0 / 9.0,
    1.0 / 9.0,
    1.0 / 36.0,
    1.0 / 36.0,
    1.0 / 36.0,
    1.0 / 36.0,
];

pub const C_D3Q27: [[i32; 3]; 27] = [
    [0, 0, 0],
    [1, 0, 0],
    [-1, 0, 0],
    [0, 1, 0],
    [0, -1, 0],
    [0, 0, 1],
    [0, 0, -1],
    [1, 1, 0],
    [-1, -1, 0],
    [1, 0, 1],
    [-1, 0, -1],
    [0, 1, 1],
    [0, -1, -1],
    [1, -1, 0],
    [-1, 1, 0],
    [1, 0, -1],
    [-1, 0, 1],
    [0, 1, -1],
    [0, -1, 1],
    [1, 1, 1],
    [-1, -1, -1],
    [1, 1, -1],
    [-1, -1, 1],
    [1, -1, 1],
    [-1, 1, -1],
    [-1, 1, 1],
    [1, -1, -1],
];

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Stencil {
    D2Q9,
    D3Q15,
    D3Q19,
    D3Q27,
}

impl Stencil {
    pub fn dimensions(&self) -> usize {
        match self {
            Stencil::D2Q9 => 2,
            _ => 3,
        }
    }

    fn weights_by_norm(&self) -> [Float; 4] {
        match self {
            Stencil::D2Q9 => [4.0 / 9.0, 1.0 / 9.0, 1.0 / 36.0, 0.0],
            Stencil::D3Q15 => [2.0 / 9.0, 1.0 / 9.0, 0.0, 1.0 / 72.0],
            Stencil::D3Q19 => [1.0 / 3.0, 1.0 / 18.0, 1.0 / 36.0, 0.0],
            Stencil::D3Q27 => [8.0 / 27.0, 2.0 / 27.0, 1.0 / 54.0, 1.0 / 216.0],
        }
    }
}

impl fmt::Display for Stencil {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stencil::D2Q9 => "d2q9",
            Stencil::D3Q15 => "d3q15",
            Stencil::D3Q19 => "d3q19",
            Stencil::D3Q27 => "d3q27",
        };
        write!(f, "{name}")
    }
}

impl FromStr for Stencil {
    type Err = LatticeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "d2q9" => Ok(Stencil::D2Q9),
            "d3q15" => Ok(Stencil::D3Q15),
            "d3q19" => Ok(Stencil::D3Q19),
            "d3q27" => Ok(Stencil::D3Q27),
            other => Err(LatticeError::UnknownStencil(other.to_string())),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Component {
    pub start: usize,
    pub end: usize,
}

impl Component {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn range(&self) -> RangeInclusive<usize> {
        self.start..=self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }
}

#[derive(Clone, Debug)]
pub struct LatticeDescriptor {
    pub stencil: Stencil,
    pub dimensions: usize,
    pub q: usize,
    pub velocities: Vec<[i32; 3]>,
    pub weights: Vec<Float>,
    pub opposite: Vec<usize>,
    pub components: Vec<Component>,
    pub cs_2: Float,
}

impl LatticeDescriptor {
    pub fn d2q9() -> Self {
        Self::build(Stencil::D2Q9)
    }

    pub fn d3q15() -> Self {
        Self::build(Stencil::D3Q15)
    }

    pub fn d3q19() -> Self {
        Self::build(Stencil::D3Q19)
    }

    pub fn d3q27() -> Self {
        Self::build(Stencil::D3Q27)
    }

    pub fn build(stencil: Stencil) -> Self {
        let velocities: Vec<[i32; 3]> = match stencil {
            Stencil::D2Q9 => C_D2Q9.iter().map(|&[cx, cy]| [cx, cy, 0]).collect(),
            Stencil::D3Q15 => C_D3Q27
                .iter()
                .enumerate()
                .filter(|(q, _)| *q < 7 || *q >= 19)
                .map(|(_, &c)| c)
                .collect(),
            Stencil::D3Q19 => C_D3Q27[..19].to_vec(),
            Stencil::D3Q27 => C_D3Q27.to_vec(),
        };
        let by_norm = stencil.weights_by_norm();
        let weights = velocities
            .iter()
            .map(|c| by_norm[(c[0] * c[0] + c[1] * c[1] + c[2] * c[2]) as usize])
            .collect();
        let q = velocities.len();
        Self::new(stencil, velocities, weights, vec![Component::new(0, q - 1)])
            .expect("built-in stencils are consistent")
    }

    pub fn new(
        stencil: Stencil,
        velocities: Vec<[i32; 3]>,
        weights: Vec<Float>,
        components: Vec<Component>,
    ) -> Result<Self, LatticeError> {
        let q = velocities.len();
        if q == 0 || q > MAX_Q || weights.len() != q {
            return Err(LatticeError::DirectionCount { q, max: MAX_Q });
        }
        let lattice = Self {
            stencil,
            dimensions: stencil.dimensions(),
            q,
            velocities,
            weights,
            opposite: Vec::new(),
            components: Vec::new(),
            cs_2: CS_2,
        };
        lattice.with_components(components)
    }

    pub fn with_components(mut self, components: Vec<Component>) -> Result<Self, LatticeError> {
        let mut covered = vec![0usize; self.q];
        let mut opposite = vec![usize::MAX; self.q];
        for (index, component) in components.iter().enumerate() {
            if component.start > component.end || component.end >= self.q {
                return Err(LatticeError::InvalidComponentRange {
                    component: index,
                    start: component.start,
                    end: component.end,
                    q: self.q,
                });
            }
            for q in component.range() {
                covered[q] += 1;
            }
            let sum: Float = component.range().map(|q| self.weights[q]).sum();
            if (sum - 1.0).abs() > TOLERANCE_WEIGHTS {
                return Err(LatticeError::WeightSum {
                    component: index,
                    sum,
                });
            }
        }
        if let Some(q) = covered.iter().position(|&n| n != 1) {
            return Err(LatticeError::ComponentCoverage(q));
        }
        for component in &components {
            for q in component.range() {
                let c = self.velocities[q];
                opposite[q] = component
                    .range()
                    .find(|&p| {
                        let d = self.velocities[p];
                        d[0] == -c[0] && d[1] == -c[1] && d[2] == -c[2]
                    })
                    .ok_or(LatticeError::MissingOpposite(q))?;
            }
        }
        self.opposite = opposite;
        self.components = components;
        Ok(self)
    }

    pub fn component_of(&self, q: usize) -> Option<Component> {
        self.components
            .iter()
            .copied()
            .find(|component| component.range().contains(&q))
    }

    pub fn is(&self, stencil: Stencil) -> bool {
        self.stencil == stencil
    }

    pub fn velocity(&self, q: usize) -> [i32; 3] {
        self.velocities[q]
    }

    #[inline]
    pub fn c_dot(&self, q: usize, u: &[Float; 3]) -> Float {
        let c = self.velocities[q];
        (c[0] as Float) * u[0] + (c[1] as Float) * u[1] + (c[2] as Float) * u[2]
    }
}
