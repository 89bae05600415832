use crate::global_variables::*;
use std::fmt;
use std::str::FromStr;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Fluid,
    ImmersedSolid,
    BounceBackWall,
    FreeFlux,
    ExtrapolatedPressure1st,
    ExtrapolatedPressure2nd,
    Periodic,
    EquilibriumDiffuseReflection,
    ZouHeVelocity,
}

impl NodeKind {
    pub const ALL: [NodeKind; 9] = [
        NodeKind::Fluid,
        NodeKind::ImmersedSolid,
        NodeKind::BounceBackWall,
        NodeKind::FreeFlux,
        NodeKind::ExtrapolatedPressure1st,
        NodeKind::ExtrapolatedPressure2nd,
        NodeKind::Periodic,
        NodeKind::EquilibriumDiffuseReflection,
        NodeKind::ZouHeVelocity,
    ];

    pub fn code(&self) -> i32 {
        match self {
            NodeKind::Fluid => 10,
            NodeKind::ImmersedSolid => -1,
            NodeKind::ExtrapolatedPressure1st => 1006,
            NodeKind::ExtrapolatedPressure2nd => 1007,
            NodeKind::Periodic => 1008,
            NodeKind::BounceBackWall => 1010,
            NodeKind::FreeFlux => 1011,
            NodeKind::ZouHeVelocity => 1012,
            NodeKind::EquilibriumDiffuseReflection => 1014,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.code() == code)
    }

    pub fn is_boundary(&self) -> bool {
        !matches!(self, NodeKind::Fluid | NodeKind::ImmersedSolid)
    }

    pub fn precedence(&self) -> u8 {
        match self {
            NodeKind::Fluid | NodeKind::ImmersedSolid => 0,
            NodeKind::Periodic => 1,
            NodeKind::FreeFlux => 2,
            NodeKind::ExtrapolatedPressure1st | NodeKind::ExtrapolatedPressure2nd => 3,
            NodeKind::ZouHeVelocity => 4,
            NodeKind::EquilibriumDiffuseReflection => 5,
            NodeKind::BounceBackWall => 6,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            NodeKind::Fluid => "fluid",
            NodeKind::ImmersedSolid => "immersed_solid",
            NodeKind::BounceBackWall => "bounce_back",
            NodeKind::FreeFlux => "free_flux",
            NodeKind::ExtrapolatedPressure1st => "pressure_1st",
            NodeKind::ExtrapolatedPressure2nd => "pressure_2nd",
            NodeKind::Periodic => "periodic",
            NodeKind::EquilibriumDiffuseReflection => "diffuse_reflection",
            NodeKind::ZouHeVelocity => "zou_he",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for NodeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(code) = s.parse::<i32>() {
            return Self::from_code(code).ok_or(format!("unknown node kind code {code}"));
        }
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or(format!("unknown node kind {s}"))
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CornerType {
    Inner,
    Outer,
}

/// Local surface geometry of a node.
///
/// `normal[a]` is the sign of axis `a` pointing into the fluid: `IP` is the
/// `i = 0` face with normal `+x`, `IM` the `i = imax` face with normal `-x`.
/// One non-zero entry is a face, two an edge (a corner point in 2D), three a
/// corner. Faces are always stored with `CornerType::Inner`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum OrientationCode {
    Fluid,
    ImmersedSolid,
    Surface { normal: [i8; 3], corner: CornerType },
}

const AXIS_NAMES: [char; 3] = ['I', 'J', 'K'];

impl OrientationCode {
    pub fn surface(normal: [i8; 3], corner: CornerType) -> Self {
        let corner = if normal.iter().filter(|&&s| s != 0).count() == 1 {
            CornerType::Inner
        } else {
            corner
        };
        OrientationCode::Surface { normal, corner }
    }

    pub fn face(axis: usize, sign: i8) -> Self {
        let mut normal = [0; 3];
        normal[axis] = sign;
        Self::surface(normal, CornerType::Inner)
    }

    pub fn normal(&self) -> Option<[i8; 3]> {
        match self {
            OrientationCode::Surface { normal, .. } => Some(*normal),
            _ => None,
        }
    }

    pub fn corner_type(&self) -> Option<CornerType> {
        match self {
            OrientationCode::Surface { corner, .. } => Some(*corner),
            _ => None,
        }
    }

    pub fn axes(&self) -> impl Iterator<Item = (usize, i32)> {
        let normal = self.normal().unwrap_or([0; 3]);
        (0..3).filter_map(move |a| (normal[a] != 0).then_some((a, normal[a] as i32)))
    }

    pub fn axis_count(&self) -> usize {
        self.axes().count()
    }

    pub fn is_surface(&self) -> bool {
        self.axis_count() > 0
    }

    pub fn is_face(&self) -> bool {
        self.axis_count() == 1
    }

    pub fn is_edge(&self) -> bool {
        self.axis_count() == 2
    }

    pub fn is_corner(&self) -> bool {
        self.axis_count() == 3
    }

    pub fn required_dimensions(&self) -> usize {
        self.axes().map(|(a, _)| a + 1).max().unwrap_or(0)
    }

    pub fn unit_normal(&self) -> [Float; 3] {
        let normal = self.normal().unwrap_or([0; 3]);
        let norm = (normal.iter().map(|&s| (s as Float).powi(2)).sum::<Float>()).sqrt();
        if norm == 0.0 {
            return [0.0; 3];
        }
        normal.map(|s| s as Float / norm)
    }

    pub fn code(&self) -> i64 {
        match self {
            OrientationCode::Fluid => 0,
            OrientationCode::ImmersedSolid => -1,
            OrientationCode::Surface { corner, .. } => {
                let mut code = 0;
                for (a, s) in self.axes() {
                    let face = 10 * (a as i64 + 1) + if s > 0 { 0 } else { 1 };
                    code = code * 100 + face;
                }
                if !self.is_face() {
                    code = code * 10 + if *corner == CornerType::Inner { 0 } else { 1 };
                }
                code
            }
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => return Some(OrientationCode::Fluid),
            -1 => return Some(OrientationCode::ImmersedSolid),
            c if c < 10 => return None,
            _ => {}
        }
        let digits = code.to_string();
        let (faces, corner) = match digits.len() {
            2 => (digits.as_str(), CornerType::Inner),
            5 | 7 => {
                let (faces, last) = digits.split_at(digits.len() - 1);
                let corner = match last {
                    "0" => CornerType::Inner,
                    "1" => CornerType::Outer,
                    _ => return None,
                };
                (faces, corner)
            }
            _ => return None,
        };
        let mut normal = [0i8; 3];
        let mut last_axis = None;
        for pair in faces.as_bytes().chunks(2) {
            let axis = (pair[0] as char).to_digit(10)? as usize;
            let sign = match pair[1] {
                b'0' => 1,
                b'1' => -1,
                _ => return None,
            };
            if axis == 0 || axis > 3 || last_axis.is_some_and(|l| l >= axis) {
                return None;
            }
            normal[axis - 1] = sign;
            last_axis = Some(axis);
        }
        Some(Self::surface(normal, corner))
    }

    pub fn all_surfaces(dimensions: usize) -> Vec<Self> {
        let mut orientations = Vec::new();
        let range = |a: usize| if a < dimensions { vec![-1, 0, 1] } else { vec![0] };
        for &nz in &range(2) {
            for &ny in &range(1) {
                for &nx in &range(0) {
                    let normal = [nx, ny, nz];
                    match normal.iter().filter(|&&s| s != 0).count() {
                        0 => {}
                        1 => orientations.push(Self::surface(normal, CornerType::Inner)),
                        _ => {
                            orientations.push(Self::surface(normal, CornerType::Inner));
                            orientations.push(Self::surface(normal, CornerType::Outer));
                        }
                    }
                }
            }
        }
        orientations
    }
}

impl fmt::Display for OrientationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrientationCode::Fluid => write!(f, "FLUID"),
            OrientationCode::ImmersedSolid => write!(f, "IMMERSED_SOLID"),
            OrientationCode::Surface { corner, .. } => {
                for (a, s) in self.axes() {
                    write!(f, "{}{}", AXIS_NAMES[a], if s > 0 { 'P' } else { 'M' })?;
                }
                if !self.is_face() {
                    write!(f, "{}", if *corner == CornerType::Inner { "_I" } else { "_O" })?;
                }
                Ok(())
            }
        }
    }
}

impl FromStr for OrientationCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_uppercase();
        let name = name.strip_prefix("VG_").unwrap_or(name.as_str());
        match name {
            "FLUID" => return Ok(OrientationCode::Fluid),
            "IMMERSED_SOLID" | "IMMERSEDSOLID" => return Ok(OrientationCode::ImmersedSolid),
            _ => {}
        }
        let (faces, corner) = match name.split_once('_') {
            Some((faces, "I")) => (faces, CornerType::Inner),
            Some((faces, "O")) => (faces, CornerType::Outer),
            Some(_) => return Err(format!("unknown orientation {s}")),
            None => (name, CornerType::Inner),
        };
        let chars: Vec<char> = faces.chars().collect();
        if chars.is_empty() || chars.len() % 2 != 0 {
            return Err(format!("unknown orientation {s}"));
        }
        let mut normal = [0i8; 3];
        for pair in chars.chunks(2) {
            let axis = AXIS_NAMES
                .iter()
                .position(|&c| c == pair[0])
                .ok_or(format!("unknown axis {} in {s}", pair[0]))?;
            let sign = match pair[1] {
                'P' => 1,
                'M' => -1,
                other => return Err(format!("unknown sign {other} in {s}")),
            };
            if normal[axis] != 0 {
                return Err(format!("axis {} repeated in {s}", pair[0]));
            }
            normal[axis] = sign;
        }
        let is_face = chars.len() == 2;
        if is_face == name.contains('_') {
            return Err(format!("unknown orientation {s}"));
        }
        Ok(Self::surface(normal, corner))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_codes_match_the_named_orientations() {
        let cases = [
            ("IP", 10),
            ("IM", 11),
            ("JP", 20),
            ("KM", 31),
            ("IPJP_I", 10200),
            ("IMJM_O", 11211),
            ("JMKP_I", 21300),
            ("IPJPKP_I", 1020300),
            ("IMJMKM_O", 1121311),
            ("IPJMKP_O", 1021301),
        ];
        for (name, code) in cases {
            let orientation: OrientationCode = name.parse().unwrap();
            assert_eq!(orientation.code(), code, "{name}");
            assert_eq!(OrientationCode::from_code(code), Some(orientation), "{name}");
            assert_eq!(orientation.to_string(), name);
        }
    }

    #[test]
    fn faces_point_into_the_fluid() {
        let ip: OrientationCode = "VG_IP".parse().unwrap();
        assert_eq!(ip.normal(), Some([1, 0, 0]));
        let jm: OrientationCode = "JM".parse().unwrap();
        assert_eq!(jm.normal(), Some([0, -1, 0]));
        assert!(jm.is_face());
    }

    #[test]
    fn surface_counts() {
        let all_2d = OrientationCode::all_surfaces(2);
        assert_eq!(all_2d.iter().filter(|o| o.is_face()).count(), 4);
        assert_eq!(all_2d.iter().filter(|o| o.is_edge()).count(), 8);
        let all_3d = OrientationCode::all_surfaces(3);
        assert_eq!(all_3d.iter().filter(|o| o.is_face()).count(), 6);
        assert_eq!(all_3d.iter().filter(|o| o.is_edge()).count(), 24);
        assert_eq!(all_3d.iter().filter(|o| o.is_corner()).count(), 16);
        for orientation in all_3d {
            assert_eq!(OrientationCode::from_code(orientation.code()), Some(orientation));
        }
    }

    #[test]
    fn unit_normal_of_a_corner() {
        let corner: OrientationCode = "IPJMKP_I".parse().unwrap();
        let n = corner.unit_normal();
        let expected = 1.0 / (3.0 as Float).sqrt();
        assert!((n[0] - expected).abs() < 1e-15);
        assert!((n[1] + expected).abs() < 1e-15);
        assert!((n[2] - expected).abs() < 1e-15);
    }

    #[test]
    fn malformed_names_are_rejected() {
        assert!("IPJP".parse::<OrientationCode>().is_err());
        assert!("IP_I".parse::<OrientationCode>().is_err());
        assert!("IPIM_I".parse::<OrientationCode>().is_err());
        assert!("XP".parse::<OrientationCode>().is_err());
        assert_eq!(OrientationCode::from_code(12), None);
    }

    #[test]
    fn node_kind_codes() {
        for kind in NodeKind::ALL {
            assert_eq!(NodeKind::from_code(kind.code()), Some(kind));
            assert_eq!(kind.to_string().parse::<NodeKind>(), Ok(kind));
        }
        assert_eq!("1011".parse::<NodeKind>(), Ok(NodeKind::FreeFlux));
        assert!(!NodeKind::Fluid.is_boundary());
        assert!(NodeKind::Periodic.is_boundary());
    }
}
