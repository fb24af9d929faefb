use std::{
    fmt,
    str::FromStr,
};

use clap::{
    ValueEnum,
    builder::PossibleValue,
};
use ndarray::{
    Array1,
    Array3,
};
use serde::{
    Serialize,
    Deserialize,
};

pub type Result<T> = anyhow::Result<T>;

pub type Vector<T> = Array1<T>;  // Define this type to use broadcast operations.
pub type Cube<T>   = Array3<T>;
pub type MatX3<T> = Vec<[T;3]>;  // Nx3 matrix
pub type Mat33<T> = [[T;3];3];   // 3x3 matrix


/// One of the three grid axes, in the order they are declared in the grid line.
///
/// These are lattice directions, not Cartesian ones: `x` is accepted for the first
/// axis only because people are used to typing it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "String", into = "String")]
pub enum Axis {
    A,
    B,
    C,
}


const AXIS_ALIASES: [(Axis, &[&str]); 3] = [
    (Axis::A, &["a", "x", "1"]),
    (Axis::B, &["b", "y", "2"]),
    (Axis::C, &["c", "z", "3"]),
];


impl Axis {
    /// Position of this axis in `[nx, ny, nz]` and in the cell matrix.
    pub fn index(self) -> usize {
        match self {
            Axis::A => 0,
            Axis::B => 1,
            Axis::C => 2,
        }
    }

    fn aliases(self) -> &'static [&'static str] {
        AXIS_ALIASES[self.index()].1
    }
}


impl ValueEnum for Axis {
    fn value_variants<'a>() -> &'a [Self] {
        &[Axis::A, Axis::B, Axis::C]
    }

    fn to_possible_value(&self) -> Option<PossibleValue> {
        let names = self.aliases();
        Some(PossibleValue::new(names[0]).aliases(names[1..].iter().copied()))
    }
}


impl FromStr for Axis {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        AXIS_ALIASES.iter()
            .find(|(_, names)| names.contains(&key.as_str()))
            .map(|(axis, _)| *axis)
            .ok_or_else(|| format!("Invalid axis {:?}, available axes are `a|x|1`, `b|y|2` and `c|z|3`", s))
    }
}


impl TryFrom<String> for Axis {
    type Error = String;

    fn try_from(s: String) -> std::result::Result<Self, Self::Error> {
        s.parse()
    }
}


impl From<Axis> for String {
    fn from(axis: Axis) -> Self {
        axis.to_string()
    }
}


impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.aliases()[0])
    }
}
