//! Planar averaging: collapse the data cube onto one lattice direction.

use ndarray::{
    Array1,
    Axis as NdAxis,
};

use crate::{
    error::{
        ChgError,
        ChgResult,
    },
    types::{
        Axis,
        Vector,
    },
    vasp_parsers::chg::ChargeDensity,
};


/// One-dimensional profile along a lattice direction.
#[derive(Clone, Debug)]
pub struct PlanarProfile {
    pub axis:      Axis,
    /// Distance from the origin in Å, starts at exactly zero.
    pub distances: Vector<f64>,
    pub values:    Vector<f64>,
}


impl PlanarProfile {
    pub fn new(axis: Axis, distances: Vector<f64>, values: Vector<f64>) -> ChgResult<Self> {
        if distances.is_empty() || distances.len() != values.len() {
            return Err(ChgError::format(format!(
                        "profile needs non-empty columns of equal length, got {} distances and {} values",
                        distances.len(), values.len())));
        }
        if distances[0] != 0.0 {
            return Err(ChgError::format(format!("profile must start at distance 0, got {}", distances[0])));
        }
        if distances.windows(2).into_iter().any(|w| w[1] < w[0]) {
            return Err(ChgError::format("profile distances must be non-decreasing"));
        }

        Ok(Self { axis, distances, values })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}


/// Average the field over the two axes other than `axis`.
///
/// The values are divided by the cell volume when `normalize` is set, distances are
/// never touched by the normalization.
pub fn planar_average(field: &ChargeDensity, axis: Axis, normalize: bool) -> ChgResult<PlanarProfile> {
    // the cube is stored as [iz, iy, ix]
    let (first, second) = match axis {
        Axis::A => (NdAxis(1), NdAxis(0)),
        Axis::B => (NdAxis(2), NdAxis(0)),
        Axis::C => (NdAxis(2), NdAxis(1)),
    };

    let mut values = field.chg
        .mean_axis(first)
        .and_then(|v| v.mean_axis(second))
        .ok_or_else(|| ChgError::format(format!("cannot average an empty grid {:?}", field.ngrid)))?;

    if normalize {
        values /= field.volume;
    }

    let n = field.ngrid[axis.index()];
    let axislen = field.pos.axis_length(axis)?;
    let distances = Array1::from_shape_fn(n, |t| {
        if t == 0 {
            0.0
        } else {
            t as f64 / n as f64 * axislen
        }
    });

    PlanarProfile::new(axis, distances, values)
}
