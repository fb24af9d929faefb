//! Derived geometric quantities of the periodic cell.

use crate::{
    error::{
        ChgError,
        ChgResult,
    },
    types::Mat33,
};


fn triple_product(c: &Mat33<f64>) -> f64 {
    // |00 01 02|
    // |10 11 12|
    // |20 21 22|
    c[0][0] * (c[1][1] * c[2][2] - c[2][1] * c[1][2]) -
        c[0][1] * (c[1][0] * c[2][2] - c[1][2] * c[2][0]) +
        c[0][2] * (c[1][0] * c[2][1] - c[1][1] * c[2][0])
}


/// Volume of the cell spanned by `basis`, i.e. `a0 · (a1 × a2)`.
///
/// The rows must already be scaled by the scale factor of the header. Degenerate or
/// left-handed cells are rejected since the volume is used as a divisor downstream.
pub fn cell_volume(basis: &Mat33<f64>) -> ChgResult<f64> {
    let volume = triple_product(basis);
    if !volume.is_finite() || volume <= 0.0 {
        return Err(ChgError::Geometry { volume });
    }
    Ok(volume)
}


/// Length of one lattice vector after scaling.
pub fn axis_length(row: &[f64; 3], scale: f64) -> f64 {
    row.iter()
        .map(|x| x * scale)
        .map(|x| x * x)
        .sum::<f64>()
        .sqrt()
}


/// Effective multiplier of the raw basis vectors.
///
/// Negative scale means the target volume of the cell, the vectors are then stretched
/// isotropically to reach it.
pub fn scale_factor(basis: &Mat33<f64>, scale: f64) -> ChgResult<f64> {
    if scale > 0.0 {
        Ok(scale)
    } else if scale < 0.0 {
        let raw = triple_product(basis).abs();
        if raw == 0.0 {
            return Err(ChgError::Geometry { volume: raw });
        }
        Ok((scale.abs() / raw).cbrt())
    } else {
        Err(ChgError::Geometry { volume: 0.0 })
    }
}


/// Apply the universal scale factor to the raw basis.
pub fn scaled_cell(basis: &Mat33<f64>, scale: f64) -> ChgResult<Mat33<f64>> {
    let factor = scale_factor(basis, scale)?;
    let mut ret = *basis;
    ret.iter_mut()
        .flatten()
        .for_each(|x| *x *= factor);
    Ok(ret)
}
