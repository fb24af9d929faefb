//! Volumetric data files written by VASP: CHGCAR, CHG, PARCHG, LOCPOT ...
//!
//! Layout: a POSCAR-like structure block, one blank line, the grid line `NGX NGY NGZ`,
//! then `NGX*NGY*NGZ` numbers with X running fastest. Whatever follows the first data
//! block (augmentation occupancies, the magnetization block of spin-polarized runs) is
//! skipped.

use std::{
    fmt,
    io::{
        self,
        BufRead,
        Write,
    },
    path::Path,
};

use itertools::Itertools;
use log::{
    debug,
    warn,
};
use ndarray::Array3;

use crate::{
    error::{
        ChgError,
        ChgResult,
    },
    types::Cube,
    vasp_parsers::{
        open_text,
        parse_leading,
        write_atomic,
        poscar::Poscar,
        LineReader,
        MAX_PREALLOC,
    },
};


/// A scalar field sampled on the real-space grid of a periodic cell.
#[derive(Clone, Debug)]
pub struct ChargeDensity {
    pub pos:    Poscar,
    /// `[NGX, NGY, NGZ]` as declared in the file.
    pub ngrid:  [usize; 3],
    /// Indexed as `[iz, iy, ix]`, the declared first axis is the innermost one.
    pub chg:    Cube<f64>,
    /// Volume of the scaled cell in Å^3, strictly positive.
    pub volume: f64,
}


impl ChargeDensity {
    /// Assemble a field, all invariants are verified here.
    pub fn new(pos: Poscar, ngrid: [usize; 3], chg: Cube<f64>) -> ChgResult<Self> {
        if ngrid.iter().any(|&n| n == 0) {
            return Err(ChgError::format(format!("grid dimensions must be positive, got {:?}", ngrid)));
        }

        let expected = [ngrid[2], ngrid[1], ngrid[0]];
        if chg.shape() != expected {
            return Err(ChgError::format(format!(
                        "data cube of shape {:?} does not fit the grid {:?}", chg.shape(), ngrid)));
        }

        pos.check()?;
        let volume = pos.volume()?;

        Ok(Self { pos, ngrid, chg, volume })
    }

    pub fn from_file(path: &(impl AsRef<Path> + ?Sized)) -> ChgResult<Self> {
        debug!("Opening volumetric data file {:?}", path.as_ref());
        Self::from_reader(open_text(path)?)
    }

    pub fn from_str(txt: &str) -> ChgResult<Self> {
        Self::from_reader(io::Cursor::new(txt.as_bytes()))
    }

    pub fn from_reader(reader: impl BufRead) -> ChgResult<Self> {
        let mut reader = LineReader::new(reader);
        let pos = Poscar::from_lines(&mut reader)?;
        let (ngrid, gridline) = Self::read_ngrid(&mut reader)?;
        let chg = Self::read_chg(&mut reader, ngrid, &gridline)?;
        Self::new(pos, ngrid, chg)
    }

    fn read_ngrid<R: BufRead>(reader: &mut LineReader<R>) -> ChgResult<([usize; 3], String)> {
        // VASP puts exactly one blank line here, tolerate none or several
        loop {
            let (lineno, line) = reader.expect_line("grid dimensions")?;
            if line.trim().is_empty() {
                continue;
            }

            let v = parse_leading::<usize>(line, 3, "grid dimensions", lineno)?;
            if v.contains(&0) {
                return Err(ChgError::format(format!("line {}: grid dimensions must be positive, got {:?}", lineno, v)));
            }
            debug!("Grid dimensions {:?} found at line {}", v, lineno);
            return Ok(([v[0], v[1], v[2]], line.trim().to_string()));
        }
    }

    /// Read the first data block straight into a preallocated buffer.
    ///
    /// The block ends at EOF, at a line starting with 'a' (augmentation occupancies) or at
    /// a repeated grid line once the block is complete.
    fn read_chg<R: BufRead>(reader: &mut LineReader<R>, ngrid: [usize; 3], gridline: &str) -> ChgResult<Array3<f64>> {
        let ntot = ngrid.iter()
            .try_fold(1usize, |acc, &n| acc.checked_mul(n))
            .ok_or_else(|| ChgError::format(format!("grid {:?} has too many points", ngrid)))?;
        let mut buf: Vec<f64> = Vec::with_capacity(ntot.min(MAX_PREALLOC));

        while let Some((lineno, line)) = reader.next_line()? {
            let trimmed = line.trim();
            if trimmed.starts_with('a') {
                debug!("Trailing section found at line {}: {:?}", lineno, trimmed);
                break;
            }
            if buf.len() == ntot && trimmed == gridline {
                debug!("Next data block found at line {}", lineno);
                break;
            }

            for tok in trimmed.split_whitespace() {
                let v = tok.parse::<f64>()
                    .map_err(|_| ChgError::format(format!("line {}: cannot parse {:?} as a number", lineno, tok)))?;
                if buf.len() == ntot {
                    return Err(ChgError::format(format!(
                                "line {}: more than {} grid values for the grid {:?}", lineno, ntot, ngrid)));
                }
                buf.push(v);
            }
        }

        if buf.len() != ntot {
            return Err(ChgError::format(format!(
                        "expecting {} grid values for the grid {:?}, found {}", ntot, ngrid, buf.len())));
        }

        Array3::from_shape_vec((ngrid[2], ngrid[1], ngrid[0]), buf)
            .map_err(|e| ChgError::format(e.to_string()))
    }

    /// Subtract `other` from `self` in place, `self` is consumed and its buffer reused.
    ///
    /// Structure and cell are taken from `self`.
    pub fn difference(mut self, other: &ChargeDensity) -> ChgResult<Self> {
        if self.ngrid != other.ngrid {
            return Err(ChgError::ShapeMismatch { lhs: self.ngrid, rhs: other.ngrid });
        }

        if self.pos.ion_types != other.pos.ion_types || self.pos.ions_per_type != other.pos.ions_per_type {
            warn!("Subtracting data of different systems: {:?}{:?} and {:?}{:?}",
                  self.pos.ion_types, self.pos.ions_per_type,
                  other.pos.ion_types, other.pos.ions_per_type);
        }

        self.chg -= &other.chg;
        Ok(self)
    }

    /// The target is replaced only after the whole file has been written.
    pub fn to_file(&self, path: &(impl AsRef<Path> + ?Sized)) -> io::Result<()> {
        write_atomic(path, |w| self.to_writer(w))
    }

    /// Same layout as read, five numbers per line.
    pub fn to_writer(&self, w: &mut impl Write) -> io::Result<()> {
        write!(w, "{}", self.pos)?;
        writeln!(w)?;
        writeln!(w, "{:5}{:5}{:5}", self.ngrid[0], self.ngrid[1], self.ngrid[2])?;

        // standard layout iterates the last index fastest, which is X here
        for chunk in &self.chg.iter().chunks(5) {
            for v in chunk {
                write!(w, " {}", FortranFormat(*v))?;
            }
            writeln!(w)?;
        }
        Ok(())
    }
}


/// Fold the difference over the inputs from left to right: `((f1 - f2) - f3) - ...`.
///
/// The order matters, the structure of the result comes from the first field.
pub fn fold_difference(fields: impl IntoIterator<Item = ChargeDensity>) -> ChgResult<ChargeDensity> {
    let mut it = fields.into_iter();
    let first = it.next()
        .ok_or_else(|| ChgError::format("no input data"))?;
    it.try_fold(first, |acc, f| acc.difference(&f))
}


/// `0.12345678901E+01` style scientific notation used by VASP.
struct FortranFormat(f64);

impl fmt::Display for FortranFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let v = self.0;
        if v == 0.0 {
            return f.write_str("0.00000000000E+00");
        }
        if !v.is_finite() {
            return write!(f, "{}", v);
        }

        // d.dddddddddd x 10^e  ==>  0.ddddddddddd x 10^(e+1)
        let s = format!("{:.10E}", v.abs());
        let (mantissa, exp) = s.split_once('E').unwrap_or((s.as_str(), "0"));
        let exp = exp.parse::<i32>().unwrap_or(0) + 1;
        let digits = mantissa.replace('.', "");
        let sign = if v < 0.0 { "-" } else { "" };
        let esign = if exp < 0 { '-' } else { '+' };
        write!(f, "{}0.{}E{}{:02}", sign, digits, esign, exp.abs())
    }
}
