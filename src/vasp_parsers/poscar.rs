use std::{
    fmt,
    io::{
        self,
        BufRead,
    },
    path::Path,
};

use log::debug;

use crate::{
    error::{
        ChgError,
        ChgResult,
    },
    geometry,
    types::{
        Axis,
        Mat33,
        MatX3,
    },
    vasp_parsers::{
        open_text,
        parse_leading,
        LineReader,
        MAX_PREALLOC,
    },
};


/// Tag of the coordinate block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CoordType {
    Direct,
    Cartesian,
}


impl CoordType {
    fn from_line(line: &str) -> Option<Self> {
        match line.trim_start().chars().next()?.to_ascii_lowercase() {
            'd'       => Some(Self::Direct),
            'c' | 'k' => Some(Self::Cartesian),
            _         => None,
        }
    }
}


impl fmt::Display for CoordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Direct    => f.write_str("Direct"),
            Self::Cartesian => f.write_str("Cartesian"),
        }
    }
}


/// Structure block heading every volumetric data file.
///
/// The cell and positions are kept exactly as read, they are only carried along to be
/// written back.
#[derive(Clone, Debug, PartialEq)]
pub struct Poscar {
    pub comment:       String,
    pub scale:         f64,
    pub cell:          Mat33<f64>,
    pub ion_types:     Vec<String>,
    pub ions_per_type: Vec<usize>,
    pub coord_type:    CoordType,
    pub positions:     MatX3<f64>,
}


impl Poscar {
    pub fn from_file(path: &(impl AsRef<Path> + ?Sized)) -> ChgResult<Self> {
        let mut reader = LineReader::new(open_text(path)?);
        Self::from_lines(&mut reader)
    }

    pub fn from_str(txt: &str) -> ChgResult<Self> {
        let mut reader = LineReader::new(io::Cursor::new(txt.as_bytes()));
        Self::from_lines(&mut reader)
    }

    /// Consume the structure lines, the cursor stays right after the last atomic position.
    pub(crate) fn from_lines<R: BufRead>(reader: &mut LineReader<R>) -> ChgResult<Self> {
        let comment = reader.expect_line("system name")?.1.trim().to_string();

        let scale = {
            let (lineno, line) = reader.expect_line("scale factor")?;
            parse_leading::<f64>(line, 1, "scale factor", lineno)?[0]
        };

        let mut cell = [[0.0f64; 3]; 3];
        for (i, row) in cell.iter_mut().enumerate() {
            let (lineno, line) = reader.expect_line("lattice vector")?;
            let v = parse_leading::<f64>(line, 3, &format!("lattice vector #{}", i + 1), lineno)?;
            row.copy_from_slice(&v);
        }

        let ion_types = {
            let (lineno, line) = reader.expect_line("element symbols")?;
            let v = line.split_whitespace()
                .map(str::to_string)
                .collect::<Vec<String>>();
            if v.is_empty() {
                return Err(ChgError::format(format!("line {}: no element symbols found", lineno)));
            }
            if v[0].parse::<f64>().is_ok() {
                return Err(ChgError::format(format!(
                            "line {}: element symbols are missing, VASP4 style headers are not supported", lineno)));
            }
            v
        };

        let ions_per_type = {
            let (lineno, line) = reader.expect_line("ions per type")?;
            let ncol = line.split_whitespace().count();
            parse_leading::<usize>(line, ncol, "ions per type", lineno)?
        };
        if ions_per_type.len() != ion_types.len() {
            return Err(ChgError::format(format!(
                        "line {}: {} element symbols but {} ion counts",
                        reader.lineno(), ion_types.len(), ions_per_type.len())));
        }
        let nions = ions_per_type.iter()
            .try_fold(0usize, |acc, &n| acc.checked_add(n))
            .ok_or_else(|| ChgError::format(format!(
                        "line {}: ion counts {:?} are too large", reader.lineno(), ions_per_type)))?;

        let coord_type = {
            let (mut lineno, mut line) = reader.expect_line("coordinate type")?;
            if line.trim_start().starts_with(['s', 'S']) {
                debug!("Selective dynamics line found at line {}, flags are dropped", lineno);
                (lineno, line) = reader.expect_line("coordinate type")?;
            }
            CoordType::from_line(line)
                .ok_or_else(|| ChgError::format(format!(
                            "line {}: unknown coordinate type {:?}", lineno, line.trim())))?
        };

        let mut positions = Vec::with_capacity(nions.min(MAX_PREALLOC));
        for i in 0 .. nions {
            let (lineno, line) = reader.next_line()?
                .ok_or_else(|| ChgError::format(format!(
                            "expecting {} atomic positions, file ends after {}", nions, i)))?;
            let v = parse_leading::<f64>(line, 3, "atomic position", lineno)?;
            positions.push([v[0], v[1], v[2]]);
        }

        let ret = Self {
            comment,
            scale,
            cell,
            ion_types,
            ions_per_type,
            coord_type,
            positions,
        };
        ret.check()?;
        Ok(ret)
    }

    /// Header consistency, the counts must describe the position rows.
    pub fn check(&self) -> ChgResult<()> {
        if self.ion_types.len() != self.ions_per_type.len() {
            return Err(ChgError::format(format!(
                        "{} element symbols but {} ion counts",
                        self.ion_types.len(), self.ions_per_type.len())));
        }
        if self.nions() != self.positions.len() {
            return Err(ChgError::format(format!(
                        "ion counts sum up to {} but {} atomic positions are present",
                        self.nions(), self.positions.len())));
        }
        Ok(())
    }

    pub fn nions(&self) -> usize {
        self.ions_per_type.iter().fold(0, |acc, &n| acc.saturating_add(n))
    }

    pub fn scaled_cell(&self) -> ChgResult<Mat33<f64>> {
        geometry::scaled_cell(&self.cell, self.scale)
    }

    pub fn volume(&self) -> ChgResult<f64> {
        geometry::cell_volume(&self.scaled_cell()?)
    }

    /// Length of the lattice vector along `axis` in Angstrom.
    pub fn axis_length(&self, axis: Axis) -> ChgResult<f64> {
        let factor = geometry::scale_factor(&self.cell, self.scale)?;
        Ok(geometry::axis_length(&self.cell[axis.index()], factor))
    }
}


impl fmt::Display for Poscar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.comment)?;
        writeln!(f, "{:19.14}", self.scale)?;
        for row in self.cell.iter() {
            writeln!(f, " {:14.10} {:14.10} {:14.10}", row[0], row[1], row[2])?;
        }

        let line = self.ion_types.iter()
            .map(|s| format!("{:>5}", s))
            .collect::<String>();
        writeln!(f, "{}", line)?;
        let line = self.ions_per_type.iter()
            .map(|n| format!("{:>6}", n))
            .collect::<String>();
        writeln!(f, "{}", line)?;

        writeln!(f, "{}", self.coord_type)?;
        for p in self.positions.iter() {
            writeln!(f, " {:14.10} {:14.10} {:14.10}", p[0], p[1], p[2])?;
        }
        Ok(())
    }
}
