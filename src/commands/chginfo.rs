use std::path::PathBuf;

use anyhow::bail;
use clap::Args;
use colored::Colorize;
use log::error;

use crate::{
    types::{
        Result,
        Axis,
    },
    OptProcess,
    vasp_parsers::chg::ChargeDensity,
    commands::common::read_chg,
};


#[derive(Debug, Args)]
/// Print a short summary of volumetric data files: grid, cell and value statistics.
///
/// Each file is inspected on its own, a broken file doesn't hide the others.
pub struct Chginfo {
    #[arg(default_value = "./CHGCAR")]
    /// Volumetric data files: CHGCAR, CHG, PARCHG or LOCPOT. `.gz` files are accepted.
    inputs: Vec<PathBuf>,
}


/// Value statistics of one field, `sum / N` is the total charge for CHGCAR data.
#[derive(Clone, Debug, PartialEq)]
pub struct ChgSummary {
    pub label:   String,
    pub ngrid:   [usize; 3],
    pub volume:  f64,
    pub lengths: [f64; 3],
    pub min:     f64,
    pub max:     f64,
    pub mean:    f64,
}


impl ChgSummary {
    pub fn from_chg(chg: &ChargeDensity) -> Result<Self> {
        let mut lengths = [0.0; 3];
        for axis in [Axis::A, Axis::B, Axis::C] {
            lengths[axis.index()] = chg.pos.axis_length(axis)?;
        }

        let min = chg.chg.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = chg.chg.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let mean = chg.chg.mean().unwrap_or(0.0);

        Ok(Self {
            label: chg.pos.comment.trim().to_string(),
            ngrid: chg.ngrid,
            volume: chg.volume,
            lengths,
            min,
            max,
            mean,
        })
    }

    fn render(&self) -> String {
        let [na, nb, nc] = self.ngrid;
        let [la, lb, lc] = self.lengths;
        format!("\
    system:        {}
    grid:          {} x {} x {} ({} points)
    axis lengths:  {:.6} {:.6} {:.6} Å
    cell volume:   {:.6} Å^3
    min / max:     {:.6E} / {:.6E}
    mean (sum/N):  {:.6E}",
            self.label,
            na, nb, nc, na * nb * nc,
            la, lb, lc,
            self.volume,
            self.min, self.max,
            self.mean)
    }
}


impl OptProcess for Chginfo {
    fn process(&self) -> Result<()> {
        let mut nfailed = 0;

        for input in self.inputs.iter() {
            match read_chg(input).and_then(|chg| ChgSummary::from_chg(&chg)) {
                Ok(summary) => {
                    println!("{} {:?}", "OK".green().bold(), input);
                    println!("{}", summary.render());
                },
                Err(e) => {
                    nfailed += 1;
                    error!("{:#}", e);
                    println!("{} {:?}: {:#}", "FAILED".red().bold(), input, e);
                },
            }
        }

        if nfailed > 0 {
            bail!("{} of {} files failed.", nfailed, self.inputs.len());
        }
        Ok(())
    }
}
