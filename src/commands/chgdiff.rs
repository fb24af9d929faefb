use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use log::info;

use crate::{
    types::Result,
    OptProcess,
    commands::common::{
        announce_write,
        read_and_subtract,
    },
};


#[derive(Debug, Args)]
/// Calculate charge density difference and save it in CHGCAR layout.
///
/// The difference is taken from left to right: `f1 - f2 - f3 ...`, the structure of the
/// first file is kept. All the inputs must share the same grid.
///
/// Example: rschg chgdiff CHGCAR_AB CHGCAR_A CHGCAR_B -o CHGCAR_diff.vasp
pub struct Chgdiff {
    #[arg(default_value = "./CHGCAR")]
    /// Volumetric data files: CHGCAR, CHG, PARCHG or LOCPOT. `.gz` files are accepted.
    inputs: Vec<PathBuf>,

    #[arg(short = 'o', long, default_value = "./DCD.vasp")]
    /// Output file name.
    output: PathBuf,
}


impl OptProcess for Chgdiff {
    fn process(&self) -> Result<()> {
        let chg = read_and_subtract(&self.inputs)?;
        info!("Grid of the result: {:?}, cell volume: {:.6} Å^3", chg.ngrid, chg.volume);

        announce_write(&self.output);
        chg.to_file(&self.output)
            .with_context(|| format!("Write file {:?} failed.", self.output))?;

        Ok(())
    }
}
