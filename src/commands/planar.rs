use std::path::{
    Path,
    PathBuf,
};

use anyhow::{
    bail,
    Context,
};
use clap::Args;
use colored::Colorize;
use log::{
    info,
    warn,
    error,
};

use crate::{
    types::{
        Result,
        Axis,
    },
    OptProcess,
    Settings,
    itx::{
        self,
        ItxPreset,
    },
    planar::{
        planar_average,
        PlanarProfile,
    },
    commands::common::{
        announce_write,
        read_chg,
        read_and_subtract,
        write_array_to_txt,
        write_profile_html,
    },
};


#[derive(Debug, Args)]
/// Planar averaged charge density (or potential) along one lattice axis, saved as Igor
/// text file (.itx).
///
/// With multiple inputs the difference `f1 - f2 - f3 ...` is averaged. The averaged values
/// are divided by the cell volume unless `--no-volume-avg` is given, which turns CHGCAR
/// data into e/Å^3.
pub struct Planar {
    #[arg(default_value = "./CHGCAR")]
    /// Volumetric data files: CHGCAR, CHG, PARCHG or LOCPOT. `.gz` files are accepted.
    inputs: Vec<PathBuf>,

    #[arg(short = 'd', long, value_enum, ignore_case = true)]
    /// Averaging direction, the plane spanned by the other two axes is averaged.
    ///
    /// 'a', 'x' and '1' all mean the first grid axis, similarly for the others. These are
    /// lattice axes, not Cartesian ones. Default is 'c', or the one in the config file.
    axis: Option<Axis>,

    #[arg(short = 'O', long, default_value = "./planar.itx")]
    /// Igor text file to write.
    itxout: PathBuf,

    #[arg(short = 'P', long)]
    /// Label used in wave names: planar_<LABEL>, x_planar_<LABEL>.
    label: Option<String>,

    #[arg(short = 'v', long)]
    /// Don't divide the averaged data by the cell volume.
    no_volume_avg: bool,

    #[arg(long)]
    /// Also write the raw profile as plain text for replotting with other tools.
    txtout: Option<PathBuf>,

    #[arg(long)]
    /// Also plot the profile to html.
    htmlout: Option<PathBuf>,

    #[arg(long)]
    /// Process every input on its own instead of taking their difference.
    ///
    /// Each input writes `<name>_planar.itx` next to itself, failures don't stop the others.
    each: bool,
}


struct ProfileJob<'a> {
    axis:       Axis,
    volume_avg: bool,
    preset:     &'a ItxPreset,
}


impl ProfileJob<'_> {
    fn ylabel(&self) -> &'static str {
        if self.volume_avg {
            "Planar averaged ρ (e/Å³)"
        } else {
            "Planar averaged value"
        }
    }

    fn write_itx(&self, profile: &PlanarProfile, path: &Path, label: &str) -> Result<()> {
        announce_write(path);
        itx::save_profile(path, profile, label, self.preset)
            .with_context(|| format!("Write file {:?} failed.", path))
    }
}


impl Planar {
    fn each_output(input: &Path) -> (PathBuf, String) {
        let stem = input.file_name()
            .map(|s| s.to_string_lossy().trim_end_matches(".gz").to_string())
            .unwrap_or_else(|| "planar".to_string());
        (input.with_file_name(format!("{}_planar.itx", stem)), stem)
    }

    fn process_single(&self, job: &ProfileJob) -> Result<()> {
        let chg = read_and_subtract(&self.inputs)?;

        info!("Averaging along {} axis, volume normalization: {}", job.axis, job.volume_avg);
        let profile = planar_average(&chg, job.axis, job.volume_avg)
            .context("Planar average failed.")?;

        // each output is atomic on its own, the itx is written only after the others succeeded
        if let Some(txtout) = self.txtout.as_ref() {
            info!("Writing raw plot data to {:?}", txtout);
            let header = format!("Distance(A)  {}", job.ylabel());
            write_array_to_txt(txtout, vec![&profile.distances, &profile.values], &header)?;
        }

        if let Some(htmlout) = self.htmlout.as_ref() {
            info!("Writing to {:?}", htmlout);
            let title = format!("Planar average along {} axis", job.axis);
            write_profile_html(htmlout, &profile, &title, job.ylabel())?;
        }

        let label = self.label.clone().unwrap_or_default();
        job.write_itx(&profile, &self.itxout, &label)
    }

    fn process_each(&self, job: &ProfileJob) -> Result<()> {
        if self.txtout.is_some() || self.htmlout.is_some() {
            warn!("`--txtout` and `--htmlout` are ignored with `--each`.");
        }

        let results = self.inputs.iter()
            .map(|input| {
                let (output, stem) = Self::each_output(input);
                let label = self.label.clone().unwrap_or(stem);
                let ret = read_chg(input)
                    .and_then(|chg| planar_average(&chg, job.axis, job.volume_avg)
                              .with_context(|| format!("Planar average of {:?} failed.", input)))
                    .and_then(|profile| job.write_itx(&profile, &output, &label));
                (input, output, ret)
            })
            .collect::<Vec<_>>();

        let mut nfailed = 0;
        for (input, output, ret) in results.iter() {
            match ret {
                Ok(_) => {
                    println!("  {}  {:?} -> {:?}", "OK".green().bold(), input, output);
                },
                Err(e) => {
                    nfailed += 1;
                    error!("{:#}", e);
                    println!("  {}  {:?}: {:#}", "FAILED".red().bold(), input, e);
                },
            }
        }

        if nfailed > 0 {
            bail!("{} of {} files failed.", nfailed, results.len());
        }
        Ok(())
    }
}


impl OptProcess for Planar {
    fn process(&self) -> Result<()> {
        let settings = Settings::from_default()?;

        let job = ProfileJob {
            axis:       self.axis.unwrap_or(settings.planar.axis),
            volume_avg: settings.planar.volume_avg && !self.no_volume_avg,
            preset:     &settings.planar.itx,
        };

        if self.each {
            self.process_each(&job)
        } else {
            self.process_single(&job)
        }
    }
}
