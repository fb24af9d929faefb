use std::{
    io::Write,
    path::{
        Path,
        PathBuf,
    },
};

use anyhow::{
    bail,
    Context,
};
use log::{
    info,
    warn,
};
use ndarray::Array1;

use crate::{
    types::Result,
    planar::PlanarProfile,
    vasp_parsers::{
        write_atomic,
        chg::{
            self,
            ChargeDensity,
        },
    },
};


pub fn announce_write(path: &Path) {
    if path.is_file() {
        warn!("File {:?} exists, overwriting ...", path);
    } else {
        info!("Writing {:?} ...", path);
    }
}


pub fn write_array_to_txt(file_name: &(impl AsRef<Path> + ?Sized), ys: Vec<&Array1<f64>>, comment: &str) -> Result<()> {
    let ncol = ys.len();

    let x = ys.first().context("At lease two data sets are needed")?;
    let nrow = x.len();

    if nrow == 0 || !ys.iter().all(|y| y.len() == nrow) {
        bail!("[WRT_ARRAY]: input data with zero length or they don't have consistent lengths");
    }

    write_atomic(file_name, |f| {
        writeln!(f, "# {}", comment.trim())?;

        for irow in 0 .. nrow {
            let mut s = String::with_capacity(17 * ncol + 1);
            for y in ys.iter() {
                s.push_str(&format!("  {:15.6}", y[irow]));
            }
            s.push('\n');

            f.write_all(s.as_bytes())?;
        }
        Ok(())
    })?;

    Ok(())
}


/// Standalone html page with the profile plotted by plotly.js.
pub fn write_profile_html(path: &Path, profile: &PlanarProfile, title: &str, ylabel: &str) -> Result<()> {
    let trace = plotly::Scatter::new(profile.distances.to_vec(), profile.values.to_vec())
        .mode(plotly::common::Mode::Lines);

    let mut plot = plotly::Plot::new();
    plot.add_trace(trace);

    let layout = plotly::Layout::new()
        .title(plotly::common::Title::with_text(title))
        .y_axis(plotly::layout::Axis::new()
                .title(plotly::common::Title::with_text(ylabel))
                .zero_line(true))
        .x_axis(plotly::layout::Axis::new()
                .title(plotly::common::Title::with_text("Distance (Å)"))
                .zero_line(true));
    plot.set_layout(layout);

    let body = plot.to_inline_html(None);
    write_atomic(path, |f| {
        writeln!(f, "<!DOCTYPE html>")?;
        writeln!(f, "<html>\n<head>\n<meta charset=\"utf-8\" />")?;
        writeln!(f, "<script src=\"https://cdn.plot.ly/plotly-2.12.1.min.js\"></script>")?;
        writeln!(f, "</head>\n<body>\n{}\n</body>\n</html>", body)
    }).with_context(|| format!("Write html to {:?} failed.", path))
}


pub fn read_chg(path: &Path) -> Result<ChargeDensity> {
    info!("Reading charge density from {:?}", path);
    ChargeDensity::from_file(path)
        .with_context(|| format!("Parse file {:?} failed.", path))
}


/// Read all the inputs and fold them into `f1 - f2 - f3 ...`.
pub fn read_and_subtract(paths: &[PathBuf]) -> Result<ChargeDensity> {
    let fields = paths.iter()
        .map(|p| read_chg(p))
        .collect::<Result<Vec<_>>>()?;

    if fields.len() > 1 {
        info!("Calculating difference: {}",
              paths.iter()
                  .map(|p| format!("{:?}", p))
                  .collect::<Vec<_>>()
                  .join(" - "));
    }

    chg::fold_difference(fields)
        .context("Charge density difference failed.")
}
