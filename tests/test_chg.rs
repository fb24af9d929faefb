use std::{
    ffi::OsStr,
    fs,
    io::Write,
    path::PathBuf,
};

use approx::assert_relative_eq;
use clap::Parser;
use flate2::{
    write::GzEncoder,
    Compression,
};
use tempdir::TempDir;

use rschg::{
    Result,
    Axis,
    ChargeDensity,
    ChgError,
    OptProcess,
    chg,
    planar_average,
    itx::{
        self,
        ItxPreset,
    },
    commands::{
        chgdiff::Chgdiff,
        planar::Planar,
    },
};


macro_rules! get_fpath_in_current_dir {
    ($fname:expr) => {{
        let mut path = PathBuf::from(file!());
        path.pop();
        path.push($fname);
        path
    }}
}


#[derive(Parser)]
struct ChgdiffCmd {
    #[command(flatten)]
    cmd: Chgdiff,
}


#[derive(Parser)]
struct PlanarCmd {
    #[command(flatten)]
    cmd: Planar,
}


#[test]
fn test_read_chgcar() -> Result<()> {
    let chg = ChargeDensity::from_file(&get_fpath_in_current_dir!("CHGCAR.Li"))?;

    assert_eq!(chg.ngrid, [2, 3, 4]);
    assert_eq!(chg.chg.shape(), &[4, 3, 2]);
    assert_eq!(chg.pos.ion_types, vec!["Li"]);
    assert_relative_eq!(chg.volume, 20.148362761266316, epsilon = 1E-9);
    assert_eq!(chg.chg[[0, 0, 0]], 0.44062142953E+00);
    assert_eq!(chg.chg[[3, 2, 1]], 0.10568153616E+01);
    Ok(())
}


#[test]
fn test_read_gzipped() -> Result<()> {
    let dir = TempDir::new("rschg_gz")?;
    let path = dir.path().join("CHGCAR.gz");

    let raw = fs::read(get_fpath_in_current_dir!("CHGCAR.Li"))?;
    let mut enc = GzEncoder::new(fs::File::create(&path)?, Compression::default());
    enc.write_all(&raw)?;
    enc.finish()?;

    let gz = ChargeDensity::from_file(&path)?;
    let plain = ChargeDensity::from_file(&get_fpath_in_current_dir!("CHGCAR.Li"))?;
    assert_eq!(gz.chg, plain.chg);
    assert_eq!(gz.pos, plain.pos);
    Ok(())
}


#[test]
fn test_write_and_reread() -> Result<()> {
    let dir = TempDir::new("rschg_roundtrip")?;
    let path = dir.path().join("DCD.vasp");

    let chg = ChargeDensity::from_file(&get_fpath_in_current_dir!("CHGCAR.Li"))?;
    chg.to_file(&path)?;

    let back = ChargeDensity::from_file(&path)?;
    assert_eq!(back.ngrid, chg.ngrid);
    assert_eq!(back.pos.ion_types, chg.pos.ion_types);
    assert_eq!(back.pos.ions_per_type, chg.pos.ions_per_type);
    assert_relative_eq!(back.volume, chg.volume, epsilon = 1E-6);
    back.chg.iter()
        .zip(chg.chg.iter())
        .for_each(|(x, y)| assert_relative_eq!(x, y, max_relative = 1E-10));
    Ok(())
}


#[test]
fn test_difference_of_files() -> Result<()> {
    let fname = get_fpath_in_current_dir!("CHGCAR.Li");
    let fields = vec![
        ChargeDensity::from_file(&fname)?,
        ChargeDensity::from_file(&fname)?,
        ChargeDensity::from_file(&fname)?,
    ];
    let first = fields[0].chg.clone();

    let diff = chg::fold_difference(fields)?;
    diff.chg.iter()
        .zip(first.iter())
        .for_each(|(d, f)| assert_relative_eq!(*d, -f, epsilon = 1E-12));

    let other = ChargeDensity::from_file(&get_fpath_in_current_dir!("CHGCAR.Li_2x2x2"))?;
    let err = diff.difference(&other).unwrap_err();
    assert!(matches!(err, ChgError::ShapeMismatch { lhs: [2, 3, 4], rhs: [2, 2, 2] }));
    Ok(())
}


#[test]
fn test_chgdiff_command() -> Result<()> {
    let dir = TempDir::new("rschg_chgdiff")?;
    let fname = get_fpath_in_current_dir!("CHGCAR.Li");
    let output = dir.path().join("DCD.vasp");

    let opt = ChgdiffCmd::try_parse_from([
        OsStr::new("chgdiff"), fname.as_os_str(), fname.as_os_str(), OsStr::new("-o"), output.as_os_str(),
    ])?;
    opt.cmd.process()?;

    let dcd = ChargeDensity::from_file(&output)?;
    assert!(dcd.chg.iter().all(|v| *v == 0.0));

    // grids differ, nothing is written
    let bad_output = dir.path().join("bad.vasp");
    let mismatch = get_fpath_in_current_dir!("CHGCAR.Li_2x2x2");
    let opt = ChgdiffCmd::try_parse_from([
        OsStr::new("chgdiff"), fname.as_os_str(), mismatch.as_os_str(), OsStr::new("-o"), bad_output.as_os_str(),
    ])?;
    assert!(opt.cmd.process().is_err());
    assert!(!bad_output.exists());
    Ok(())
}


#[test]
fn test_planar_to_itx() -> Result<()> {
    let dir = TempDir::new("rschg_planar")?;
    let path = dir.path().join("planar.itx");

    let chg = ChargeDensity::from_file(&get_fpath_in_current_dir!("CHGCAR.Li"))?;
    let profile = planar_average(&chg, Axis::C, true)?;
    assert_eq!(profile.len(), 4);
    assert_eq!(profile.distances[0], 0.0);

    itx::save_profile(&path, &profile, "Li", &ItxPreset::default())?;
    let txt = fs::read_to_string(&path)?;
    let lines = txt.lines().collect::<Vec<_>>();

    assert_eq!(lines[0], "IGOR");
    assert_eq!(lines[1], "WAVES/D x_planar_Li planar_Li");
    assert_eq!(lines[2], "BEGIN");
    assert_eq!(lines[7], "END");
    assert_eq!(lines[8], "X Display planar_Li vs x_planar_Li as \"planar_avg_Li\" ");

    for (line, (d, v)) in lines[3 .. 7].iter().zip(profile.distances.iter().zip(profile.values.iter())) {
        let cols = line.split_whitespace()
            .map(|s| s.parse::<f64>())
            .collect::<std::result::Result<Vec<_>, _>>()?;
        assert_eq!(cols.len(), 2);
        assert_relative_eq!(cols[0], *d, epsilon = 1E-9);
        assert_relative_eq!(cols[1], *v, epsilon = 1E-9);
    }
    Ok(())
}


#[test]
fn test_planar_each_isolated() -> Result<()> {
    let dir = TempDir::new("rschg_each")?;

    let good = dir.path().join("CHGCAR_good");
    fs::copy(get_fpath_in_current_dir!("CHGCAR.Li"), &good)?;
    let broken = dir.path().join("CHGCAR_broken");
    fs::write(&broken, "not a charge density\n")?;

    let opt = PlanarCmd::try_parse_from([
        OsStr::new("planar"), broken.as_os_str(), good.as_os_str(), OsStr::new("--each"), OsStr::new("-d"), OsStr::new("a"),
    ])?;
    assert!(opt.cmd.process().is_err());

    let itx = fs::read_to_string(dir.path().join("CHGCAR_good_planar.itx"))?;
    assert!(itx.starts_with("IGOR\nWAVES/D x_planar_CHGCAR_good planar_CHGCAR_good\nBEGIN\n"));
    assert_eq!(itx.lines().filter(|l| l.split_whitespace().count() == 2 && !l.starts_with('X')).count(), 2);
    assert!(!dir.path().join("CHGCAR_broken_planar.itx").exists());
    Ok(())
}


#[test]
fn test_planar_each_oversized_header() -> Result<()> {
    let dir = TempDir::new("rschg_each_oversized")?;

    let head = fs::read_to_string(get_fpath_in_current_dir!("CHGCAR.Li"))?
        .lines()
        .take(10)
        .collect::<Vec<_>>()
        .join("\n");
    let oversized = dir.path().join("CHGCAR_oversized");
    fs::write(&oversized, format!("{}\n 1000000 1000000 1000000\n 0.1E+01\n", head))?;

    let err = ChargeDensity::from_file(&oversized).unwrap_err();
    assert!(matches!(err, ChgError::Format { .. }));

    let good = dir.path().join("CHGCAR_good");
    fs::copy(get_fpath_in_current_dir!("CHGCAR.Li"), &good)?;

    let opt = PlanarCmd::try_parse_from([
        OsStr::new("planar"), oversized.as_os_str(), good.as_os_str(), OsStr::new("--each"),
    ])?;
    assert!(opt.cmd.process().is_err());

    assert!(dir.path().join("CHGCAR_good_planar.itx").is_file());
    assert!(!dir.path().join("CHGCAR_oversized_planar.itx").exists());
    Ok(())
}


#[test]
fn test_planar_failed_txtout_keeps_itx_untouched() -> Result<()> {
    let dir = TempDir::new("rschg_planar_txtout")?;
    let fname = get_fpath_in_current_dir!("CHGCAR.Li");
    let itxout = dir.path().join("planar.itx");
    let txtout = dir.path().join("nonexist").join("planar.txt");

    let opt = PlanarCmd::try_parse_from([
        OsStr::new("planar"), fname.as_os_str(),
        OsStr::new("-O"), itxout.as_os_str(),
        OsStr::new("--txtout"), txtout.as_os_str(),
    ])?;
    assert!(opt.cmd.process().is_err());
    assert!(!itxout.exists());

    let txtout = dir.path().join("planar.txt");
    let opt = PlanarCmd::try_parse_from([
        OsStr::new("planar"), fname.as_os_str(),
        OsStr::new("-O"), itxout.as_os_str(),
        OsStr::new("--txtout"), txtout.as_os_str(),
    ])?;
    opt.cmd.process()?;
    assert!(itxout.is_file());
    assert!(fs::read_to_string(&txtout)?.starts_with("# Distance(A)"));
    Ok(())
}
