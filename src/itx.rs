//! Igor Pro text (`.itx`) export of planar averaged profiles.
//!
//! Igor parses the keywords literally, keep the layout byte for byte.

use std::{
    io::{
        self,
        Write,
    },
    path::Path,
};

use serde::{
    Serialize,
    Deserialize,
};

use crate::{
    planar::PlanarProfile,
    vasp_parsers::write_atomic,
};


const GRAPH_PRESET: &str = r#"X DefaultFont/U "Times New Roman"
X ModifyGraph marker=19
X ModifyGraph lSize=1.5
X ModifyGraph tick=2
X ModifyGraph mirror=1
X ModifyGraph fSize=28
X ModifyGraph lblMargin(left)=15,lblMargin(bottom)=10
X ModifyGraph standoff=0
X ModifyGraph axThick=1.5
X ModifyGraph axisOnTop=1
X Label left "Planar averaged ρ (\f02e\f00/Å\S3\M)"
X Label bottom "Distance (Å)"
"#;


/// Graph size and optional axis ranges, everything else in the preset is fixed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItxPreset {
    pub width:  f64,
    pub height: f64,
    pub left:   Option<(f64, f64)>,
    pub bottom: Option<(f64, f64)>,
}


impl Default for ItxPreset {
    fn default() -> Self {
        Self {
            width:  340.157,
            height: 340.157,
            left:   None,
            bottom: None,
        }
    }
}


pub fn write_profile(w: &mut impl Write, profile: &PlanarProfile, label: &str, preset: &ItxPreset) -> io::Result<()> {
    writeln!(w, "IGOR")?;
    writeln!(w, "WAVES/D x_planar_{0} planar_{0}", label)?;
    writeln!(w, "BEGIN")?;
    for (d, v) in profile.distances.iter().zip(profile.values.iter()) {
        writeln!(w, "{:12.10}  {:12.10} ", d, v)?;
    }
    writeln!(w, "END")?;
    writeln!(w, "X Display planar_{0} vs x_planar_{0} as \"planar_avg_{0}\" ", label)?;

    w.write_all(GRAPH_PRESET.as_bytes())?;
    writeln!(w, "X ModifyGraph width={:.6},height={:.6}", preset.width, preset.height)?;
    if let Some((min, max)) = preset.left {
        writeln!(w, "X Setaxis left {:4.6}, {:4.6}", min, max)?;
    }
    if let Some((min, max)) = preset.bottom {
        writeln!(w, "X Setaxis bottom {:4.6}, {:4.6}", min, max)?;
    }
    Ok(())
}


/// Write the profile to `path`, the file is either complete or left untouched.
pub fn save_profile(path: &(impl AsRef<Path> + ?Sized), profile: &PlanarProfile, label: &str, preset: &ItxPreset) -> io::Result<()> {
    write_atomic(path, |w| write_profile(w, profile, label, preset))
}
