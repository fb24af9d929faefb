pub mod vasp_parsers;
pub mod commands;
pub mod cli;
pub mod error;
pub mod geometry;
pub mod itx;
pub mod planar;
pub mod types;
pub mod settings;

pub use cli::OptProcess;
pub use types::{
    Result,
    Axis,
};
pub use error::{
    ChgError,
    ChgResult,
};

pub use vasp_parsers::poscar::Poscar;
pub use vasp_parsers::chg::{
    self,
    ChargeDensity,
};

pub use planar::{
    planar_average,
    PlanarProfile,
};

pub use settings::Settings;
