pub mod common;
pub mod chgdiff;
pub mod planar;
pub mod chginfo;
