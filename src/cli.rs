use std::sync::OnceLock;
use clap::{
    Parser,
    builder::styling::{
        AnsiColor,
        Effects,
        Styles,
    },
};
use enum_dispatch::enum_dispatch;

use crate::{
    types::Result,
    commands::{
        chgdiff::Chgdiff,
        planar::Planar,
        chginfo::Chginfo,
    },
};


pub fn get_style() -> Styles {
    static INSTANCE: OnceLock<Styles> = OnceLock::new();
    INSTANCE.get_or_init(|| {
        Styles::styled()
            .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
            .usage(AnsiColor::Green.on_default()   | Effects::BOLD)
            .literal(AnsiColor::Green.on_default() | Effects::BOLD)
            .placeholder(AnsiColor::BrightBlue.on_default())
            .error(AnsiColor::BrightRed.on_default())
            .valid(AnsiColor::BrightYellow.on_default())
    }).to_owned()
}


#[enum_dispatch]
pub trait OptProcess {
    fn process(&self) -> Result<()>;
}


#[enum_dispatch(OptProcess)]
#[derive(Debug, Parser)]
#[command(name = "rschg",
            about = r"Charge density differences and planar averages of VASP volumetric data.
Results are written in CHGCAR layout or as Igor text files (.itx).",
            version,
            styles = get_style()
            )]
enum Opt {
    Chgdiff,

    Planar,

    Chginfo,
}


pub fn run() -> Result<()> {
    Opt::parse().process()
}


#[cfg(test)]
mod test {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli() {
        Opt::command().debug_assert();

        let opt = Opt::try_parse_from(["rschg", "planar", "A", "B", "-d", "Z", "-P", "Li", "-v"]).unwrap();
        assert!(matches!(opt, Opt::Planar(_)));

        assert!(Opt::try_parse_from(["rschg", "planar", "-d", "w"]).is_err());
        assert!(Opt::try_parse_from(["rschg", "chgdiff", "A", "B", "-o", "out.vasp"]).is_ok());
    }
}
