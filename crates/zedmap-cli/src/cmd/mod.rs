use anyhow::Result;

use crate::args::{Cli, Command};

mod genmap;

pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Genmap(args) => genmap::run(&args),
    }
}
