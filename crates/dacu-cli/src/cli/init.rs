use std::io::Write;

use lib::store::Store;

use super::Context;
use crate::{error, ui};

#[derive(clap::Args, Debug, Clone)]
#[group(id = "init-args")]
pub struct Args {
    /// Clear and reinitialize the store if it already exists
    #[arg(long, short)]
    pub force: bool,
}

pub fn run(ctx: &mut Context, args: &Args) -> anyhow::Result<()> {
    let root = ctx.root()?;
    let store = Store::init(&root, args.force).map_err(error::store)?;

    let mut w = ctx.ui.stderr();
    write!(w, "Initialized ")?;
    ui::write_ident(&mut w, store.dir().display())?;
    writeln!(w)?;

    Ok(())
}
