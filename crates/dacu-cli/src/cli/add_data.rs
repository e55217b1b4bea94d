use std::io::Write;
use std::path::PathBuf;

use super::Context;
use crate::{error, ui};

#[derive(clap::Args, Debug, Clone)]
#[group(id = "add-data-args")]
pub struct Args {
    /// The task to add the data set to, by name or target file
    pub task: String,

    /// The file holding the input
    pub input: PathBuf,

    /// The file holding the expected output
    pub output: PathBuf,
}

pub fn run(ctx: &mut Context, args: &Args) -> anyhow::Result<()> {
    let mut store = ctx.store()?;
    let (task, dataset) = store
        .add_data(&args.task, &args.input, &args.output)
        .map_err(error::store)?;

    let mut w = ctx.ui.stderr();
    write!(w, "Successfully created ")?;
    ui::write_ident(&mut w, format_args!("{}/{}", task.name, dataset.index))?;
    writeln!(w, ".(in|out)")?;

    Ok(())
}
