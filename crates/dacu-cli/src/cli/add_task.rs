use std::io::Write;
use std::path::PathBuf;

use lib::task::Task;

use super::Context;
use crate::{error, ui};

#[derive(clap::Args, Debug, Clone)]
#[group(id = "add-task-args")]
pub struct Args {
    /// The source file solving the task, relative to the project root
    pub file: PathBuf,

    /// The name of the task, derived from the file name if not given
    pub name: Option<String>,
}

pub fn run(ctx: &mut Context, args: &Args) -> anyhow::Result<()> {
    let mut store = ctx.store()?;
    let config = ctx.config(&store)?;

    let name = match &args.name {
        Some(name) => name.clone(),
        None => {
            let name = Task::derive_name(&args.file);

            let mut w = ctx.ui.stderr();
            write!(w, "Auto-generated task name ")?;
            ui::write_ident(&mut w, &name)?;
            writeln!(w, " for file '{}'", args.file.display())?;

            name
        }
    };

    if let Err(err) = ctx.registry(&config).lookup_path(&args.file) {
        tracing::warn!(?err, "adding task without language adapter");
        ctx.ui
            .warning(format_args!("{err}, the task can't be tested until one is configured"))?;
    }

    let task = store
        .add_task(name, args.file.clone())
        .map_err(error::store)?;

    let mut w = ctx.ui.stderr();
    write!(w, "Added task ")?;
    ui::write_ident(&mut w, &task.name)?;
    writeln!(w)?;

    Ok(())
}
