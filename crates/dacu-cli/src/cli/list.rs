use std::io::Write;

use lib::stdx::fmt::Term;
use lib::store::TaskStore;

use super::Context;
use crate::ui;

#[derive(clap::Args, Debug, Clone)]
#[group(id = "list-args")]
pub struct Args {
    /// Print the tasks as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(ctx: &mut Context, args: &Args) -> anyhow::Result<()> {
    let store = ctx.store()?;
    let mut w = ctx.ui.stdout();

    if args.json {
        serde_json::to_writer_pretty(&mut w, store.tasks())?;
        writeln!(w)?;
        return Ok(());
    }

    for task in store.tasks() {
        ui::write_ident(&mut w, &task.name)?;
        writeln!(
            w,
            " {} ({} {})",
            task.target.display(),
            task.count,
            Term::simple("data set").with(task.count),
        )?;
    }

    Ok(())
}
