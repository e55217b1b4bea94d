use std::error::Error;
use std::fmt::Display;
use std::io::{self, Write};

use lib::{config, runner, store};
use termcolor::Color;
use thiserror::Error;

use crate::ui::{self, Ui};

/// An error which is reported to the user as is, it is not a bug.
pub trait Failure: Error + Send + Sync + 'static {
    fn report(&self, ui: &Ui) -> io::Result<()>;
}

/// A task was not accepted, the verdict was already reported.
#[derive(Debug, Error)]
#[error("a task was not accepted")]
pub struct TestFailure;

#[derive(Debug)]
pub struct OperationFailure(pub Box<dyn Failure>);

impl Error for OperationFailure {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.0.source()
    }
}

impl Display for OperationFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl<F: Failure> From<F> for OperationFailure {
    fn from(value: F) -> Self {
        OperationFailure(Box::new(value) as _)
    }
}

/// Turns a store error into an operation failure unless it's unexpected.
pub fn store(err: store::Error) -> anyhow::Error {
    match err {
        store::Error::Io(_) => err.into(),
        err => OperationFailure::from(err).into(),
    }
}

/// Turns a config error into an operation failure unless it's unexpected.
pub fn config(err: config::Error) -> anyhow::Error {
    match err {
        config::Error::Io(_) => err.into(),
        err => OperationFailure::from(err).into(),
    }
}

/// Turns a runner error which isn't a verdict into an operation failure
/// unless it's unexpected.
pub fn runner(err: runner::Error) -> anyhow::Error {
    match err {
        runner::Error::Io(_) => err.into(),
        err => OperationFailure::from(err).into(),
    }
}

fn hint_init(ui: &Ui) -> io::Result<()> {
    ui.hint_with(|w| {
        write!(w, "You can initialize it using ")?;
        ui::write_colored(w, Color::Cyan, |w| write!(w, "dacu init"))?;
        writeln!(w)
    })
}

impl Failure for store::Error {
    fn report(&self, ui: &Ui) -> io::Result<()> {
        match self {
            store::Error::NotInitialized(root) => {
                ui.error_with(|w| writeln!(w, "Project '{}' was not initialized", root.display()))?;
                hint_init(ui)
            }
            store::Error::AlreadyInitialized(root) => ui.error_hinted_with(
                |w| writeln!(w, "Project '{}' was already initialized", root.display()),
                |w| {
                    write!(w, "Pass ")?;
                    ui::write_colored(w, Color::Cyan, |w| write!(w, "--force"))?;
                    writeln!(w, " to clear and reinitialize it")
                },
            ),
            store::Error::DuplicateTask(name) => ui.error_with(|w| {
                write!(w, "Task ")?;
                ui::write_ident(w, name)?;
                writeln!(w, " was already created")
            }),
            store::Error::TargetAlreadyBound { target, task } => ui.error_with(|w| {
                write!(w, "File '{}' is already bound to task ", target.display())?;
                ui::write_ident(w, task)?;
                writeln!(w)
            }),
            store::Error::TaskNotFound(selector) => ui.error_with(|w| {
                write!(w, "Cannot find task ")?;
                ui::write_ident(w, selector)?;
                writeln!(w)
            }),
            store::Error::Json(err) => {
                ui.error_with(|w| writeln!(w, "Couldn't parse {}:\n{err}", store::TASKS_NAME))
            }
            other => ui.error(other),
        }
    }
}

impl Failure for config::Error {
    fn report(&self, ui: &Ui) -> io::Result<()> {
        match self {
            config::Error::Toml(err) => ui.error_with(|w| {
                writeln!(w, "Couldn't parse {}:", config::CONFIG_NAME)?;
                write!(w, "{err}")
            }),
            other => ui.error(other),
        }
    }
}

impl Failure for runner::Error {
    fn report(&self, ui: &Ui) -> io::Result<()> {
        match self {
            runner::Error::UnsupportedLanguage { task, error } => ui.error_hinted_with(
                |w| {
                    write!(w, "Cannot test task ")?;
                    ui::write_ident(w, task)?;
                    writeln!(w, ", {error}")
                },
                |w| {
                    write!(w, "Languages can be added in ")?;
                    ui::write_colored(w, Color::Cyan, |w| {
                        write!(w, "{}/{}", store::STORE_DIR, config::CONFIG_NAME)
                    })?;
                    writeln!(w)
                },
            ),
            runner::Error::TaskNotFound(selector) => ui.error_with(|w| {
                write!(w, "Cannot find task ")?;
                ui::write_ident(w, selector)?;
                writeln!(w)
            }),
            runner::Error::MissingDatasetFile { task, index, path } => ui.error_with(|w| {
                write!(w, "Data set {index} of task ")?;
                ui::write_ident(w, task)?;
                writeln!(w, " is missing '{}'", path.display())
            }),
            other => ui.error(other),
        }
    }
}
