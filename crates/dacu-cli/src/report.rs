//! Reporting of test progress and verdicts.

use std::io::{self, Write};
use std::time::Duration;

use lib::runner::{self, BatchSummary, Event};
use lib::stdx::fmt::Term;
use lib::task::Task;
use termcolor::{Color, WriteColor};

use crate::ui::{self, Ui};

/// The padding to use for the summary annotation.
const SUMMARY_PADDING: usize = 8;

/// Reports runner progress to stderr.
pub struct Reporter<'ui> {
    ui: &'ui Ui,
}

impl<'ui> Reporter<'ui> {
    pub fn new(ui: &'ui Ui) -> Self {
        Self { ui }
    }
}

impl runner::Reporter for Reporter<'_> {
    fn report(&mut self, task: &Task, event: Event) -> io::Result<()> {
        write_event(&mut self.ui.stderr(), task, event)
    }
}

/// Writes a single progress event, compilation and completion are silent.
pub fn write_event<W: WriteColor + ?Sized>(w: &mut W, task: &Task, event: Event) -> io::Result<()> {
    match event {
        Event::Started => {
            write!(w, "Running task ")?;
            ui::write_ident(w, &task.name)?;
            writeln!(
                w,
                " to {}, {} {} found.",
                task.target.display(),
                task.count,
                Term::simple("data set").with(task.count),
            )
        }
        Event::Accepted(index) => {
            ui::write_bold_colored(w, Color::Green, |w| write!(w, "Accepted"))?;
            writeln!(w, " test {index}.")
        }
        Event::Compiled | Event::Finished => Ok(()),
    }
}

/// Writes why a task was not accepted, other errors are written as
/// failures.
pub fn write_verdict<W: WriteColor + ?Sized>(w: &mut W, err: &runner::Error) -> io::Result<()> {
    let header = |w: &mut W, text: &str| ui::write_bold_colored(w, Color::Red, |w| write!(w, "{text}"));

    match err {
        runner::Error::CompilationError { exit, .. } => {
            header(w, "Compilation error")?;
            writeln!(w, " with {exit}.")
        }
        runner::Error::RuntimeError { index, exit, .. } => {
            header(w, "Running failed")?;
            writeln!(w, " on test {index} with {exit}.")
        }
        runner::Error::WrongAnswer { index, .. } => {
            header(w, "Wrong answer")?;
            writeln!(w, " on test {index}.")
        }
        other => writeln!(w, "{other}"),
    }
}

/// Writes the summary of a fully accepted batch.
pub fn write_summary<W: WriteColor + ?Sized>(w: &mut W, summary: &BatchSummary) -> io::Result<()> {
    ui::write_annotated(w, "Summary", Color::Green, SUMMARY_PADDING, |w| {
        write!(w, "[")?;
        write_duration(w, summary.duration)?;
        write!(w, "] ")?;

        let tasks = summary.tasks.len();
        let datasets = summary.accepted();

        ui::write_bold(w, |w| write!(w, "{tasks}"))?;
        write!(w, " {}, ", Term::simple("task").with(tasks))?;
        ui::write_bold(w, |w| write!(w, "{datasets}"))?;
        write!(w, " {} ", Term::simple("data set").with(datasets))?;
        ui::write_colored(w, Color::Green, |w| write!(w, "accepted"))?;
        writeln!(w)
    })
}

/// Writes a padded duration in human readable form.
fn write_duration<W: Write + ?Sized>(w: &mut W, duration: Duration) -> io::Result<()> {
    let s = duration.as_secs();
    let ms = duration.subsec_millis();
    let us = duration.subsec_micros().saturating_sub(ms * 1000);

    write!(w, "{s: >2}s {ms: >3}ms {us: >3}µs")
}
