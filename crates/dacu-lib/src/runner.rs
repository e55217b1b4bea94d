//! Compiling, running and judging tasks against their datasets.
//!
//! A [`Runner`] stops at the first failure, be it a failed compilation, a
//! failed run or a wrong answer. Every failure is returned as an [`Error`],
//! successful progress is sent to a [`Reporter`].

use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use tempdir::TempDir;
use thiserror::Error;

use crate::compare;
use crate::exec::{Executor, Exit};
use crate::language::{self, Registry};
use crate::store::TaskStore;
use crate::task::Task;
use crate::TOOL_NAME;

/// The name of the captured output file in a dataset's scratch directory.
const OUTPUT_NAME: &str = "out";

/// An error which stops a run.
#[derive(Debug, Error)]
pub enum Error {
    /// No adapter is registered for the task's target.
    #[error("task {task:?} has no supported language")]
    UnsupportedLanguage {
        /// The task's name.
        task: String,

        /// The failed lookup.
        #[source]
        error: language::Error,
    },

    /// The task's source failed to compile.
    #[error("compilation error with {exit}")]
    CompilationError {
        /// The task's name.
        task: String,

        /// How the compiler exited.
        exit: Exit,
    },

    /// The solution failed on a dataset.
    #[error("running failed on test {index} with {exit}")]
    RuntimeError {
        /// The task's name.
        task: String,

        /// The index of the dataset.
        index: usize,

        /// How the solution exited.
        exit: Exit,
    },

    /// The solution's output was not accepted for a dataset.
    #[error("wrong answer on test {index}")]
    WrongAnswer {
        /// The task's name.
        task: String,

        /// The index of the dataset.
        index: usize,
    },

    /// A selector matched no task.
    #[error("cannot find task {0:?}")]
    TaskNotFound(String),

    /// A dataset file of a task doesn't exist.
    #[error("test {index} of task {task:?} is missing {path:?}")]
    MissingDatasetFile {
        /// The task's name.
        task: String,

        /// The index of the dataset.
        index: usize,

        /// The missing file.
        path: PathBuf,
    },

    /// An io error occurred.
    #[error("an io error occurred")]
    Io(#[from] io::Error),
}

impl Error {
    /// Returns whether this error is a verdict on the solution rather than a
    /// failure of the run itself.
    pub fn is_verdict(&self) -> bool {
        matches!(
            self,
            Self::CompilationError { .. } | Self::RuntimeError { .. } | Self::WrongAnswer { .. }
        )
    }

    /// The name of the task this error occurred in, if it belongs to one.
    pub fn task(&self) -> Option<&str> {
        match self {
            Self::UnsupportedLanguage { task, .. }
            | Self::CompilationError { task, .. }
            | Self::RuntimeError { task, .. }
            | Self::WrongAnswer { task, .. }
            | Self::MissingDatasetFile { task, .. } => Some(task),
            Self::TaskNotFound(_) | Self::Io(_) => None,
        }
    }
}

/// Progress of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// The task is about to be compiled.
    Started,

    /// The task compiled successfully.
    Compiled,

    /// The dataset at this index was accepted.
    Accepted(usize),

    /// All datasets of the task were accepted.
    Finished,
}

/// Receives the progress of a run.
pub trait Reporter {
    /// Reports an event of the given task.
    fn report(&mut self, task: &Task, event: Event) -> io::Result<()>;
}

impl Reporter for () {
    fn report(&mut self, _task: &Task, _event: Event) -> io::Result<()> {
        Ok(())
    }
}

/// The result of a fully accepted task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSummary {
    /// The task's name.
    pub name: String,

    /// The number of accepted datasets.
    pub accepted: usize,
}

/// The result of a fully accepted batch of tasks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// The accepted tasks in the order they ran.
    pub tasks: Vec<TaskSummary>,

    /// The time the whole batch took.
    pub duration: Duration,
}

impl BatchSummary {
    /// The total number of accepted datasets.
    pub fn accepted(&self) -> usize {
        self.tasks.iter().map(|task| task.accepted).sum()
    }
}

/// Runs tasks using the adapters of a registry.
pub struct Runner<'a> {
    registry: &'a Registry,
    executor: &'a mut dyn Executor,
    reporter: &'a mut dyn Reporter,
    strict: bool,
    timeout: Option<Duration>,
}

impl<'a> Runner<'a> {
    /// Creates a new lenient runner without a time limit.
    pub fn new(
        registry: &'a Registry,
        executor: &'a mut dyn Executor,
        reporter: &'a mut dyn Reporter,
    ) -> Self {
        Self {
            registry,
            executor,
            reporter,
            strict: false,
            timeout: None,
        }
    }

    /// Sets whether outputs must match byte for byte.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Sets the time limit of a single dataset run.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Compiles the task once and runs it against all of its datasets in
    /// ascending order, returning at the first failure.
    #[tracing::instrument(skip_all, fields(task = %task.name))]
    pub fn run(&mut self, task: &Task, store: &dyn TaskStore) -> Result<TaskSummary, Error> {
        let registry = self.registry;
        let adapter = registry
            .lookup_path(&task.target)
            .map_err(|error| Error::UnsupportedLanguage {
                task: task.name.clone(),
                error,
            })?;

        let target = store.target(task);
        self.reporter.report(task, Event::Started)?;

        let exit = adapter.compile(&target, self.executor)?;
        if !exit.success() {
            return Err(Error::CompilationError {
                task: task.name.clone(),
                exit,
            });
        }
        self.reporter.report(task, Event::Compiled)?;

        let command = adapter.run_command(&target);
        tracing::debug!(%command, count = task.count, "running datasets");

        for index in 0..task.count {
            let dataset = store.dataset(task, index);
            if let Some(path) = dataset.missing_file() {
                return Err(Error::MissingDatasetFile {
                    task: task.name.clone(),
                    index,
                    path: path.to_path_buf(),
                });
            }

            // removed on drop, whatever the outcome
            let scratch = TempDir::new(TOOL_NAME)?;
            let produced = scratch.path().join(OUTPUT_NAME);

            let exit = self
                .executor
                .run(&command, &dataset.input, &produced, self.timeout)?;
            if !exit.success() {
                return Err(Error::RuntimeError {
                    task: task.name.clone(),
                    index,
                    exit,
                });
            }

            let produced = fs::read(&produced)?;
            let expected = fs::read(&dataset.output)?;
            if !compare::equivalent(&produced, &expected, self.strict) {
                tracing::debug!(index, strict = self.strict, "output differed");
                return Err(Error::WrongAnswer {
                    task: task.name.clone(),
                    index,
                });
            }

            tracing::trace!(index, "accepted");
            self.reporter.report(task, Event::Accepted(index))?;
        }

        self.reporter.report(task, Event::Finished)?;

        Ok(TaskSummary {
            name: task.name.clone(),
            accepted: task.count,
        })
    }

    /// Resolves all selectors by task name or target and runs the selected
    /// tasks in order, no selectors select all tasks. Nothing is run if any
    /// selector matches no task.
    #[tracing::instrument(skip_all, fields(selectors = selectors.len()))]
    pub fn run_all<S: AsRef<str>>(
        &mut self,
        selectors: &[S],
        store: &dyn TaskStore,
    ) -> Result<BatchSummary, Error> {
        let tasks: Vec<&Task> = if selectors.is_empty() {
            store.tasks().iter().collect()
        } else {
            selectors
                .iter()
                .map(|selector| {
                    let selector = selector.as_ref();
                    store
                        .find(selector)
                        .ok_or_else(|| Error::TaskNotFound(selector.to_owned()))
                })
                .collect::<Result<_, _>>()?
        };

        tracing::debug!(tasks = tasks.len(), "resolved tasks");

        let start = Instant::now();
        let mut summary = BatchSummary::default();
        for task in tasks {
            summary.tasks.push(self.run(task, store)?);
        }
        summary.duration = start.elapsed();

        Ok(summary)
    }
}
