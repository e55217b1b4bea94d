use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tempdir::TempDir;

use crate::exec::{Executor, Exit, Invocation};
use crate::store::TaskStore;
use crate::task::{Dataset, Task};
use crate::TOOL_NAME;

pub mod fs;

/// An [`Executor`] which records invocations instead of spawning processes.
/// Runs copy their input to their output, like `cat` would.
#[derive(Debug)]
pub struct Recorder {
    compile_exit: Exit,
    run_exit: Exit,
    compiled: Vec<Invocation>,
    runs: Vec<Invocation>,
}

impl Recorder {
    pub fn new() -> Self {
        Self {
            compile_exit: Exit::SUCCESS,
            run_exit: Exit::SUCCESS,
            compiled: vec![],
            runs: vec![],
        }
    }

    pub fn with_compile_exit(mut self, exit: Exit) -> Self {
        self.compile_exit = exit;
        self
    }

    pub fn with_run_exit(mut self, exit: Exit) -> Self {
        self.run_exit = exit;
        self
    }

    pub fn compiled(&self) -> &[Invocation] {
        &self.compiled
    }

    pub fn runs(&self) -> &[Invocation] {
        &self.runs
    }
}

impl Executor for Recorder {
    fn compile(&mut self, invocation: &Invocation) -> io::Result<Exit> {
        self.compiled.push(invocation.clone());
        Ok(self.compile_exit)
    }

    fn run(
        &mut self,
        invocation: &Invocation,
        input: &Path,
        output: &Path,
        _timeout: Option<Duration>,
    ) -> io::Result<Exit> {
        self.runs.push(invocation.clone());
        std::fs::copy(input, output)?;
        Ok(self.run_exit)
    }
}

/// A [`TaskStore`] whose datasets live in a temporary directory.
pub struct TempStore {
    dir: TempDir,
    tasks: Vec<Task>,
}

impl TempStore {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new(TOOL_NAME).unwrap(),
            tasks: vec![],
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Adds a task with the given `(input, output)` datasets.
    pub fn with_task(mut self, name: &str, target: &str, datasets: &[(&str, &str)]) -> Self {
        let mut task = Task::new(name, target);
        task.count = datasets.len();

        let dir = self.dir.path().join(&task.id);
        std::fs::create_dir_all(&dir).unwrap();
        for (index, (input, output)) in datasets.iter().enumerate() {
            let dataset = Dataset::in_dir(&dir, index);
            std::fs::write(dataset.input, input).unwrap();
            std::fs::write(dataset.output, output).unwrap();
        }

        self.tasks.push(task);
        self
    }

    /// Overrides the dataset count of a task without creating files.
    pub fn set_count(&mut self, name: &str, count: usize) {
        let task = self.tasks.iter_mut().find(|t| t.name == name).unwrap();
        task.count = count;
    }
}

impl TaskStore for TempStore {
    fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    fn target(&self, task: &Task) -> PathBuf {
        self.dir.path().join(&task.target)
    }

    fn dataset(&self, task: &Task, index: usize) -> Dataset {
        Dataset::in_dir(&self.dir.path().join(&task.id), index)
    }
}
