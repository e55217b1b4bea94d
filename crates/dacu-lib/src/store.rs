//! The on-disk task store, a `.dacu` directory in the project root.
//!
//! ```text
//! <root>
//! └── .dacu
//!     ├── config.toml
//!     ├── tasks.json
//!     └── <task id>
//!         ├── 0.in
//!         ├── 0.out
//!         └── ...
//! ```

use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::CONFIG_NAME;
use crate::stdx;
use crate::stdx::result::ResultEx;
use crate::task::{Dataset, Task};

/// The name of the store directory inside the project root.
pub const STORE_DIR: &str = ".dacu";

/// The name of the task manifest inside the store directory.
pub const TASKS_NAME: &str = "tasks.json";

/// The only supported manifest version.
pub const TASKS_VERSION: u32 = 1;

/// An error which can occur while reading or modifying the store.
#[derive(Debug, Error)]
pub enum Error {
    /// The project has no store.
    #[error("the project at {0:?} is not initialized")]
    NotInitialized(PathBuf),

    /// The project already has a store.
    #[error("the project at {0:?} is already initialized")]
    AlreadyInitialized(PathBuf),

    /// The manifest has a version this tool can't read.
    #[error("unsupported store version {0}")]
    UnsupportedVersion(u32),

    /// A task name was empty.
    #[error("a task name must not be empty")]
    EmptyName,

    /// A task with this name is already registered.
    #[error("task {0:?} already exists")]
    DuplicateTask(String),

    /// The target is already bound to another task.
    #[error("{target:?} is already bound to task {task:?}")]
    TargetAlreadyBound {
        /// The target which was added again.
        target: PathBuf,

        /// The task it is bound to.
        task: String,
    },

    /// No task matched a selector.
    #[error("cannot find task {0:?}")]
    TaskNotFound(String),

    /// The manifest could not be parsed or written.
    #[error("couldn't parse {TASKS_NAME}")]
    Json(#[from] serde_json::Error),

    /// An io error occurred.
    #[error("an io error occurred")]
    Io(#[from] io::Error),
}

/// Read access to registered tasks and their datasets.
pub trait TaskStore {
    /// All registered tasks in registration order.
    fn tasks(&self) -> &[Task];

    /// The path of a task's target as seen from the working directory.
    fn target(&self, task: &Task) -> PathBuf;

    /// The dataset at the given index of a task.
    fn dataset(&self, task: &Task, index: usize) -> Dataset;

    /// Finds the task whose name or target is the given selector.
    fn find(&self, selector: &str) -> Option<&Task> {
        self.tasks().iter().find(|task| task.matches(selector))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Manifest {
    version: u32,
    tasks: Vec<Task>,
}

impl Default for Manifest {
    fn default() -> Self {
        Self {
            version: TASKS_VERSION,
            tasks: vec![],
        }
    }
}

/// A [`TaskStore`] backed by a `.dacu` directory. Changes are only persisted
/// by the operations which document doing so.
#[derive(Debug, Clone)]
pub struct Store {
    root: PathBuf,
    manifest: Manifest,
}

impl Store {
    /// Initializes a new empty store in the given project root. If `force` is
    /// given an existing store is removed first, otherwise it is an error.
    #[tracing::instrument]
    pub fn init(root: &Path, force: bool) -> Result<Self, Error> {
        let dir = root.join(STORE_DIR);

        if force {
            tracing::debug!(?dir, "clearing store");
            stdx::fs::remove_dir(&dir)?;
        } else if dir.join(TASKS_NAME).try_exists()? {
            return Err(Error::AlreadyInitialized(root.to_path_buf()));
        }

        stdx::fs::create_dir(&dir, true)?;
        std::fs::write(dir.join(CONFIG_NAME), "")?;

        let this = Self {
            root: root.to_path_buf(),
            manifest: Manifest::default(),
        };
        this.save()?;

        Ok(this)
    }

    /// Opens the store in the given project root.
    #[tracing::instrument]
    pub fn open(root: &Path) -> Result<Self, Error> {
        let path = root.join(STORE_DIR).join(TASKS_NAME);

        let Some(source) =
            std::fs::read_to_string(&path).ignore(|e| e.kind() == ErrorKind::NotFound)?
        else {
            return Err(Error::NotInitialized(root.to_path_buf()));
        };

        let manifest: Manifest = serde_json::from_str(&source)?;
        if manifest.version != TASKS_VERSION {
            return Err(Error::UnsupportedVersion(manifest.version));
        }

        tracing::debug!(tasks = manifest.tasks.len(), "opened store");

        Ok(Self {
            root: root.to_path_buf(),
            manifest,
        })
    }

    /// The project root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The store directory.
    pub fn dir(&self) -> PathBuf {
        self.root.join(STORE_DIR)
    }

    /// The config file in the store directory.
    pub fn config_path(&self) -> PathBuf {
        self.dir().join(CONFIG_NAME)
    }

    /// The dataset directory of a task.
    pub fn task_dir(&self, task: &Task) -> PathBuf {
        self.dir().join(&task.id)
    }

    /// Writes the manifest to disk.
    #[tracing::instrument(skip(self))]
    pub fn save(&self) -> Result<(), Error> {
        let json = serde_json::to_string_pretty(&self.manifest)?;
        std::fs::write(self.dir().join(TASKS_NAME), json)?;
        Ok(())
    }

    /// Registers a new task, creates its dataset directory and saves the
    /// manifest.
    #[tracing::instrument(skip(self))]
    pub fn add_task(&mut self, name: String, target: PathBuf) -> Result<&Task, Error> {
        if name.is_empty() {
            return Err(Error::EmptyName);
        }

        for task in &self.manifest.tasks {
            if task.name == name {
                return Err(Error::DuplicateTask(name));
            }

            if task.target == target {
                return Err(Error::TargetAlreadyBound {
                    target,
                    task: task.name.clone(),
                });
            }
        }

        let task = Task::new(name, target);
        stdx::fs::create_dir(self.task_dir(&task), true)?;
        tracing::debug!(id = %task.id, "registered task");

        self.manifest.tasks.push(task);
        self.save()?;

        let last = self.manifest.tasks.len() - 1;
        Ok(&self.manifest.tasks[last])
    }

    /// Copies the given input and output files as the next dataset of the
    /// selected task, saves the manifest and returns the task and new
    /// dataset.
    #[tracing::instrument(skip(self))]
    pub fn add_data(
        &mut self,
        selector: &str,
        input: &Path,
        output: &Path,
    ) -> Result<(&Task, Dataset), Error> {
        let pos = self
            .manifest
            .tasks
            .iter()
            .position(|task| task.matches(selector))
            .ok_or_else(|| Error::TaskNotFound(selector.to_owned()))?;

        let dir = self.task_dir(&self.manifest.tasks[pos]);
        let dataset = Dataset::in_dir(&dir, self.manifest.tasks[pos].count);

        stdx::fs::create_dir(&dir, true)?;
        std::fs::copy(input, &dataset.input)?;
        std::fs::copy(output, &dataset.output)?;
        tracing::debug!(index = dataset.index, "copied dataset");

        self.manifest.tasks[pos].count += 1;
        self.save()?;

        Ok((&self.manifest.tasks[pos], dataset))
    }
}

impl TaskStore for Store {
    fn tasks(&self) -> &[Task] {
        &self.manifest.tasks
    }

    fn target(&self, task: &Task) -> PathBuf {
        self.root.join(&task.target)
    }

    fn dataset(&self, task: &Task, index: usize) -> Dataset {
        Dataset::in_dir(&self.task_dir(task), index)
    }
}
