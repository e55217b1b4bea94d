//! Registered tasks and their datasets.

use std::fmt::{self, Display};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A registered solution, stored in `tasks.json` exactly as shown here:
///
/// ```json
/// {
///   "name": "a-plus-b",
///   "target": "a plus b.cpp",
///   "id": "c0f8…",
///   "count": 2
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// The unique name of this task.
    pub name: String,

    /// The source file solving this task, relative to the project root.
    pub target: PathBuf,

    /// The lowercase hex SHA-256 digest of the name, used as the dataset
    /// directory name.
    pub id: String,

    /// The number of datasets, they are indexed from `0` to `count - 1`.
    pub count: usize,
}

impl Task {
    /// Creates a new task without datasets.
    pub fn new<S: Into<String>, P: Into<PathBuf>>(name: S, target: P) -> Self {
        let name = name.into();

        Self {
            id: Self::id_for(&name),
            name,
            target: target.into(),
            count: 0,
        }
    }

    /// Returns the identifier of a task with the given name.
    pub fn id_for(name: &str) -> String {
        hex::encode(Sha256::digest(name.as_bytes()))
    }

    /// Derives a task name from a target file, that is the file name up to
    /// its first `.` with each run of whitespace replaced by `-`.
    ///
    /// ```
    /// # use dacu_lib::task::Task;
    /// # use std::path::Path;
    /// assert_eq!(Task::derive_name(Path::new("a plus  b.cpp")), "a-plus-b");
    /// assert_eq!(Task::derive_name(Path::new("src/sol.test.py")), "sol");
    /// ```
    pub fn derive_name(target: &Path) -> String {
        let file_name = target
            .file_name()
            .map(|name| name.to_string_lossy())
            .unwrap_or_default();

        let stem = file_name.split('.').next().unwrap_or_default();

        let mut name = String::with_capacity(stem.len());
        let mut in_whitespace = false;
        for c in stem.chars() {
            if c.is_whitespace() {
                if !in_whitespace {
                    name.push('-');
                }
                in_whitespace = true;
            } else {
                name.push(c);
                in_whitespace = false;
            }
        }

        name
    }

    /// Returns whether a selector refers to this task by name or target.
    pub fn matches(&self, selector: &str) -> bool {
        self.name == selector || self.target == Path::new(selector)
    }
}

impl Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// The input and expected output file of a single dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    /// The zero based index within its task.
    pub index: usize,

    /// The file fed to the solution's standard input.
    pub input: PathBuf,

    /// The file holding the expected standard output.
    pub output: PathBuf,
}

impl Dataset {
    /// Creates the dataset with the given index inside a task's directory.
    pub fn in_dir(dir: &Path, index: usize) -> Self {
        Self {
            index,
            input: dir.join(format!("{index}.in")),
            output: dir.join(format!("{index}.out")),
        }
    }

    /// Returns the first file of this dataset which doesn't exist.
    pub fn missing_file(&self) -> Option<&Path> {
        [&self.input, &self.output]
            .into_iter()
            .find(|path| !path.is_file())
            .map(PathBuf::as_path)
    }
}
