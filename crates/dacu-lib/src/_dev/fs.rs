use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write;
use std::path::{Path, PathBuf};

use tempdir::TempDir;

use crate::{stdx, TOOL_NAME};

/// What a path is expected to be after a test, `None` content is not checked.
#[derive(Debug)]
enum Entry {
    Dir,
    File(Option<Vec<u8>>),
}

/// A temporary project root which is compared against an expected layout
/// after the test ran.
pub struct TempEnv {
    root: TempDir,
    expected: BTreeMap<PathBuf, Entry>,
}

/// Sets up the project before the test.
pub struct Setup<'a>(&'a Path);

impl Setup<'_> {
    pub fn dir<P: AsRef<Path>>(&mut self, path: P) -> &mut Self {
        stdx::fs::create_dir(self.0.join(path), true).unwrap();
        self
    }

    pub fn file<P: AsRef<Path>>(&mut self, path: P, content: impl AsRef<[u8]>) -> &mut Self {
        let path = self.0.join(path);
        if let Some(parent) = path.parent() {
            stdx::fs::create_dir(parent, true).unwrap();
        }

        std::fs::write(path, content).unwrap();
        self
    }
}

/// Describes the project after the test, anything not described is
/// unexpected.
pub struct Expect<'a>(&'a mut BTreeMap<PathBuf, Entry>);

impl Expect<'_> {
    pub fn dir<P: AsRef<Path>>(&mut self, path: P) -> &mut Self {
        self.0.insert(path.as_ref().to_path_buf(), Entry::Dir);
        self
    }

    pub fn file<P: AsRef<Path>>(&mut self, path: P) -> &mut Self {
        self.0.insert(path.as_ref().to_path_buf(), Entry::File(None));
        self
    }

    pub fn file_content<P: AsRef<Path>>(
        &mut self,
        path: P,
        content: impl AsRef<[u8]>,
    ) -> &mut Self {
        self.0.insert(
            path.as_ref().to_path_buf(),
            Entry::File(Some(content.as_ref().to_owned())),
        );
        self
    }
}

impl TempEnv {
    pub fn run(
        setup: impl for<'a, 'b> FnOnce(&'a mut Setup<'b>) -> &'a mut Setup<'b>,
        test: impl FnOnce(&Path),
        expect: impl for<'a, 'b> FnOnce(&'a mut Expect<'b>) -> &'a mut Expect<'b>,
    ) {
        let mut env = Self {
            root: TempDir::new(TOOL_NAME).unwrap(),
            expected: BTreeMap::new(),
        };

        setup(&mut Setup(env.root.path()));
        test(env.root.path());
        expect(&mut Expect(&mut env.expected));

        env.assert();
    }

    pub fn run_no_check(
        setup: impl for<'a, 'b> FnOnce(&'a mut Setup<'b>) -> &'a mut Setup<'b>,
        test: impl FnOnce(&Path),
    ) {
        let root = TempDir::new(TOOL_NAME).unwrap();
        setup(&mut Setup(root.path()));
        test(root.path());
    }

    /// Collects all files and leaf directories below `dir`.
    fn collect(&self, dir: &Path, found: &mut BTreeMap<PathBuf, Option<Vec<u8>>>) {
        let mut empty = true;
        for entry in dir.read_dir().unwrap() {
            let path = entry.unwrap().path();
            empty = false;

            if path.is_dir() {
                self.collect(&path, found);
            } else {
                let rel = path.strip_prefix(self.root.path()).unwrap().to_path_buf();
                found.insert(rel, Some(std::fs::read(&path).unwrap()));
            }
        }

        if empty && dir != self.root.path() {
            let rel = dir.strip_prefix(self.root.path()).unwrap().to_path_buf();
            found.insert(rel, None);
        }
    }

    fn assert(self) {
        let mut found = BTreeMap::new();
        self.collect(self.root.path(), &mut found);

        // parents of expected entries are implied
        let implied: BTreeSet<_> = self
            .expected
            .keys()
            .flat_map(|path| path.ancestors().skip(1))
            .map(Path::to_path_buf)
            .collect();

        let mut msg = String::new();
        for (path, entry) in &self.expected {
            match (entry, found.remove(path)) {
                (Entry::Dir, Some(None)) => {}
                (Entry::Dir, None) if implied.contains(path) => {}
                (Entry::File(None), Some(Some(_))) => {}
                (Entry::File(Some(expected)), Some(Some(content))) => {
                    if *expected != content {
                        writeln!(
                            msg,
                            "/{}: expected {:?}, found {:?}",
                            path.display(),
                            String::from_utf8_lossy(expected),
                            String::from_utf8_lossy(&content),
                        )
                        .unwrap();
                    }
                }
                _ => writeln!(msg, "/{}: not found", path.display()).unwrap(),
            }
        }

        for path in found.keys() {
            if !implied.contains(path) {
                writeln!(msg, "/{}: not expected", path.display()).unwrap();
            }
        }

        if !msg.is_empty() {
            panic!("\n{msg}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_env_run() {
        TempEnv::run(
            |root| root.file("a/b/empty.txt", "").file("a/c/other.txt", "x"),
            |root| {
                std::fs::remove_file(root.join("a/b/empty.txt")).unwrap();
            },
            |root| root.dir("a/b").file_content("a/c/other.txt", "x"),
        );
    }

    #[test]
    #[should_panic]
    fn test_temp_env_run_unexpected() {
        TempEnv::run(
            |root| root.file("a/b/empty.txt", "").file("a/c/other.txt", ""),
            |_| {},
            |root| root.file("a/b/empty.txt"),
        );
    }

    #[test]
    #[should_panic]
    fn test_temp_env_run_content() {
        TempEnv::run(
            |root| root.file("a.txt", "x"),
            |_| {},
            |root| root.file_content("a.txt", "y"),
        );
    }

    #[test]
    fn test_temp_env_run_no_check() {
        TempEnv::run_no_check(
            |root| root.dir("a/b"),
            |root| assert!(root.join("a/b").is_dir()),
        );
    }
}
