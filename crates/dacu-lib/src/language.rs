//! Language adapters, mapping a source file extension to how that source is
//! compiled and run.
//!
//! The [`Registry`] is built once from the built-in adapters and the
//! [`languages`][crate::config::Config::languages] section of the config, it
//! is not modified afterwards.

use std::collections::BTreeMap;
use std::io;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;

use crate::config::LanguageConfig;
use crate::exec::{Executor, Exit, Invocation};

/// The built-in adapters, see [`Registry::builtin`].
const BUILTIN: &[(&str, Kind, &str)] = &[
    ("c", Kind::Native, "gcc"),
    ("cc", Kind::Native, "g++"),
    ("cpp", Kind::Native, "g++"),
    ("cxx", Kind::Native, "g++"),
    ("rs", Kind::Native, "rustc"),
    ("js", Kind::Interpreted, "node"),
    ("py", Kind::Interpreted, "python3"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Native,
    Interpreted,
}

/// An error for looking up adapters.
#[derive(Debug, Error)]
pub enum Error {
    /// No adapter is registered for this extension.
    #[error("unsupported language {0:?}")]
    UnsupportedLanguage(String),

    /// The target has no extension to look up.
    #[error("cannot determine the language of {0:?}")]
    MissingExtension(PathBuf),
}

/// How a source file is turned into a runnable program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Adapter {
    /// Compiled ahead of time into an executable next to the source, named
    /// after the source without its extension.
    Native {
        /// The compiler binary.
        compiler: String,

        /// Arguments passed before the source file.
        args: Vec<String>,
    },

    /// Run directly by an interpreter, compilation always succeeds.
    Interpreted {
        /// The interpreter binary.
        interpreter: String,

        /// Arguments passed before the source file.
        args: Vec<String>,
    },
}

impl Adapter {
    /// Creates a native adapter without extra arguments.
    pub fn native<S: Into<String>>(compiler: S) -> Self {
        Self::Native {
            compiler: compiler.into(),
            args: vec![],
        }
    }

    /// Creates an interpreted adapter without extra arguments.
    pub fn interpreted<S: Into<String>>(interpreter: S) -> Self {
        Self::Interpreted {
            interpreter: interpreter.into(),
            args: vec![],
        }
    }

    /// Returns the compiler invocation for the given source, if this adapter
    /// has one.
    pub fn compile_command(&self, source: &Path) -> Option<Invocation> {
        match self {
            Self::Native { compiler, args } => Some(
                Invocation::new(compiler)
                    .args(args)
                    .arg(source)
                    .arg("-o")
                    .arg(executable(source)),
            ),
            Self::Interpreted { .. } => None,
        }
    }

    /// Compiles the given source, for interpreted adapters this spawns nothing
    /// and succeeds.
    pub fn compile(&self, source: &Path, executor: &mut dyn Executor) -> io::Result<Exit> {
        match self.compile_command(source) {
            Some(invocation) => {
                tracing::debug!(%invocation, "compiling");
                executor.compile(&invocation)
            }
            None => Ok(Exit::SUCCESS),
        }
    }

    /// Returns the invocation which runs the given source.
    pub fn run_command(&self, source: &Path) -> Invocation {
        match self {
            Self::Native { .. } => Invocation::new(executable(source)),
            Self::Interpreted { interpreter, args } => {
                Invocation::new(interpreter).args(args).arg(source)
            }
        }
    }
}

impl From<LanguageConfig> for Adapter {
    fn from(config: LanguageConfig) -> Self {
        match config {
            LanguageConfig::Native { program, args } => Self::Native {
                compiler: program,
                args,
            },
            LanguageConfig::Interpreted { program, args } => Self::Interpreted {
                interpreter: program,
                args,
            },
        }
    }
}

/// Returns the executable path of a natively compiled source, that is the
/// source without its extension. Bare file names are made explicitly relative
/// so they are never looked up in `PATH`.
fn executable(source: &Path) -> PathBuf {
    let exe = source.with_extension("");

    match exe.components().next() {
        Some(Component::Normal(_)) if exe.parent() == Some(Path::new("")) => {
            Path::new(".").join(exe)
        }
        _ => exe,
    }
}

/// A lookup table of adapters keyed by file extension.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    adapters: BTreeMap<String, Adapter>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with the built-in adapters for C, C++, Rust,
    /// JavaScript and Python.
    pub fn builtin() -> Self {
        let adapters = BUILTIN
            .iter()
            .map(|&(ext, kind, program)| {
                let adapter = match kind {
                    Kind::Native => Adapter::native(program),
                    Kind::Interpreted => Adapter::interpreted(program),
                };
                (ext.to_owned(), adapter)
            })
            .collect();

        Self { adapters }
    }

    /// Creates a registry with the built-in adapters extended or overridden by
    /// the configured ones.
    pub fn with_config<I>(languages: I) -> Self
    where
        I: IntoIterator<Item = (String, LanguageConfig)>,
    {
        let mut this = Self::builtin();
        for (ext, config) in languages {
            this = this.with(ext, config.into());
        }
        this
    }

    /// Registers an adapter for the given extension, replacing any previous
    /// one.
    pub fn with<S: Into<String>>(mut self, ext: S, adapter: Adapter) -> Self {
        self.adapters.insert(ext.into(), adapter);
        self
    }

    /// Looks up the adapter for an extension.
    pub fn lookup(&self, ext: &str) -> Result<&Adapter, Error> {
        self.adapters
            .get(ext)
            .ok_or_else(|| Error::UnsupportedLanguage(ext.to_owned()))
    }

    /// Looks up the adapter for a source file by its extension.
    pub fn lookup_path(&self, source: &Path) -> Result<&Adapter, Error> {
        let ext = source
            .extension()
            .and_then(|ext| ext.to_str())
            .ok_or_else(|| Error::MissingExtension(source.to_path_buf()))?;

        self.lookup(ext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::_dev::Recorder;

    #[test]
    fn test_lookup_builtin() {
        let registry = Registry::builtin();
        assert_eq!(registry.lookup("cpp").unwrap(), &Adapter::native("g++"));
        assert_eq!(registry.lookup("py").unwrap(), &Adapter::interpreted("python3"));
        assert!(matches!(
            registry.lookup("hs"),
            Err(Error::UnsupportedLanguage(ext)) if ext == "hs"
        ));
    }

    #[test]
    fn test_lookup_path_without_extension() {
        assert!(matches!(
            Registry::builtin().lookup_path(Path::new("Makefile")),
            Err(Error::MissingExtension(_))
        ));
    }

    #[test]
    fn test_with_config_overrides() {
        let registry = Registry::with_config([
            (
                "cpp".to_owned(),
                LanguageConfig::Native {
                    program: "clang++".into(),
                    args: vec!["-O2".into()],
                },
            ),
            (
                "sh".to_owned(),
                LanguageConfig::Interpreted {
                    program: "sh".into(),
                    args: vec![],
                },
            ),
        ]);

        assert_eq!(
            registry.lookup("cpp").unwrap().compile_command(Path::new("a.cpp")),
            Some(Invocation::new("clang++").args(["-O2", "a.cpp", "-o", "./a"]))
        );
        assert_eq!(registry.lookup("sh").unwrap(), &Adapter::interpreted("sh"));
    }

    #[test]
    fn test_native_commands() {
        let adapter = Adapter::native("g++");

        assert_eq!(
            adapter.compile_command(Path::new("src/sol.cpp")),
            Some(Invocation::new("g++").args(["src/sol.cpp", "-o", "src/sol"]))
        );
        assert_eq!(
            adapter.run_command(Path::new("src/sol.cpp")),
            Invocation::new("src/sol")
        );
        assert_eq!(adapter.run_command(Path::new("sol.cpp")), Invocation::new("./sol"));
        assert_eq!(
            adapter.run_command(Path::new("/tmp/sol.cpp")),
            Invocation::new("/tmp/sol")
        );
    }

    #[test]
    fn test_interpreted_commands() {
        let adapter = Adapter::interpreted("node");

        assert_eq!(adapter.compile_command(Path::new("a.js")), None);
        assert_eq!(
            adapter.run_command(Path::new("a.js")),
            Invocation::new("node").arg("a.js")
        );
    }

    #[test]
    fn test_interpreted_compile_spawns_nothing() {
        let mut recorder = Recorder::new();
        let exit = Adapter::interpreted("python3")
            .compile(Path::new("a.py"), &mut recorder)
            .unwrap();

        assert_eq!(exit, Exit::SUCCESS);
        assert!(recorder.compiled().is_empty());
    }

    #[test]
    fn test_native_compile_reports_exit() {
        let mut recorder = Recorder::new().with_compile_exit(Exit::Code(1));
        let exit = Adapter::native("g++")
            .compile(Path::new("a.cpp"), &mut recorder)
            .unwrap();

        assert_eq!(exit, Exit::Code(1));
        assert_eq!(recorder.compiled().len(), 1);
    }
}
