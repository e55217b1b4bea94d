use std::path::PathBuf;
use std::time::Duration;
use std::env;
use std::io::{self, Write};

use clap::ColorChoice;
use lib::config::Config;
use lib::language::Registry;
use lib::store::Store;
use thiserror::Error;

use crate::error::{self, Failure, OperationFailure};
use crate::ui::Ui;

pub mod add_data;
pub mod add_task;
pub mod init;
pub mod list;

/// Dacu exited successfully.
pub const EXIT_OK: u8 = 0;

/// At least one task was not accepted.
pub const EXIT_TEST_FAILURE: u8 = 1;

/// The requested operation failed gracefully.
pub const EXIT_OPERATION_FAILURE: u8 = 2;

/// An unexpected error occurred.
pub const EXIT_ERROR: u8 = 3;

#[derive(Debug, Error)]
#[error("root {0:?} not found")]
pub struct RootNotFound(PathBuf);

impl Failure for RootNotFound {
    fn report(&self, ui: &Ui) -> io::Result<()> {
        ui.error_with(|w| writeln!(w, "Root '{}' not found", self.0.display()))
    }
}

pub struct Context<'a> {
    /// The parsed top-level arguments.
    pub args: &'a Args,

    /// The terminal ui.
    pub ui: &'a Ui,
}

impl<'a> Context<'a> {
    pub fn new(args: &'a Args, ui: &'a Ui) -> Self {
        tracing::debug!(?args, "creating context");
        Self { args, ui }
    }

    /// Resolves the project root, this is always absolute.
    pub fn root(&self) -> anyhow::Result<PathBuf> {
        let root = match &self.args.global.root {
            Some(root) => {
                if !root.try_exists()? {
                    anyhow::bail!(OperationFailure::from(RootNotFound(root.clone())));
                }

                root.canonicalize()?
            }
            None => env::current_dir()?,
        };

        tracing::debug!(?root, "resolved root");
        Ok(root)
    }

    /// Opens the store of an initialized project.
    pub fn store(&self) -> anyhow::Result<Store> {
        Store::open(&self.root()?).map_err(error::store)
    }

    /// Reads the config of the given store.
    pub fn config(&self, store: &Store) -> anyhow::Result<Config> {
        Config::read(&store.config_path()).map_err(error::config)
    }

    /// Creates the language registry from the built-in and configured
    /// adapters.
    pub fn registry(&self, config: &Config) -> Registry {
        Registry::with_config(config.languages.clone())
    }

    pub fn run(&mut self) -> anyhow::Result<()> {
        self.args.cmd.run(self)
    }
}

macro_rules! ansi {
    ($s:expr; b) => {
        concat!("\x1B[1m", $s, "\x1B[0m")
    };
    ($s:expr; u) => {
        concat!("\x1B[4m", $s, "\x1B[0m")
    };
    ($s:expr;) => {
        $s
    };
    ($s:expr; $first:ident $( + $rest:tt)*) => {
        ansi!(ansi!($s; $($rest)*); $first)
    };
}

// NOTE: clap style formatting, kept simple to avoid a proc macro dependency
#[rustfmt::skip]
static AFTER_LONG_ABOUT: &str = concat!(
    ansi!("Exit Codes:\n"; u + b),
    "  ", ansi!("0"; b), "  Success\n",
    "  ", ansi!("1"; b), "  A task was not accepted\n",
    "  ", ansi!("2"; b), "  The requested operation failed\n",
    "  ", ansi!("3"; b), "  An unexpected error occurred",
);

#[derive(clap::Args, Debug, Clone)]
pub struct GlobalArgs {
    /// The project root directory, defaults to the current directory
    #[arg(long, short, env = "DACU_ROOT", global = true)]
    pub root: Option<PathBuf>,

    #[command(flatten, next_help_heading = "Output Options")]
    pub output: OutputArgs,
}

#[derive(clap::Args, Debug, Clone)]
pub struct JudgeArgs {
    /// Compare outputs byte for byte
    ///
    /// By default trailing whitespace on each line and trailing blank lines
    /// are ignored.
    #[arg(long, short, overrides_with = "no_strict")]
    pub strict: bool,

    /// Ignore trailing whitespace even if strict mode is configured
    #[arg(long, overrides_with = "strict")]
    pub no_strict: bool,

    /// The time limit of a single data set run in milliseconds
    #[arg(long, short, value_name = "MS")]
    pub timeout: Option<u64>,
}

impl JudgeArgs {
    /// Resolves strictness, the flags take precedence over the config.
    pub fn strict(&self, config: &Config) -> bool {
        match (self.strict, self.no_strict) {
            (true, _) => true,
            (_, true) => false,
            _ => config.strict_fallback(),
        }
    }

    /// Resolves the time limit, the flag takes precedence over the config.
    pub fn timeout(&self, config: &Config) -> Option<Duration> {
        self.timeout
            .map(Duration::from_millis)
            .or_else(|| config.timeout_duration())
    }
}

#[derive(clap::Args, Debug, Clone)]
pub struct OutputArgs {
    /// When to use colorful output
    ///
    /// If set to auto, color will only be enabled if a capable terminal is
    /// detected.
    #[clap(
        long,
        value_name = "WHEN",
        require_equals = true,
        num_args = 0..=1,
        default_value = "auto",
        default_missing_value = "always",
        global = true,
    )]
    pub color: ColorChoice,

    /// Produce more logging output [-v ... -vvvvv]
    ///
    /// Logs are written to stderr, the increasing number of verbose flags
    /// corresponds to the log levels ERROR, WARN, INFO, DEBUG, TRACE.
    #[arg(long, short, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

/// Compile, run and judge solutions against local data sets
#[derive(clap::Parser, Debug, Clone)]
#[command(version, after_long_help = AFTER_LONG_ABOUT)]
pub struct Args {
    #[command(flatten)]
    pub global: GlobalArgs,

    /// The command to run
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(clap::Subcommand, Debug, Clone)]
pub enum Command {
    /// Initialize the project with an empty task store
    #[command()]
    Init(init::Args),

    /// Register a source file as a new task
    #[command()]
    AddTask(add_task::Args),

    /// Attach an input and expected output file to a task
    #[command()]
    AddData(add_data::Args),

    /// Compile and judge tasks against their data sets
    #[command(visible_alias = "t")]
    Test(test::Args),

    /// List the registered tasks
    #[command(visible_alias = "ls")]
    List(list::Args),
}

impl Command {
    pub fn run(&self, ctx: &mut Context) -> anyhow::Result<()> {
        match self {
            Command::Init(args) => init::run(ctx, args),
            Command::AddTask(args) => add_task::run(ctx, args),
            Command::AddData(args) => add_data::run(ctx, args),
            Command::Test(args) => test::run(ctx, args),
            Command::List(args) => list::run(ctx, args),
        }
    }
}
