//! Process invocation. Everything that touches the operating system's process
//! API goes through an [`Executor`], the rest of the crate is portable logic.

use std::ffi::{OsStr, OsString};
use std::fmt::{self, Display};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// How often a running process with a time limit is polled for its exit.
const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// The exit code shells report for a program which could not be found.
pub const EXIT_NOT_FOUND: i32 = 127;

/// The exit code shells report for a program which could not be executed.
pub const EXIT_NOT_EXECUTABLE: i32 = 126;

/// A program and its arguments, this is never passed through a shell.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Invocation {
    program: OsString,
    args: Vec<OsString>,
}

impl Invocation {
    /// Creates a new invocation of the given program without arguments.
    pub fn new<S: Into<OsString>>(program: S) -> Self {
        Self {
            program: program.into(),
            args: vec![],
        }
    }

    /// Appends an argument.
    pub fn arg<S: Into<OsString>>(mut self, arg: S) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// The program to execute.
    pub fn program(&self) -> &OsStr {
        &self.program
    }

    /// The arguments passed to the program.
    pub fn arguments(&self) -> &[OsString] {
        &self.args
    }

    /// Creates a [`Command`] for this invocation.
    pub fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }
}

impl Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.to_string_lossy())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }

        Ok(())
    }
}

/// How a process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Exit {
    /// The process exited with a code, `0` is success.
    Code(i32),

    /// The process was terminated by a signal.
    Signal(i32),

    /// The process exceeded its time limit and was killed.
    Timeout(Duration),
}

impl Exit {
    /// The successful exit.
    pub const SUCCESS: Self = Self::Code(0);

    /// Returns whether the process exited successfully.
    pub fn success(self) -> bool {
        self == Self::SUCCESS
    }
}

impl From<ExitStatus> for Exit {
    fn from(status: ExitStatus) -> Self {
        if let Some(code) = status.code() {
            return Self::Code(code);
        }

        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return Self::Signal(signal);
            }
        }

        // only reachable on platforms which report neither
        Self::Code(-1)
    }
}

impl Display for Exit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Exit::Code(code) => write!(f, "return code {code}"),
            Exit::Signal(signal) => write!(f, "signal {signal}"),
            Exit::Timeout(limit) => write!(f, "timeout after {}ms", limit.as_millis()),
        }
    }
}

/// Runs compilers and solutions.
pub trait Executor {
    /// Runs a compiler to completion with inherited standard streams.
    fn compile(&mut self, invocation: &Invocation) -> io::Result<Exit>;

    /// Runs a solution with its standard input read from `input` and its
    /// standard output written to `output`, killing it once it exceeds
    /// `timeout`.
    fn run(
        &mut self,
        invocation: &Invocation,
        input: &Path,
        output: &Path,
        timeout: Option<Duration>,
    ) -> io::Result<Exit>;
}

/// An [`Executor`] spawning real processes in a working directory.
#[derive(Debug, Clone)]
pub struct SystemExecutor {
    workdir: PathBuf,
}

impl SystemExecutor {
    /// Creates a new executor which spawns all processes in `workdir`.
    pub fn new<P: Into<PathBuf>>(workdir: P) -> Self {
        Self {
            workdir: workdir.into(),
        }
    }
}

impl Executor for SystemExecutor {
    #[tracing::instrument(skip(self, invocation), fields(%invocation))]
    fn compile(&mut self, invocation: &Invocation) -> io::Result<Exit> {
        let child = match invocation.command().current_dir(&self.workdir).spawn() {
            Ok(child) => child,
            Err(err) => return not_started(err),
        };

        let exit = wait(child)?;
        tracing::debug!(?exit, "compiler exited");
        Ok(exit)
    }

    #[tracing::instrument(skip(self, invocation), fields(%invocation))]
    fn run(
        &mut self,
        invocation: &Invocation,
        input: &Path,
        output: &Path,
        timeout: Option<Duration>,
    ) -> io::Result<Exit> {
        let spawned = invocation
            .command()
            .current_dir(&self.workdir)
            .stdin(Stdio::from(File::open(input)?))
            .stdout(Stdio::from(File::create(output)?))
            .spawn();

        let child = match spawned {
            Ok(child) => child,
            Err(err) => return not_started(err),
        };

        let exit = match timeout {
            Some(limit) => wait_timeout(child, limit)?,
            None => wait(child)?,
        };

        tracing::debug!(?exit, "solution exited");
        Ok(exit)
    }
}

/// Turns a failed spawn into the exit a shell would report, other errors are
/// passed through.
fn not_started(err: io::Error) -> io::Result<Exit> {
    let exit = match err.kind() {
        io::ErrorKind::NotFound => Exit::Code(EXIT_NOT_FOUND),
        io::ErrorKind::PermissionDenied => Exit::Code(EXIT_NOT_EXECUTABLE),
        _ => return Err(err),
    };

    tracing::debug!(%err, ?exit, "program could not be started");
    Ok(exit)
}

fn wait(mut child: Child) -> io::Result<Exit> {
    Ok(child.wait()?.into())
}

fn wait_timeout(mut child: Child, limit: Duration) -> io::Result<Exit> {
    let start = Instant::now();

    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(status.into());
        }

        if start.elapsed() >= limit {
            tracing::warn!(pid = child.id(), ?limit, "killing solution after time limit");
            child.kill()?;
            child.wait()?;
            return Ok(Exit::Timeout(limit));
        }

        thread::sleep(POLL_INTERVAL);
    }
}
