use std::io::{self, IsTerminal, Write};
use std::process::ExitCode;

use clap::{ColorChoice, Parser};
use tracing::Level;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::prelude::*;
use tracing_tree::HierarchicalLayer;

use crate::cli::{Context, EXIT_ERROR, EXIT_OK, EXIT_OPERATION_FAILURE, EXIT_TEST_FAILURE};
use crate::error::{OperationFailure, TestFailure};
use crate::ui::Ui;

mod cli;
mod error;
mod report;
mod ui;

fn is_color(color: ColorChoice) -> bool {
    match color {
        ColorChoice::Auto => io::stderr().is_terminal(),
        ColorChoice::Always => true,
        ColorChoice::Never => false,
    }
}

fn main() -> ExitCode {
    let args = cli::Args::parse();

    if args.global.output.verbose >= 1 {
        let level = match args.global.output.verbose {
            1 => Level::ERROR,
            2 => Level::WARN,
            3 => Level::INFO,
            4 => Level::DEBUG,
            _ => Level::TRACE,
        };

        tracing_subscriber::registry()
            .with(
                HierarchicalLayer::new(4)
                    .with_targets(true)
                    .with_ansi(is_color(args.global.output.color)),
            )
            .with(
                Targets::new()
                    .with_target(std::env!("CARGO_CRATE_NAME"), level)
                    .with_target("dacu_lib", level),
            )
            .init();
    }

    let ui = Ui::new(match args.global.output.color {
        ColorChoice::Auto => termcolor::ColorChoice::Auto,
        ColorChoice::Always => termcolor::ColorChoice::Always,
        ColorChoice::Never => termcolor::ColorChoice::Never,
    });

    let mut ctx = Context::new(&args, &ui);

    let code = match ctx.run() {
        Ok(()) => EXIT_OK,
        Err(err) => {
            let code = exit_code(&err);
            match err.downcast_ref::<OperationFailure>() {
                Some(OperationFailure(failure)) => {
                    tracing::error!(%failure, "operation failed");
                    failure.report(&ui).ok();
                }
                None if code == EXIT_ERROR => {
                    unexpected_error(&ui, &err).ok();
                }
                None => {}
            }

            code
        }
    };

    ui.flush().ok();
    ExitCode::from(code)
}

/// Classifies an error returned by a command.
fn exit_code(err: &anyhow::Error) -> u8 {
    if err.is::<TestFailure>() {
        return EXIT_TEST_FAILURE;
    }

    if err.is::<OperationFailure>() {
        return EXIT_OPERATION_FAILURE;
    }

    // NOTE: broken pipes occur when programs close the pipe before we're done
    // writing, this is not an error
    if err
        .root_cause()
        .downcast_ref()
        .is_some_and(|err: &io::Error| err.kind() == io::ErrorKind::BrokenPipe)
    {
        return EXIT_OK;
    }

    EXIT_ERROR
}

fn unexpected_error(ui: &Ui, err: &anyhow::Error) -> io::Result<()> {
    ui.error_with(|w| {
        writeln!(w, "dacu ran into an unexpected error, this is most likely a bug")?;
        writeln!(w, "Please consider reporting this along with the output below")
    })?;

    if !std::env::var("RUST_BACKTRACE").is_ok_and(|var| var == "full") {
        ui.hint(
            "consider running with the environment variable RUST_BACKTRACE set to 'full' when \
            reporting issues",
        )?;
    }

    ui.error_with(|w| writeln!(w, "{err:?}"))
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use lib::config::Config;
    use lib::{language, runner, store};

    use super::*;
    use crate::error;

    #[test]
    fn test_exit_code_verdict() {
        assert_eq!(exit_code(&anyhow::Error::from(TestFailure)), EXIT_TEST_FAILURE);
    }

    #[test]
    fn test_exit_code_operation_failure() {
        let errors = [
            error::runner(runner::Error::TaskNotFound("a".into())),
            error::runner(runner::Error::UnsupportedLanguage {
                task: "a".into(),
                error: language::Error::UnsupportedLanguage("hs".into()),
            }),
            error::store(store::Error::NotInitialized(PathBuf::from("/project"))),
            error::store(store::Error::DuplicateTask("a".into())),
            error::config(Config::parse("strict = 1").unwrap_err()),
        ];

        for err in &errors {
            assert_eq!(exit_code(err), EXIT_OPERATION_FAILURE, "{err:?}");
        }
    }

    #[test]
    fn test_exit_code_unexpected() {
        let errors = [
            error::runner(runner::Error::Io(io::Error::other("disk on fire"))),
            error::store(store::Error::Io(io::Error::other("disk on fire"))),
            anyhow::anyhow!("something else"),
        ];

        for err in &errors {
            assert_eq!(exit_code(err), EXIT_ERROR, "{err:?}");
        }
    }

    #[test]
    fn test_exit_code_broken_pipe() {
        let err = anyhow::Error::from(io::Error::from(io::ErrorKind::BrokenPipe));
        assert_eq!(exit_code(&err), EXIT_OK);
    }
}
