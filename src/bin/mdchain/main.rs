use std::process::ExitCode;

mod cli;
mod commands;
mod display;
mod io;
mod util;

fn main() -> ExitCode {
    let cli = cli::parse();

    let default_filter = if cli.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();

    let ctx = Context::for_command(&cli.command);

    if ctx.interactive {
        display::print_banner();
    }

    match commands::dispatch(cli.command, ctx) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            display::print_error(&e);
            ExitCode::FAILURE
        }
    }
}

/// Whether the CLI draws spinners, banners, and tables on stderr.
///
/// Only when stderr is a terminal and `--quiet` was not given; the run plan
/// on stdout is unaffected.
#[derive(Debug, Clone, Copy)]
pub struct Context {
    pub interactive: bool,
}

impl Context {
    fn for_command(command: &cli::Command) -> Self {
        Self {
            interactive: !command.common().quiet && io::stderr_is_tty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn quiet_disables_interactive_output() {
        let cli = cli::Cli::try_parse_from(["mdchain", "inspect", "run.yaml", "--quiet"]).unwrap();
        assert!(!Context::for_command(&cli.command).interactive);

        let cli = cli::Cli::try_parse_from(["mdchain", "p", "run.yaml", "--gpu", "1", "-q"]).unwrap();
        assert!(!Context::for_command(&cli.command).interactive);
    }
}
