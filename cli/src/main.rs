mod command;
mod interactive;
mod report;
mod script;
mod session;

use std::{
    io::{stdin, stdout},
    path::PathBuf,
};

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use report::{Format, Reporter};
use session::Session;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// read commands from stdin one at a time
    Interactive(CommonArgs),
    /// execute commands from a file
    Run(RunArgs),
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
    /// Print outcomes as JSON, one object per line
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct RunArgs {
    #[command(flatten)]
    delegate: CommonArgs,
    /// File path to command script
    script: PathBuf,
    /// Print access statistics after the script ends
    #[arg(long)]
    stat: bool,
}

fn main() -> Result<()> {
    let args = Cli::parse();
    match args.command {
        Command::Interactive(CommonArgs { verbose, json }) => {
            init_logger(verbose);
            let mut session = Session::new(Reporter::new(stdout(), format(json)));
            log::info!("starting interactive session.");
            interactive::execute_interactive(&mut session, stdin().lock(), stdout())?;
            output_stat(&session);
            Ok(())
        }
        Command::Run(RunArgs {
            delegate: CommonArgs { verbose, json },
            script,
            stat,
        }) => {
            init_logger(verbose);
            let src = script::load_script(&script)?;
            let mut session = Session::new(Reporter::new(stdout(), format(json)));
            let n = script::run_script(&src, &mut session)?;
            log::info!("finished {}: {n} commands.", script.display());
            if stat {
                session.execute(command::Command::Stat)?;
            } else {
                output_stat(&session);
            }
            Ok(())
        }
    }
}

fn init_logger(verbose: bool) {
    if verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    } else {
        env_logger::init();
    }
}

fn format(json: bool) -> Format {
    if json {
        Format::Json
    } else {
        Format::Text
    }
}

#[cfg(not(feature = "stat"))]
fn output_stat<W>(_: &Session<W>) {}

#[cfg(feature = "stat")]
fn output_stat<W: std::io::Write>(session: &Session<W>) {
    let max_width = report::stat_width();
    log::info!("statistics:\n{}", session.cache().collect_stat().view(max_width));
}
