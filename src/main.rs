use clap::Parser;

use loadcurve::args::{Cli, Command};
use loadcurve::logger::init_logging;

fn main() {
    let cli = Cli::parse();
    let Command::Run(args) = cli.command;
    init_logging(args.verbose);

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("failed to start runtime: {err}");
            std::process::exit(1);
        }
    };

    let result = runtime.block_on(loadcurve::run::run(args));

    match result {
        Ok(run_id) => {
            println!("Run complete: {run_id}");
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    }
}
