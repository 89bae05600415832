use clap::{arg, command, value_parser, Command};
use colored::*;
use lbm_boundary as lbm;
use rayon::ThreadPoolBuilder;
use std::process;

fn main() {
    env_logger::init();

    let matches = command!()
        .arg(
            arg!(
                -n --number_of_threads <NUMBER_OF_THREADS> "Sets the number of threads: 1, 2, 4, 8, 16 or 32"
            )
            .required(false)
            .value_parser(value_parser!(usize)),
        )
        .subcommand(
            Command::new("run")
                .about("Runs the case in pre_processing/case_conditions.jou"),
        )
        .get_matches();

    if let Some(&num_threads) = matches.get_one::<usize>("number_of_threads") {
        if let Err(e) = ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
        {
            eprintln!("{} {e}.", "Error while building the thread pool:".red().bold());
            process::exit(1);
        }
    }

    match matches.subcommand() {
        Some(("run", _)) => {
            if let Err(e) = lbm::simulation::run() {
                eprintln!("{} {e}.", "Error:".red().bold());
                process::exit(1);
            }
        }
        _ => {}
    }
}
