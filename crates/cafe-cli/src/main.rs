mod cli;

use std::process;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{e:#}"); // pretty anyhow chain
        process::exit(1);
    }
}
