// src/main.rs

use moodup::{cli, run};

fn main() {
    if let Err(err) = run(cli::parse()) {
        eprintln!("moodup error: {err}");
        std::process::exit(1);
    }
}
