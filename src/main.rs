use std::env;
use std::process::exit;

fn main() {
    let args: Vec<String> = env::args().collect();
    exit(athus_form::cli::run_with_args(&args));
}
