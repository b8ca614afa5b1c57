use std::process::ExitCode;

fn main() -> ExitCode {
    covtrend::cli::run()
}
