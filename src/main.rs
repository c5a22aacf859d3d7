use clap::Parser;
use meme_narrator::cli;
use tracing::error;

fn main() {
    let args = cli::Args::parse();
    let code = match cli::dispatch(args) {
        Ok(status) => status.exit_code(),
        Err(err) => {
            // Config and folder errors happen before logging is up.
            if tracing::dispatcher::has_been_set() {
                error!("{:#}", err);
            } else {
                eprintln!("error: {:#}", err);
            }
            1
        }
    };
    std::process::exit(code);
}
