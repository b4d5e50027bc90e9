use clap::Parser;
use cognita_cli::{CliArgs, CognitaCli};

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();

    let result = match CognitaCli::from_args("cognita", &args) {
        Ok(cli) => cli.run(args).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
