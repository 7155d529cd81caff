mod verbose;

use std::path::Path;

use clap::{FromArgMatches as _, IntoApp as _, Parser, Subcommand};
use tracing_error::ErrorLayer;
use tracing_subscriber::{prelude::*, EnvFilter, Registry};
use twelf::Layer;

use seriale_common::Conf;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
#[clap(propagate_version = true)]
struct Cli {
    #[clap(flatten)]
    verbose: verbose::Verbosity,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the data file from the seed document if it is missing
    Init,
    /// Start the built-in web server
    Serve,
}

#[tokio::main]
async fn main() -> Result<(), seriale_common::Report> {
    seriale_common::install()?;

    let matches = Cli::command().args(&Conf::clap_args()).get_matches();
    let cli = Cli::from_arg_matches(&matches)?;

    // Config files are optional, a fresh checkout runs on defaults.
    let mut layers = Vec::with_capacity(4);
    if Path::new("seriale.json").is_file() {
        layers.push(Layer::Json("seriale.json".into()));
    }
    if Path::new("seriale.toml").is_file() {
        layers.push(Layer::Toml("seriale.toml".into()));
    }
    layers.push(Layer::Env(Some("SERIALE_".to_string())));
    layers.push(Layer::Clap(matches));

    let conf = Conf::with_layers(&layers)?;

    let subscriber = Registry::default()
        .with(ErrorLayer::default())
        .with(tracing_subscriber::fmt::Layer::default())
        .with(EnvFilter::from_default_env().add_directive(cli.verbose.log_level_filter().into()));

    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Init => seriale_command_init::run(&conf)?,
        Commands::Serve => seriale_command_serve::run(&conf).await?,
    }

    Ok(())
}
