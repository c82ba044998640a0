use clap::Parser;
use entitygen::{Cli, Settings, load_config, run};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "entitygen=debug,entitygen_typegen=debug"
    } else {
        "entitygen=info,entitygen_typegen=warn"
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = std::env::current_dir()
        .map_err(anyhow::Error::from)
        .and_then(|root| load_config(&cli, &root))
        .and_then(|config| run(&Settings::resolve(&cli, config), cli.check));

    if let Err(e) = result {
        eprintln!("entitygen: {e:#}");
        std::process::exit(1);
    }
}
