use clap::Parser;

mod cli;
mod error;
mod output;
mod settings;
mod trip_file;

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = cli::Cli::parse();
    let settings = settings::Settings::new(cli.config.as_deref())?;

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(format!(
            "tripsplit={level},engine={level}",
            level = settings.app.level
        ))
        .init();

    cli::run(cli, &settings)?;
    Ok(())
}
