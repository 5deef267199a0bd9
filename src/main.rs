use clap::Parser;
use file_sorter::logging::init_logging;
use file_sorter::{
	ConfigurationSource, Engine, FileSettingsSource, Settings, SettingsFileStore, StaticSource,
};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "file-sorter")]
#[command(about = "Watches a folder and sorts new files into category folders by extension")]
struct Cli {
	/// Settings file to load and follow (defaults to the per-machine settings file)
	#[arg(short, long, conflicts_with_all = ["watch", "dest"])]
	config: Option<PathBuf>,

	/// Folder to watch (requires --dest; skips the settings file)
	#[arg(short, long, requires = "dest")]
	watch: Option<PathBuf>,

	/// Destination root for category folders (requires --watch)
	#[arg(short, long, requires = "watch")]
	dest: Option<PathBuf>,

	/// Enable verbose logging
	#[arg(short, long)]
	verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let cli = Cli::parse();
	init_logging(cli.verbose)?;

	let source: Box<dyn ConfigurationSource> = match (cli.watch, cli.dest) {
		(Some(watch), Some(dest)) => Box::new(StaticSource::new(Settings::new(watch, dest))),
		_ => {
			let store = match cli.config {
				Some(path) => SettingsFileStore::at(path)?,
				None => SettingsFileStore::open()?,
			};
			info!("Using settings file {}", store.config_path().display());
			Box::new(FileSettingsSource::new(store)?)
		}
	};

	let engine = Engine::default();
	info!("Starting file sorter. Press Ctrl+C to stop.");

	engine
		.run(source.as_ref(), async {
			if let Err(e) = tokio::signal::ctrl_c().await {
				tracing::error!("Failed to listen for Ctrl+C: {}", e);
			}
			info!("Shutting down file sorter...");
		})
		.await;

	Ok(())
}
