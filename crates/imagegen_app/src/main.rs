mod platform;

use std::path::PathBuf;

use engine_logging::LogDestination;

fn main() -> anyhow::Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(platform::config::DEFAULT_CONFIG_FILE));
    let config = platform::config::load(&config_path)?;

    engine_logging::initialize(
        LogDestination::File(config.log_file.clone()),
        log::LevelFilter::Info,
    );

    platform::run_app(config)
}
