use std::{env, time::SystemTime};

use fern::colors::{Color, ColoredLevelConfig};
use log::LevelFilter;

/// Log to stdout at `LOG_LEVEL` (default `debug`).
pub fn init() -> Result<(), fern::InitError> {
    let level = env::var("LOG_LEVEL")
        .ok()
        .and_then(|level| level.parse().ok())
        .unwrap_or(LevelFilter::Debug);

    let colors = ColoredLevelConfig::new()
        .info(Color::Green)
        .debug(Color::Blue)
        .trace(Color::Magenta);

    fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {}",
                humantime::format_rfc3339_seconds(SystemTime::now()),
                colors.color(record.level()),
                record.target(),
                message
            ))
        })
        .level(level)
        .level_for("hyper", LevelFilter::Info)
        .chain(std::io::stdout())
        .apply()?;

    Ok(())
}
