use ayalog::{debug, error, fatal, info, trace, warn, Logger};

fn main() -> Result<(), ayalog::Error> {
    // Initialize from environment (optional):
    //   AYALOG_LEVEL=debug AYALOG_COLOR=always AYALOG_SHOW_COLUMN=1
    let mut logger = Logger::builder().stdout().with_env().build()?;

    let arr = [1, 2, 3, 4];
    trace!(logger, "hello", "world")?;
    debug!(logger, "example message", arr)?;
    info!(logger, "listening on", 8080)?;
    warn!(logger, "disk almost full", 92)?;
    error!(logger, "disk almost full", 97)?;
    fatal!(logger, "disk full")?;

    logger.set_level("info")?;
    debug!(logger, "filtered out")?;

    logger.set_show_function_name(false);
    logger.set_show_column_number(true);
    info!(logger, "no function name, with column")?;

    logger.off();
    fatal!(logger, "silenced")?;
    logger.on();
    info!(logger, "back on")?;

    Ok(())
}
