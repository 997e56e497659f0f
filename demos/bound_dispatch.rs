use ayalog::{info, warn, Environment, InvocationMode, Logger};

fn render(logger: &Logger) -> Result<(), ayalog::Error> {
    info!(logger, "rendering", ["header", "body"])
}

fn main() -> Result<(), ayalog::Error> {
    // Same call sites, reported identically through both dispatch paths
    for mode in [InvocationMode::Direct, InvocationMode::Bound] {
        let mut logger = Logger::builder()
            .environment(Environment::Terminal)
            .invocation_mode(mode)
            .build()?;
        render(&logger)?;
        logger.set_show_date(false);
        warn!(logger, "mode", mode, "trace index", logger.trace_frame_index())?;
    }

    // Browser rendering; off wasm32 this prints through a plain stand-in console
    let logger = Logger::builder().environment(Environment::Browser).build()?;
    render(&logger)?;
    Ok(())
}
