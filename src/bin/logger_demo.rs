use campus_chat::logger::*;

fn main() -> anyhow::Result<()> {
    let logger = Logger::new_bootstrap();
    trace!("bootstrap trace log");
    debug!("bootstrap debug log");
    info!("bootstrap info log");

    let config = LogConfig {
        filter: "campus_chat=trace,debug".to_string(),
    };
    logger.reload_from_config(&config)?;
    trace!("application trace log");
    debug!("application debug log");
    info!("application info log");

    let bad = LogConfig {
        filter: "campus_chat=loud".to_string(),
    };
    info!("malformed filter rejected: {}", logger.reload_from_config(&bad).is_err());

    Ok(())
}
