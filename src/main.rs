use campus_chat::client::*;
use campus_chat::domain_model::Route;
use campus_chat::infra_memory::*;
use campus_chat::logger::*;
use campus_chat::settings::*;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let logger = Logger::new_bootstrap();

    let project_settings = parse_settings(cli.settings.as_deref())?;
    info!(?project_settings);
    logger.reload_from_config(&LogConfig::from(&project_settings.log))?;

    let accounts = Arc::new(AccountDirectory::new());
    let store = Arc::new(MemoryRealtimeStore::new());
    let mut client = ChatClient::try_new(
        &project_settings,
        accounts,
        store,
        Arc::new(MemoryRouter::at(Route::ChatRoot)),
        Arc::new(ConsoleAlerts),
    )?;

    client.start();
    let result = run_console(&mut client).await;
    client.stop();

    match &result {
        Ok(()) => info!("client shut down"),
        Err(e) => error!("console failed: {:#}", e),
    }
    result
}
