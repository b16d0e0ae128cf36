mod render;

use anyhow::Result;
use tenki_core::{AppError, Config};
use tenki_forecast::{ForecastSession, JmaClient};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize core
    tenki_core::init()?;

    let (config, _warnings) = Config::load_validated()?;
    let office = std::env::args()
        .nth(1)
        .unwrap_or_else(|| config.forecast.default_office.clone());

    tracing::info!("Tenki started (office {})", office);

    let client = JmaClient::from_config(&config)?;
    let mut session = match ForecastSession::start(client).await {
        Ok(session) => session,
        Err(e) => {
            println!("{}", e.user_message());
            return Err(AppError::from(e).into());
        }
    };

    println!("{}", render::sidebar(&session.sidebar()));

    if let Err(e) = session.select_office(&office).await {
        tracing::warn!("Office {} not selectable: {}", office, e);
        println!("{}", e.user_message());
    }

    if let Some(selection) = session.office() {
        println!("{}", render::picker(selection, session.selected_area()));
    }
    print!(
        "{}",
        render::grid(session.grid(), render::columns_for(config.ui.window_width))
    );

    Ok(())
}
