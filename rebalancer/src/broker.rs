//! Brokerage session setup for the CLI.

use log::info;
use wholeshare_broker::questrade::QuestradeBroker;

use crate::config::ConnectionConfig;
use crate::error::Result;

/// Open a Questrade session from the configured credentials file.
pub fn connect_questrade(config: &ConnectionConfig) -> Result<QuestradeBroker> {
    info!(
        "Loading credentials from {}",
        config.credentials_file.display()
    );
    Ok(QuestradeBroker::connect(
        &config.credentials_file,
        &config.oauth_url,
        config.timeout(),
    )?)
}

/// Exchange a refresh token and write the credentials file.
pub fn login(config: &ConnectionConfig, refresh_token: &str) -> Result<()> {
    let credentials = QuestradeBroker::login(
        &config.credentials_file,
        &config.oauth_url,
        refresh_token,
        config.timeout(),
    )?;
    info!(
        "Stored credentials for {} in {}",
        credentials.api_server,
        config.credentials_file.display()
    );
    Ok(())
}
