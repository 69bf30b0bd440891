use hrdesk::{Config, Session};

pub async fn initialize(config: &Config) -> Result<Session, hrdesk::Error> {
	let url = config.connection_url()?;
	let session = Session::connect(&url, config.max_connections).await?;
	log::debug!("connected, {} table(s) available", session.tables().len());
	Ok(session)
}
