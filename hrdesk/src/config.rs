//! Runtime configuration, loaded from environment variables.

use std::path::PathBuf;

use crate::{database::Drivers, document::DocumentFormat, Error};

/// Server + database pair used to compose a connection URL.
///
/// This is the structured form of a `Server=<host>;Database=<name>` connection string.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConnectionSettings {
    pub server: String,
    pub database: String,
    /// `postgres`, `mysql` or `sqlite`.
    pub driver: String,
    pub user: Option<String>,
    pub password: Option<String>,
}

impl ConnectionSettings {
    pub fn new(server: impl Into<String>, database: impl Into<String>, driver: impl Into<String>) -> Self {
        Self { server: server.into(), database: database.into(), driver: driver.into(), user: None, password: None }
    }

    /// Builds the URL the pool connects with.
    pub fn url(&self) -> Result<String, Error> {
        let server = self.server.trim();
        let database = self.database.trim();
        if server.is_empty() || database.is_empty() {
            return Err(Error::Connection("Server name and database name cannot be empty.".to_string()));
        }

        let credentials = match (&self.user, &self.password) {
            (Some(user), Some(password)) => format!("{}:{}@", user, password),
            (Some(user), None) => format!("{}@", user),
            _ => String::new(),
        };

        match self.driver.trim().to_ascii_lowercase().as_str() {
            "" | "postgres" | "postgresql" => Ok(format!("postgres://{}{}/{}", credentials, server, database)),
            "mysql" | "mariadb" => Ok(format!("mysql://{}{}/{}", credentials, server, database)),
            // The server name only identifies the host for file databases; the path is the database.
            "sqlite" => Ok(format!("sqlite://{}?mode=rwc", database)),
            other => Err(Error::Connection(format!("unsupported driver '{}'", other))),
        }
    }

    pub fn driver(&self) -> Result<Drivers, Error> {
        Ok(Drivers::from_url(&self.url()?))
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    /// Full connection URL; takes precedence over `connection`.
    pub database_url: Option<String>,
    pub connection: ConnectionSettings,
    /// Directory that holds the `Docs/` tree.
    pub docs_dir: PathBuf,
    pub document_format: DocumentFormat,
    pub max_connections: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            connection: ConnectionSettings::new("", "", "postgres"),
            docs_dir: PathBuf::from("."),
            document_format: DocumentFormat::Text,
            max_connections: 5,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let database_url = std::env::var("DATABASE_URL").ok().filter(|s| !s.trim().is_empty());
        let connection = ConnectionSettings {
            server: std::env::var("HRDESK_SERVER").unwrap_or_default(),
            database: std::env::var("HRDESK_DATABASE").unwrap_or_default(),
            driver: std::env::var("HRDESK_DRIVER").unwrap_or_else(|_| "postgres".to_string()),
            user: std::env::var("HRDESK_USER").ok(),
            password: std::env::var("HRDESK_PASSWORD").ok(),
        };
        let docs_dir = std::env::var("HRDESK_DOCS_DIR").map(PathBuf::from).unwrap_or_else(|_| PathBuf::from("."));
        let document_format = match std::env::var("HRDESK_DOCUMENT_FORMAT") {
            Ok(raw) => raw.parse().unwrap_or_else(|_| {
                log::warn!("HRDESK_DOCUMENT_FORMAT '{}' not recognised -- using text", raw);
                DocumentFormat::Text
            }),
            Err(_) => DocumentFormat::Text,
        };
        let max_connections = std::env::var("HRDESK_MAX_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5);

        if database_url.is_none() && connection.server.is_empty() {
            log::warn!("neither DATABASE_URL nor HRDESK_SERVER is set -- a connection URL must be given explicitly");
        }

        Self { database_url, connection, docs_dir, document_format, max_connections }
    }

    /// The URL to connect with: `DATABASE_URL` if set, otherwise one composed from the
    /// server and database names.
    pub fn connection_url(&self) -> Result<String, Error> {
        match &self.database_url {
            Some(url) => Ok(url.clone()),
            None => self.connection.url(),
        }
    }
}
