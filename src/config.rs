//! Command line and environment configuration shared by the binaries.

use clap::Args;

use crate::Error;

/// The header set by the identity provider when none is configured.
pub const DEFAULT_OWNER_HEADER: &str = "x-forwarded-user";

/// Where to find the SQLite database.
#[derive(Args, Debug, Clone)]
pub struct DatabaseArgs {
    /// File path to the application SQLite database.
    ///
    /// Surrounding quotes and a leading `sqlite://` or `sqlite:` are ignored.
    #[arg(long, env = "DATABASE_URL")]
    pub db_path: String,
}

impl DatabaseArgs {
    /// The database path with quotes and URL scheme removed.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidDatabasePath] if nothing is left after cleaning.
    pub fn path(&self) -> Result<String, Error> {
        clean_db_path(&self.db_path)
    }
}

/// Settings for the web server.
#[derive(Args, Debug, Clone)]
pub struct ServerArgs {
    /// The address to serve the app from.
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// The port to serve the app from.
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// The canonical name of the timezone that dates are shown and compared in, e.g. "Pacific/Auckland".
    #[arg(long, env = "TIMEZONE", default_value = "Etc/UTC")]
    pub timezone: String,

    /// The request header that carries the signed-in user's ID.
    #[arg(long, env = "OWNER_HEADER", default_value = DEFAULT_OWNER_HEADER)]
    pub owner_header: String,
}

/// Remove whitespace, surrounding quotes and a `sqlite:` scheme from a database path.
///
/// Paths copied out of `.env` files and connection strings often carry these.
pub fn clean_db_path(raw: &str) -> Result<String, Error> {
    let mut path = raw.trim();

    for quote in ['"', '\''] {
        if path.len() >= 2 && path.starts_with(quote) && path.ends_with(quote) {
            path = path[1..path.len() - 1].trim();
        }
    }

    let path = path
        .strip_prefix("sqlite://")
        .or_else(|| path.strip_prefix("sqlite:"))
        .unwrap_or(path)
        .trim();

    if path.is_empty() {
        return Err(Error::InvalidDatabasePath);
    }

    Ok(path.to_owned())
}
