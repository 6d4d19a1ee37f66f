//! Create the finance tracker's database tables ahead of the first server start.

use std::{error::Error, path::Path};

use clap::Parser;
use rusqlite::Connection;

use finance_tracker::{DatabaseArgs, init_tracing, initialize_db};

/// Create or upgrade the SQLite database used by the server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[command(flatten)]
    database: DatabaseArgs,
}

fn main() -> Result<(), Box<dyn Error>> {
    init_tracing(Path::new("debug.log"))?;

    let args = Args::parse();
    let db_path = args.database.path()?;

    tracing::info!("Setting up database at {db_path}");
    let connection = Connection::open(&db_path)?;

    if let Err(error) = initialize_db(&connection) {
        tracing::error!("Could not create the database tables: {error}");
        return Err(error.into());
    }

    tracing::info!("Database is ready");

    Ok(())
}
