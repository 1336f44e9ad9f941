use anyhow::Context;

use tourstore::config::Settings;
use tourstore::schema::empty_db;
use tourstore::{establish_connection, init_logging};

fn main() -> anyhow::Result<()> {
    init_logging();

    let settings = Settings::from_env()?;
    let mut db = establish_connection(&settings.database_url)?;
    empty_db(&mut db).context("Failed to empty DB")?;
    Ok(())
}
