//! CLI smoke entry point.
//!
//! # Responsibility
//! - Open the store named by `MICROBLOG_*` environment variables.
//! - Print version, schema version and row counts in a stable
//!   `key=value` format.

use microblog_core::db::migrations::current_version;
use microblog_core::{
    core_version, db, init_from_config, PostRepository, SqlitePostRepository,
    SqliteUserRepository, StoreConfig, UserRepository,
};
use std::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("event=cli_run module=cli status=error error={err}");
            eprintln!("microblog error={err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let config = StoreConfig::from_env();
    init_from_config(&config)?;

    let conn = db::open_configured(&config)?;
    let users = SqliteUserRepository::try_new(&conn)?.count_users()?;
    let posts = SqlitePostRepository::try_new(&conn)?.count_posts()?;

    println!("microblog version={}", core_version());
    println!("microblog schema_version={}", current_version(&conn)?);
    println!("microblog users={users} posts={posts}");
    Ok(())
}
