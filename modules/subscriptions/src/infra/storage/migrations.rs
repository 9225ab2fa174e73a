use sqlx::migrate::Migrator;

/// Schema migrations embedded from `migrations/` at build time.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");
