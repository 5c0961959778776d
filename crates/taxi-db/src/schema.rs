//! Table definitions.
//!
//! [`migrate`] is idempotent: every statement is `IF NOT EXISTS`.

use taxi_core::TaxiResult;

use crate::sqlite::SqliteBackend;

/// The full schema, in dependency order.
pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS taxi_manufacturer (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name VARCHAR(255) NOT NULL UNIQUE,
    country VARCHAR(255) NOT NULL
);

CREATE TABLE IF NOT EXISTS taxi_driver (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username VARCHAR(150) NOT NULL UNIQUE,
    password VARCHAR(128) NOT NULL,
    first_name VARCHAR(150) NOT NULL DEFAULT '',
    last_name VARCHAR(150) NOT NULL DEFAULT '',
    email VARCHAR(254) NOT NULL DEFAULT '',
    is_staff BOOLEAN NOT NULL DEFAULT 0,
    is_superuser BOOLEAN NOT NULL DEFAULT 0,
    is_active BOOLEAN NOT NULL DEFAULT 1,
    date_joined TEXT NOT NULL,
    last_login TEXT NULL,
    license_number VARCHAR(255) NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS taxi_car (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    model VARCHAR(255) NOT NULL,
    manufacturer_id INTEGER NOT NULL
        REFERENCES taxi_manufacturer (id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS taxi_car_manufacturer_id ON taxi_car (manufacturer_id);

CREATE TABLE IF NOT EXISTS taxi_car_drivers (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    car_id INTEGER NOT NULL REFERENCES taxi_car (id) ON DELETE CASCADE,
    driver_id INTEGER NOT NULL REFERENCES taxi_driver (id) ON DELETE CASCADE,
    UNIQUE (car_id, driver_id)
);

CREATE INDEX IF NOT EXISTS taxi_car_drivers_driver_id ON taxi_car_drivers (driver_id);
";

/// Creates any missing tables and indexes.
pub async fn migrate(db: &SqliteBackend) -> TaxiResult<()> {
    db.execute_batch(SCHEMA).await?;
    tracing::info!(path = %db.path().display(), "schema is up to date");
    Ok(())
}

/// Returns the names of the tables `migrate` creates that are present.
pub async fn existing_tables(db: &SqliteBackend) -> TaxiResult<Vec<String>> {
    db.run(|conn| {
        let mut stmt = conn.prepare(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name LIKE 'taxi\\_%' ESCAPE '\\' ORDER BY name",
        )?;
        let names = stmt.query_map([], |row| row.get(0))?;
        names.collect()
    })
    .await
}
