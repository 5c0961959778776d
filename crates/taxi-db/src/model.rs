//! The [`Model`] trait and generic queries shared by every model.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use taxi_core::{TaxiError, TaxiResult};

use crate::lookups::Conditions;
use crate::sqlite::SqliteBackend;

/// A row type stored in one table.
///
/// `select_sql` may join other tables; `pk_column` is the qualified primary
/// key column usable in its WHERE clause.
pub trait Model: Sized + Send + 'static {
    /// Returns the database table name.
    fn table_name() -> &'static str;

    /// Returns the human-readable singular name (e.g. "car").
    fn verbose_name() -> &'static str;

    /// Returns the SELECT statement, without WHERE or ORDER BY.
    fn select_sql() -> &'static str;

    /// Returns the primary key column as it appears in `select_sql`.
    fn pk_column() -> &'static str;

    /// Returns the default ORDER BY expression.
    fn ordering() -> &'static str;

    /// Returns this row's primary key.
    fn pk(&self) -> i64;

    /// Builds an instance from a row produced by `select_sql`.
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self>;
}

/// Returns the rows matching `conditions` in default ordering.
pub async fn fetch_all<M: Model>(db: &SqliteBackend, conditions: Conditions) -> TaxiResult<Vec<M>> {
    let sql = format!(
        "{}{} ORDER BY {}",
        M::select_sql(),
        conditions.where_sql(),
        M::ordering()
    );
    let params = conditions.into_params();
    db.run(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(params.iter()), |row| M::from_row(row))?;
        rows.collect()
    })
    .await
}

/// Returns the row with primary key `pk`.
///
/// A missing row is [`TaxiError::DoesNotExist`], which renders as a 404.
pub async fn fetch_one<M: Model>(db: &SqliteBackend, pk: i64) -> TaxiResult<M> {
    let sql = format!("{} WHERE {} = ?1", M::select_sql(), M::pk_column());
    db.run(move |conn| conn.query_row(&sql, [pk], |row| M::from_row(row)))
        .await
        .map_err(|e| match e {
            TaxiError::DoesNotExist(_) => does_not_exist::<M>(pk),
            other => other,
        })
}

/// Returns the number of rows in the model's table.
pub async fn count<M: Model>(db: &SqliteBackend) -> TaxiResult<i64> {
    let sql = format!("SELECT COUNT(*) FROM {}", M::table_name());
    db.run(move |conn| conn.query_row(&sql, [], |row| row.get(0)))
        .await
}

/// Deletes the row with primary key `pk`. Related rows cascade.
pub async fn delete<M: Model>(db: &SqliteBackend, pk: i64) -> TaxiResult<()> {
    let sql = format!("DELETE FROM {} WHERE id = ?1", M::table_name());
    let affected = db.run(move |conn| conn.execute(&sql, [pk])).await?;
    if affected == 0 {
        return Err(does_not_exist::<M>(pk));
    }
    tracing::info!(table = M::table_name(), pk, "deleted row");
    Ok(())
}

/// Returns `true` if some row satisfies `conditions`.
pub async fn exists<M: Model>(db: &SqliteBackend, conditions: Conditions) -> TaxiResult<bool> {
    let sql = format!(
        "SELECT EXISTS(SELECT 1 FROM {}{})",
        M::table_name(),
        conditions.where_sql()
    );
    let params = conditions.into_params();
    db.run(move |conn| {
        conn.query_row(&sql, rusqlite::params_from_iter(params.iter()), |row| row.get(0))
    })
    .await
}

/// The error for a missing primary key.
pub fn does_not_exist<M: Model>(pk: i64) -> TaxiError {
    TaxiError::DoesNotExist(format!(
        "No {} matching id {pk} exists",
        M::verbose_name()
    ))
}

/// Formats a timestamp for storage (RFC 3339, microseconds, `Z`).
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parses a stored timestamp from column `idx`.
pub fn parse_timestamp(idx: usize, value: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Manufacturer;
    use crate::schema;

    async fn db_with_manufacturers() -> SqliteBackend {
        let db = SqliteBackend::memory().unwrap();
        schema::migrate(&db).await.unwrap();
        db.run(|conn| {
            conn.execute_batch(
                "INSERT INTO taxi_manufacturer (name, country) VALUES ('Volvo', 'Sweden');
                 INSERT INTO taxi_manufacturer (name, country) VALUES ('Audi', 'Germany');",
            )
        })
        .await
        .unwrap();
        db
    }

    #[tokio::test]
    async fn test_fetch_all_uses_default_ordering() {
        let db = db_with_manufacturers().await;
        let all: Vec<Manufacturer> = fetch_all(&db, Conditions::new()).await.unwrap();
        let names: Vec<_> = all.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["Audi", "Volvo"]);
    }

    #[tokio::test]
    async fn test_fetch_one_missing_is_does_not_exist() {
        let db = db_with_manufacturers().await;
        let err = fetch_one::<Manufacturer>(&db, 99).await.unwrap_err();
        assert!(matches!(err, TaxiError::DoesNotExist(ref msg) if msg.contains("manufacturer")));
    }

    #[tokio::test]
    async fn test_count_and_delete() {
        let db = db_with_manufacturers().await;
        assert_eq!(count::<Manufacturer>(&db).await.unwrap(), 2);
        delete::<Manufacturer>(&db, 1).await.unwrap();
        assert_eq!(count::<Manufacturer>(&db).await.unwrap(), 1);
        assert!(delete::<Manufacturer>(&db, 1).await.is_err());
    }

    #[tokio::test]
    async fn test_exists() {
        let db = db_with_manufacturers().await;
        let mut cond = Conditions::new();
        cond.exact("name", "Volvo".to_string());
        assert!(exists::<Manufacturer>(&db, cond).await.unwrap());
        let mut cond = Conditions::new();
        cond.exact("name", "Saab".to_string());
        assert!(!exists::<Manufacturer>(&db, cond).await.unwrap());
    }

    #[test]
    fn test_timestamp_roundtrip() {
        let now = Utc::now();
        let stored = format_timestamp(&now);
        let parsed = parse_timestamp(0, &stored).unwrap();
        assert_eq!(parsed.timestamp_micros(), now.timestamp_micros());
    }

    #[test]
    fn test_parse_timestamp_rejects_garbage() {
        assert!(parse_timestamp(3, "yesterday").is_err());
    }
}
