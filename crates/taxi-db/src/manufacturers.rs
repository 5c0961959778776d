//! Manufacturer queries.

use taxi_core::TaxiResult;

use crate::lookups::{non_empty, Conditions};
use crate::model::{self, does_not_exist};
use crate::models::Manufacturer;
use crate::sqlite::SqliteBackend;

/// Narrows the manufacturer list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManufacturerFilter {
    /// Case-insensitive substring of `name`.
    pub name: Option<String>,
}

impl ManufacturerFilter {
    fn conditions(&self) -> Conditions {
        let mut conditions = Conditions::new();
        if let Some(name) = non_empty(self.name.as_deref()) {
            conditions.icontains("name", name);
        }
        conditions
    }
}

/// Editable manufacturer fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManufacturerData {
    pub name: String,
    pub country: String,
}

/// Lists manufacturers ordered by name.
pub async fn list(db: &SqliteBackend, filter: &ManufacturerFilter) -> TaxiResult<Vec<Manufacturer>> {
    model::fetch_all(db, filter.conditions()).await
}

/// Fetches one manufacturer.
pub async fn get(db: &SqliteBackend, id: i64) -> TaxiResult<Manufacturer> {
    model::fetch_one(db, id).await
}

/// Inserts a manufacturer. A duplicate name is an `IntegrityError`.
pub async fn create(db: &SqliteBackend, data: &ManufacturerData) -> TaxiResult<Manufacturer> {
    let name = data.name.clone();
    let country = data.country.clone();
    let id = db
        .run(move |conn| {
            conn.execute(
                "INSERT INTO taxi_manufacturer (name, country) VALUES (?1, ?2)",
                [&name, &country],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await?;
    tracing::info!(id, name = %data.name, "created manufacturer");
    get(db, id).await
}

/// Replaces a manufacturer's fields.
pub async fn update(db: &SqliteBackend, id: i64, data: &ManufacturerData) -> TaxiResult<Manufacturer> {
    let name = data.name.clone();
    let country = data.country.clone();
    let affected = db
        .run(move |conn| {
            conn.execute(
                "UPDATE taxi_manufacturer SET name = ?1, country = ?2 WHERE id = ?3",
                rusqlite::params![name, country, id],
            )
        })
        .await?;
    if affected == 0 {
        return Err(does_not_exist::<Manufacturer>(id));
    }
    tracing::info!(id, "updated manufacturer");
    get(db, id).await
}

/// Deletes a manufacturer and, by cascade, its cars.
pub async fn delete(db: &SqliteBackend, id: i64) -> TaxiResult<()> {
    model::delete::<Manufacturer>(db, id).await
}

/// Counts all manufacturers.
pub async fn count(db: &SqliteBackend) -> TaxiResult<i64> {
    model::count::<Manufacturer>(db).await
}

/// Returns `true` if another manufacturer already uses `name`.
pub async fn name_exists(db: &SqliteBackend, name: &str, exclude: Option<i64>) -> TaxiResult<bool> {
    let mut conditions = Conditions::new();
    conditions.exact("name", name.to_string());
    if let Some(id) = exclude {
        conditions.not_equal("id", id);
    }
    model::exists::<Manufacturer>(db, conditions).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema;
    use taxi_core::TaxiError;

    async fn setup() -> SqliteBackend {
        let db = SqliteBackend::memory().unwrap();
        schema::migrate(&db).await.unwrap();
        for (name, country) in [("first_name", "first_country"), ("second_name", "second_country")] {
            create(
                &db,
                &ManufacturerData {
                    name: name.to_string(),
                    country: country.to_string(),
                },
            )
            .await
            .unwrap();
        }
        db
    }

    #[tokio::test]
    async fn test_list_unfiltered_returns_all() {
        let db = setup().await;
        let all = list(&db, &ManufacturerFilter::default()).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_list_filters_by_name() {
        let db = setup().await;
        let filter = ManufacturerFilter {
            name: Some("first_name".to_string()),
        };
        let found = list(&db, &filter).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "first_name");
    }

    #[tokio::test]
    async fn test_list_filter_is_case_insensitive_substring() {
        let db = setup().await;
        let filter = ManufacturerFilter {
            name: Some("COND".to_string()),
        };
        let found = list(&db, &filter).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "second_name");
    }

    #[tokio::test]
    async fn test_list_underscore_is_literal() {
        let db = setup().await;
        create(
            &db,
            &ManufacturerData {
                name: "firstXname".to_string(),
                country: "x".to_string(),
            },
        )
        .await
        .unwrap();
        let filter = ManufacturerFilter {
            name: Some("first_".to_string()),
        };
        let found = list(&db, &filter).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "first_name");
    }

    #[tokio::test]
    async fn test_blank_filter_returns_all() {
        let db = setup().await;
        let filter = ManufacturerFilter {
            name: Some("   ".to_string()),
        };
        assert_eq!(list(&db, &filter).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_name_is_integrity_error() {
        let db = setup().await;
        let err = create(
            &db,
            &ManufacturerData {
                name: "first_name".to_string(),
                country: "elsewhere".to_string(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, TaxiError::IntegrityError(_)));
    }

    #[tokio::test]
    async fn test_update_and_name_exists() {
        let db = setup().await;
        let all = list(&db, &ManufacturerFilter::default()).await.unwrap();
        let first = &all[0];
        assert!(name_exists(&db, "second_name", Some(first.id)).await.unwrap());
        assert!(!name_exists(&db, "first_name", Some(first.id)).await.unwrap());

        let updated = update(
            &db,
            first.id,
            &ManufacturerData {
                name: "renamed".to_string(),
                country: "first_country".to_string(),
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.to_string(), "renamed first_country");
    }

    #[tokio::test]
    async fn test_update_missing() {
        let db = setup().await;
        let err = update(&db, 404, &ManufacturerData::default()).await.unwrap_err();
        assert_eq!(err.status_code(), 404);
    }

    #[tokio::test]
    async fn test_delete_and_count() {
        let db = setup().await;
        assert_eq!(count(&db).await.unwrap(), 2);
        delete(&db, 1).await.unwrap();
        assert_eq!(count(&db).await.unwrap(), 1);
    }
}
