//! Car queries, including the car–driver assignment table.

use rusqlite::types::Value as SqlValue;
use taxi_core::{TaxiError, TaxiResult};

use crate::lookups::{non_empty, Conditions};
use crate::model::{self, does_not_exist};
use crate::models::{Car, Driver};
use crate::sqlite::SqliteBackend;

/// Narrows the car list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CarFilter {
    /// Case-insensitive substring of `model`.
    pub model: Option<String>,
    /// Exact manufacturer.
    pub manufacturer_id: Option<i64>,
}

impl CarFilter {
    fn conditions(&self) -> Conditions {
        let mut conditions = Conditions::new();
        if let Some(id) = self.manufacturer_id {
            conditions.exact("c.manufacturer_id", id);
        }
        if let Some(model) = non_empty(self.model.as_deref()) {
            conditions.icontains("c.model", model);
        }
        conditions
    }
}

/// Editable car fields, including the full set of assigned drivers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CarData {
    pub model: String,
    pub manufacturer_id: i64,
    pub driver_ids: Vec<i64>,
}

/// Lists cars ordered by id.
pub async fn list(db: &SqliteBackend, filter: &CarFilter) -> TaxiResult<Vec<Car>> {
    model::fetch_all(db, filter.conditions()).await
}

/// Fetches one car with its manufacturer.
pub async fn get(db: &SqliteBackend, id: i64) -> TaxiResult<Car> {
    model::fetch_one(db, id).await
}

/// Inserts a car and its driver assignments in one transaction.
pub async fn create(db: &SqliteBackend, data: &CarData) -> TaxiResult<Car> {
    let data_owned = data.clone();
    let id = db
        .run(move |conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO taxi_car (model, manufacturer_id) VALUES (?1, ?2)",
                rusqlite::params![data_owned.model, data_owned.manufacturer_id],
            )?;
            let id = tx.last_insert_rowid();
            replace_drivers(&tx, id, &data_owned.driver_ids)?;
            tx.commit()?;
            Ok(id)
        })
        .await?;
    tracing::info!(id, model = %data.model, "created car");
    get(db, id).await
}

/// Replaces a car's fields and its driver assignments in one transaction.
pub async fn update(db: &SqliteBackend, id: i64, data: &CarData) -> TaxiResult<Car> {
    let data = data.clone();
    let affected = db
        .run(move |conn| {
            let tx = conn.transaction()?;
            let affected = tx.execute(
                "UPDATE taxi_car SET model = ?1, manufacturer_id = ?2 WHERE id = ?3",
                rusqlite::params![data.model, data.manufacturer_id, id],
            )?;
            if affected > 0 {
                replace_drivers(&tx, id, &data.driver_ids)?;
            }
            tx.commit()?;
            Ok(affected)
        })
        .await?;
    if affected == 0 {
        return Err(does_not_exist::<Car>(id));
    }
    tracing::info!(id, "updated car");
    get(db, id).await
}

fn replace_drivers(tx: &rusqlite::Transaction<'_>, car_id: i64, driver_ids: &[i64]) -> rusqlite::Result<()> {
    tx.execute("DELETE FROM taxi_car_drivers WHERE car_id = ?1", [car_id])?;
    let mut insert = tx.prepare(
        "INSERT OR IGNORE INTO taxi_car_drivers (car_id, driver_id) VALUES (?1, ?2)",
    )?;
    for driver_id in driver_ids {
        insert.execute([car_id, *driver_id])?;
    }
    Ok(())
}

/// Deletes a car and its assignments.
pub async fn delete(db: &SqliteBackend, id: i64) -> TaxiResult<()> {
    model::delete::<Car>(db, id).await
}

/// Counts all cars.
pub async fn count(db: &SqliteBackend) -> TaxiResult<i64> {
    model::count::<Car>(db).await
}

/// Drivers assigned to a car, ordered by username.
pub async fn drivers(db: &SqliteBackend, car_id: i64) -> TaxiResult<Vec<Driver>> {
    let mut conditions = Conditions::new();
    conditions.raw(
        "id IN (SELECT driver_id FROM taxi_car_drivers WHERE car_id = ?)",
        [SqlValue::Integer(car_id)],
    );
    model::fetch_all(db, conditions).await
}

/// Primary keys of the drivers assigned to a car.
pub async fn driver_ids(db: &SqliteBackend, car_id: i64) -> TaxiResult<Vec<i64>> {
    db.run(move |conn| {
        let mut stmt = conn.prepare(
            "SELECT driver_id FROM taxi_car_drivers WHERE car_id = ?1 ORDER BY driver_id",
        )?;
        let ids = stmt.query_map([car_id], |row| row.get(0))?;
        ids.collect()
    })
    .await
}

/// Cars a driver is assigned to, ordered by id.
pub async fn for_driver(db: &SqliteBackend, driver_id: i64) -> TaxiResult<Vec<Car>> {
    let mut conditions = Conditions::new();
    conditions.raw(
        "c.id IN (SELECT car_id FROM taxi_car_drivers WHERE driver_id = ?)",
        [SqlValue::Integer(driver_id)],
    );
    model::fetch_all(db, conditions).await
}

/// Cars made by one manufacturer.
pub async fn for_manufacturer(db: &SqliteBackend, manufacturer_id: i64) -> TaxiResult<Vec<Car>> {
    list(
        db,
        &CarFilter {
            model: None,
            manufacturer_id: Some(manufacturer_id),
        },
    )
    .await
}

/// Flips whether `driver_id` is assigned to `car_id`.
///
/// Returns `true` if the driver is assigned afterwards. The check and the
/// write happen in one transaction under the connection lock, so concurrent
/// toggles serialize and the later one wins.
pub async fn toggle_driver(db: &SqliteBackend, car_id: i64, driver_id: i64) -> TaxiResult<bool> {
    let assigned = db
        .run(move |conn| {
            let tx = conn.transaction()?;
            let car_exists: bool = tx.query_row(
                "SELECT EXISTS(SELECT 1 FROM taxi_car WHERE id = ?1)",
                [car_id],
                |row| row.get(0),
            )?;
            if !car_exists {
                return Err(rusqlite::Error::QueryReturnedNoRows);
            }
            let removed = tx.execute(
                "DELETE FROM taxi_car_drivers WHERE car_id = ?1 AND driver_id = ?2",
                [car_id, driver_id],
            )?;
            if removed == 0 {
                tx.execute(
                    "INSERT INTO taxi_car_drivers (car_id, driver_id) VALUES (?1, ?2)",
                    [car_id, driver_id],
                )?;
            }
            tx.commit()?;
            Ok(removed == 0)
        })
        .await
        .map_err(|e| match e {
            TaxiError::DoesNotExist(_) => does_not_exist::<Car>(car_id),
            other => other,
        })?;
    tracing::info!(car_id, driver_id, assigned, "toggled car assignment");
    Ok(assigned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers;
    use crate::manufacturers::{self, ManufacturerData};
    use crate::models::NewDriver;
    use crate::schema;

    struct Fixture {
        db: SqliteBackend,
        manufacturer_id: i64,
        driver_ids: Vec<i64>,
    }

    async fn setup() -> Fixture {
        let db = SqliteBackend::memory().unwrap();
        schema::migrate(&db).await.unwrap();
        let manufacturer = manufacturers::create(
            &db,
            &ManufacturerData {
                name: "test".to_string(),
                country: "test".to_string(),
            },
        )
        .await
        .unwrap();
        let mut driver_ids = Vec::new();
        for (username, license) in [("user1", "AAA11111"), ("user2", "BBB22222")] {
            let driver = drivers::insert(
                &db,
                &NewDriver {
                    username: username.to_string(),
                    password: "!".to_string(),
                    license_number: Some(license.to_string()),
                    ..NewDriver::default()
                },
            )
            .await
            .unwrap();
            driver_ids.push(driver.id);
        }
        Fixture {
            db,
            manufacturer_id: manufacturer.id,
            driver_ids,
        }
    }

    fn car(model: &str, manufacturer_id: i64) -> CarData {
        CarData {
            model: model.to_string(),
            manufacturer_id,
            driver_ids: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_create_loads_manufacturer() {
        let f = setup().await;
        let created = create(&f.db, &car("test1", f.manufacturer_id)).await.unwrap();
        assert_eq!(created.model, "test1");
        assert_eq!(created.manufacturer.name, "test");
    }

    #[tokio::test]
    async fn test_list_filters_by_model() {
        let f = setup().await;
        let car1 = create(&f.db, &car("test1", f.manufacturer_id)).await.unwrap();
        create(&f.db, &car("other", f.manufacturer_id)).await.unwrap();

        let filter = CarFilter {
            model: Some(car1.model.clone()),
            ..CarFilter::default()
        };
        let found = list(&f.db, &filter).await.unwrap();
        assert_eq!(found, vec![car1]);
    }

    #[tokio::test]
    async fn test_list_orders_by_id() {
        let f = setup().await;
        create(&f.db, &car("b", f.manufacturer_id)).await.unwrap();
        create(&f.db, &car("a", f.manufacturer_id)).await.unwrap();
        let models: Vec<String> = list(&f.db, &CarFilter::default())
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.model)
            .collect();
        assert_eq!(models, ["b", "a"]);
    }

    #[tokio::test]
    async fn test_create_with_drivers_and_update_replaces_them() {
        let f = setup().await;
        let mut data = car("x", f.manufacturer_id);
        data.driver_ids = f.driver_ids.clone();
        let created = create(&f.db, &data).await.unwrap();
        assert_eq!(driver_ids(&f.db, created.id).await.unwrap(), f.driver_ids);

        data.driver_ids = vec![f.driver_ids[1]];
        update(&f.db, created.id, &data).await.unwrap();
        let assigned = drivers(&f.db, created.id).await.unwrap();
        assert_eq!(assigned.len(), 1);
        assert_eq!(assigned[0].username, "user2");
    }

    #[tokio::test]
    async fn test_toggle_adds_then_removes() {
        let f = setup().await;
        let created = create(&f.db, &car("x", f.manufacturer_id)).await.unwrap();
        let driver = f.driver_ids[0];

        assert!(toggle_driver(&f.db, created.id, driver).await.unwrap());
        assert_eq!(driver_ids(&f.db, created.id).await.unwrap(), vec![driver]);
        assert_eq!(for_driver(&f.db, driver).await.unwrap().len(), 1);

        assert!(!toggle_driver(&f.db, created.id, driver).await.unwrap());
        assert!(driver_ids(&f.db, created.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_toggle_missing_car_is_not_found() {
        let f = setup().await;
        let err = toggle_driver(&f.db, 999, f.driver_ids[0]).await.unwrap_err();
        assert_eq!(err.status_code(), 404);
    }

    #[tokio::test]
    async fn test_deleting_manufacturer_cascades_to_cars() {
        let f = setup().await;
        let mut data = car("x", f.manufacturer_id);
        data.driver_ids = f.driver_ids.clone();
        create(&f.db, &data).await.unwrap();
        manufacturers::delete(&f.db, f.manufacturer_id).await.unwrap();
        assert_eq!(count(&f.db).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_deleting_driver_removes_assignment() {
        let f = setup().await;
        let mut data = car("x", f.manufacturer_id);
        data.driver_ids = f.driver_ids.clone();
        let created = create(&f.db, &data).await.unwrap();
        drivers::delete(&f.db, f.driver_ids[0]).await.unwrap();
        assert_eq!(driver_ids(&f.db, created.id).await.unwrap(), vec![f.driver_ids[1]]);
    }

    #[tokio::test]
    async fn test_unknown_manufacturer_is_integrity_error() {
        let f = setup().await;
        let err = create(&f.db, &car("x", 12345)).await.unwrap_err();
        assert!(matches!(err, TaxiError::IntegrityError(_)));
    }

    #[tokio::test]
    async fn test_for_manufacturer() {
        let f = setup().await;
        create(&f.db, &car("x", f.manufacturer_id)).await.unwrap();
        assert_eq!(for_manufacturer(&f.db, f.manufacturer_id).await.unwrap().len(), 1);
        assert!(for_manufacturer(&f.db, f.manufacturer_id + 1).await.unwrap().is_empty());
    }
}
