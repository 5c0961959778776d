//! Model structs for manufacturers, cars and drivers.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{parse_timestamp, Model};

/// A car manufacturer. Names are unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manufacturer {
    pub id: i64,
    pub name: String,
    pub country: String,
}

impl fmt::Display for Manufacturer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.country)
    }
}

impl Model for Manufacturer {
    fn table_name() -> &'static str {
        "taxi_manufacturer"
    }

    fn verbose_name() -> &'static str {
        "manufacturer"
    }

    fn select_sql() -> &'static str {
        "SELECT id, name, country FROM taxi_manufacturer"
    }

    fn pk_column() -> &'static str {
        "id"
    }

    fn ordering() -> &'static str {
        "name ASC"
    }

    fn pk(&self) -> i64 {
        self.id
    }

    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            country: row.get(2)?,
        })
    }
}

/// A car, always loaded together with its manufacturer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Car {
    pub id: i64,
    pub model: String,
    pub manufacturer: Manufacturer,
}

impl Car {
    /// Returns the manufacturer's primary key.
    pub const fn manufacturer_id(&self) -> i64 {
        self.manufacturer.id
    }
}

impl fmt::Display for Car {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.model)
    }
}

impl Model for Car {
    fn table_name() -> &'static str {
        "taxi_car"
    }

    fn verbose_name() -> &'static str {
        "car"
    }

    fn select_sql() -> &'static str {
        "SELECT c.id, c.model, m.id, m.name, m.country \
         FROM taxi_car c JOIN taxi_manufacturer m ON m.id = c.manufacturer_id"
    }

    fn pk_column() -> &'static str {
        "c.id"
    }

    fn ordering() -> &'static str {
        "c.id ASC"
    }

    fn pk(&self) -> i64 {
        self.id
    }

    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            model: row.get(1)?,
            manufacturer: Manufacturer {
                id: row.get(2)?,
                name: row.get(3)?,
                country: row.get(4)?,
            },
        })
    }
}

/// A driver account. Drivers log in, and carry a license number.
///
/// `license_number` is absent for accounts created outside the driver form,
/// such as a superuser created from the command line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Driver {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub is_active: bool,
    pub date_joined: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
    pub license_number: Option<String>,
}

impl Driver {
    /// Returns the URL of this driver's detail page.
    pub fn get_absolute_url(&self) -> String {
        format!("/drivers/{}/", self.id)
    }

    /// Returns "first last", trimmed.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

impl fmt::Display for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} {})", self.username, self.first_name, self.last_name)
    }
}

impl Model for Driver {
    fn table_name() -> &'static str {
        "taxi_driver"
    }

    fn verbose_name() -> &'static str {
        "driver"
    }

    fn select_sql() -> &'static str {
        "SELECT id, username, password, first_name, last_name, email, is_staff, \
         is_superuser, is_active, date_joined, last_login, license_number FROM taxi_driver"
    }

    fn pk_column() -> &'static str {
        "id"
    }

    fn ordering() -> &'static str {
        "username ASC"
    }

    fn pk(&self) -> i64 {
        self.id
    }

    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        let last_login: Option<String> = row.get(10)?;
        Ok(Self {
            id: row.get(0)?,
            username: row.get(1)?,
            password: row.get(2)?,
            first_name: row.get(3)?,
            last_name: row.get(4)?,
            email: row.get(5)?,
            is_staff: row.get(6)?,
            is_superuser: row.get(7)?,
            is_active: row.get(8)?,
            date_joined: parse_timestamp(9, &row.get::<_, String>(9)?)?,
            last_login: last_login
                .as_deref()
                .map(|s| parse_timestamp(10, s))
                .transpose()?,
            license_number: row.get(11)?,
        })
    }
}

/// Values for inserting a driver. `password` must already be encoded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewDriver {
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub license_number: Option<String>,
}
