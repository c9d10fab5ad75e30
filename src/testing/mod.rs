//! Fixtures shared by the unit tests

use chrono::NaiveDate;
use sqlx::SqlitePool;
use tempfile::TempDir;

use crate::config::DatabaseConfig;
use crate::database::manager::connect_and_migrate;
use crate::database::models::{ExpenseFields, MemoryFields, NewTrip, SpotFields};

/// Migrated pool backed by a file in a fresh temp dir. Keep the `TempDir`
/// alive for as long as the pool is used.
pub async fn test_pool() -> (SqlitePool, TempDir) {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = DatabaseConfig {
        url: format!("sqlite://{}", dir.path().join("test.db").display()),
        max_connections: 4,
        connection_timeout: 5,
    };
    let pool = connect_and_migrate(&config).await.expect("test database");
    (pool, dir)
}

/// Insert a user row directly and return its id
pub async fn seed_user(pool: &SqlitePool, username: &str) -> i64 {
    sqlx::query("INSERT INTO users (username, password_hash) VALUES (?, 'not-a-hash')")
        .bind(username)
        .execute(pool)
        .await
        .expect("seed user")
        .last_insert_rowid()
}

pub fn date(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").expect("valid date")
}

/// Three-day Kyoto trip with a 30000 budget
pub fn kyoto_trip() -> NewTrip {
    NewTrip {
        title: "Kyoto".to_string(),
        destination: "Kyoto".to_string(),
        start_date: date("2024-04-01"),
        end_date: date("2024-04-03"),
        description: String::new(),
        budget: 30000.0,
        cover_image: None,
    }
}

pub fn spot_fields(name: &str, day: Option<i64>) -> SpotFields {
    SpotFields {
        trip_day_id: day,
        name: name.to_string(),
        category: "sightseeing".to_string(),
        lat: None,
        lng: None,
        address: String::new(),
        description: String::new(),
        visit_time: None,
        duration: 60,
        cost: 0.0,
        notes: String::new(),
        rating: 0,
        image_url: None,
    }
}

pub fn expense_fields(category: &str, amount: f64, currency: &str) -> ExpenseFields {
    ExpenseFields {
        trip_spot_id: None,
        category: category.to_string(),
        description: String::new(),
        amount,
        currency: currency.to_string(),
        date: date("2024-04-01"),
        payment_method: "cash".to_string(),
        receipt_image: None,
    }
}

pub fn memory_fields(title: &str, day: &str) -> MemoryFields {
    MemoryFields {
        trip_spot_id: None,
        title: title.to_string(),
        content: String::new(),
        emotion: String::new(),
        weather: String::new(),
        date: date(day),
        media_url: None,
    }
}
