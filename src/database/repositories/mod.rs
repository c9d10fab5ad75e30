pub mod expenses;
pub mod memories;
pub mod spots;
pub mod trip_days;
pub mod trips;
pub mod users;

pub use expenses::ExpenseRepository;
pub use memories::MemoryRepository;
pub use spots::SpotRepository;
pub use trip_days::TripDayRepository;
pub use trips::TripRepository;
pub use users::UserRepository;

use sqlx::SqliteConnection;

/// The stored file URL an update displaces, if it sets a different one
pub(crate) fn replaced_file(previous: Option<String>, incoming: &Option<String>) -> Option<String> {
    incoming.as_ref()?;
    previous.filter(|old| Some(old) != incoming.as_ref())
}

use super::manager::DatabaseError;

/// Confirm that `trip_id` belongs to `owner` inside an open transaction or connection.
pub(crate) async fn ensure_trip_owned(
    conn: &mut SqliteConnection,
    owner: i64,
    trip_id: i64,
) -> Result<(), DatabaseError> {
    let found: Option<i64> = sqlx::query_scalar("SELECT id FROM trips WHERE id = ? AND user_id = ?")
        .bind(trip_id)
        .bind(owner)
        .fetch_optional(&mut *conn)
        .await?;
    found.map(|_| ()).ok_or(DatabaseError::NotFound("Trip"))
}

/// Confirm that an optional linked spot belongs to the same trip and owner.
pub(crate) async fn ensure_spot_in_trip(
    conn: &mut SqliteConnection,
    owner: i64,
    trip_id: i64,
    spot_id: Option<i64>,
) -> Result<(), DatabaseError> {
    let Some(spot_id) = spot_id else {
        return Ok(());
    };
    let found: Option<i64> = sqlx::query_scalar(
        "SELECT id FROM trip_spots WHERE id = ? AND trip_id = ? AND user_id = ?",
    )
    .bind(spot_id)
    .bind(trip_id)
    .bind(owner)
    .fetch_optional(&mut *conn)
    .await?;
    found.map(|_| ()).ok_or(DatabaseError::NotFound("Spot"))
}
