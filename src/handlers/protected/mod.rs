// handlers/protected/mod.rs - Protected handlers (JWT authentication required)
//
// Every handler takes the caller as `AuthUser` and passes its id to the
// repositories, which scope every read and write to that owner. Records owned
// by someone else look exactly like records that do not exist (404).

pub mod auth; // GET /api/auth/profile
pub mod expenses; // /api/expenses
pub mod memories; // /api/memories
pub mod spots; // /api/trip-spots
pub mod trip_days; // /api/trips/:id/days, /api/trip-days/:id
pub mod trips; // /api/trips
