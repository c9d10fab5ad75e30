pub mod manager;
pub mod models;
pub mod repositories;
pub mod schema;

pub use manager::{begin_write, connect, connect_and_migrate, health_check, DatabaseError};
pub use repositories::{
    ExpenseRepository, MemoryRepository, SpotRepository, TripDayRepository, TripRepository,
    UserRepository,
};
