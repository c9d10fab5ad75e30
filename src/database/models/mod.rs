pub mod expense;
pub mod memory;
pub mod spot;
pub mod trip;
pub mod trip_day;
pub mod user;

pub use expense::*;
pub use memory::*;
pub use spot::*;
pub use trip::*;
pub use trip_day::*;
pub use user::*;
