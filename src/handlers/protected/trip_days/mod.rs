pub mod collection;
pub mod record;

pub use collection::get as trip_days_get;
pub use collection::post as trip_days_post;

pub use record::delete as trip_day_delete;
pub use record::get as trip_day_get;
pub use record::put as trip_day_put;
