pub mod collection;
pub mod record;

pub use collection::get as trips_get;
pub use collection::post as trips_post;

pub use record::delete as trip_delete;
pub use record::get as trip_get;
pub use record::put as trip_put;
pub use record::status_patch as trip_status_patch;
