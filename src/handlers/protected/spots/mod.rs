pub mod collection;
pub mod record;
pub mod scoped;

pub use collection::get as spots_get;
pub use collection::post as spots_post;

pub use record::delete as spot_delete;
pub use record::get as spot_get;
pub use record::order_patch as spot_order_patch;
pub use record::put as spot_put;
pub use record::visited_patch as spot_visited_patch;

pub use scoped::by_day as spots_by_day_get;
pub use scoped::by_trip as spots_by_trip_get;
