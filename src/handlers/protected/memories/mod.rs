pub mod collection;
pub mod record;
pub mod reports;

pub use collection::by_spot as memories_by_spot_get;
pub use collection::by_trip as memories_by_trip_get;
pub use collection::get as memories_get;
pub use collection::post as memories_post;

pub use record::delete as memory_delete;
pub use record::get as memory_get;
pub use record::put as memory_put;

pub use reports::daily as memories_daily_get;
pub use reports::emotions as memories_emotions_get;
pub use reports::stats as memories_stats_get;
pub use reports::weather as memories_weather_get;
