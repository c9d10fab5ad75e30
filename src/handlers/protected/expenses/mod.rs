pub mod collection;
pub mod record;
pub mod reports;

pub use collection::by_trip as expenses_by_trip_get;
pub use collection::get as expenses_get;
pub use collection::post as expenses_post;

pub use record::delete as expense_delete;
pub use record::get as expense_get;
pub use record::put as expense_put;

pub use reports::budget_comparison as expenses_budget_get;
pub use reports::daily as expenses_daily_get;
pub use reports::summary as expenses_summary_get;
