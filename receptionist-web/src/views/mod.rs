//! Presentation state derived from API data. Templates only read these.

pub mod analytics;
pub mod billing;
pub mod calls;
pub mod status;

pub use analytics::AnalyticsView;
pub use billing::{PlanAction, PlanCard, PlanInfo, UsageMeter, UsageState};
pub use calls::{CallDetail, CallRow};
pub use status::ShopStatus;
