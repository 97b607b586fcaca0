pub mod billing;
pub mod calendar;
pub mod call;
pub mod context;
pub mod shop;
pub mod timestamp;
pub mod user;

pub use billing::{
    CheckoutRequest, CheckoutResponse, PlanTier, PortalRequest, PortalResponse, QuotaStatus,
    Subscription, SubscriptionStatus, Usage,
};
pub use calendar::{CalendarAuthorization, CalendarDisconnect, CalendarStatus};
pub use call::{CallAnalytics, CallIntent, CallLog, CallOutcome, DailyCallCount};
pub use context::{CustomerContext, InteractionRecord};
pub use shop::{AdapterType, ShopConfig, ShopConfigCreate, ShopConfigUpdate, ShopSettings};
pub use user::{AuthUser, UserProfile};
