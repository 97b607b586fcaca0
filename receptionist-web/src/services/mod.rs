pub mod api_client;
pub mod error;
pub mod metrics;

pub use api_client::ReceptionistApi;
pub use error::ApiError;
