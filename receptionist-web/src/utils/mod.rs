pub mod format;
pub mod htmx;
pub mod jwt;
pub mod phone;
