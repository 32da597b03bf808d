//! Pure business logic shared by the storage services and the HTTP layer.

pub mod reconciler;
pub mod sanitize;

pub use reconciler::{reconcile, Reconciled};
pub use sanitize::{sanitize_daily_value, sanitize_result_value};
