//! Repository trait definitions for storage operations.
//!
//! Storage is split into one focused trait per collection:
//!
//! - [`error`]: Error types for repository operations
//! - [`chart`]: Yearly chart documents keyed by `(year, type)`
//! - [`daily`]: Daily number records keyed by business date
//! - [`result`]: Headline result per draw type
//!
//! # Trait Composition
//!
//! A complete backend implements all three traits and automatically gets
//! [`FullRepository`], which is what the service layer and HTTP state hold:
//!
//! ```ignore
//! impl ChartRepository for MyRepo { ... }
//! impl DailyRepository for MyRepo { ... }
//! impl ResultRepository for MyRepo { ... }
//! ```

pub mod chart;
pub mod daily;
pub mod error;
pub mod result;

pub use chart::ChartRepository;
pub use daily::DailyRepository;
pub use error::{ErrorContext, RepositoryError, RepositoryResult};
pub use result::ResultRepository;

/// Composite trait bound for a complete repository implementation.
pub trait FullRepository: ChartRepository + DailyRepository + ResultRepository {}

impl<T> FullRepository for T where T: ChartRepository + DailyRepository + ResultRepository {}
