//! Domain model: chart documents, daily records, results and the pure
//! calendar/panel logic they are built from.

pub mod business_day;
pub mod calendar;
pub mod chart;
pub mod daily;
pub mod panel;
pub mod result;

pub use business_day::*;
pub use calendar::*;
pub use chart::*;
pub use daily::*;
pub use panel::*;
pub use result::*;
