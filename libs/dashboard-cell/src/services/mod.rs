pub mod stats;

pub use stats::{trailing_months, DashboardService, MonthWindow};
