pub mod booking;
pub mod schedule;
pub mod search;

pub use booking::AppointmentService;
pub use search::{AppointmentSearch, PartyFilter};
