pub mod calendar;
pub mod clock;
pub mod command;
pub mod query;
