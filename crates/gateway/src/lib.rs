pub mod api;
pub mod bootstrap;
pub mod calendar;
pub mod cli;
pub mod notify;
pub mod schedule;
pub mod scheduler;
pub mod state;
pub mod store;
