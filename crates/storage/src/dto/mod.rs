pub mod common;
pub mod competition;
pub mod ranking;
pub mod rating;
pub mod runner;
