pub mod competition;
pub mod ranking;
pub mod runner;
