pub mod competitions;
pub mod ranking;
pub mod ratings;
pub mod runners;
