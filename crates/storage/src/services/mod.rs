pub mod rating;
pub mod rating_pass;
