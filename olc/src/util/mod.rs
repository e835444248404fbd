pub mod diag;
pub mod display;
