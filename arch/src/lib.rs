pub mod builtin;
pub mod inst;
