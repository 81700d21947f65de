pub mod date;
pub mod pattern;
