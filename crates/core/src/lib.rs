#![forbid(unsafe_code)]

pub mod links;
pub mod model;
pub mod time;

pub use time::Clock;
