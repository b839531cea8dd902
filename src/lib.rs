pub mod catalog;
pub mod config;
pub mod movie;
pub mod ranking;

pub use movie::{Movie, RankedMovie};
