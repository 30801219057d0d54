pub mod cli;
pub mod config;
pub mod data;
pub mod deck;
pub mod error;
pub mod parallel;

pub use error::{DeckError, Result};
