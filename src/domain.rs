//! Domain module - Administrative area entities
//! 
//! This module contains the records produced by a crawl and the value
//! objects that steer which parts of the hierarchy get expanded.
//! 
//! Modern Rust module organization (Rust 2018+ style):
//! - Each module is its own file in the domain/ directory
//! - Public exports are defined here for convenience

pub mod area;
pub mod scope;

// Re-export commonly used items for convenience
pub use area::{AreaCategory, AreaDataset, AreaRecord};
pub use scope::ScopeFilter;
