//! Command implementations

pub mod completions;
pub mod gazeborc;
pub mod pkgconfig;
pub mod probe;
pub mod release;
