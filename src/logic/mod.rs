pub mod expand;

pub use expand::*;
