pub mod calendar;
pub mod common;
pub mod contact;
pub mod meeting;

pub use calendar::*;
pub use common::*;
pub use contact::*;
pub use meeting::*;
