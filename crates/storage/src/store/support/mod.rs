#![forbid(unsafe_code)]

mod assignments;
mod live;
mod rows;

pub(super) use assignments::*;
pub use live::LIVE;
pub(super) use live::*;
pub(super) use rows::*;
