pub mod action;
pub mod detail;
pub mod entity;
pub mod fields;
pub mod kind;
pub mod triple;

pub use action::*;
pub use detail::*;
pub use entity::*;
pub use fields::{Fields, Record};
pub use kind::*;
pub use triple::*;
