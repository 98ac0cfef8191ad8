//! Form state module

mod forms;
pub mod path;
mod store;
mod value;

pub use forms::*;
pub use store::*;
pub use value::*;
