pub mod attributes;
pub mod recipes;
pub mod users;

pub use attributes::*;
pub use recipes::*;
pub use users::*;
