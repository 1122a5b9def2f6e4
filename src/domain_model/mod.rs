mod principal;
mod unit;
mod user;

pub use principal::*;
pub use unit::*;
pub use user::*;
