mod post_repo;
mod store_error;
mod user_repo;

pub use post_repo::*;
pub use store_error::*;
pub use user_repo::*;
