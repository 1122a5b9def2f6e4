//! `dashmap`-backed store used by the `"fake"` store backend and by tests.

mod post_repo_memory;
mod user_repo_memory;

pub use post_repo_memory::*;
pub use user_repo_memory::*;
