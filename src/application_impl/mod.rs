mod auth_service_impl;
mod jwt_codec;
mod password_hasher;
mod post_service_impl;
mod post_total_aggregator;
mod user_service_impl;
mod validation;

pub use auth_service_impl::*;
pub use jwt_codec::*;
pub use password_hasher::*;
pub use post_service_impl::*;
pub use post_total_aggregator::*;
pub use user_service_impl::*;
