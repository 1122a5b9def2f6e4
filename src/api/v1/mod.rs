mod error;
mod gate;
mod handler;
mod router;

pub use error::{ApiError, ResponseCode, recover_error};
pub use gate::{NoPrincipal, RequestContext, authenticate, parse_bearer, with_principal};
pub use handler::ApiResponse;
pub use router::routes;
