use super::gate::with_principal;
use super::handler;
use crate::domain_model::PageQuery;
use crate::server::*;
use std::convert::Infallible;
use std::sync::Arc;
use warp::Filter;

/// All `/api/v1` routes. Path, then method, then the gate, then the body:
/// an unknown path is a 404 rather than a 405, and an unauthenticated
/// request is a 401 whatever its payload.
pub fn routes(
    server: Arc<Server>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let gate = with_principal(server.token_codec.clone());

    let register = warp::path!("users")
        .and(warp::post())
        .and(warp::body::json())
        .and(with(server.auth_service.clone()))
        .and_then(handler::register);

    let login = warp::path!("login")
        .and(warp::post())
        .and(warp::body::json())
        .and(with(server.auth_service.clone()))
        .and(with(server.token_codec.clone()))
        .and_then(handler::login);

    let list_users = warp::path!("users")
        .and(warp::get())
        .and(gate.clone())
        .and(warp::query::<PageQuery>())
        .and(with(server.user_service.clone()))
        .and_then(handler::list_users);

    let get_user = warp::path!("users" / String)
        .and(warp::get())
        .and(gate.clone())
        .and(with(server.user_service.clone()))
        .and_then(handler::get_user);

    let update_user = warp::path!("users" / String)
        .and(warp::put())
        .and(gate.clone())
        .and(warp::body::json())
        .and(with(server.user_service.clone()))
        .and_then(handler::update_user);

    let change_password = warp::path!("users" / String / "password")
        .and(warp::put())
        .and(gate.clone())
        .and(warp::body::json())
        .and(with(server.auth_service.clone()))
        .and_then(handler::change_password);

    let delete_user = warp::path!("users" / String)
        .and(warp::delete())
        .and(gate.clone())
        .and(with(server.user_service.clone()))
        .and_then(handler::delete_user);

    let list_user_posts = warp::path!("users" / String / "posts")
        .and(warp::get())
        .and(gate.clone())
        .and(warp::query::<PageQuery>())
        .and(with(server.post_service.clone()))
        .and_then(handler::list_user_posts);

    let create_post = warp::path!("posts")
        .and(warp::post())
        .and(gate.clone())
        .and(warp::body::json())
        .and(with(server.post_service.clone()))
        .and_then(handler::create_post);

    let list_posts = warp::path!("posts")
        .and(warp::get())
        .and(gate.clone())
        .and(warp::query::<PageQuery>())
        .and(with(server.post_service.clone()))
        .and_then(handler::list_posts);

    let get_post = warp::path!("posts" / String)
        .and(warp::get())
        .and(gate.clone())
        .and(with(server.post_service.clone()))
        .and_then(handler::get_post);

    let update_post = warp::path!("posts" / String)
        .and(warp::put())
        .and(gate.clone())
        .and(warp::body::json())
        .and(with(server.post_service.clone()))
        .and_then(handler::update_post);

    let delete_post = warp::path!("posts" / String)
        .and(warp::delete())
        .and(gate)
        .and(with(server.post_service.clone()))
        .and_then(handler::delete_post);

    let users = register
        .or(login)
        .or(list_users)
        .or(get_user)
        .or(update_user)
        .or(change_password)
        .or(delete_user)
        .or(list_user_posts);
    let posts = create_post
        .or(list_posts)
        .or(get_post)
        .or(update_post)
        .or(delete_post);

    users.or(posts)
}

fn with<ServiceType>(
    service: Arc<ServiceType>,
) -> impl Filter<Extract = (Arc<ServiceType>,), Error = Infallible> + Clone
where
    ServiceType: Send + Sync + ?Sized,
{
    warp::any().map(move || service.clone())
}
