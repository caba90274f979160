//! Scaffold handlers.
//!
//! These are the starting points a generated project ships with: a smoke
//! handler for `/api/tests` and REST bindings for the user store.

use axum::Json;
use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use serde_json::json;
use sqlx::MySqlPool;

use crate::db::{NewUser, UserRepository};
use crate::error::RoostError;
use crate::runtime::Handler;

/// Catches all requests to `/api/tests`; useful for checking that the
/// runtime is up. Safe to remove.
pub fn test_handler() -> Handler {
    Handler::new("/tests").route(
        "/",
        get(|| async { "Hello roost GET!" })
            .post(|| async { "Hello roost POST!" })
            .put(|| async { "Hello roost PUT!" })
            .delete(|| async { "Hello roost DELETE!" }),
    )
}

/// REST bindings for the user store at `/api/users`. Registered through
/// `HttpRuntime::register_with_mysql`, so it only exists when the
/// relational backend is active.
pub fn user_routes(pool: MySqlPool) -> Handler {
    let repo = UserRepository::new(pool);
    let list_repo = repo.clone();
    let create_repo = repo.clone();
    let get_repo = repo.clone();
    let update_repo = repo.clone();
    let delete_repo = repo;

    Handler::new("/users")
        .route(
            "/",
            get(move || async move { list_repo.find_all().await.map(Json) }).post(
                move |Json(user): Json<NewUser>| async move {
                    let id = create_repo.create(&user).await?;
                    Ok::<_, RoostError>((StatusCode::CREATED, Json(json!({ "id": id }))))
                },
            ),
        )
        .route(
            "/{id}",
            get(move |Path(id): Path<u64>| async move {
                match get_repo.find_by_id(id).await? {
                    Some(user) => Ok::<_, RoostError>(Json(user).into_response()),
                    None => Ok(StatusCode::NOT_FOUND.into_response()),
                }
            })
            .put(move |Path(id): Path<u64>, Json(user): Json<NewUser>| async move {
                let updated = update_repo.update(id, &user).await?;
                Ok::<_, RoostError>(if updated {
                    StatusCode::NO_CONTENT
                } else {
                    StatusCode::NOT_FOUND
                })
            })
            .delete(move |Path(id): Path<u64>| async move {
                let deleted = delete_repo.delete(id).await?;
                Ok::<_, RoostError>(if deleted {
                    StatusCode::NO_CONTENT
                } else {
                    StatusCode::NOT_FOUND
                })
            }),
        )
}
