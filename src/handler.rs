use axum::extract::{Query, State};
use axum::http::Uri;
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::{Json, Router};
use std::future::Future;
use std::sync::Arc;
use strum::IntoEnumIterator;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::error::ApiError;
use crate::params::QueryParams;
use crate::routes::{Route, RouteContext};
use crate::session::{with_session, SessionFactory};
use crate::settings::LikeStrategy;
use crate::utils::logs;

/// Decoded query string in arrival order, duplicates kept.
type QueryPairs = Vec<(String, String)>;

/// Shared by every request. Holds no per-request state.
#[derive(Clone)]
pub struct AppState {
    sessions: Arc<dyn SessionFactory>,
    likes: LikeStrategy,
}

impl AppState {
    pub fn new(sessions: impl SessionFactory, likes: LikeStrategy) -> Self {
        Self {
            sessions: Arc::new(sessions),
            likes,
        }
    }
}

/// One entry per [`Route`], reachable with any HTTP method. Everything else
/// is a 404.
pub fn router(state: AppState) -> Router {
    let mut router: Router<AppState> = Router::new();
    for route in Route::iter() {
        router = router.route(
            route.path(),
            any(move |State(state): State<AppState>, Query(pairs): Query<QueryPairs>| {
                dispatch(route, state, pairs)
            }),
        );
    }

    router
        .fallback(unknown_route)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

pub async fn serve(
    listener: TcpListener,
    state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
}

async fn unknown_route(uri: Uri) -> ApiError {
    ApiError::UnknownRoute(uri.path().to_string())
}

async fn dispatch(route: Route, state: AppState, pairs: QueryPairs) -> Response {
    let query = QueryParams::from(pairs);
    let AppState { sessions, likes } = state;

    // diesel blocks, so the whole session scope runs off the async workers.
    let outcome = tokio::task::spawn_blocking(move || {
        with_session(sessions.as_ref(), |conn| {
            route.handle(&mut RouteContext {
                query: &query,
                conn,
                likes,
            })
        })
    })
    .await
    .unwrap_or_else(|e| Err(ApiError::Task(e.to_string())));

    match outcome {
        Ok(body) => Json(body).into_response(),
        Err(e) => {
            if e.should_log() {
                logs::log_request_failed(route.path(), &e.to_string());
            }
            e.into_response()
        }
    }
}
