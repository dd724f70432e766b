//! Stable dispatch entry point.
//!
//! # Responsibilities
//! - Delegate each request to whichever router is installed right now
//! - Hand unmatched requests on to the host (middleware variant)
//! - Answer unmatched requests itself (terminal variant)
//!
//! # Design Decisions
//! - Unmatched requests are detected through a marker the shell's fallback
//!   (unknown path) or the sealed method fallback (known path, unknown method)
//!   puts in the response extensions, carrying the original request back out
//! - Dispatch before initialization is a pass-through (middleware) or a 503
//!   (terminal)

use std::convert::Infallible;
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    Router,
};
use tower::ServiceExt;

use crate::hot::slot::{Installed, RouterSlot};

/// Marker the shell fallback attaches to responses for unmatched requests.
#[derive(Clone)]
struct Unmatched(Arc<Mutex<Option<Request>>>);

impl Unmatched {
    fn take(&self) -> Option<Request> {
        self.0.lock().ok()?.take()
    }
}

fn mark_unmatched(status: StatusCode, request: Request) -> Response {
    let mut response = status.into_response();
    response
        .extensions_mut()
        .insert(Unmatched(Arc::new(Mutex::new(Some(request)))));
    response
}

async fn unmatched(request: Request) -> Response {
    mark_unmatched(StatusCode::NOT_FOUND, request)
}

async fn unmatched_method(request: Request) -> Response {
    mark_unmatched(StatusCode::METHOD_NOT_ALLOWED, request)
}

/// The empty router handed to factories.
pub(crate) fn shell() -> Router {
    Router::new().fallback(unmatched)
}

/// Finish a router the factory built from the shell.
///
/// A known path with an unknown method counts as unmatched too. axum only
/// applies this to routes that already exist, so it runs after the factory.
pub(crate) fn seal(router: Router) -> Router {
    router.method_not_allowed_fallback(unmatched_method)
}

/// Request-handling entry point registered once on the host.
///
/// Cloning is cheap and every clone follows the same slot, so the value the
/// host registered at startup keeps working across any number of reloads.
#[derive(Clone, Debug)]
pub struct EntryPoint {
    slot: Arc<RouterSlot>,
}

impl EntryPoint {
    pub(crate) fn new(slot: Arc<RouterSlot>) -> Self {
        Self { slot }
    }

    /// Version of the router requests are currently dispatched to.
    pub fn version(&self) -> Option<u64> {
        self.slot.version()
    }

    /// Put the entry point in front of `router` as middleware.
    ///
    /// Requests the hot router has no route for continue into `router`.
    pub fn wrap(&self, router: Router) -> Router {
        router.layer(middleware::from_fn_with_state(self.clone(), dispatch))
    }

    /// Use the entry point as the fallback of `router`, with no further
    /// chaining: requests neither router matches get a 404.
    pub fn as_fallback(&self, router: Router) -> Router {
        let entry = self.clone();
        router.fallback(move |request: Request| {
            let entry = entry.clone();
            async move { entry.call(request).await }
        })
    }

    /// Dispatch one request to the current router.
    pub async fn call(&self, request: Request) -> Response {
        let Some(installed) = self.slot.load() else {
            return (StatusCode::SERVICE_UNAVAILABLE, "router not initialized").into_response();
        };
        let mut response = route(&installed, request).await;
        response.extensions_mut().remove::<Unmatched>();
        response
    }
}

async fn route(installed: &Installed, request: Request) -> Response {
    let result: Result<Response, Infallible> = installed.router.clone().oneshot(request).await;
    match result {
        Ok(response) => response,
        Err(never) => match never {},
    }
}

async fn dispatch(State(entry): State<EntryPoint>, request: Request, next: Next) -> Response {
    let Some(installed) = entry.slot.load() else {
        return next.run(request).await;
    };

    let mut response = route(&installed, request).await;
    match response
        .extensions_mut()
        .remove::<Unmatched>()
        .and_then(|unmatched| unmatched.take())
    {
        Some(request) => next.run(request).await,
        None => response,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::routing::{get, post};

    async fn send(router: Router, path: &str) -> (StatusCode, String) {
        send_method(router, "GET", path).await
    }

    async fn send_method(router: Router, method: &str, path: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method(method)
            .uri(path)
            .body(Body::empty())
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    fn host() -> Router {
        Router::new().route("/host", get(|| async { "from host" }))
    }

    fn entry_with(router: Option<Router>) -> EntryPoint {
        let slot = Arc::new(RouterSlot::new());
        if let Some(router) = router {
            slot.install(seal(router));
        }
        EntryPoint::new(slot)
    }

    #[tokio::test]
    async fn matched_requests_use_hot_router() {
        let entry = entry_with(Some(shell().route("/hot", get(|| async { "from hot" }))));
        let app = entry.wrap(host());

        assert_eq!(send(app, "/hot").await, (StatusCode::OK, "from hot".into()));
    }

    #[tokio::test]
    async fn unmatched_requests_fall_through_to_host() {
        let entry = entry_with(Some(shell().route("/hot", get(|| async { "from hot" }))));
        let app = entry.wrap(host());

        assert_eq!(
            send(app.clone(), "/host").await,
            (StatusCode::OK, "from host".into())
        );
        let (status, _) = send(app, "/nowhere").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn hot_routes_shadow_host_routes() {
        let entry = entry_with(Some(shell().route("/host", get(|| async { "shadowed" }))));
        let app = entry.wrap(host());

        assert_eq!(send(app, "/host").await, (StatusCode::OK, "shadowed".into()));
    }

    #[tokio::test]
    async fn uninitialized_middleware_is_a_pass_through() {
        let app = entry_with(None).wrap(host());

        assert_eq!(send(app, "/host").await, (StatusCode::OK, "from host".into()));
    }

    #[tokio::test]
    async fn terminal_variant_rejects_until_initialized() {
        let app = entry_with(None).as_fallback(Router::new());

        let (status, _) = send(app, "/anything").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn terminal_variant_answers_unmatched_with_404() {
        let entry = entry_with(Some(shell().route("/hot", get(|| async { "from hot" }))));
        let app = entry.as_fallback(host());

        assert_eq!(
            send(app.clone(), "/hot").await,
            (StatusCode::OK, "from hot".into())
        );
        assert_eq!(
            send(app.clone(), "/host").await,
            (StatusCode::OK, "from host".into())
        );
        let (status, _) = send(app, "/nowhere").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn same_entry_point_follows_swaps() {
        let slot = Arc::new(RouterSlot::new());
        let entry = EntryPoint::new(slot.clone());
        let app = entry.wrap(host());

        slot.install(shell().route("/hot", get(|| async { "a" })));
        assert_eq!(send(app.clone(), "/hot").await.1, "a");

        slot.install(shell().route("/hot", get(|| async { "b" })));
        assert_eq!(send(app, "/hot").await.1, "b");
        assert_eq!(entry.version(), Some(2));
    }

    #[tokio::test]
    async fn method_mismatch_falls_through_to_host() {
        let entry = entry_with(Some(shell().route("/page", get(|| async { "hot get" }))));
        let host = Router::new().route("/page", post(|| async { "host post" }));
        let app = entry.wrap(host);

        assert_eq!(
            send_method(app.clone(), "GET", "/page").await,
            (StatusCode::OK, "hot get".into())
        );
        assert_eq!(
            send_method(app, "POST", "/page").await,
            (StatusCode::OK, "host post".into())
        );
    }

    #[tokio::test]
    async fn method_mismatch_unknown_to_host_is_404() {
        let entry = entry_with(Some(shell().route("/page", get(|| async { "hot get" }))));
        let app = entry.wrap(host());

        let (status, _) = send_method(app, "DELETE", "/page").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn terminal_variant_keeps_405_for_method_mismatch() {
        let entry = entry_with(Some(shell().route("/page", get(|| async { "hot get" }))));
        let app = entry.as_fallback(Router::new());

        let (status, _) = send_method(app, "PUT", "/page").await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }
}
