//! Exact-path request router.
//!
//! One hash lookup for the path, one for the method. No patterns, no
//! parameters, no normalisation: `/users` and `/users/` are different routes.
//! Register a path, get a handler, optionally wrapped in middleware.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::error::RouteError;
use crate::handler::{BoxedHandler, Handler};
use crate::method::Method;
use crate::middleware::{compose, Middleware};
use crate::request::Request;
use crate::response::{IntoResponse, Response};

/// The application router.
///
/// Build it once at startup and pass it to [`Server::serve`](crate::Server::serve).
/// Registration consumes and returns `self` so calls chain naturally, and so
/// the table can no longer change once the server shares it between tasks.
///
/// ```rust
/// use absol::{Request, Response, Router, StatusCode};
///
/// async fn brew(_req: Request) -> Response {
///     Response::builder().status(StatusCode::IM_A_TEAPOT).text("teapot")
/// }
///
/// # tokio_test(async {
/// let app = Router::new().get("/test", brew);
///
/// let res = app.dispatch(Request::new("GET", "/test")).await;
/// assert_eq!(res.status_code(), StatusCode::IM_A_TEAPOT);
///
/// let res = app.dispatch(Request::new("POST", "/test")).await;
/// assert_eq!(res.body(), b"absol: request method not registered\n");
/// # });
/// # fn tokio_test<F: std::future::Future>(f: F) {
/// #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f);
/// # }
/// ```
#[derive(Default)]
pub struct Router {
    routes: HashMap<String, HashMap<Method, BoxedHandler>>,
    middleware: Option<Middleware>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `handler` to `method` + `path`. Returns `self` for chaining.
    ///
    /// The path is matched byte for byte and is not validated. Registering the
    /// same pair twice replaces the earlier handler.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.routes
            .entry(path.to_owned())
            .or_default()
            .insert(method, handler.into_boxed_handler());
        self
    }

    pub fn head(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::Head, path, handler)
    }

    pub fn get(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::Get, path, handler)
    }

    pub fn post(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::Post, path, handler)
    }

    pub fn put(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::Put, path, handler)
    }

    pub fn delete(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::Delete, path, handler)
    }

    /// Adds a middleware around every route, including routes registered
    /// later.
    ///
    /// The newest middleware becomes the outermost layer: it sees the request
    /// first and the response last.
    pub fn middleware<M>(mut self, middleware: M) -> Self
    where
        M: Fn(BoxedHandler) -> BoxedHandler + Send + Sync + 'static,
    {
        self.layer(Arc::new(middleware))
    }

    /// Like [`middleware`](Router::middleware), for an already shared value
    /// such as the result of [`compose`].
    pub fn layer(mut self, middleware: Middleware) -> Self {
        self.middleware = Some(match self.middleware.take() {
            Some(chain) => compose(middleware, chain),
            None => middleware,
        });
        self
    }

    /// Routes one request and produces exactly one response.
    ///
    /// Unknown paths get `404`, known paths without a handler for the
    /// request's method get `405`. Otherwise the response is whatever the
    /// handler, wrapped in the middleware chain, returns.
    pub async fn dispatch(&self, req: Request) -> Response {
        let handler = match self.lookup(req.method(), req.path()) {
            Ok(handler) => handler,
            Err(e) => {
                debug!(method = %req.method(), path = %req.path(), "{e}");
                return e.into_response();
            }
        };

        let handler = match &self.middleware {
            Some(chain) => chain(handler),
            None => handler,
        };

        handler.call(req).await
    }

    fn lookup(&self, method: &str, path: &str) -> Result<BoxedHandler, RouteError> {
        let methods = self.routes.get(path).ok_or(RouteError::PathNotRegistered)?;
        method
            .parse::<Method>()
            .ok()
            .and_then(|m| methods.get(&m))
            .cloned()
            .ok_or(RouteError::MethodNotRegistered)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use http::StatusCode;

    use super::*;
    use crate::handler::from_fn;

    async fn teapot(_req: Request) -> Response {
        Response::builder()
            .status(StatusCode::IM_A_TEAPOT)
            .text("teapot")
    }

    async fn send(router: &Router, method: &str, path: &str) -> Response {
        router.dispatch(Request::new(method, path)).await
    }

    fn assert_teapot(res: &Response) {
        assert_eq!(res.status_code(), StatusCode::IM_A_TEAPOT);
        assert_eq!(res.body(), b"teapot");
    }

    fn set_header(name: &'static str, value: &'static str) -> impl Fn(BoxedHandler) -> BoxedHandler + Send + Sync + 'static {
        move |next: BoxedHandler| {
            from_fn(move |req: Request| {
                let next = next.clone();
                async move {
                    let mut res = next.call(req).await;
                    res.set_header(name, value);
                    res
                }
            })
        }
    }

    #[tokio::test]
    async fn each_verb_dispatches_to_its_handler() {
        let cases: [(&str, fn(Router, &str) -> Router); 5] = [
            ("HEAD",   |r: Router, p: &str| r.head(p, teapot)),
            ("GET",    |r: Router, p: &str| r.get(p, teapot)),
            ("POST",   |r: Router, p: &str| r.post(p, teapot)),
            ("PUT",    |r: Router, p: &str| r.put(p, teapot)),
            ("DELETE", |r: Router, p: &str| r.delete(p, teapot)),
        ];

        for (method, register) in cases {
            let router = register(Router::new(), "/test");
            assert_teapot(&send(&router, method, "/test").await);
        }
    }

    #[tokio::test]
    async fn unknown_path_is_not_found_for_any_method() {
        let router = Router::new().get("/other", teapot);

        for method in ["GET", "POST", "PATCH", "BREW"] {
            let res = send(&router, method, "/test").await;
            assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
            assert_eq!(res.body(), b"absol: request path not registered\n");
        }
    }

    #[tokio::test]
    async fn empty_router_is_not_found() {
        let res = send(&Router::new(), "GET", "/test").await;
        assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(res.body(), b"absol: request path not registered\n");
    }

    #[tokio::test]
    async fn unregistered_method_is_not_allowed() {
        let router = Router::new().get("/test", teapot);

        for method in ["POST", "PATCH", "get"] {
            let res = send(&router, method, "/test").await;
            assert_eq!(res.status_code(), StatusCode::METHOD_NOT_ALLOWED);
            assert_eq!(res.body(), b"absol: request method not registered\n");
        }
    }

    #[tokio::test]
    async fn paths_match_exactly() {
        let router = Router::new().get("/test", teapot).get("", teapot);

        for path in ["/test/", "/TEST", "/test%20", "test"] {
            assert_eq!(send(&router, "GET", path).await.status_code(), StatusCode::NOT_FOUND);
        }
        assert_teapot(&send(&router, "GET", "").await);
    }

    #[tokio::test]
    async fn only_the_matching_handler_runs() {
        let hits: Arc<[AtomicUsize; 2]> = Arc::default();

        let (a, b) = (hits.clone(), hits.clone());
        let router = Router::new()
            .get("/a", move |_req: Request| {
                a[0].fetch_add(1, Ordering::SeqCst);
                async { "a" }
            })
            .get("/b", move |_req: Request| {
                b[1].fetch_add(1, Ordering::SeqCst);
                async { "b" }
            });

        assert_eq!(send(&router, "GET", "/a").await.body(), b"a");
        assert_eq!(hits[0].load(Ordering::SeqCst), 1);
        assert_eq!(hits[1].load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn reregistering_replaces_the_handler() {
        let router = Router::new()
            .get("/test", |_req: Request| async { "old" })
            .get("/test", |_req: Request| async { "new" });

        assert_eq!(send(&router, "GET", "/test").await.body(), b"new");
    }

    #[tokio::test]
    async fn methods_on_one_path_are_independent() {
        let router = Router::new()
            .get("/test", |_req: Request| async { "get" })
            .post("/test", |_req: Request| async { "post" });

        assert_eq!(send(&router, "GET", "/test").await.body(), b"get");
        assert_eq!(send(&router, "POST", "/test").await.body(), b"post");
        assert_eq!(
            send(&router, "PUT", "/test").await.status_code(),
            StatusCode::METHOD_NOT_ALLOWED,
        );
    }

    #[tokio::test]
    async fn middleware_applies_to_every_route() {
        let router = Router::new()
            .get("/test", teapot)
            .post("/other", |_req: Request| async { "other" })
            .middleware(set_header("X-Foo", "foo-test"));

        let res = send(&router, "GET", "/test").await;
        assert_teapot(&res);
        assert_eq!(res.header("x-foo"), Some("foo-test"));

        let res = send(&router, "POST", "/other").await;
        assert_eq!(res.header("x-foo"), Some("foo-test"));
    }

    #[tokio::test]
    async fn middleware_added_after_serving_affects_later_dispatches() {
        let router = Router::new().get("/test", teapot);
        assert_eq!(send(&router, "GET", "/test").await.header("x-foo"), None);

        let router = router.middleware(set_header("X-Foo", "foo-test"));
        assert_eq!(send(&router, "GET", "/test").await.header("x-foo"), Some("foo-test"));
    }

    #[tokio::test]
    async fn middleware_does_not_touch_routing_errors() {
        let router = Router::new()
            .get("/test", teapot)
            .middleware(set_header("X-Foo", "foo-test"));

        assert_eq!(send(&router, "GET", "/missing").await.header("x-foo"), None);
        assert_eq!(send(&router, "PUT", "/test").await.header("x-foo"), None);
    }

    #[tokio::test]
    async fn later_middleware_wraps_earlier() {
        let router = Router::new()
            .get("/test", teapot)
            .middleware(set_header("X-Foo", "foo-test"))
            .middleware(set_header("X-Bar", "bar-test"))
            // Runs outermost, so it overwrites what the inner layers set.
            .middleware(set_header("X-Foo", "outer"));

        let res = send(&router, "GET", "/test").await;
        assert_teapot(&res);
        assert_eq!(res.header("x-bar"), Some("bar-test"));
        assert_eq!(res.header("x-foo"), Some("outer"));
    }

    #[tokio::test]
    async fn short_circuit_skips_inner_layers_and_handler() {
        let calls = Arc::new(Mutex::new(Vec::new()));

        let handler_calls = calls.clone();
        let inner_calls = calls.clone();
        let router = Router::new()
            .get("/test", move |_req: Request| {
                handler_calls.lock().unwrap().push("handler");
                async { "unreachable" }
            })
            .middleware(move |next: BoxedHandler| {
                let calls = inner_calls.clone();
                from_fn(move |req: Request| {
                    calls.lock().unwrap().push("inner");
                    next.call(req)
                })
            })
            .middleware(|_next: BoxedHandler| {
                from_fn(|_req: Request| async { Response::status(StatusCode::FORBIDDEN) })
            });

        let res = send(&router, "GET", "/test").await;
        assert_eq!(res.status_code(), StatusCode::FORBIDDEN);
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn composed_middleware_can_be_layered() {
        let chain = compose(
            Arc::new(set_header("X-Foo", "outer")),
            Arc::new(set_header("X-Foo", "inner")),
        );
        let router = Router::new()
            .get("/test", teapot)
            .layer(chain)
            .middleware(set_header("X-Bar", "bar-test"));

        let res = send(&router, "GET", "/test").await;
        assert_teapot(&res);
        assert_eq!(res.header("x-foo"), Some("outer"));
        assert_eq!(res.header("x-bar"), Some("bar-test"));
    }

    #[tokio::test]
    async fn routers_are_independent() {
        let a = Router::new().get("/test", teapot);
        let b = Router::new();

        assert_teapot(&send(&a, "GET", "/test").await);
        assert_eq!(send(&b, "GET", "/test").await.status_code(), StatusCode::NOT_FOUND);
    }
}
