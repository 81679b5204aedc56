//! Middleware and the chain composer.
//!
//! A middleware is a plain function value that takes the handler it wraps and
//! returns a new one. It can act before the inner handler, after it, around
//! it, or not call it at all.
//!
//! ```rust
//! use absol::handler::{from_fn, BoxedHandler};
//! use absol::{Request, Response, Router, StatusCode};
//!
//! fn require_token(next: BoxedHandler) -> BoxedHandler {
//!     from_fn(move |req: Request| {
//!         let next = next.clone();
//!         async move {
//!             if req.header("authorization").is_none() {
//!                 return Response::status(StatusCode::UNAUTHORIZED);
//!             }
//!             next.call(req).await
//!         }
//!     })
//! }
//!
//! # async fn hello(_: Request) -> &'static str { "hello" }
//! let app = Router::new()
//!     .get("/", hello)
//!     .middleware(require_token);
//! ```
//!
//! Middleware added later wraps everything added before it: with
//! `.middleware(a).middleware(b)`, `b` runs first on the way in and last on
//! the way out.

pub mod trace;

pub use trace::trace;

use std::sync::Arc;

use crate::handler::BoxedHandler;

/// A shared, type-erased middleware.
pub type Middleware = Arc<dyn Fn(BoxedHandler) -> BoxedHandler + Send + Sync + 'static>;

/// Combines two middleware into one.
///
/// Applying the result to a handler `h` is `outer(inner(h))`: `outer` ends up
/// as the outer layer. Nothing is invoked until the composed value is applied.
pub fn compose(outer: Middleware, inner: Middleware) -> Middleware {
    Arc::new(move |handler: BoxedHandler| outer(inner(handler)))
}
