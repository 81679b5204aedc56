//! # absol
//!
//! An exact-path HTTP router with composable middleware.
//!
//! A route is a path string and one of five verbs (`HEAD`, `GET`, `POST`,
//! `PUT`, `DELETE`). Paths are compared byte for byte: no patterns, no
//! parameters, no trailing-slash or case folding. A request for an unknown
//! path gets `404`; a known path with no handler for the method gets `405`.
//!
//! Middleware are plain functions from handler to handler. Each one added
//! wraps everything added before it, so the most recent is the outermost
//! layer.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use absol::{middleware, Request, Response, Router, Server, StatusCode};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), absol::Error> {
//!     let app = Router::new()
//!         .get("/users", list_users)
//!         .post("/users", create_user)
//!         .middleware(middleware::trace());
//!
//!     Server::bind("0.0.0.0:3000")?.serve(app).await
//! }
//!
//! async fn list_users(_req: Request) -> Response {
//!     Response::json(br#"[{"id":1}]"#.to_vec())
//! }
//!
//! async fn create_user(req: Request) -> Response {
//!     if req.body().is_empty() {
//!         return Response::status(StatusCode::BAD_REQUEST);
//!     }
//!     Response::builder()
//!         .status(StatusCode::CREATED)
//!         .header("location", "/users/2")
//!         .json(br#"{"id":2}"#.to_vec())
//! }
//! ```

mod error;
mod method;
mod request;
mod response;
mod router;
mod server;

pub mod handler;
pub mod health;
pub mod middleware;

pub use error::{Error, RouteError};
pub use handler::{BoxedHandler, Handler};
pub use http::StatusCode;
pub use method::Method;
pub use request::Request;
pub use response::{IntoResponse, Response, ResponseBuilder};
pub use router::Router;
pub use server::{Server, ADDR_ENV, DEFAULT_ADDR};
