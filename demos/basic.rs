//! Minimal absol example — a few exact routes, middleware, and health checks.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example basic
//!
//! Try:
//!   curl -i http://localhost:3000/tea
//!   curl -i -X POST http://localhost:3000/tea     # 405
//!   curl -i http://localhost:3000/coffee          # 404
//!   curl -i -X PUT http://localhost:3000/orders -d 'two sugars'
//!   curl -i http://localhost:3000/healthz
//!
//! Set ABSOL_ADDR to listen elsewhere (default 0.0.0.0:3000).

use absol::handler::{from_fn, BoxedHandler};
use absol::{health, middleware, Request, Response, Router, Server, StatusCode};

#[tokio::main]
async fn main() -> Result<(), absol::Error> {
    tracing_subscriber::fmt::init();

    let app = Router::new()
        .get("/tea",      brew)
        .head("/tea",     brew)
        .put("/orders",   place_order)
        .delete("/orders", cancel_order)
        .get("/healthz",  health::liveness)
        .get("/readyz",   health::readiness)
        .middleware(powered_by)
        .middleware(middleware::trace());

    Server::from_env()?.serve(app).await
}

// GET /tea → 418
async fn brew(_req: Request) -> Response {
    Response::builder()
        .status(StatusCode::IM_A_TEAPOT)
        .text("teapot")
}

// PUT /orders
async fn place_order(req: Request) -> Response {
    if req.body().is_empty() {
        return Response::status(StatusCode::BAD_REQUEST);
    }
    Response::builder()
        .status(StatusCode::CREATED)
        .text(format!("ordered: {}", String::from_utf8_lossy(req.body())))
}

// DELETE /orders → 204 No Content
async fn cancel_order(_req: Request) -> StatusCode {
    StatusCode::NO_CONTENT
}

// Stamps every routed response.
fn powered_by(next: BoxedHandler) -> BoxedHandler {
    from_fn(move |req: Request| {
        let next = next.clone();
        async move {
            let mut res = next.call(req).await;
            res.set_header("x-powered-by", "absol");
            res
        }
    })
}
