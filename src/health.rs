//! Built-in Kubernetes health-check handlers.
//!
//! | Probe | Suggested path | Failure means |
//! |---|---|---|
//! | **Liveness** | `/healthz` | restart the process |
//! | **Readiness** | `/readyz` | pull the pod from the load balancer |
//!
//! ```rust,no_run
//! use absol::{Router, health};
//!
//! let app = Router::new()
//!     .get("/healthz", health::liveness)
//!     .get("/readyz", health::readiness);
//! ```
//!
//! Only registered verbs match, so add a `HEAD` route too if your prober uses it.
//! Replace `readiness` with your own handler to gate on dependencies.

use crate::{Request, Response};

/// Always `200 OK` with body `"ok"`.
pub async fn liveness(_req: Request) -> Response {
    Response::text("ok")
}

/// `200 OK` with body `"ready"`.
pub async fn readiness(_req: Request) -> Response {
    Response::text("ready")
}
