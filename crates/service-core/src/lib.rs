//! Plumbing shared by the users and deliveries services.
//!
//! Purpose: keep the wire contracts both services agree on (the error
//! envelope, the role enumeration, the trace header) in one place, together
//! with the infrastructure glue they wire identically: the request tracing
//! middleware, health probes, telemetry initialisation, and the Diesel
//! connection pool.

pub mod error;
pub mod extract;
pub mod health;
pub mod macros;
pub mod middleware;
pub mod persistence;
pub mod role;
pub mod shutdown;
pub mod telemetry;
pub mod trace_id;

pub use error::{ApiResult, Error, ErrorCode, ErrorEnvelope, TRACE_ID_HEADER};
pub use middleware::Trace;
pub use role::{Role, RoleParseError};
pub use trace_id::TraceId;
