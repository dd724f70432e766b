//! HTTP subsystem of the development server.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (request id, trace, timeout, CORS)
//!     → EntryPoint (hot router: route table)
//!     → unmatched → host routes (control.rs under the control prefix)
//!     → 404
//! ```

pub mod control;
pub mod server;

pub use control::{ControlState, DevStatus};
pub use server::{DevServer, ServerError, X_REQUEST_ID};
