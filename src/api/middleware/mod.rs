//! API middleware stack.
//!
//! Execution order (outermost → innermost):
//! 1. Session validator: bearer token lookup, injects the operator
//! 2. Audit logger: logs after auth, has the username

pub mod audit;
pub mod auth;
