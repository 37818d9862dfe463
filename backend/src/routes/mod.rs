/// Router Module Index
///
/// Splits the routes by whether the access gate applies to them, so the gate is attached once at
/// module level instead of per handler.

/// Routes outside the gate (health check, logout).
pub mod public;

/// Routes behind the access gate (auth pages and the dashboard).
pub mod gated;
