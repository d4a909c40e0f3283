//! Liveness route handler.

/// Fixed payload returned by `GET /`.
pub const STATUS_TEXT: &str = "IdeaBrowser Core API is running 🚀";

/// GET / - Confirm the server is up.
pub async fn index() -> &'static str {
    STATUS_TEXT
}
