use axum::{Extension, Json};
use serde_json::Value;

use crate::middleware::CurrentUser;

/// GET /me - The identity the provider resolved for the presented token,
/// returned exactly as the provider shaped it.
pub async fn whoami(Extension(user): Extension<CurrentUser>) -> Json<Value> {
    Json(user.raw)
}
