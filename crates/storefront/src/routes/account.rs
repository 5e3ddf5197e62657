//! Account route handlers.
//!
//! These routes sit behind the login gate, so `RequireAuth` always succeeds
//! here. It is still extracted to get at the session user.

use askama::Template;
use askama_web::WebTemplate;
use axum::{Json, extract::State};

use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::{CurrentUser, Order};
use crate::services::OrderService;
use crate::state::AppState;

/// Dashboard page template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub user: CurrentUser,
    pub orders: Vec<Order>,
}

/// Display the dashboard with the user's most recent orders.
///
/// # Errors
///
/// Returns `AppError::Database` if the orders cannot be loaded.
#[tracing::instrument(skip_all, fields(user_id = %user.id))]
pub async fn dashboard(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<DashboardTemplate, AppError> {
    let orders = OrderService::new(state.storage())
        .recent_orders(user.id)
        .await?;

    Ok(DashboardTemplate { user, orders })
}

/// Return the logged-in user as JSON.
pub async fn current_user(RequireAuth(user): RequireAuth) -> Json<CurrentUser> {
    Json(user)
}
