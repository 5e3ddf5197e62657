//! Order route handlers.
//!
//! ```text
//! GET  /order/{product_id}          - Order form
//! POST /order/{product_id}          - Place order
//! GET  /order-confirmation/{id}     - Confirmation for one of the user's orders
//! ```
//!
//! A placed order renders its confirmation directly. Rejected orders show the
//! form again with the error: 422 for bad input or too little stock, 500 when
//! storage failed.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tower_sessions::Session;

use market_core::{OrderId, ProductId};

use crate::error::{AppError, add_breadcrumb};
use crate::filters;
use crate::middleware::{CsrfToken, RequestId, RequireAuth, verify_csrf};
use crate::models::{Order, Product};
use crate::services::{CatalogService, OrderError, OrderRequest, OrderService};
use crate::state::AppState;

/// Order form submission: the order fields plus the CSRF token.
#[derive(Debug, Default, Deserialize)]
pub struct OrderForm {
    #[serde(flatten)]
    pub order: OrderRequest,
    #[serde(default)]
    pub csrf_token: String,
}

/// Order form template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/new.html")]
pub struct OrderFormTemplate {
    pub product: Product,
    pub csrf_token: String,
    pub error: Option<String>,
    pub form: OrderRequest,
}

/// Order confirmation template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/confirmation.html")]
pub struct OrderConfirmationTemplate {
    pub order: Order,
}

/// Display the order form for a product.
///
/// # Errors
///
/// Returns `AppError::NotFound` if the product does not exist.
pub async fn new(
    State(state): State<AppState>,
    Path(product_id): Path<ProductId>,
    csrf: CsrfToken,
) -> Result<OrderFormTemplate, AppError> {
    let product = CatalogService::new(state.storage().catalog())
        .get_product(product_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {product_id}")))?;

    Ok(OrderFormTemplate {
        product,
        csrf_token: csrf.0,
        error: None,
        form: OrderRequest {
            quantity: "1".to_string(),
            ..OrderRequest::default()
        },
    })
}

/// Place an order.
///
/// # Errors
///
/// Returns `AppError::Forbidden` on a CSRF mismatch and `AppError::NotFound`
/// if the product does not exist. Every other failure re-renders the form.
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    RequestId(request_id): RequestId,
    Path(product_id): Path<ProductId>,
    Form(form): Form<OrderForm>,
) -> Result<Response, AppError> {
    verify_csrf(&session, &form.csrf_token).await?;

    let result = OrderService::new(state.storage())
        .place_order(product_id, &form.order, user.id)
        .await;

    let err = match result {
        Ok(order) => {
            add_breadcrumb(
                "order",
                "Placed order",
                &[("order_id", order.id.to_string())],
            );
            return Ok(OrderConfirmationTemplate { order }.into_response());
        }
        Err(err) => err,
    };

    let (status, product, message) = match err.into_reprompt() {
        Ok((product, message)) => (StatusCode::UNPROCESSABLE_ENTITY, product, message),
        Err(OrderError::NotFound(id)) => {
            return Err(AppError::NotFound(format!("product {id}")));
        }
        Err(err) => {
            let event_id = sentry::capture_error(&err);
            tracing::error!(error = %err, sentry_event_id = %event_id, "Order placement failed");

            // The form needs the product; if even that read fails, give up
            let product = CatalogService::new(state.storage().catalog())
                .get_product(product_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("product {product_id}")))?;
            let message = format!(
                "We could not place your order. Please try again. (reference {request_id})"
            );
            (StatusCode::INTERNAL_SERVER_ERROR, product, message)
        }
    };

    let page = OrderFormTemplate {
        product,
        csrf_token: CsrfToken::for_session(&session).await?.0,
        error: Some(message),
        form: form.order,
    };
    Ok((status, page).into_response())
}

/// Display the confirmation for one of the current user's orders.
///
/// # Errors
///
/// Returns `AppError::NotFound` if the order does not exist or belongs to
/// someone else.
pub async fn confirmation(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(order_id): Path<OrderId>,
) -> Result<OrderConfirmationTemplate, AppError> {
    let order = OrderService::new(state.storage())
        .get_order_for_user(order_id, user.id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {order_id}")))?;

    Ok(OrderConfirmationTemplate { order })
}
