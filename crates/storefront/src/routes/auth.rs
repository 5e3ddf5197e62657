//! Authentication route handlers.
//!
//! Sign-up, login and logout. Successful sign-up and login both log the user
//! in on the current session and redirect to the product list.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;

use crate::error::{AppError, add_breadcrumb};
use crate::filters;
use crate::middleware::auth::LOGIN_PATH;
use crate::middleware::csrf::session_error;
use crate::middleware::{CsrfToken, OptionalAuth, clear_current_user, set_current_user, verify_csrf};
use crate::models::CurrentUser;
use crate::services::{AuthService, SignUp};
use crate::state::AppState;

/// Where users land after logging in.
const AFTER_LOGIN_PATH: &str = "/products";

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub csrf_token: String,
}

/// Sign-up form data.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SignupForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub csrf_token: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub csrf_token: String,
    pub error: Option<String>,
    pub email: String,
}

/// Sign-up page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/signup.html")]
pub struct SignupTemplate {
    pub csrf_token: String,
    pub error: Option<String>,
    pub username: String,
    pub email: String,
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page(OptionalAuth(user): OptionalAuth, csrf: CsrfToken) -> Response {
    if user.is_some() {
        return Redirect::to(AFTER_LOGIN_PATH).into_response();
    }

    LoginTemplate {
        csrf_token: csrf.0,
        error: None,
        email: String::new(),
    }
    .into_response()
}

/// Handle login form submission.
///
/// # Errors
///
/// Returns `AppError::Forbidden` on a CSRF mismatch and a server error if
/// storage or the session store fails. Wrong credentials re-render the form.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    verify_csrf(&session, &form.csrf_token).await?;

    let auth = AuthService::new(state.storage().users());
    match auth.log_in(&form.email, &form.password).await {
        Ok(user) => {
            set_current_user(&session, &CurrentUser::from(&user))
                .await
                .map_err(session_error)?;
            add_breadcrumb("auth", "Logged in", &[("user_id", user.id.to_string())]);
            Ok(Redirect::to(AFTER_LOGIN_PATH).into_response())
        }
        Err(err) if err.is_user_error() => {
            tracing::debug!(error = %err, "Login rejected");
            let message = err.form_message();
            let status = AppError::from(err).status();
            let page = LoginTemplate {
                csrf_token: CsrfToken::for_session(&session).await?.0,
                error: Some(message),
                email: form.email,
            };
            Ok((status, page).into_response())
        }
        Err(err) => Err(err.into()),
    }
}

// =============================================================================
// Sign-up Routes
// =============================================================================

/// Display the sign-up page.
pub async fn signup_page(OptionalAuth(user): OptionalAuth, csrf: CsrfToken) -> Response {
    if user.is_some() {
        return Redirect::to(AFTER_LOGIN_PATH).into_response();
    }

    SignupTemplate {
        csrf_token: csrf.0,
        error: None,
        username: String::new(),
        email: String::new(),
    }
    .into_response()
}

/// Handle sign-up form submission.
///
/// # Errors
///
/// Returns `AppError::Forbidden` on a CSRF mismatch and a server error if
/// storage or the session store fails. Invalid input re-renders the form.
pub async fn signup(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<SignupForm>,
) -> Result<Response, AppError> {
    verify_csrf(&session, &form.csrf_token).await?;

    let auth = AuthService::new(state.storage().users());
    let result = auth
        .sign_up(SignUp {
            username: &form.username,
            email: &form.email,
            password: &form.password,
            confirm_password: &form.confirm_password,
        })
        .await;

    match result {
        Ok(user) => {
            set_current_user(&session, &CurrentUser::from(&user))
                .await
                .map_err(session_error)?;
            add_breadcrumb("auth", "Signed up", &[("user_id", user.id.to_string())]);
            Ok(Redirect::to(AFTER_LOGIN_PATH).into_response())
        }
        Err(err) if err.is_user_error() => {
            tracing::debug!(error = %err, "Sign-up rejected");
            let message = err.form_message();
            let status = AppError::from(err).status();
            let page = SignupTemplate {
                csrf_token: CsrfToken::for_session(&session).await?.0,
                error: Some(message),
                username: form.username,
                email: form.email,
            };
            Ok((status, page).into_response())
        }
        Err(err) => Err(err.into()),
    }
}

// =============================================================================
// Logout
// =============================================================================

/// Destroy the session and return to the login page.
///
/// # Errors
///
/// Returns a server error if the session cannot be deleted.
pub async fn logout(session: Session) -> Result<Redirect, AppError> {
    clear_current_user(&session).await.map_err(session_error)?;
    Ok(Redirect::to(LOGIN_PATH))
}
