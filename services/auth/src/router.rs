use axum::{
    Router,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use lumina_core::health::{healthz, readyz};
use lumina_core::middleware::{propagate_request_id_layer, request_id_layer};

use crate::domain::repository::{CodeDelivery, UserRepository, VerificationCodeStore};
use crate::handlers::{
    auth::{login, logout, register},
    code::{send_code, verify_code},
    user::get_user,
};
use crate::state::AppState;

pub fn build_router<U, S, D>(state: AppState<U, S, D>) -> Router
where
    U: UserRepository + Clone + 'static,
    S: VerificationCodeStore + Clone + 'static,
    D: CodeDelivery + Clone + 'static,
{
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Verification codes
        .route("/api/auth/code/send", post(send_code::<U, S, D>))
        .route("/api/auth/code/verify", post(verify_code::<U, S, D>))
        // Session
        .route("/api/auth/login", post(login::<U, S, D>))
        .route("/api/auth/register", post(register::<U, S, D>))
        .route("/api/auth/logout", post(logout))
        // Users
        .route("/api/users/{id}", get(get_user::<U, S, D>))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(request_id_layer())
                .layer(TraceLayer::new_for_http())
                .layer(propagate_request_id_layer()),
        )
}
