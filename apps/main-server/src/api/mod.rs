//! HTTP endpoints.

pub mod appointments;
pub mod bookings;
pub mod doctors;
pub mod payments;
pub mod users;

use axum::{
    Router, middleware,
    routing::{MethodRouter, delete, get, post, put},
};
use booking_store::BookingStore;
use uuid::Uuid;

use crate::error::{ServerError, ServerResult};
use crate::middleware::{admin_middleware, auth_middleware};
use crate::state::SharedState;

/// Creates the router with every endpoint and its access rule.
pub fn create_router<S: BookingStore + 'static>(state: SharedState<S>) -> Router {
    Router::new()
        // Availability
        .route("/appointmentOptions", get(appointments::list_options::<S>))
        .route("/appointment-Speciality", get(appointments::list_treatment_names::<S>))
        // Bookings
        .route(
            "/bookings",
            user_only(
                &state,
                post(bookings::create_booking::<S>).get(bookings::list_bookings::<S>),
            ),
        )
        .route(
            "/bookings/:id",
            get(bookings::get_booking::<S>)
                .merge(user_only(&state, delete(bookings::delete_booking::<S>))),
        )
        // Users
        .route("/setuser", put(users::set_user::<S>))
        .route("/users", get(users::list_users::<S>))
        .route("/users/:id", user_only(&state, delete(users::delete_user::<S>)))
        .route("/adminusers", admin_only(&state, get(users::get_user::<S>)))
        .route("/Admin/user", admin_only(&state, put(users::promote_user::<S>)))
        // Doctors
        .route("/doctors", admin_only(&state, post(doctors::add_doctor::<S>)))
        .route("/alldoctors", admin_only(&state, get(doctors::list_doctors::<S>)))
        .route("/doctors/:id", admin_only(&state, delete(doctors::delete_doctor::<S>)))
        // Payments
        .route("/create-payment-intent", post(payments::create_payment_intent::<S>))
        .route("/payments", post(payments::confirm_payment::<S>))
        // Liveness
        .route("/", get(root))
        .route("/health", get(health_check))
        .with_state(state)
}

/// Requires a valid identity token.
fn user_only<S: BookingStore + 'static>(
    state: &SharedState<S>,
    route: MethodRouter<SharedState<S>>,
) -> MethodRouter<SharedState<S>> {
    route.route_layer(middleware::from_fn_with_state(
        state.clone(),
        auth_middleware::<S>,
    ))
}

/// Requires a valid identity token belonging to an admin.
fn admin_only<S: BookingStore + 'static>(
    state: &SharedState<S>,
    route: MethodRouter<SharedState<S>>,
) -> MethodRouter<SharedState<S>> {
    // Layers added last run first, so authentication precedes the role check.
    let route = route.route_layer(middleware::from_fn_with_state(
        state.clone(),
        admin_middleware::<S>,
    ));
    user_only(state, route)
}

/// Parses a path identifier.
pub(crate) fn parse_id(raw: &str) -> ServerResult<Uuid> {
    raw.parse()
        .map_err(|_| ServerError::InvalidRequest(format!("Invalid id: {raw}")))
}

async fn root() -> &'static str {
    "doctors portal server is running"
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
