use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::handlers::{
    airlines, auth, bookings, facilities, locations, payments, reports, reviews, tours, users,
};
use crate::middleware::auth::{auth_middleware, require_admin};
use crate::middleware::rate_limit::create_public_governor;
use crate::middleware::user_rate_limit::create_user_governor;
use crate::AppState;

pub fn create_router(state: AppState) -> Router {
    let public_governor = create_public_governor();
    let user_governor = create_user_governor();

    // Public routes (rate limited per IP)
    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .layer(public_governor.clone());

    let catalog_routes = Router::new()
        .route("/tours", get(tours::list_tours))
        .route("/tours/{id}", get(tours::get_tour))
        .route("/tours/{id}/reviews", get(reviews::list_reviews))
        .route("/airlines", get(airlines::list_airlines))
        .route("/locations", get(locations::list_locations))
        .route("/facilities", get(facilities::list_facilities))
        .layer(public_governor);

    // Called by the payment gateway
    let webhook_routes = Router::new()
        .route("/payments/notification", post(payments::payment_notification));

    // Authenticated customer routes (rate limited per user)
    let customer_routes = Router::new()
        .route(
            "/users/me",
            get(users::me).put(users::update_me).delete(users::delete_me),
        )
        .route(
            "/bookings",
            get(bookings::my_bookings).post(bookings::create_booking),
        )
        .route("/bookings/{code}", get(bookings::get_booking))
        .route("/bookings/{code}/cancel", post(bookings::cancel_booking))
        .route("/reviews", post(reviews::create_review))
        .route(
            "/reviews/{id}",
            put(reviews::update_review).delete(reviews::delete_review),
        )
        .layer(user_governor)
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Admin routes (requires auth + admin role)
    let admin_routes = Router::new()
        // Catalog management
        .route("/airlines", post(airlines::create_airline))
        .route(
            "/airlines/{id}",
            put(airlines::update_airline).delete(airlines::delete_airline),
        )
        .route("/locations", post(locations::create_location))
        .route(
            "/locations/{id}",
            put(locations::update_location).delete(locations::delete_location),
        )
        .route("/facilities", post(facilities::create_facility))
        .route(
            "/facilities/{id}",
            put(facilities::update_facility).delete(facilities::delete_facility),
        )
        .route("/tours", post(tours::create_tour))
        .route(
            "/tours/{id}",
            put(tours::update_tour).delete(tours::delete_tour),
        )
        // Accounts
        .route("/users", get(users::list_users))
        .route("/users/{id}", axum::routing::delete(users::delete_user))
        // Bookings
        .route("/bookings", get(bookings::list_all_bookings))
        .route("/bookings/{code}/status", put(bookings::update_booking_status))
        // Dashboard
        .route("/reports/summary", get(reports::summary))
        .route("/reports/tours", get(reports::tours))
        .layer(middleware::from_fn(require_admin))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let api_routes = catalog_routes
        .merge(webhook_routes)
        .merge(customer_routes);

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api/admin", admin_routes)
        .nest("/api", api_routes)
        .with_state(state)
}
