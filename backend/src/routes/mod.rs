//! Route definitions for Mill Mitra

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Auth routes (public)
        .nest("/auth", auth_routes())
        // Protected routes - release order management
        .nest("/release-orders", release_order_routes())
        // Protected routes - paddy lifting
        .nest("/lifting", lifting_routes())
        // Protected routes - daily stock log
        .nest("/daily-logs", daily_log_routes())
        // Protected routes - CMR orders and rice delivery
        .nest("/deliveries", delivery_routes())
        // Protected routes - FRK management
        .nest("/frk", frk_routes())
        // Protected routes - registers and reports
        .nest("/reports", report_routes())
        // Protected routes - backup and restore
        .nest("/backup", backup_routes())
}

/// Authentication routes
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
        .route("/recover", post(handlers::recover))
        // Season discovery needs the caller's identity
        .route(
            "/seasons",
            get(handlers::list_seasons).route_layer(middleware::from_fn(auth_middleware)),
        )
}

/// Release order routes (protected)
fn release_order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_release_orders))
        .route("/import", post(handlers::import_release_order))
        .route(
            "/:do_no",
            put(handlers::update_release_order).delete(handlers::delete_release_order),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Paddy lifting routes (protected)
fn lifting_routes() -> Router<AppState> {
    Router::new()
        .route("/godowns", get(handlers::godown_board))
        .route("/plan", post(handlers::plan_lift))
        .route("/", post(handlers::record_lift))
        .route("/records", get(handlers::list_lifting_records))
        .route("/records/:id", delete(handlers::delete_lifting_record))
        .route("/weighing-slip", post(handlers::extract_weighing_slip))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Daily stock log routes (protected)
fn daily_log_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_daily_logs).post(handlers::upsert_daily_log),
        )
        .route("/:id", delete(handlers::delete_daily_log))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// CMR order and delivery routes (protected)
fn delivery_routes() -> Router<AppState> {
    Router::new()
        .route("/cmr/import", post(handlers::import_cmr_order))
        .route("/cmr", get(handlers::list_cmr_orders))
        .route(
            "/cmr/:id",
            put(handlers::update_cmr_order).delete(handlers::delete_cmr_order),
        )
        .route(
            "/",
            get(handlers::list_deliveries).post(handlers::create_delivery),
        )
        .route("/summary", get(handlers::delivery_summary))
        .route("/:id", delete(handlers::delete_delivery))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// FRK routes (protected)
fn frk_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_frk_records).post(handlers::create_frk_record),
        )
        .route("/stock", get(handlers::frk_stock_summary))
        .route("/:id", delete(handlers::delete_frk_record))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Report routes (protected)
fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/stock", get(handlers::stock_report))
        .route("/bags", get(handlers::bag_report))
        .route("/godowns", get(handlers::godown_report))
        .route("/do-wise", get(handlers::do_report))
        .route("/byproducts", get(handlers::byproduct_report))
        .route("/lifting-register", get(handlers::lifting_register_report))
        .route("/lifting-register/csv", get(handlers::lifting_register_csv))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Backup routes (protected)
fn backup_routes() -> Router<AppState> {
    Router::new()
        .route("/export", get(handlers::export_backup))
        .route("/preview", post(handlers::preview_backup))
        .route("/restore", post(handlers::restore_backup))
        .route_layer(middleware::from_fn(auth_middleware))
}
