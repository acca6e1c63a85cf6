pub mod health;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::state::AppState;
use crate::store::handlers as store;
use crate::views::handlers as views;
use crate::weather::handlers as weather;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Whole store
        .route("/api/v1/state", get(store::handle_get_state))
        .route("/api/v1/data", delete(store::handle_clear_all))
        .route(
            "/api/v1/premium",
            get(store::handle_get_premium).put(store::handle_set_premium),
        )
        // Garden beds and plants
        .route(
            "/api/v1/beds",
            get(store::handle_list_beds).post(store::handle_create_bed),
        )
        .route(
            "/api/v1/beds/:id",
            get(store::handle_get_bed)
                .patch(store::handle_update_bed)
                .delete(store::handle_delete_bed),
        )
        .route(
            "/api/v1/plants",
            get(store::handle_list_plants).post(store::handle_create_plant),
        )
        .route(
            "/api/v1/plants/:id",
            get(store::handle_get_plant)
                .patch(store::handle_update_plant)
                .delete(store::handle_delete_plant),
        )
        // Tasks
        .route(
            "/api/v1/tasks",
            get(store::handle_list_tasks).post(store::handle_create_task),
        )
        .route("/api/v1/tasks/overdue", get(views::handle_overdue_tasks))
        .route("/api/v1/tasks/summary", get(views::handle_task_summary))
        .route(
            "/api/v1/tasks/:id",
            get(store::handle_get_task)
                .patch(store::handle_update_task)
                .delete(store::handle_delete_task),
        )
        .route("/api/v1/tasks/:id/toggle", post(store::handle_toggle_task))
        // Budget
        .route(
            "/api/v1/transactions",
            get(store::handle_list_transactions).post(store::handle_create_transaction),
        )
        .route(
            "/api/v1/transactions/:id",
            get(store::handle_get_transaction)
                .patch(store::handle_update_transaction)
                .delete(store::handle_delete_transaction),
        )
        .route("/api/v1/budget/summary", get(views::handle_budget_summary))
        // Derived views
        .route("/api/v1/dashboard", get(views::handle_dashboard))
        .route("/api/v1/analytics", get(views::handle_analytics))
        // Weather
        .route("/api/v1/weather", get(weather::handle_get_weather))
        .route("/api/v1/weather/refresh", post(weather::handle_refresh_weather))
        .route(
            "/api/v1/weather/history",
            get(weather::handle_weather_history)
                .post(weather::handle_add_weather_history)
                .delete(weather::handle_clear_weather_history),
        )
        .with_state(state)
}
