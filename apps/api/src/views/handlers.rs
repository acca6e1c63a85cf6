use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::{GardenBed, PlantedItem, WeatherSnapshot};
use crate::state::AppState;
use crate::store::handlers::TaskView;
use crate::views::analytics::{build_report, AnalyticsPeriod, AnalyticsReport};
use crate::views::budget::{budget_summary, BudgetSummary};
use crate::views::filters::{plants_in_selection, BedSelection};
use crate::views::tasks::{
    overdue_tasks, pending_preview, sort_tasks, task_summary, TaskSummary, PENDING_PREVIEW_LEN,
};

const RECENT_BEDS_LEN: usize = 2;

/// GET /api/v1/tasks/overdue
pub async fn handle_overdue_tasks(State(state): State<AppState>) -> Json<Vec<TaskView>> {
    let store = state.store.read().await;
    let mut overdue = overdue_tasks(store.tasks(), Utc::now());
    sort_tasks(&mut overdue);
    Json(overdue.into_iter().map(TaskView::from).collect())
}

/// GET /api/v1/tasks/summary
pub async fn handle_task_summary(State(state): State<AppState>) -> Json<TaskSummary> {
    let store = state.store.read().await;
    Json(task_summary(store.tasks(), Utc::now()))
}

/// GET /api/v1/budget/summary
pub async fn handle_budget_summary(State(state): State<AppState>) -> Json<BudgetSummary> {
    let store = state.store.read().await;
    Json(budget_summary(store.transactions()))
}

#[derive(Serialize)]
pub struct DashboardResponse {
    pub bed_count: usize,
    pub plant_count: usize,
    pub is_premium: bool,
    pub tasks: TaskSummary,
    pub pending_tasks: Vec<TaskView>,
    pub recent_beds: Vec<GardenBed>,
    pub weather: Option<WeatherSnapshot>,
    pub location_name: String,
}

/// GET /api/v1/dashboard
pub async fn handle_dashboard(State(state): State<AppState>) -> Json<DashboardResponse> {
    let store = state.store.read().await;
    Json(DashboardResponse {
        bed_count: store.beds().len(),
        plant_count: store.plants().len(),
        is_premium: store.is_premium(),
        tasks: task_summary(store.tasks(), Utc::now()),
        pending_tasks: pending_preview(store.tasks(), PENDING_PREVIEW_LEN)
            .into_iter()
            .map(TaskView::from)
            .collect(),
        recent_beds: store.beds().iter().take(RECENT_BEDS_LEN).cloned().collect(),
        weather: store.weather().current.clone(),
        location_name: store.weather().location_name.clone(),
    })
}

#[derive(Debug, Default, Deserialize)]
pub struct AnalyticsQuery {
    pub period: Option<AnalyticsPeriod>,
    pub bed: Option<String>,
}

/// GET /api/v1/analytics
pub async fn handle_analytics(
    State(state): State<AppState>,
    Query(params): Query<AnalyticsQuery>,
) -> Result<Json<AnalyticsReport>, AppError> {
    let selection = BedSelection::parse(params.bed.as_deref());
    let plants: Vec<PlantedItem> = {
        let store = state.store.read().await;
        plants_in_selection(store.plants(), &selection)
            .into_iter()
            .cloned()
            .collect()
    };

    let bed_id = match selection {
        BedSelection::All => None,
        BedSelection::Bed(id) => Some(id),
    };
    let report = build_report(
        state.analytics.as_ref(),
        params.period.unwrap_or_default(),
        bed_id,
        &plants,
        Utc::now().date_naive(),
    )
    .await?;
    Ok(Json(report))
}
