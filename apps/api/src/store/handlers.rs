use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::{AppError, AppJson};
use crate::models::{BudgetTransaction, GardenBed, GardenTask, PlantedItem, WeatherHistoryEntry};
use crate::state::AppState;
use crate::store::{BedRemoval, EntityKind, StoreError, WeatherState};
use crate::validation::{
    validate_bed, validate_bed_patch, validate_plant, validate_plant_patch, validate_task,
    validate_task_patch, validate_transaction, validate_transaction_patch, BedForm, BedPatch,
    PlantForm, PlantPatch, TaskForm, TaskPatch, TransactionForm, TransactionPatch,
};
use crate::views::filters::{
    filter_tasks, search_beds, search_plants, search_transactions, BedSelection, CategoryFilter,
    StatusFilter, TaskFilter,
};
use crate::views::tasks::sort_tasks;

/// A task as presentation sees it: the stored fields plus the derived
/// `completed` flag.
#[derive(Debug, Clone, Serialize)]
pub struct TaskView {
    #[serde(flatten)]
    pub task: GardenTask,
    pub completed: bool,
}

impl From<&GardenTask> for TaskView {
    fn from(task: &GardenTask) -> Self {
        TaskView {
            completed: task.is_completed(),
            task: task.clone(),
        }
    }
}

#[derive(Serialize)]
pub struct StateResponse {
    pub beds: Vec<GardenBed>,
    pub plants: Vec<PlantedItem>,
    pub tasks: Vec<TaskView>,
    pub budget_transactions: Vec<BudgetTransaction>,
    pub is_premium: bool,
    pub weather_history: Vec<WeatherHistoryEntry>,
    pub weather: WeatherState,
    pub last_save_error: Option<String>,
}

/// GET /api/v1/state
pub async fn handle_get_state(State(state): State<AppState>) -> Json<StateResponse> {
    let store = state.store.read().await;
    Json(StateResponse {
        beds: store.beds().to_vec(),
        plants: store.plants().to_vec(),
        tasks: store.tasks().iter().map(TaskView::from).collect(),
        budget_transactions: store.transactions().to_vec(),
        is_premium: store.is_premium(),
        weather_history: store.weather_history().to_vec(),
        weather: store.weather().clone(),
        last_save_error: store.last_save_error().map(str::to_string),
    })
}

/// DELETE /api/v1/data
pub async fn handle_clear_all(State(state): State<AppState>) -> StatusCode {
    state.store.write().await.clear_all();
    StatusCode::NO_CONTENT
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub search: Option<String>,
    pub bed: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Beds
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/beds
pub async fn handle_list_beds(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Json<Vec<GardenBed>> {
    let store = state.store.read().await;
    Json(
        search_beds(store.beds(), params.search.as_deref())
            .into_iter()
            .cloned()
            .collect(),
    )
}

/// POST /api/v1/beds
pub async fn handle_create_bed(
    State(state): State<AppState>,
    AppJson(form): AppJson<BedForm>,
) -> Result<(StatusCode, Json<GardenBed>), AppError> {
    let data = validate_bed(form)?;
    let bed = state.store.write().await.add_bed(data);
    Ok((StatusCode::CREATED, Json(bed)))
}

/// GET /api/v1/beds/:id
pub async fn handle_get_bed(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<GardenBed>, AppError> {
    let store = state.store.read().await;
    let bed = store
        .bed(&id)
        .cloned()
        .ok_or_else(|| StoreError::not_found(EntityKind::Bed, &id))?;
    Ok(Json(bed))
}

/// PATCH /api/v1/beds/:id
pub async fn handle_update_bed(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(patch): AppJson<BedPatch>,
) -> Result<Json<GardenBed>, AppError> {
    let update = validate_bed_patch(patch)?;
    let bed = state.store.write().await.update_bed(&id, update)?;
    Ok(Json(bed))
}

/// DELETE /api/v1/beds/:id
pub async fn handle_delete_bed(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<BedRemoval>, AppError> {
    let removal = state.store.write().await.delete_bed(&id)?;
    Ok(Json(removal))
}

// ────────────────────────────────────────────────────────────────────────────
// Plants
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/plants
pub async fn handle_list_plants(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Json<Vec<PlantedItem>> {
    let selection = BedSelection::parse(params.bed.as_deref());
    let store = state.store.read().await;
    Json(
        search_plants(store.plants(), &selection, params.search.as_deref())
            .into_iter()
            .cloned()
            .collect(),
    )
}

/// POST /api/v1/plants
pub async fn handle_create_plant(
    State(state): State<AppState>,
    AppJson(form): AppJson<PlantForm>,
) -> Result<(StatusCode, Json<PlantedItem>), AppError> {
    let data = validate_plant(form)?;
    let plant = state.store.write().await.add_plant(data)?;
    Ok((StatusCode::CREATED, Json(plant)))
}

/// GET /api/v1/plants/:id
pub async fn handle_get_plant(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PlantedItem>, AppError> {
    let store = state.store.read().await;
    let plant = store
        .plant(&id)
        .cloned()
        .ok_or_else(|| StoreError::not_found(EntityKind::Plant, &id))?;
    Ok(Json(plant))
}

/// PATCH /api/v1/plants/:id
pub async fn handle_update_plant(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(patch): AppJson<PlantPatch>,
) -> Result<Json<PlantedItem>, AppError> {
    let update = validate_plant_patch(patch)?;
    let plant = state.store.write().await.update_plant(&id, update)?;
    Ok(Json(plant))
}

/// DELETE /api/v1/plants/:id
pub async fn handle_delete_plant(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.store.write().await.delete_plant(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

// ────────────────────────────────────────────────────────────────────────────
// Tasks
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct TaskListQuery {
    pub bed: Option<String>,
    pub status: Option<StatusFilter>,
    pub category: Option<String>,
    pub search: Option<String>,
}

/// GET /api/v1/tasks
/// Filtered, then sorted: incomplete first, by priority, by due date.
pub async fn handle_list_tasks(
    State(state): State<AppState>,
    Query(params): Query<TaskListQuery>,
) -> Result<Json<Vec<TaskView>>, AppError> {
    let category = CategoryFilter::parse(params.category.as_deref()).ok_or_else(|| {
        AppError::Validation(format!(
            "Unknown task category '{}'",
            params.category.as_deref().unwrap_or_default()
        ))
    })?;
    let filter = TaskFilter {
        bed: BedSelection::parse(params.bed.as_deref()),
        status: params.status.unwrap_or_default(),
        category,
        search: params.search,
    };

    let store = state.store.read().await;
    let mut tasks = filter_tasks(store.tasks(), &filter);
    sort_tasks(&mut tasks);
    Ok(Json(tasks.into_iter().map(TaskView::from).collect()))
}

/// POST /api/v1/tasks
pub async fn handle_create_task(
    State(state): State<AppState>,
    AppJson(form): AppJson<TaskForm>,
) -> Result<(StatusCode, Json<TaskView>), AppError> {
    let data = validate_task(form)?;
    let task = state.store.write().await.add_task(data)?;
    Ok((StatusCode::CREATED, Json(TaskView::from(&task))))
}

/// GET /api/v1/tasks/:id
pub async fn handle_get_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TaskView>, AppError> {
    let store = state.store.read().await;
    let task = store
        .task(&id)
        .ok_or_else(|| StoreError::not_found(EntityKind::Task, &id))?;
    Ok(Json(TaskView::from(task)))
}

/// PATCH /api/v1/tasks/:id
pub async fn handle_update_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(patch): AppJson<TaskPatch>,
) -> Result<Json<TaskView>, AppError> {
    let update = validate_task_patch(patch)?;
    let task = state.store.write().await.update_task(&id, update)?;
    Ok(Json(TaskView::from(&task)))
}

/// POST /api/v1/tasks/:id/toggle
pub async fn handle_toggle_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TaskView>, AppError> {
    let task = state.store.write().await.toggle_task_complete(&id)?;
    Ok(Json(TaskView::from(&task)))
}

/// DELETE /api/v1/tasks/:id
pub async fn handle_delete_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.store.write().await.delete_task(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

// ────────────────────────────────────────────────────────────────────────────
// Budget
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/transactions
pub async fn handle_list_transactions(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Json<Vec<BudgetTransaction>> {
    let store = state.store.read().await;
    Json(
        search_transactions(store.transactions(), params.search.as_deref())
            .into_iter()
            .cloned()
            .collect(),
    )
}

/// POST /api/v1/transactions
pub async fn handle_create_transaction(
    State(state): State<AppState>,
    AppJson(form): AppJson<TransactionForm>,
) -> Result<(StatusCode, Json<BudgetTransaction>), AppError> {
    let data = validate_transaction(form)?;
    let tx = state.store.write().await.add_transaction(data);
    Ok((StatusCode::CREATED, Json(tx)))
}

/// GET /api/v1/transactions/:id
pub async fn handle_get_transaction(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<BudgetTransaction>, AppError> {
    let store = state.store.read().await;
    let tx = store
        .transaction(&id)
        .cloned()
        .ok_or_else(|| StoreError::not_found(EntityKind::Transaction, &id))?;
    Ok(Json(tx))
}

/// PATCH /api/v1/transactions/:id
pub async fn handle_update_transaction(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(patch): AppJson<TransactionPatch>,
) -> Result<Json<BudgetTransaction>, AppError> {
    let update = validate_transaction_patch(patch)?;
    let tx = state.store.write().await.update_transaction(&id, update)?;
    Ok(Json(tx))
}

/// DELETE /api/v1/transactions/:id
pub async fn handle_delete_transaction(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.store.write().await.delete_transaction(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

// ────────────────────────────────────────────────────────────────────────────
// Premium
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct PremiumStatus {
    pub is_premium: bool,
}

/// GET /api/v1/premium
pub async fn handle_get_premium(State(state): State<AppState>) -> Json<PremiumStatus> {
    Json(PremiumStatus {
        is_premium: state.store.read().await.is_premium(),
    })
}

/// PUT /api/v1/premium
pub async fn handle_set_premium(
    State(state): State<AppState>,
    AppJson(req): AppJson<PremiumStatus>,
) -> Json<PremiumStatus> {
    state.store.write().await.set_premium_status(req.is_premium);
    Json(req)
}
