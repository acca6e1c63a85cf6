//! Input validation for everything that reaches the store's add/update calls.
//!
//! Forms arrive with raw strings. Each `validate_*` function sanitises text,
//! checks lengths, numbers and dates, and either returns the typed store input
//! or a `Validation` error listing every violated field. Enumerated fields are
//! already checked by the JSON decoder.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Deserializer};

use crate::errors::AppError;
use crate::models::{
    BedUpdate, HealthStatus, NewBed, NewPlant, NewTask, NewTransaction, NewWeatherHistoryEntry,
    PlantUpdate, TaskCategory, TaskPriority, TaskStatus, TaskUpdate, TransactionKind,
    TransactionUpdate,
};

const BED_NAME_MAX: usize = 50;
const BED_LOCATION_MAX: usize = 100;
const BED_DESCRIPTION_MAX: usize = 200;
const TASK_TITLE_MAX: usize = 100;
const TASK_DESCRIPTION_MAX: usize = 500;
const PLANT_NAME_MAX: usize = 50;
const PLANT_SPECIES_MAX: usize = 30;
const PLANT_NOTES_MAX: usize = 200;
const TRANSACTION_TITLE_MAX: usize = 100;
const TRANSACTION_CATEGORY_MAX: usize = 50;
const TRANSACTION_NOTES_MAX: usize = 500;
const CONDITION_MAX: usize = 50;

const MANUAL_SOURCE: &str = "Manual Entry";

/// Collects every failed check before reporting, so a form shows all problems
/// at once.
#[derive(Debug, Default)]
struct Violations(Vec<String>);

impl Violations {
    fn push(&mut self, message: impl Into<String>) {
        self.0.push(message.into());
    }

    /// Sanitises `raw` and checks its length (in characters).
    fn text(&mut self, field: &str, raw: &str, min: usize, max: usize) -> String {
        let clean = sanitize_input(raw);
        let len = clean.chars().count();
        if len < min {
            if min == 1 {
                self.push(format!("{field} is required"));
            } else {
                self.push(format!("{field} must be at least {min} characters"));
            }
        } else if len > max {
            self.push(format!("{field} must be at most {max} characters"));
        }
        clean
    }

    fn optional_text(&mut self, field: &str, raw: Option<&str>, max: usize) -> String {
        raw.map(|r| self.text(field, r, 0, max)).unwrap_or_default()
    }

    fn date(&mut self, field: &str, raw: &str) -> Option<DateTime<Utc>> {
        let parsed = parse_date(raw);
        if parsed.is_none() {
            self.push(format!("{field} is not a valid date"));
        }
        parsed
    }

    fn positive(&mut self, field: &str, value: f64) {
        if !value.is_finite() || value <= 0.0 {
            self.push(format!("{field} must be positive"));
        }
    }

    fn finite(&mut self, field: &str, value: f64) {
        if !value.is_finite() {
            self.push(format!("{field} must be a number"));
        }
    }

    fn finish<T>(self, value: impl FnOnce() -> T) -> Result<T, AppError> {
        if self.0.is_empty() {
            Ok(value())
        } else {
            Err(AppError::Validation(self.0.join("; ")))
        }
    }
}

/// Strips markup-ish fragments from free text: angle brackets,
/// `javascript:` and inline `on…=` handler attributes. Also trims.
pub fn sanitize_input(input: &str) -> String {
    let without_brackets: String = input.trim().chars().filter(|c| !matches!(c, '<' | '>')).collect();
    let without_protocol = remove_ascii_case_insensitive(&without_brackets, "javascript:");
    remove_event_handlers(&without_protocol)
}

fn remove_ascii_case_insensitive(haystack: &str, needle: &str) -> String {
    let lower = haystack.to_ascii_lowercase();
    let mut out = String::with_capacity(haystack.len());
    let mut cursor = 0;
    while let Some(found) = lower[cursor..].find(needle) {
        let start = cursor + found;
        out.push_str(&haystack[cursor..start]);
        cursor = start + needle.len();
    }
    out.push_str(&haystack[cursor..]);
    out
}

/// Removes every `on<word chars>=` run, matching case-insensitively.
fn remove_event_handlers(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut i = 0;
    while i < chars.len() {
        if chars[i].eq_ignore_ascii_case(&'o')
            && chars.get(i + 1).is_some_and(|c| c.eq_ignore_ascii_case(&'n'))
        {
            let mut j = i + 2;
            while j < chars.len() && (chars[j].is_ascii_alphanumeric() || chars[j] == '_') {
                j += 1;
            }
            if j > i + 2 && chars.get(j) == Some(&'=') {
                i = j + 1;
                continue;
            }
        }
        out.push(chars[i]);
        i += 1;
    }
    out
}

/// Accepts RFC 3339 timestamps or plain `YYYY-MM-DD` dates (midnight UTC).
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
    Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?))
}

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`).
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Form selects send "" for "no bed".
fn non_empty(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let v = v.trim().to_string();
        (!v.is_empty()).then_some(v)
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Beds
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct BedForm {
    pub name: String,
    pub location: String,
    pub area: f64,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BedPatch {
    pub name: Option<String>,
    pub location: Option<String>,
    pub area: Option<f64>,
    pub description: Option<String>,
}

pub fn validate_bed(form: BedForm) -> Result<NewBed, AppError> {
    let mut v = Violations::default();
    let name = v.text("name", &form.name, 1, BED_NAME_MAX);
    let location = v.text("location", &form.location, 1, BED_LOCATION_MAX);
    v.positive("area", form.area);
    let description = v.optional_text("description", form.description.as_deref(), BED_DESCRIPTION_MAX);
    v.finish(|| NewBed {
        name,
        location,
        area: form.area,
        description,
    })
}

pub fn validate_bed_patch(patch: BedPatch) -> Result<BedUpdate, AppError> {
    let mut v = Violations::default();
    let name = patch.name.map(|n| v.text("name", &n, 1, BED_NAME_MAX));
    let location = patch
        .location
        .map(|l| v.text("location", &l, 1, BED_LOCATION_MAX));
    if let Some(area) = patch.area {
        v.positive("area", area);
    }
    let description = patch
        .description
        .map(|d| v.text("description", &d, 0, BED_DESCRIPTION_MAX));
    v.finish(|| BedUpdate {
        name,
        location,
        area: patch.area,
        description,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Plants
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct PlantForm {
    pub name: String,
    #[serde(alias = "type")]
    pub species: String,
    pub bed_id: String,
    pub planted_date: String,
    #[serde(default)]
    pub expected_harvest_date: Option<String>,
    #[serde(default)]
    pub health: Option<HealthStatus>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlantPatch {
    pub name: Option<String>,
    #[serde(alias = "type")]
    pub species: Option<String>,
    pub bed_id: Option<String>,
    pub planted_date: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub expected_harvest_date: Option<Option<String>>,
    pub health: Option<HealthStatus>,
    pub notes: Option<String>,
}

pub fn validate_plant(form: PlantForm) -> Result<NewPlant, AppError> {
    let mut v = Violations::default();
    let name = v.text("name", &form.name, 1, PLANT_NAME_MAX);
    let species = v.text("type", &form.species, 1, PLANT_SPECIES_MAX);
    let bed_id = form.bed_id.trim().to_string();
    if bed_id.is_empty() {
        v.push("Bed ID is required");
    }
    let planted_date = v.date("planted_date", &form.planted_date);
    let expected_harvest_date = non_empty(form.expected_harvest_date)
        .and_then(|raw| v.date("expected_harvest_date", &raw));
    let notes = v.optional_text("notes", form.notes.as_deref(), PLANT_NOTES_MAX);
    v.finish(|| NewPlant {
        name,
        species,
        bed_id,
        planted_date: planted_date.unwrap_or_default(),
        expected_harvest_date,
        health: form.health.unwrap_or_default(),
        notes,
    })
}

pub fn validate_plant_patch(patch: PlantPatch) -> Result<PlantUpdate, AppError> {
    let mut v = Violations::default();
    let name = patch.name.map(|n| v.text("name", &n, 1, PLANT_NAME_MAX));
    let species = patch
        .species
        .map(|s| v.text("type", &s, 1, PLANT_SPECIES_MAX));
    let bed_id = match patch.bed_id {
        Some(id) if id.trim().is_empty() => {
            v.push("Bed ID is required");
            None
        }
        other => other.map(|id| id.trim().to_string()),
    };
    let planted_date = patch
        .planted_date
        .and_then(|raw| v.date("planted_date", &raw));
    let expected_harvest_date = patch
        .expected_harvest_date
        .map(|raw| non_empty(raw).and_then(|r| v.date("expected_harvest_date", &r)));
    let notes = patch
        .notes
        .map(|n| v.text("notes", &n, 0, PLANT_NOTES_MAX));
    v.finish(|| PlantUpdate {
        name,
        species,
        bed_id,
        planted_date,
        expected_harvest_date,
        health: patch.health,
        notes,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Tasks
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct TaskForm {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub due_date: String,
    pub priority: TaskPriority,
    pub category: TaskCategory,
    #[serde(default)]
    pub bed_id: Option<String>,
    #[serde(default)]
    pub status: Option<TaskStatus>,
    /// Boolean surfaces may send this instead of `status`.
    #[serde(default)]
    pub completed: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<String>,
    pub priority: Option<TaskPriority>,
    pub category: Option<TaskCategory>,
    pub status: Option<TaskStatus>,
    pub completed: Option<bool>,
    #[serde(default, deserialize_with = "double_option")]
    pub bed_id: Option<Option<String>>,
}

pub fn validate_task(form: TaskForm) -> Result<NewTask, AppError> {
    let mut v = Violations::default();
    let title = v.text("title", &form.title, 1, TASK_TITLE_MAX);
    let description =
        v.optional_text("description", form.description.as_deref(), TASK_DESCRIPTION_MAX);
    let due_date = v.date("due_date", &form.due_date);
    let status = form
        .status
        .or(form.completed.map(TaskStatus::from_completed))
        .unwrap_or_default();
    v.finish(|| NewTask {
        title,
        description,
        due_date: due_date.unwrap_or_default(),
        priority: form.priority,
        category: form.category,
        status,
        bed_id: non_empty(form.bed_id),
    })
}

pub fn validate_task_patch(patch: TaskPatch) -> Result<TaskUpdate, AppError> {
    let mut v = Violations::default();
    let title = patch.title.map(|t| v.text("title", &t, 1, TASK_TITLE_MAX));
    let description = patch
        .description
        .map(|d| v.text("description", &d, 0, TASK_DESCRIPTION_MAX));
    let due_date = patch.due_date.and_then(|raw| v.date("due_date", &raw));
    let status = patch
        .status
        .or(patch.completed.map(TaskStatus::from_completed));
    v.finish(|| TaskUpdate {
        title,
        description,
        due_date,
        priority: patch.priority,
        category: patch.category,
        status,
        bed_id: patch.bed_id.map(non_empty),
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Budget transactions
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct TransactionForm {
    pub title: String,
    pub amount: f64,
    #[serde(alias = "type")]
    pub kind: TransactionKind,
    pub category: String,
    pub date: String,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionPatch {
    pub title: Option<String>,
    pub amount: Option<f64>,
    #[serde(alias = "type")]
    pub kind: Option<TransactionKind>,
    pub category: Option<String>,
    pub date: Option<String>,
    pub notes: Option<String>,
}

pub fn validate_transaction(form: TransactionForm) -> Result<NewTransaction, AppError> {
    let mut v = Violations::default();
    let title = v.text("title", &form.title, 1, TRANSACTION_TITLE_MAX);
    v.finite("amount", form.amount);
    let category = v.text("category", &form.category, 1, TRANSACTION_CATEGORY_MAX);
    let date = v.date("date", &form.date);
    let notes = v.optional_text("notes", form.notes.as_deref(), TRANSACTION_NOTES_MAX);
    v.finish(|| NewTransaction {
        title,
        amount: form.amount,
        kind: form.kind,
        category,
        date: date.unwrap_or_default(),
        notes,
    })
}

pub fn validate_transaction_patch(
    patch: TransactionPatch,
) -> Result<TransactionUpdate, AppError> {
    let mut v = Violations::default();
    let title = patch
        .title
        .map(|t| v.text("title", &t, 1, TRANSACTION_TITLE_MAX));
    if let Some(amount) = patch.amount {
        v.finite("amount", amount);
    }
    let category = patch
        .category
        .map(|c| v.text("category", &c, 1, TRANSACTION_CATEGORY_MAX));
    let date = patch.date.and_then(|raw| v.date("date", &raw));
    let notes = patch
        .notes
        .map(|n| v.text("notes", &n, 0, TRANSACTION_NOTES_MAX));
    v.finish(|| TransactionUpdate {
        title,
        amount: patch.amount,
        kind: patch.kind,
        category,
        date,
        notes,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Weather log
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct WeatherHistoryForm {
    pub date: String,
    pub temperature: f64,
    pub condition: String,
    pub high_temp: Option<f64>,
    pub low_temp: Option<f64>,
    pub humidity: Option<f64>,
    pub wind_speed: Option<f64>,
    pub precipitation: Option<f64>,
    pub data_source: Option<String>,
    #[serde(default = "default_historical")]
    pub is_historical: bool,
}

fn default_historical() -> bool {
    true
}

pub fn validate_weather_history(
    form: WeatherHistoryForm,
) -> Result<NewWeatherHistoryEntry, AppError> {
    let mut v = Violations::default();
    let date = v.date("date", &form.date);
    v.finite("temperature", form.temperature);
    let condition = v.text("condition", &form.condition, 1, CONDITION_MAX);
    for (field, value) in [
        ("high_temp", form.high_temp),
        ("low_temp", form.low_temp),
        ("humidity", form.humidity),
        ("wind_speed", form.wind_speed),
        ("precipitation", form.precipitation),
    ] {
        if let Some(value) = value {
            v.finite(field, value);
        }
    }
    let data_source = non_empty(form.data_source).unwrap_or_else(|| MANUAL_SOURCE.to_string());
    v.finish(|| NewWeatherHistoryEntry {
        date: date.unwrap_or_default(),
        temperature: form.temperature,
        condition,
        high_temp: form.high_temp,
        low_temp: form.low_temp,
        humidity: form.humidity,
        wind_speed: form.wind_speed,
        precipitation: form.precipitation,
        data_source,
        is_historical: form.is_historical,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bed_form() -> BedForm {
        BedForm {
            name: "Herb spiral".to_string(),
            location: "By the kitchen".to_string(),
            area: 1.2,
            description: None,
        }
    }

    #[test]
    fn test_sanitize_strips_markup() {
        assert_eq!(sanitize_input("  <b>Basil</b>  "), "bBasil/b");
        assert_eq!(sanitize_input("JavaScript:alert(1)"), "alert(1)");
        assert_eq!(sanitize_input("x onClick=run()"), "x run()");
        assert_eq!(sanitize_input("onion = tasty"), "onion = tasty");
        assert_eq!(sanitize_input("Tomatoes"), "Tomatoes");
    }

    #[test]
    fn test_parse_date_accepts_plain_and_rfc3339() {
        let plain = parse_date("2024-05-01").unwrap();
        assert_eq!(plain.to_rfc3339(), "2024-05-01T00:00:00+00:00");
        let full = parse_date("2024-05-01T10:00:00+02:00").unwrap();
        assert_eq!(full.to_rfc3339(), "2024-05-01T08:00:00+00:00");
        assert!(parse_date("May first").is_none());
        assert!(parse_date("2024-13-40").is_none());
    }

    #[test]
    fn test_valid_bed_passes() {
        let bed = validate_bed(bed_form()).unwrap();
        assert_eq!(bed.name, "Herb spiral");
        assert_eq!(bed.description, "");
    }

    #[test]
    fn test_bed_rejects_empty_name_and_non_positive_area() {
        let mut form = bed_form();
        form.name = "   ".to_string();
        form.area = 0.0;
        match validate_bed(form) {
            Err(AppError::Validation(msg)) => {
                assert!(msg.contains("name is required"));
                assert!(msg.contains("area must be positive"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_bed_rejects_long_name() {
        let mut form = bed_form();
        form.name = "x".repeat(BED_NAME_MAX + 1);
        assert!(validate_bed(form).is_err());
    }

    #[test]
    fn test_bed_rejects_nan_area() {
        let mut form = bed_form();
        form.area = f64::NAN;
        assert!(validate_bed(form).is_err());
    }

    #[test]
    fn test_task_form_defaults_and_bed_blank() {
        let form: TaskForm = serde_json::from_value(serde_json::json!({
            "title": "Water beans",
            "due_date": "2024-06-01",
            "priority": "high",
            "category": "watering",
            "bed_id": ""
        }))
        .unwrap();
        let task = validate_task(form).unwrap();
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.bed_id, None);
        assert_eq!(task.description, "");
    }

    #[test]
    fn test_task_form_rejects_bad_date() {
        let form: TaskForm = serde_json::from_value(serde_json::json!({
            "title": "Water beans",
            "due_date": "tomorrow-ish",
            "priority": "low",
            "category": "general"
        }))
        .unwrap();
        assert!(matches!(validate_task(form), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_task_form_rejects_unknown_category() {
        let result: Result<TaskForm, _> = serde_json::from_value(serde_json::json!({
            "title": "Water beans",
            "due_date": "2024-06-01",
            "priority": "low",
            "category": "dancing"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_task_patch_null_bed_detaches() {
        let patch: TaskPatch =
            serde_json::from_value(serde_json::json!({ "bed_id": null, "completed": true }))
                .unwrap();
        let update = validate_task_patch(patch).unwrap();
        assert_eq!(update.bed_id, Some(None));
        assert_eq!(update.status, Some(TaskStatus::Completed));

        let untouched: TaskPatch = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(validate_task_patch(untouched).unwrap(), TaskUpdate::default());
    }

    #[test]
    fn test_plant_form_accepts_type_alias() {
        let form: PlantForm = serde_json::from_value(serde_json::json!({
            "name": "Cherry tomato",
            "type": "Solanum",
            "bed_id": "bed-1",
            "planted_date": "2024-04-10",
            "expected_harvest_date": "2024-07-01"
        }))
        .unwrap();
        let plant = validate_plant(form).unwrap();
        assert_eq!(plant.species, "Solanum");
        assert_eq!(plant.health, HealthStatus::Good);
        assert!(plant.expected_harvest_date.unwrap() > plant.planted_date);
    }

    #[test]
    fn test_plant_form_requires_bed() {
        let form: PlantForm = serde_json::from_value(serde_json::json!({
            "name": "Kale",
            "species": "Brassica",
            "bed_id": " ",
            "planted_date": "2024-04-10"
        }))
        .unwrap();
        assert!(validate_plant(form).is_err());
    }

    #[test]
    fn test_transaction_form_checks_category() {
        let form: TransactionForm = serde_json::from_value(serde_json::json!({
            "title": "Hose",
            "amount": 24.99,
            "type": "expense",
            "category": "",
            "date": "2024-04-10"
        }))
        .unwrap();
        assert!(validate_transaction(form).is_err());
    }

    #[test]
    fn test_weather_history_defaults_source() {
        let form: WeatherHistoryForm = serde_json::from_value(serde_json::json!({
            "date": "2024-04-10",
            "temperature": 14.5,
            "condition": "Rain",
            "precipitation": 6.0
        }))
        .unwrap();
        let entry = validate_weather_history(form).unwrap();
        assert_eq!(entry.data_source, MANUAL_SOURCE);
        assert!(entry.is_historical);
    }
}
