use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Income,
    Expense,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetTransaction {
    pub id: String,
    pub title: String,
    /// Signed as entered; totals use the magnitude together with `kind`.
    pub amount: f64,
    pub kind: TransactionKind,
    pub category: String,
    pub date: DateTime<Utc>,
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTransaction {
    pub title: String,
    pub amount: f64,
    pub kind: TransactionKind,
    pub category: String,
    pub date: DateTime<Utc>,
    pub notes: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionUpdate {
    pub title: Option<String>,
    pub amount: Option<f64>,
    pub kind: Option<TransactionKind>,
    pub category: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

impl BudgetTransaction {
    pub fn from_new(id: String, data: NewTransaction, created_at: DateTime<Utc>) -> Self {
        BudgetTransaction {
            id,
            title: data.title,
            amount: data.amount,
            kind: data.kind,
            category: data.category,
            date: data.date,
            notes: data.notes,
            created_at,
        }
    }

    pub fn apply(&mut self, update: TransactionUpdate) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(amount) = update.amount {
            self.amount = amount;
        }
        if let Some(kind) = update.kind {
            self.kind = kind;
        }
        if let Some(category) = update.category {
            self.category = category;
        }
        if let Some(date) = update.date {
            self.date = date;
        }
        if let Some(notes) = update.notes {
            self.notes = notes;
        }
    }
}
