use serde::Serialize;

use crate::models::{BudgetTransaction, TransactionKind};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BudgetSummary {
    pub income: f64,
    pub expense: f64,
    pub balance: f64,
    pub transaction_count: usize,
    /// Expense totals per category, largest first.
    pub expense_by_category: Vec<CategoryTotal>,
}

/// Totals use each amount's magnitude; `kind` decides the side.
pub fn budget_summary(transactions: &[BudgetTransaction]) -> BudgetSummary {
    let mut summary = BudgetSummary {
        transaction_count: transactions.len(),
        ..Default::default()
    };
    let mut by_category: Vec<CategoryTotal> = Vec::new();

    for tx in transactions {
        let amount = tx.amount.abs();
        match tx.kind {
            TransactionKind::Income => summary.income += amount,
            TransactionKind::Expense => {
                summary.expense += amount;
                match by_category.iter_mut().find(|c| c.category == tx.category) {
                    Some(entry) => entry.total += amount,
                    None => by_category.push(CategoryTotal {
                        category: tx.category.clone(),
                        total: amount,
                    }),
                }
            }
        }
    }

    by_category.sort_by(|a, b| b.total.total_cmp(&a.total));
    summary.balance = summary.income - summary.expense;
    summary.expense_by_category = by_category;
    summary
}
