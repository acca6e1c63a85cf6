use chrono::Utc;

use super::events::{Collection, StoreEvent};
use super::{new_id, EntityKind, GardenStore, StoreError};
use crate::models::{BudgetTransaction, NewTransaction, TransactionUpdate};

impl GardenStore {
    pub fn add_transaction(&mut self, data: NewTransaction) -> BudgetTransaction {
        let transaction = BudgetTransaction::from_new(new_id(), data, Utc::now());
        self.transactions.push(transaction.clone());
        self.commit(StoreEvent::added(Collection::Transactions, &transaction.id));
        transaction
    }

    pub fn update_transaction(
        &mut self,
        id: &str,
        update: TransactionUpdate,
    ) -> Result<BudgetTransaction, StoreError> {
        let transaction = self
            .transactions
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| StoreError::not_found(EntityKind::Transaction, id))?;
        transaction.apply(update);
        let updated = transaction.clone();
        self.commit(StoreEvent::updated(Collection::Transactions, id));
        Ok(updated)
    }

    pub fn delete_transaction(&mut self, id: &str) -> Result<BudgetTransaction, StoreError> {
        let index = self
            .transactions
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| StoreError::not_found(EntityKind::Transaction, id))?;
        let transaction = self.transactions.remove(index);
        self.commit(StoreEvent::deleted(Collection::Transactions, id));
        Ok(transaction)
    }
}
