use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use sysdeck_core::{Lifecycle, LogSink, ManagedComponent, ProgressTracker, TaskRunner};
use uuid::Uuid;

use super::{require_finite, require_name, ManagerError, Registry, Result};
use crate::models::*;

pub const FINANCE_MANAGER: &str = "FinanceManager";

pub struct FinanceManager {
    lifecycle: Lifecycle,
    runner: TaskRunner,
    transactions: Registry<Transaction>,
}

impl FinanceManager {
    pub fn new(log: Arc<dyn LogSink>, progress: Arc<dyn ProgressTracker>) -> Self {
        Self {
            lifecycle: Lifecycle::new(FINANCE_MANAGER, log.clone()),
            runner: TaskRunner::new(FINANCE_MANAGER, log, progress),
            transactions: Registry::new(),
        }
    }

    /// Transactions, newest `date` first.
    pub fn list(&self) -> Result<Vec<Transaction>> {
        self.lifecycle.check_initialized()?;
        let mut transactions = self.transactions.list();
        transactions.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(transactions)
    }

    pub async fn record(&self, input: CreateTransactionInput) -> Result<Transaction> {
        self.lifecycle.check_initialized()?;
        let title = format!("Record {} {}", input.kind.as_str(), input.description);
        self.runner
            .execute_task(
                &title,
                move || async move {
                    require_name("description", &input.description)?;
                    require_finite("amount", input.amount)?;
                    if input.amount < 0.0 {
                        return Err(ManagerError::Invalid(
                            "amount must not be negative; use kind to set direction".to_string(),
                        ));
                    }

                    let now = Utc::now();
                    let transaction = Transaction {
                        id: Uuid::new_v4(),
                        description: input.description,
                        amount: input.amount,
                        kind: input.kind,
                        category: input.category,
                        date: input.date.unwrap_or(now),
                        created_at: now,
                    };
                    self.transactions.insert(transaction.clone());
                    Ok(transaction)
                },
                None,
            )
            .await
    }

    pub async fn delete(&self, id: Uuid) -> Result<Transaction> {
        self.lifecycle.check_initialized()?;
        self.runner
            .execute_task(
                &format!("Delete transaction {}", id),
                move || async move {
                    self.transactions
                        .remove(id)
                        .ok_or_else(|| ManagerError::not_found("Transaction", id))
                },
                None,
            )
            .await
    }

    pub fn summary(&self) -> Result<FinanceSummary> {
        self.lifecycle.check_initialized()?;
        let mut summary = FinanceSummary::default();
        for t in self.transactions.list() {
            match t.kind {
                TransactionKind::Income => summary.income += t.amount,
                TransactionKind::Expense => summary.expenses += t.amount,
            }
        }
        summary.balance = summary.income - summary.expenses;
        Ok(summary)
    }
}

#[async_trait]
impl ManagedComponent for FinanceManager {
    fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }
}
