//! Bounded expansion-round budget for one session.

use serde::Serialize;

/// Remaining expansion rounds plus every query issued so far.
///
/// The base query is recorded without spending budget; each expansion
/// round spends one unit whether or not its search succeeds.
#[derive(Debug, Clone, Serialize)]
pub struct QueryBudget {
    max_rounds: usize,
    remaining: usize,
    issued: Vec<String>,
}

impl QueryBudget {
    pub fn new(max_rounds: usize) -> Self {
        Self {
            max_rounds,
            remaining: max_rounds,
            issued: Vec::new(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.remaining
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }

    /// Expansion rounds spent so far.
    pub fn rounds_used(&self) -> usize {
        self.max_rounds - self.remaining
    }

    /// Queries issued so far, base query first.
    pub fn issued(&self) -> &[String] {
        &self.issued
    }

    /// Record the base query. Does not spend budget.
    pub fn record_base(&mut self, query: &str) {
        self.issued.push(query.to_owned());
    }

    /// Spend one round on `query`. Returns `false` when the budget was
    /// already exhausted, in which case nothing is recorded.
    pub fn spend(&mut self, query: &str) -> bool {
        if self.is_exhausted() {
            return false;
        }
        self.remaining -= 1;
        self.issued.push(query.to_owned());
        true
    }

    pub fn into_issued(self) -> Vec<String> {
        self.issued
    }
}
