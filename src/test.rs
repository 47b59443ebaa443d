//! Shared test utilities for creating test environments.
//!
//! This module is only compiled when running tests (`#[cfg(test)]`).

use crate::config::Config;
use crate::dashboard::Dashboard;
use crate::ledger::Ledger;
use crate::model::ExpenseId;
use crate::seed;

/// A dashboard seeded with the built-in sample expenses and default settings.
pub struct TestEnv {
    dashboard: Dashboard,
}

impl TestEnv {
    pub fn new() -> Self {
        let ledger = Ledger::from_seed(seed::builtin().unwrap());
        Self {
            dashboard: Dashboard::new(ledger, &Config::default()),
        }
    }

    pub fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }

    pub fn dashboard_mut(&mut self) -> &mut Dashboard {
        &mut self.dashboard
    }

    pub fn into_dashboard(self) -> Dashboard {
        self.dashboard
    }

    /// Returns the id of the first expense with this description.
    pub fn id_of(&self, description: &str) -> ExpenseId {
        self.dashboard
            .ledger()
            .iter()
            .find(|e| e.description() == description)
            .map(|e| e.id())
            .unwrap_or_else(|| panic!("No seed expense named '{description}'"))
    }
}
