use chrono::{DateTime, Local};
use ethers::types::U256;

use crate::types::{WalletLineWarning, WorkflowResult};

#[derive(Debug, Clone)]
pub struct BatchReport {
    pub started_at: DateTime<Local>,
    pub finished_at: Option<DateTime<Local>>,
    pub results: Vec<WorkflowResult>,
    pub skipped_lines: Vec<WalletLineWarning>,
    /// Stopped by an interrupt before every wallet was processed.
    pub interrupted: bool,
}

impl BatchReport {
    pub fn new(skipped_lines: Vec<WalletLineWarning>) -> Self {
        Self {
            started_at: Local::now(),
            finished_at: None,
            results: Vec::new(),
            skipped_lines,
            interrupted: false,
        }
    }

    pub fn push(&mut self, result: WorkflowResult) {
        self.results.push(result);
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Local::now());
    }

    pub fn success_count(&self) -> usize {
        self.results.iter().filter(|result| result.success()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.results.len() - self.success_count()
    }

    pub fn total_gas_used(&self) -> U256 {
        self.results
            .iter()
            .fold(U256::zero(), |total, result| total + result.total_gas_used())
    }
}
