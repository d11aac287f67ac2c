use std::{
    io,
    path::{Path, PathBuf},
};

use chrono::Local;

use crate::{
    types::{BatchReport, WorkflowResult},
    utils::short_address,
};

pub const CSV_HEADER: [&str; 14] = [
    "index",
    "address",
    "status",
    "token name",
    "symbol",
    "token address",
    "image",
    "create tx",
    "buy tx",
    "approve tx",
    "sell tx",
    "steps",
    "gas used",
    "error",
];

pub struct ReportService;

impl ReportService {
    pub fn log_summary(report: &BatchReport) {
        log::info!(
            "[ReportService] {} wallets, {} succeeded, {} failed, {} lines skipped, gas used {}{}",
            report.results.len(),
            report.success_count(),
            report.failed_count(),
            report.skipped_lines.len(),
            report.total_gas_used(),
            if report.interrupted { " (interrupted)" } else { "" }
        );

        for result in &report.results {
            let token = result
                .token_address
                .map(|address| format!("{:#x}", address))
                .unwrap_or_else(|| "-".to_string());
            match &result.error {
                None => log::info!(
                    "[ReportService] #{} {} {} ({}) {}",
                    result.index,
                    short_address(&result.wallet_address),
                    result.token.name,
                    result.token.symbol,
                    token
                ),
                Some(err) => log::warn!(
                    "[ReportService] #{} {} [{}] {} token {}",
                    result.index,
                    short_address(&result.wallet_address),
                    err.kind(),
                    err,
                    token
                ),
            }
        }
        for skipped in &report.skipped_lines {
            log::warn!(
                "[ReportService] line {} skipped: {}",
                skipped.line_number,
                skipped.message
            );
        }
    }

    pub fn render_csv(report: &BatchReport) -> String {
        let mut csv = CSV_HEADER.join(",");
        csv.push('\n');
        for result in &report.results {
            let row: Vec<String> = Self::row(result)
                .into_iter()
                .map(|field| csv_field(&field))
                .collect();
            csv.push_str(&row.join(","));
            csv.push('\n');
        }
        csv
    }

    /// Write the CSV report into `dir` and return its path.
    pub fn write_csv(report: &BatchReport, dir: &Path) -> io::Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let timestamp = report.finished_at.unwrap_or_else(Local::now);
        let path = dir.join(format!(
            "batch_report_{}.csv",
            timestamp.format("%Y%m%d_%H%M%S")
        ));
        std::fs::write(&path, Self::render_csv(report))?;
        log::info!("[ReportService] report written to {:?}", path);
        Ok(path)
    }

    fn row(result: &WorkflowResult) -> Vec<String> {
        let approve_tx = result
            .sell
            .as_ref()
            .and_then(|sell| sell.approve.as_ref())
            .map(|outcome| outcome.tx_hash_hex())
            .unwrap_or_default();
        let sell_tx = result
            .sell
            .as_ref()
            .and_then(|sell| sell.sell.as_ref())
            .map(|outcome| outcome.tx_hash_hex())
            .unwrap_or_default();
        let steps: Vec<String> = result
            .steps_completed
            .iter()
            .map(|step| step.to_string())
            .collect();

        vec![
            result.index.to_string(),
            format!("{:#x}", result.wallet_address),
            if result.success() { "success" } else { "failed" }.to_string(),
            result.token.name.clone(),
            result.token.symbol.clone(),
            result
                .token_address
                .map(|address| format!("{:#x}", address))
                .unwrap_or_default(),
            result.image.clone().unwrap_or_default(),
            result
                .create_tx
                .as_ref()
                .map(|outcome| outcome.tx_hash_hex())
                .unwrap_or_default(),
            result
                .buy_tx
                .as_ref()
                .map(|outcome| outcome.tx_hash_hex())
                .unwrap_or_default(),
            approve_tx,
            sell_tx,
            steps.join("|"),
            result.total_gas_used().to_string(),
            result
                .error
                .as_ref()
                .map(|err| format!("{}: {}", err.kind(), err))
                .unwrap_or_default(),
        ]
    }
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use ethers::types::{Address, H256, U256};
    use rust_decimal::Decimal;

    use super::*;
    use crate::types::{
        ChainError, ImageSource, LaunchPlan, SellOutcome, TokenCreationRequest,
        TransactionOutcome, TxKind, TxStage, WorkflowError, WorkflowStep,
    };

    fn plan() -> LaunchPlan {
        LaunchPlan {
            token: TokenCreationRequest {
                name: "Moon, Token".to_string(),
                symbol: "MOON42".to_string(),
                description: "desc".to_string(),
                ..Default::default()
            },
            image: ImageSource::Url("https://static.four.meme/a.png".to_string()),
            purchase_amount: U256::zero(),
            sell_percentage: Decimal::ZERO,
        }
    }

    fn report() -> BatchReport {
        let mut ok = WorkflowResult::new(1, Address::repeat_byte(0x11), &plan());
        ok.mark(WorkflowStep::BalanceCheck);
        ok.mark(WorkflowStep::TokenCreated);
        ok.token_address = Some(Address::repeat_byte(0x42));
        ok.create_tx = Some(TransactionOutcome {
            stage: TxStage::Confirmed,
            tx_hash: Some(H256::repeat_byte(0xaa)),
            gas_used: Some(U256::from(1_500_000)),
            ..TransactionOutcome::new(TxKind::CreateToken)
        });

        let mut failed = WorkflowResult::new(2, Address::repeat_byte(0x22), &plan());
        failed.error = Some(WorkflowError::Auth("said \"no\"".to_string()));

        let mut report = BatchReport::new(Vec::new());
        report.push(ok);
        report.push(failed);
        report.finish();
        report
    }

    #[test]
    fn renders_one_row_per_wallet() {
        let csv = ReportService::render_csv(&report());
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "index,address,status,token name,symbol,token address,image,create tx,buy tx,approve tx,sell tx,steps,gas used,error"
        );
        assert!(lines[1].starts_with("1,0x1111111111111111111111111111111111111111,success,\"Moon, Token\",MOON42,"));
        assert!(lines[1].contains(&format!("0x{}", "aa".repeat(32))));
        assert!(lines[1].contains(",balance_check|token_created,1500000,"));
        assert!(lines[2].contains(",failed,"));
        assert!(lines[2].ends_with("\"AuthError: authentication failed: said \"\"no\"\"\""));
    }

    #[test]
    fn approval_without_sell_is_visible() {
        let mut result = WorkflowResult::new(3, Address::repeat_byte(0x33), &plan());
        result.sell = Some(SellOutcome {
            token_address: Address::repeat_byte(0x42),
            balance: U256::from(1_000),
            decimals: 18,
            sell_amount: U256::from(1_000),
            approve: Some(TransactionOutcome {
                stage: TxStage::Confirmed,
                tx_hash: Some(H256::repeat_byte(0xbb)),
                gas_used: Some(U256::from(46_000)),
                ..TransactionOutcome::new(TxKind::Approve)
            }),
            sell: Some(TransactionOutcome {
                stage: TxStage::Failed,
                error: Some(ChainError::Broadcast("nonce too low".to_string())),
                ..TransactionOutcome::new(TxKind::SellToken)
            }),
            error: None,
        });

        let fields = ReportService::row(&result);
        assert_eq!(fields.len(), CSV_HEADER.len());
        let approve_column = CSV_HEADER.iter().position(|name| *name == "approve tx").unwrap();
        assert_eq!(fields[approve_column], format!("0x{}", "bb".repeat(32)));
        assert_eq!(fields[approve_column + 1], "");
    }

    #[test]
    fn quotes_only_when_needed() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("x\"y"), "\"x\"\"y\"");
    }

    #[test]
    fn writes_timestamped_file() {
        let dir = std::env::temp_dir().join(format!("meme_launch_report_{}", std::process::id()));
        let path = ReportService::write_csv(&report(), &dir).unwrap();

        let file_name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(file_name.starts_with("batch_report_"));
        assert!(file_name.ends_with(".csv"));
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 3);
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
