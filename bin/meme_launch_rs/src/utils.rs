use std::{path::Path, str::FromStr};

use ethers::types::Address;
use meme_launch_utils::{
    units::to_base_units,
    utils::{derive_address, with_hex_prefix},
};
use rust_decimal::Decimal;

use crate::{
    constants::NATIVE_DECIMALS,
    types::{WalletFile, WalletFileError, WalletLineWarning, WalletRecord},
};

pub const DEFAULT_SELL_PERCENTAGE: u32 = 100;

/**
 * Parse `address;privateKey;purchaseAmount;sellPercentage` lines.
 * Blank and `#` lines are ignored, malformed lines are dropped with a warning.
 */
pub fn parse_wallet_lines(content: &str) -> WalletFile {
    let mut wallet_file = WalletFile::default();

    for (index, line) in content.lines().enumerate() {
        let line_number = index + 1;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        match parse_wallet_line(line_number, line) {
            Ok(record) => {
                if !record.address_matches() {
                    wallet_file.warnings.push(WalletLineWarning {
                        line_number,
                        message: format!(
                            "declared address {:#x} does not match key address {:#x}, using key address",
                            record.declared_address, record.derived_address
                        ),
                        skipped: false,
                    });
                }
                wallet_file.records.push(record);
            }
            Err(message) => wallet_file.warnings.push(WalletLineWarning {
                line_number,
                message,
                skipped: true,
            }),
        }
    }

    wallet_file
}

fn parse_wallet_line(line_number: usize, line: &str) -> Result<WalletRecord, String> {
    let parts: Vec<&str> = line.split(';').map(str::trim).collect();
    if parts.len() < 2 {
        return Err(
            "expected address;privateKey[;purchaseAmount[;sellPercentage]]".to_string(),
        );
    }

    let declared_address = Address::from_str(&with_hex_prefix(parts[0]))
        .map_err(|_| format!("invalid address {:?}", parts[0]))?;
    let private_key = with_hex_prefix(parts[1]);
    // never echo the key itself
    let derived_address = derive_address(&private_key).map_err(|_| "invalid private key".to_string())?;

    let purchase_amount = match parts.get(2).filter(|value| !value.is_empty()) {
        Some(value) => Decimal::from_str(value)
            .map_err(|_| format!("invalid purchase amount {:?}", value))?,
        None => Decimal::ZERO,
    };
    if purchase_amount.is_sign_negative() && !purchase_amount.is_zero() {
        return Err(format!("negative purchase amount {}", purchase_amount));
    }
    let purchase_amount_wei = to_base_units(purchase_amount, NATIVE_DECIMALS)
        .map_err(|err| format!("purchase amount {}: {}", purchase_amount, err))?;

    let sell_percentage = match parts.get(3).filter(|value| !value.is_empty()) {
        Some(value) => Decimal::from_str(value.trim_end_matches('%'))
            .map_err(|_| format!("invalid sell percentage {:?}", value))?,
        None => Decimal::from(DEFAULT_SELL_PERCENTAGE),
    };
    if sell_percentage < Decimal::ZERO || sell_percentage > Decimal::ONE_HUNDRED {
        return Err(format!("sell percentage {} outside [0, 100]", sell_percentage));
    }

    Ok(WalletRecord {
        line_number,
        declared_address,
        derived_address,
        private_key,
        purchase_amount,
        purchase_amount_wei,
        sell_percentage,
    })
}

pub fn load_wallet_file(path: &Path) -> Result<WalletFile, WalletFileError> {
    let content = std::fs::read_to_string(path).map_err(|source| WalletFileError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let wallet_file = parse_wallet_lines(&content);
    for warning in &wallet_file.warnings {
        log::warn!(
            "[WalletFile] line {}: {}{}",
            warning.line_number,
            warning.message,
            if warning.skipped { ", skipped" } else { "" }
        );
    }
    if wallet_file.records.is_empty() {
        return Err(WalletFileError::Empty(path.display().to_string()));
    }
    Ok(wallet_file)
}

/// Short `0x1234...abcd` form for console tables.
pub fn short_address(address: &Address) -> String {
    let full = format!("{:#x}", address);
    format!("{}...{}", &full[..6], &full[full.len() - 4..])
}
