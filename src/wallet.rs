//! Wallet identities. One capability with a variant per supported chain;
//! the client says which wallet session is active through `X-Wallet-Chain`.

use std::{fmt, str::FromStr, sync::LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

static SOLANA_ADDRESS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[1-9A-HJ-NP-Za-km-z]{32,44}$").unwrap());

static ETHEREUM_ADDRESS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^0x[0-9a-fA-F]{40}$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WalletChain {
    Solana,
    Ethereum,
}

impl WalletChain {
    pub fn as_str(self) -> &'static str {
        match self {
            WalletChain::Solana => "solana",
            WalletChain::Ethereum => "ethereum",
        }
    }

    /// Check `raw` against the chain's address format and return the form
    /// used as a user id. Ethereum addresses are case-insensitive (EIP-55
    /// casing is only a checksum) and are lowercased; base58 is case-sensitive.
    pub fn normalize_address(self, raw: &str) -> Result<String> {
        let raw = raw.trim();
        match self {
            WalletChain::Solana if SOLANA_ADDRESS.is_match(raw) => Ok(raw.to_string()),
            WalletChain::Ethereum if ETHEREUM_ADDRESS.is_match(raw) => Ok(raw.to_lowercase()),
            _ => Err(AppError::Validation(format!(
                "Invalid {} wallet address",
                self.as_str()
            ))),
        }
    }
}

impl fmt::Display for WalletChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WalletChain {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "solana" | "sol" => Ok(WalletChain::Solana),
            "ethereum" | "eth" | "evm" => Ok(WalletChain::Ethereum),
            _ => Err(format!("Unknown wallet chain: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletIdentity {
    pub chain: WalletChain,
    pub address: String,
}

impl WalletIdentity {
    pub fn parse(chain: &str, address: &str) -> Result<Self> {
        let chain: WalletChain = chain.parse().map_err(AppError::Validation)?;
        let address = chain.normalize_address(address)?;
        Ok(Self { chain, address })
    }
}
