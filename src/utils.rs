//! Parsing and formatting helpers shared by configuration and logging.
//!
//! All parsing functions return `ConfigError` so that a bad input surfaces as
//! a fatal configuration problem before any transaction is dispatched.

use crate::errors::ConfigError;
use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use std::str::FromStr;
use url::Url;

/// Parse and validate a hex private key.
///
/// Accepts keys with or without the "0x" prefix. The key must be exactly 32
/// bytes (64 hex characters) and a valid secp256k1 scalar.
pub fn parse_private_key(key_str: &str, var_name: &str) -> Result<PrivateKeySigner, ConfigError> {
    let clean_key = key_str.trim().trim_start_matches("0x");

    if clean_key.len() != 64 {
        return Err(ConfigError::InvalidPrivateKey {
            message: format!("{} must be 64 hex characters (32 bytes)", var_name),
        });
    }

    if !clean_key.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ConfigError::InvalidPrivateKey {
            message: format!("{} contains invalid hex characters", var_name),
        });
    }

    PrivateKeySigner::from_str(clean_key).map_err(|e| ConfigError::InvalidPrivateKey {
        message: format!("Failed to parse {}: {}", var_name, e),
    })
}

/// Parse a recipient address. The zero address is rejected.
pub fn parse_address(s: &str, var_name: &str) -> Result<Address, ConfigError> {
    let address = Address::from_str(s.trim()).map_err(|e| ConfigError::InvalidValue {
        name: var_name.to_string(),
        message: format!("invalid address '{}': {}", s, e),
    })?;

    if address == Address::ZERO {
        return Err(ConfigError::InvalidValue {
            name: var_name.to_string(),
            message: "zero address is not a valid recipient".to_string(),
        });
    }

    Ok(address)
}

/// Parse an endpoint URL; only http and https schemes are accepted.
pub fn parse_endpoint_url(s: &str, var_name: &str) -> Result<Url, ConfigError> {
    let invalid = || ConfigError::InvalidUrl {
        name: var_name.to_string(),
        url: mask_url(s),
    };

    let url = Url::parse(s.trim()).map_err(|_| invalid())?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(invalid()),
    }
}

/// Mask everything but the scheme and host of a URL for logging.
///
/// Node URLs routinely embed API keys in the path or query.
pub fn mask_url(url: &str) -> String {
    if let Ok(parsed_url) = Url::parse(url) {
        let host = parsed_url.host_str().unwrap_or("unknown");
        let scheme = parsed_url.scheme();
        format!("{}://{}/**masked**", scheme, host)
    } else {
        "**masked**".to_string()
    }
}

/// Hex encode raw bytes with a "0x" prefix, as expected by JSON-RPC.
pub fn to_hex_prefixed(bytes: impl AsRef<[u8]>) -> String {
    format!("0x{}", hex::encode(bytes))
}
