use super::ValidationError;
use alloy::primitives::Address;

/// Accepts 40 hex digits with an optional `0x` prefix.
///
/// All-lowercase and all-uppercase input is accepted as-is; mixed case must carry
/// a valid EIP-55 checksum.
pub(crate) fn is_valid_address(input: &str) -> bool {
    let body = input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
        .unwrap_or(input);
    if body.len() != 40 || !body.chars().all(|c| c.is_ascii_hexdigit()) {
        return false;
    }
    let has_lower = body.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = body.chars().any(|c| c.is_ascii_uppercase());
    if has_lower && has_upper {
        return Address::parse_checksummed(format!("0x{body}"), None).is_ok();
    }
    true
}

pub(crate) fn parse_address(input: &str) -> Result<Address, ValidationError> {
    let trimmed = input.trim();
    if !is_valid_address(trimmed) {
        return Err(ValidationError::InvalidAddress);
    }
    let body = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    format!("0x{body}")
        .parse::<Address>()
        .map_err(|_| ValidationError::InvalidAddress)
}

/// Token ids are unsigned decimal integers; surrounding whitespace is ignored.
pub(crate) fn parse_token_id(input: &str) -> Result<u64, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::InvalidTokenId);
    }
    trimmed
        .parse::<u64>()
        .map_err(|_| ValidationError::InvalidTokenId)
}
