pub mod init;
pub mod treasury;
pub mod tx;

use treasury_types::{parse_units, Amount};

/// clap value parser for decimal native amounts such as `1.5`.
pub fn parse_amount(s: &str) -> Result<Amount, String> {
    parse_units(s).map_err(|e| e.to_string())
}

/// Call data given on the command line as hex.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HexPayload(pub Vec<u8>);

/// clap value parser for `0x`-prefixed hex call data.
pub fn parse_payload(s: &str) -> Result<HexPayload, String> {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    hex::decode(digits)
        .map(HexPayload)
        .map_err(|e| format!("invalid hex payload: {}", e))
}
