use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{Rng, distr::Alphanumeric};
use sha2::{Digest, Sha256};

use crate::sync::MonthKey;

pub fn generate_code_verifier() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(128)
        .map(char::from)
        .collect()
}

pub fn generate_code_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

/// `clap` value parser for `--month`, accepts `1`-`12` and `01`-`09`.
pub fn parse_month(value: &str) -> Result<u32, String> {
    MonthKey::parse(value, "2000")
        .map(|key| key.month())
        .map_err(|e| e.to_string())
}

/// `clap` value parser for `--year`, accepts four digit years only.
pub fn parse_year(value: &str) -> Result<i32, String> {
    MonthKey::parse("1", value)
        .map(|key| key.year())
        .map_err(|e| e.to_string())
}
