use anyhow::Result;
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::io::Write;
use std::ops::Range;

/// Length range of generated passwords
pub const PASSWORD_LEN: Range<usize> = 25..50;

/// Random alphanumeric password for a peering credential
pub fn generate(prefix: Option<&str>, rng: &mut impl Rng) -> String {
    let len = rng.gen_range(PASSWORD_LEN);
    let password: String = rng
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect();

    match prefix.filter(|p| !p.is_empty()) {
        Some(prefix) => format!("{}_{}", prefix, password),
        None => password,
    }
}

pub fn run(prefix: Option<&str>, out: &mut impl Write) -> Result<()> {
    writeln!(out, "{}", generate(prefix, &mut rand::thread_rng()))?;
    Ok(())
}
