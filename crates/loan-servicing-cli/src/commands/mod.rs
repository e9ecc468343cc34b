pub mod origination;
pub mod schedule;
pub mod servicing;

use loan_servicing_core::config::LendingPolicy;

use crate::input;

/// Load a lending policy file when `--policy` is given.
pub fn load_policy(path: Option<&str>) -> Result<Option<LendingPolicy>, Box<dyn std::error::Error>> {
    let Some(path) = path else {
        return Ok(None);
    };
    let policy: LendingPolicy = input::file::read_json(path)?;
    policy.validate()?;
    tracing::debug!(policy = %path, "Lending policy loaded");
    Ok(Some(policy))
}
