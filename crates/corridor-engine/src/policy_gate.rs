//! Pure cost/capability admission check against a provider.
//! No side effects, no I/O — a provider either passes or is rejected with a
//! reason the router can stamp into a skip tag.

use corridor_core::{ProviderSpec, Result, RouterError};

use crate::Policy;

/// Fixed token budget used for cost estimation, rather than deriving one
/// from prompt length.
const ESTIMATED_TOKENS: f64 = 1000.0;

pub struct PolicyGate;

impl PolicyGate {
    /// Returns `Ok(())` if `provider` passes every predicate in `policy`,
    /// otherwise the first violated predicate as an error.
    pub fn allows(provider: &ProviderSpec, policy: &Policy) -> Result<()> {
        if let Some(limit) = policy.max_cost_usd_per_request {
            let estimated = (provider.cost.input_per_1k_tokens_usd
                + provider.cost.output_per_1k_tokens_usd)
                * (ESTIMATED_TOKENS / 1000.0);
            if estimated > limit {
                return Err(RouterError::PolicyCost { estimated, limit });
            }
        }

        if let Some(required) = &policy.required_capabilities {
            let missing: Vec<String> = required
                .iter()
                .filter(|cap| !provider.has_capability(cap))
                .cloned()
                .collect();
            if !missing.is_empty() {
                return Err(RouterError::PolicyCapability { missing });
            }
        }

        Ok(())
    }
}
