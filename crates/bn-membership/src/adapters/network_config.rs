//! Network configuration adapter
//!
//! Fixed operator and notary identities, resolved once by the embedding node.

use crate::error::MembershipResult;
use crate::ports::outbound::NetworkConfigProvider;
use shared_types::Party;

/// Network configuration with fixed operator and notary.
#[derive(Debug, Clone)]
pub struct StaticNetworkConfig {
    operator: Party,
    notary: Party,
}

impl StaticNetworkConfig {
    #[must_use]
    pub fn new(operator: Party, notary: Party) -> Self {
        Self { operator, notary }
    }
}

impl NetworkConfigProvider for StaticNetworkConfig {
    fn operator(&self) -> MembershipResult<Party> {
        Ok(self.operator.clone())
    }

    fn notary(&self) -> MembershipResult<Party> {
        Ok(self.notary.clone())
    }
}
