//! Identity seam consumed by the sync engine.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::quota::Tier;
use crate::Result;

/// The signed-in user as the sync engine sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Remote tenant identifier
    pub user_id: String,
    /// Subscription tier governing sync quota
    pub tier: Tier,
}

/// Resolves the currently authenticated account.
///
/// `Ok(None)` is the expected steady state for users who never opted into
/// cloud sync; errors are genuine transport failures only.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn current_account(&self) -> Result<Option<Account>>;
}

/// Identity provider backed by a fixed account (profiles, tests).
pub struct StaticIdentity {
    account: Option<Account>,
}

impl StaticIdentity {
    /// A provider that always resolves the given account.
    pub fn signed_in(user_id: impl Into<String>, tier: Tier) -> Self {
        Self {
            account: Some(Account {
                user_id: user_id.into(),
                tier,
            }),
        }
    }

    /// A provider that always resolves to "not signed in".
    pub const fn signed_out() -> Self {
        Self { account: None }
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentity {
    async fn current_account(&self) -> Result<Option<Account>> {
        Ok(self.account.clone())
    }
}
