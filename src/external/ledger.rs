use async_trait::async_trait;
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::db::users as user_db;
use crate::error::CoreError;

/// Balance checks against the wallet ledger. Settlement is not handled here.
#[async_trait]
pub trait LedgerService: Send + Sync {
    async fn check_balance(&self, user_id: Uuid, amount: f64) -> Result<bool, CoreError>;
}

/// Reads the `wallets` table. A user without a wallet has no funds.
#[derive(Clone)]
pub struct DbLedger {
    db: DatabaseConnection,
}

impl DbLedger {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl LedgerService for DbLedger {
    async fn check_balance(&self, user_id: Uuid, amount: f64) -> Result<bool, CoreError> {
        let wallet = user_db::get_wallet(&self.db, user_id).await?;
        Ok(wallet.is_some_and(|w| w.balance >= amount))
    }
}
