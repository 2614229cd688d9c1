//! Database access for the ledger.
//!
//! Every query is a plain struct with a [`kanau::processor::Processor`] impl
//! on [`DatabaseProcessor`], so call sites read as
//! `db.process(GetWithdrawalRecordById { id }).await`.

use sqlx::PgPool;

#[derive(Debug, Clone)]
pub struct DatabaseProcessor {
    pub pool: PgPool,
}

impl DatabaseProcessor {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}
