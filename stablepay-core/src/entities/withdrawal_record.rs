use crate::entities::WithdrawalStatus;
use crate::framework::DatabaseProcessor;
use compact_str::CompactString;
use kanau::processor::Processor;
use rust_decimal::Decimal;
use stablepay_sdk::objects::admin::AdminWithdrawalResponse;
use stablepay_sdk::objects::{
    InitiateWithdrawal, WithdrawalResponse, WithdrawalStatus as SdkWithdrawalStatus,
};
use uuid::Uuid;

/// A withdrawal whose custody transfer has confirmed, awaiting INR payout.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct WithdrawalRecord {
    pub id: Uuid,
    pub user_address: String,
    pub token_symbol: CompactString,
    pub token_amount: Decimal,
    pub chain_id: i64,
    pub transfer_hash: String,
    pub inr_amount: Decimal,
    pub bank_account_holder: String,
    pub bank_account_number: String,
    pub bank_ifsc: String,
    pub status: WithdrawalStatus,
    pub created_at: time::PrimitiveDateTime,
    pub updated_at: time::PrimitiveDateTime,
}

const RECORD_COLUMNS: &str = "id, user_address, token_symbol, token_amount, chain_id, \
    transfer_hash, inr_amount, bank_account_holder, bank_account_number, bank_ifsc, \
    status, created_at, updated_at";

impl WithdrawalRecord {
    pub fn chain_id(&self) -> u64 {
        u64::try_from(self.chain_id).unwrap_or_default()
    }
}

impl From<WithdrawalRecord> for WithdrawalResponse {
    fn from(r: WithdrawalRecord) -> Self {
        WithdrawalResponse {
            withdrawal_id: r.id,
            chain_id: r.chain_id(),
            user_address: r.user_address,
            token_symbol: r.token_symbol.into_string(),
            token_amount: r.token_amount,
            transfer_hash: r.transfer_hash,
            inr_amount: r.inr_amount,
            status: r.status.into(),
            created_at: r.created_at.assume_utc().unix_timestamp(),
        }
    }
}

impl From<WithdrawalRecord> for AdminWithdrawalResponse {
    fn from(r: WithdrawalRecord) -> Self {
        AdminWithdrawalResponse {
            withdrawal_id: r.id,
            chain_id: r.chain_id(),
            user_address: r.user_address,
            token_symbol: r.token_symbol.into_string(),
            token_amount: r.token_amount,
            transfer_hash: r.transfer_hash,
            inr_amount: r.inr_amount,
            bank_account_holder: r.bank_account_holder,
            bank_account_number: r.bank_account_number,
            bank_ifsc: r.bank_ifsc,
            status: r.status.into(),
            created_at: r.created_at.assume_utc().unix_timestamp(),
            updated_at: r.updated_at.assume_utc().unix_timestamp(),
        }
    }
}

/// Data for inserting a new withdrawal record.
#[derive(Debug, Clone)]
pub struct WithdrawalRecordInsert {
    pub user_address: String,
    pub token_symbol: CompactString,
    pub token_amount: Decimal,
    pub chain_id: i64,
    pub transfer_hash: String,
    pub inr_amount: Decimal,
    pub bank_account_holder: String,
    pub bank_account_number: String,
    pub bank_ifsc: String,
}

impl From<InitiateWithdrawal> for WithdrawalRecordInsert {
    fn from(w: InitiateWithdrawal) -> Self {
        WithdrawalRecordInsert {
            user_address: w.user_address,
            token_symbol: CompactString::from(w.token_symbol),
            token_amount: w.token_amount,
            chain_id: i64::try_from(w.chain_id).unwrap_or(i64::MAX),
            // Lower-cased so the (chain_id, transfer_hash) key ignores casing.
            transfer_hash: w.transfer_hash.to_lowercase(),
            inr_amount: w.inr_amount,
            bank_account_holder: w.bank_details.account_holder.trim().to_string(),
            bank_account_number: w.bank_details.account_number,
            bank_ifsc: w.bank_details.ifsc,
        }
    }
}

/// Insert a withdrawal record, or return the existing one for the same
/// `(chain_id, transfer_hash)`.
#[derive(Debug, Clone)]
pub struct InsertWithdrawalRecord {
    pub insert: WithdrawalRecordInsert,
}

#[derive(Debug, Clone)]
pub struct InsertedWithdrawal {
    pub record: WithdrawalRecord,
    /// `false` when the transfer had already been recorded.
    pub created: bool,
}

impl Processor<InsertWithdrawalRecord> for DatabaseProcessor {
    type Output = InsertedWithdrawal;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:InsertWithdrawalRecord")]
    async fn process(
        &self,
        query: InsertWithdrawalRecord,
    ) -> Result<InsertedWithdrawal, sqlx::Error> {
        let insert = query.insert;
        let sql = format!(
            "INSERT INTO withdrawal_records \
            (id, user_address, token_symbol, token_amount, chain_id, transfer_hash, inr_amount, \
            bank_account_holder, bank_account_number, bank_ifsc) \
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
            ON CONFLICT (chain_id, transfer_hash) DO NOTHING \
            RETURNING {RECORD_COLUMNS}"
        );
        let inserted = sqlx::query_as::<_, WithdrawalRecord>(&sql)
            .bind(Uuid::now_v7())
            .bind(&insert.user_address)
            .bind(&insert.token_symbol)
            .bind(insert.token_amount)
            .bind(insert.chain_id)
            .bind(&insert.transfer_hash)
            .bind(insert.inr_amount)
            .bind(&insert.bank_account_holder)
            .bind(&insert.bank_account_number)
            .bind(&insert.bank_ifsc)
            .fetch_optional(&self.pool)
            .await?;
        if let Some(record) = inserted {
            return Ok(InsertedWithdrawal {
                record,
                created: true,
            });
        }

        let sql = format!(
            "SELECT {RECORD_COLUMNS} FROM withdrawal_records \
            WHERE chain_id = $1 AND transfer_hash = $2"
        );
        let record = sqlx::query_as::<_, WithdrawalRecord>(&sql)
            .bind(insert.chain_id)
            .bind(&insert.transfer_hash)
            .fetch_one(&self.pool)
            .await?;
        Ok(InsertedWithdrawal {
            record,
            created: false,
        })
    }
}

#[derive(Debug, Clone)]
pub struct GetWithdrawalRecordById {
    pub id: Uuid,
}

impl Processor<GetWithdrawalRecordById> for DatabaseProcessor {
    type Output = Option<WithdrawalRecord>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetWithdrawalRecordById")]
    async fn process(
        &self,
        query: GetWithdrawalRecordById,
    ) -> Result<Option<WithdrawalRecord>, sqlx::Error> {
        let sql = format!("SELECT {RECORD_COLUMNS} FROM withdrawal_records WHERE id = $1");
        sqlx::query_as::<_, WithdrawalRecord>(&sql)
            .bind(query.id)
            .fetch_optional(&self.pool)
            .await
    }
}

/// Newest first. Callers clamp `limit` / `offset`.
#[derive(Debug, Clone, Default)]
pub struct ListWithdrawalRecords {
    pub limit: i64,
    pub offset: i64,
    pub status: Option<WithdrawalStatus>,
    pub chain_id: Option<i64>,
    pub user_address: Option<String>,
}

impl Processor<ListWithdrawalRecords> for DatabaseProcessor {
    type Output = Vec<WithdrawalRecord>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:ListWithdrawalRecords")]
    async fn process(
        &self,
        query: ListWithdrawalRecords,
    ) -> Result<Vec<WithdrawalRecord>, sqlx::Error> {
        let mut builder = sqlx::QueryBuilder::new(format!(
            "SELECT {RECORD_COLUMNS} FROM withdrawal_records WHERE TRUE"
        ));
        if let Some(status) = query.status {
            builder.push(" AND status = ").push_bind(status);
        }
        if let Some(chain_id) = query.chain_id {
            builder.push(" AND chain_id = ").push_bind(chain_id);
        }
        if let Some(user_address) = query.user_address {
            builder
                .push(" AND lower(user_address) = lower(")
                .push_bind(user_address)
                .push(")");
        }
        builder
            .push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(query.limit)
            .push(" OFFSET ")
            .push_bind(query.offset);

        builder
            .build_query_as::<WithdrawalRecord>()
            .fetch_all(&self.pool)
            .await
    }
}

/// Move a record along its settlement lifecycle.
///
/// The current status is read under a row lock, so concurrent updates of
/// the same record serialize.
#[derive(Debug, Clone)]
pub struct UpdateWithdrawalStatus {
    pub id: Uuid,
    pub status: WithdrawalStatus,
}

#[derive(Debug, Clone)]
pub enum StatusUpdate {
    Updated(WithdrawalRecord),
    NotFound,
    InvalidTransition { current: WithdrawalStatus },
}

impl Processor<UpdateWithdrawalStatus> for DatabaseProcessor {
    type Output = StatusUpdate;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:UpdateWithdrawalStatus")]
    async fn process(&self, update: UpdateWithdrawalStatus) -> Result<StatusUpdate, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let current: Option<(WithdrawalStatus,)> =
            sqlx::query_as("SELECT status FROM withdrawal_records WHERE id = $1 FOR UPDATE")
                .bind(update.id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some((current,)) = current else {
            return Ok(StatusUpdate::NotFound);
        };
        if !SdkWithdrawalStatus::from(current).can_transition_to(update.status.into()) {
            return Ok(StatusUpdate::InvalidTransition { current });
        }

        let sql = format!(
            "UPDATE withdrawal_records SET status = $2, updated_at = now() \
            WHERE id = $1 RETURNING {RECORD_COLUMNS}"
        );
        let record = sqlx::query_as::<_, WithdrawalRecord>(&sql)
            .bind(update.id)
            .bind(update.status)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(StatusUpdate::Updated(record))
    }
}
