pub mod withdrawal_record;

use stablepay_sdk::objects::WithdrawalStatus as SdkWithdrawalStatus;

/// Settlement status for database operations.
///
/// This is the sqlx::Type version. For API/DTO use, see
/// `stablepay_sdk::objects::WithdrawalStatus`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(rename_all = "lowercase", type_name = "withdrawal_status")]
pub enum WithdrawalStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl From<WithdrawalStatus> for SdkWithdrawalStatus {
    fn from(value: WithdrawalStatus) -> Self {
        match value {
            WithdrawalStatus::Pending => SdkWithdrawalStatus::Pending,
            WithdrawalStatus::Processing => SdkWithdrawalStatus::Processing,
            WithdrawalStatus::Completed => SdkWithdrawalStatus::Completed,
            WithdrawalStatus::Failed => SdkWithdrawalStatus::Failed,
        }
    }
}

impl From<SdkWithdrawalStatus> for WithdrawalStatus {
    fn from(value: SdkWithdrawalStatus) -> Self {
        match value {
            SdkWithdrawalStatus::Pending => WithdrawalStatus::Pending,
            SdkWithdrawalStatus::Processing => WithdrawalStatus::Processing,
            SdkWithdrawalStatus::Completed => WithdrawalStatus::Completed,
            SdkWithdrawalStatus::Failed => WithdrawalStatus::Failed,
        }
    }
}
