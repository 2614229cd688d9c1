pub mod admin;
pub mod blockchains;
pub mod transfer;
pub mod withdrawal;

pub use blockchains::Blockchain;
pub use transfer::{TransferStateView, TransferStep};
pub use withdrawal::{
    BankDetails, GetWithdrawalRequest, InitiateWithdrawal, UnknownStatus, ValidationError,
    WithdrawalResponse, WithdrawalStatus,
};
