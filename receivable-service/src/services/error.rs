use service_core::error::AppError;
use thiserror::Error;

/// Domain errors for the receivable ledger. Validation failures surface
/// specifically; export-pipeline failures are collapsed to `PdfExportFailed`
/// at the boundary while the underlying cause stays in the logs.
#[derive(Error, Debug)]
pub enum ReceivableError {
    #[error("record id does not match path id")]
    IdMismatch,

    #[error("invoice not found")]
    InvoiceNotFound,

    #[error("invoice is already settled")]
    AlreadySettled,

    #[error("settlement amount is invalid")]
    InvalidAmount,

    #[error("requesting user could not be identified")]
    UserNotIdentified,

    #[error("user directory is unavailable")]
    UserDirectoryUnavailable,

    #[error("report export failed")]
    PdfExportFailed,

    #[error(transparent)]
    Store(#[from] AppError),
}

impl From<ReceivableError> for AppError {
    fn from(err: ReceivableError) -> Self {
        match err {
            ReceivableError::IdMismatch => {
                AppError::BadRequest(anyhow::anyhow!("record id does not match path id"))
            }
            ReceivableError::InvoiceNotFound => {
                AppError::NotFound(anyhow::anyhow!("invoice not found"))
            }
            ReceivableError::AlreadySettled => {
                AppError::Conflict(anyhow::anyhow!("invoice is already settled"))
            }
            ReceivableError::InvalidAmount => {
                AppError::BadRequest(anyhow::anyhow!("settlement amount is invalid"))
            }
            ReceivableError::UserNotIdentified => {
                AppError::InternalError(anyhow::anyhow!("requesting user could not be identified"))
            }
            ReceivableError::UserDirectoryUnavailable => {
                AppError::BadGateway("user directory is unavailable".to_string())
            }
            ReceivableError::PdfExportFailed => {
                AppError::InternalError(anyhow::anyhow!("report export failed"))
            }
            ReceivableError::Store(e) => e,
        }
    }
}
