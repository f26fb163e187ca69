//! Domain models for receivable-service.

mod invoice;
mod settlement;

pub use invoice::{
    CreateInvoice, Invoice, InvoiceSummary, ListInvoicesFilter, OrderBy, OrderColumn,
    OrderDirection, UpdateInvoice,
};
pub use settlement::{CreateSettlement, Settlement, SettlementInput};
