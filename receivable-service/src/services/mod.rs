//! Services module for receivable-service.

pub mod cache;
pub mod database;
pub mod directory;
pub mod error;
pub mod metrics;
pub mod notifier;
pub mod receivables;
pub mod renderer;

pub use cache::{AggregateCache, MockCache, RedisCache};
pub use database::{Database, InMemoryInvoiceStore, InvoiceStore};
pub use directory::{DirectoryClient, DirectoryUser, HttpDirectoryClient, MockDirectory};
pub use error::ReceivableError;
pub use metrics::{get_metrics, init_metrics};
pub use notifier::{Attachment, EmailDispatch, HttpNotifier, MockNotifier, Notifier};
pub use receivables::ReceivableService;
pub use renderer::{ColumnStyle, HttpRenderer, MockRenderer, ReportLayout, ReportRenderer};
