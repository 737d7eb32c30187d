pub mod database;
pub mod invoice_number;
pub mod invoice_query;
pub mod metrics;
pub mod stats;

pub use database::MongoDb;
pub use invoice_number::{
    insert_with_fallback, InvoiceNumberAllocator, InvoiceNumberLedger, InvoiceWriter,
};
pub use invoice_query::InvoiceListParams;
pub use metrics::{get_metrics, init_metrics};
pub use stats::dashboard_stats;
