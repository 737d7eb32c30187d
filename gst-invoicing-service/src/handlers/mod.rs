pub mod bank;
pub mod company;
pub mod gst;
pub mod health;
pub mod invoices;

pub use bank::{get_bank, upsert_bank};
pub use company::{create_company, get_company, update_company};
pub use gst::gst_rates;
pub use health::{health_check, metrics, readiness_check};
pub use invoices::{
    create_invoice, delete_invoice, generate_invoice_number, get_dashboard_stats, get_invoice,
    list_invoices, preview_invoice, update_invoice, update_invoice_status,
};
