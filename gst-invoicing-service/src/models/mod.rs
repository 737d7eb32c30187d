pub mod bank;
pub mod company;
pub mod invoice;

pub use bank::{AccountType, BankProfile};
pub use company::{Company, CompanyAddress, Contact};
pub use invoice::{Address, Customer, Invoice, InvoiceStatus, Product};
