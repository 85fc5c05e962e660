pub mod customers;
pub mod invoices;
pub mod settings;
pub mod users;

pub use customers::{CustomerChanges, CustomersDao};
pub use invoices::{InvoiceChanges, InvoiceQuery, InvoicesDao};
pub use settings::{SettingsChanges, SettingsDao};
pub use users::{ProfileChanges, UsersDao};
