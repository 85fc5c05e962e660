pub mod customers;
pub mod invoices;
pub mod settings;
pub mod users;

pub use customers::Entity as Customers;
pub use invoices::Entity as Invoices;
pub use settings::Entity as Settings;
pub use users::Entity as Users;

pub use invoices::{InvoiceItem, InvoiceItems, InvoiceStatus, PaymentInfo};

// Type aliases
pub type UserRecord = users::Model;
pub type CustomerRecord = customers::Model;
pub type InvoiceRecord = invoices::Model;
pub type SettingsRecord = settings::Model;
