pub mod customers;
pub mod dashboard;
pub mod health;
pub mod invoices;
pub mod settings;
pub mod users;

pub use customers::create_customer_routes;
pub use dashboard::create_dashboard_routes;
pub use health::create_health_routes;
pub use invoices::create_invoice_routes;
pub use settings::create_settings_routes;
pub use users::{create_user_protected_routes, create_user_public_routes};
