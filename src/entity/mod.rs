pub mod audit_logs;
pub mod categories;
pub mod companies;
pub mod order_details;
pub mod order_headers;
pub mod products;
pub mod shopping_carts;
pub mod users;

pub use audit_logs::Entity as AuditLogs;
pub use categories::Entity as Categories;
pub use companies::Entity as Companies;
pub use order_details::Entity as OrderDetails;
pub use order_headers::Entity as OrderHeaders;
pub use products::Entity as Products;
pub use shopping_carts::Entity as ShoppingCarts;
pub use users::Entity as Users;
