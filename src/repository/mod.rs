//! Data access shared by several services.
//!
//! Every function is generic over [`sea_orm::ConnectionTrait`] so callers can
//! pass either the pooled connection or an open transaction; a transaction
//! spanning several calls is the unit of work.

pub mod order_header;
pub mod shopping_cart;
