//! Role names and order/payment status labels shared by entities, services and the API.

use sea_orm::entity::prelude::*;
use sea_orm::Iterable;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum Role {
    #[sea_orm(string_value = "Customer")]
    Customer,
    #[sea_orm(string_value = "Company")]
    Company,
    #[sea_orm(string_value = "Admin")]
    Admin,
    #[sea_orm(string_value = "Employee")]
    Employee,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "Customer",
            Role::Company => "Company",
            Role::Admin => "Admin",
            Role::Employee => "Employee",
        }
    }

    /// Admins and employees manage every order; everyone else only sees their own.
    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Admin | Role::Employee)
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::iter().find(|role| role.as_str().eq_ignore_ascii_case(raw))
    }
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum OrderStatus {
    #[sea_orm(string_value = "Pending")]
    Pending,
    #[sea_orm(string_value = "Approved")]
    Approved,
    #[sea_orm(string_value = "Processing")]
    #[serde(rename = "Processing")]
    InProcess,
    #[sea_orm(string_value = "Shipped")]
    Shipped,
    #[sea_orm(string_value = "Cancelled")]
    Cancelled,
    #[sea_orm(string_value = "Refunded")]
    Refunded,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Approved => "Approved",
            OrderStatus::InProcess => "Processing",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Cancelled => "Cancelled",
            OrderStatus::Refunded => "Refunded",
        }
    }

    /// Forward-only progression. Re-asserting the current status is allowed so
    /// payment callbacks can approve the payment without moving the order.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        if *self == next {
            return true;
        }
        match self {
            Pending => matches!(next, Approved | InProcess | Cancelled),
            Approved => matches!(next, InProcess | Shipped | Cancelled),
            InProcess => matches!(next, Shipped | Cancelled),
            Shipped | Cancelled | Refunded => false,
        }
    }
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum PaymentStatus {
    #[sea_orm(string_value = "Pending")]
    Pending,
    #[sea_orm(string_value = "Approved")]
    Approved,
    #[sea_orm(string_value = "ApprovedForDelayedPayment")]
    #[serde(rename = "ApprovedForDelayedPayment")]
    DelayedPayment,
    #[sea_orm(string_value = "Rejected")]
    Rejected,
    #[sea_orm(string_value = "Cancelled")]
    Cancelled,
    #[sea_orm(string_value = "Refunded")]
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "Pending",
            PaymentStatus::Approved => "Approved",
            PaymentStatus::DelayedPayment => "ApprovedForDelayedPayment",
            PaymentStatus::Rejected => "Rejected",
            PaymentStatus::Cancelled => "Cancelled",
            PaymentStatus::Refunded => "Refunded",
        }
    }

    pub fn is_delayed(&self) -> bool {
        *self == PaymentStatus::DelayedPayment
    }
}

/// Named views of the order list, as offered on the order management screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrderListFilter {
    /// Company orders still waiting for their delayed payment.
    Pending,
    InProcess,
    Completed,
    Approved,
    All,
}

impl OrderListFilter {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("pending") => OrderListFilter::Pending,
            Some("inprocess") => OrderListFilter::InProcess,
            Some("completed") => OrderListFilter::Completed,
            Some("approved") => OrderListFilter::Approved,
            _ => OrderListFilter::All,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staff_roles() {
        assert!(Role::Admin.is_staff());
        assert!(Role::Employee.is_staff());
        assert!(!Role::Customer.is_staff());
        assert!(!Role::Company.is_staff());
    }

    #[test]
    fn parses_role_names_case_insensitively() {
        assert_eq!(Role::parse("company"), Some(Role::Company));
        assert_eq!(Role::parse("Admin"), Some(Role::Admin));
        assert_eq!(Role::parse("root"), None);
    }

    #[test]
    fn order_progression_moves_forward_only() {
        use OrderStatus::*;
        assert!(Pending.can_transition_to(Approved));
        assert!(Approved.can_transition_to(InProcess));
        assert!(InProcess.can_transition_to(Shipped));
        assert!(Approved.can_transition_to(Shipped));
        assert!(Pending.can_transition_to(Cancelled));

        assert!(!Shipped.can_transition_to(Cancelled));
        assert!(!Cancelled.can_transition_to(Approved));
        assert!(!InProcess.can_transition_to(Pending));
        assert!(!Pending.can_transition_to(Shipped));
    }

    #[test]
    fn same_status_is_always_allowed() {
        for status in OrderStatus::iter() {
            assert!(status.can_transition_to(status));
        }
    }

    #[test]
    fn status_labels_match_stored_values() {
        assert_eq!(OrderStatus::InProcess.to_value(), "Processing");
        for status in OrderStatus::iter() {
            assert_eq!(status.to_value(), status.as_str());
        }
        for status in PaymentStatus::iter() {
            assert_eq!(status.to_value(), status.as_str());
        }
        assert_eq!(
            PaymentStatus::DelayedPayment.to_value(),
            "ApprovedForDelayedPayment"
        );
        assert_eq!(
            serde_json::to_string(&OrderStatus::InProcess).unwrap(),
            "\"Processing\""
        );
    }

    #[test]
    fn list_filter_names() {
        assert_eq!(OrderListFilter::parse(Some("pending")), OrderListFilter::Pending);
        assert_eq!(OrderListFilter::parse(Some("InProcess")), OrderListFilter::InProcess);
        assert_eq!(OrderListFilter::parse(Some("completed")), OrderListFilter::Completed);
        assert_eq!(OrderListFilter::parse(Some("approved")), OrderListFilter::Approved);
        assert_eq!(OrderListFilter::parse(Some("all")), OrderListFilter::All);
        assert_eq!(OrderListFilter::parse(None), OrderListFilter::All);
    }
}
