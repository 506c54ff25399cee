use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{LoginRequest, LoginResponse, RegisterRequest},
        cart::{AddToCartRequest, CartLine, CartSummary, CartView, PlacedOrder, ShippingDetails},
        catalog::{
            CategoryList, CategoryRequest, CompanyList, CompanyRequest, ProductList,
            ProductRequest,
        },
        orders::{
            OrderList, OrderWithDetails, PaymentRedirect, ShipOrderRequest,
            UpdateOrderDetailRequest,
        },
        users::{ChangeRoleRequest, RoleManagement, UserList, UserSummary},
    },
    models::{Category, Company, OrderDetail, OrderHeader, Product, User},
    response::{ApiResponse, Meta, OperationResult},
    routes::{
        auth, cart, categories, companies, health, home, orders, params, products, users,
    },
    status::{OrderStatus, PaymentStatus, Role},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::login,
        auth::register,
        home::list_products,
        home::product_details,
        cart::cart_list,
        cart::add_to_cart,
        cart::summary,
        cart::plus,
        cart::minus,
        cart::remove,
        cart::place_order,
        cart::order_confirmation,
        orders::list_orders,
        orders::order_details,
        orders::update_order_detail,
        orders::start_processing,
        orders::ship_order,
        orders::cancel_order,
        orders::pay_now,
        orders::payment_confirmation,
        products::list_products,
        products::get_product,
        products::create_product,
        products::update_product,
        products::delete_product,
        categories::list_categories,
        categories::get_category,
        categories::create_category,
        categories::update_category,
        categories::delete_category,
        companies::list_companies,
        companies::get_company,
        companies::create_company,
        companies::update_company,
        companies::delete_company,
        users::list_users,
        users::role_management,
        users::change_role,
        users::lock_unlock
    ),
    components(
        schemas(
            User,
            Company,
            Category,
            Product,
            OrderHeader,
            OrderDetail,
            Role,
            OrderStatus,
            PaymentStatus,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            AddToCartRequest,
            CartLine,
            CartView,
            CartSummary,
            ShippingDetails,
            PlacedOrder,
            OrderList,
            OrderWithDetails,
            UpdateOrderDetailRequest,
            ShipOrderRequest,
            PaymentRedirect,
            ProductRequest,
            ProductList,
            CategoryRequest,
            CategoryList,
            CompanyRequest,
            CompanyList,
            UserSummary,
            UserList,
            RoleManagement,
            ChangeRoleRequest,
            OperationResult,
            params::Pagination,
            params::ProductQuery,
            params::OrderListQuery,
            Meta,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<CartView>,
            ApiResponse<PlacedOrder>,
            ApiResponse<OrderHeader>,
            ApiResponse<OrderWithDetails>,
            ApiResponse<OrderList>,
            ApiResponse<UserList>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Authentication endpoints"),
        (name = "Home", description = "Catalog browsing"),
        (name = "Cart", description = "Shopping cart and checkout"),
        (name = "Orders", description = "Order lifecycle management"),
        (name = "Products", description = "Product administration"),
        (name = "Categories", description = "Category administration"),
        (name = "Companies", description = "Company administration"),
        (name = "Users", description = "User and role administration"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_lifecycle_paths() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;
        assert!(paths.contains_key("/api/customer/cart/checkout"));
        assert!(paths.contains_key("/api/admin/orders/{id}/cancel"));
        assert!(paths.contains_key("/api/admin/orders/{id}/payment-confirmation"));
        assert!(paths.contains_key("/health"));
    }
}
