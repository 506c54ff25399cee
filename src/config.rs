use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    /// Public base URL used to build payment redirect links.
    pub app_domain: String,
    pub stripe: StripeConfig,
    pub admin_email: String,
    pub admin_password: String,
}

#[derive(Debug, Clone)]
pub struct StripeConfig {
    pub secret_key: String,
    pub api_base: String,
    pub currency: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET is not set"))?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = parse_port(
            env::var("APP_PORT").ok().or_else(|| env::var("PORT").ok()),
        );
        let app_domain = env::var("APP_DOMAIN")
            .map(|d| d.trim_end_matches('/').to_string())
            .unwrap_or_else(|_| format!("http://localhost:{port}"));

        let stripe = StripeConfig {
            secret_key: env::var("STRIPE_SECRET_KEY").unwrap_or_default(),
            api_base: env::var("STRIPE_API_BASE")
                .unwrap_or_else(|_| "https://api.stripe.com".to_string()),
            currency: env::var("PAYMENT_CURRENCY").unwrap_or_else(|_| "usd".to_string()),
        };
        if stripe.secret_key.is_empty() {
            tracing::warn!("STRIPE_SECRET_KEY is empty, card checkout will be rejected by the gateway");
        }

        Ok(Self {
            database_url,
            host,
            port,
            jwt_secret,
            app_domain,
            stripe,
            admin_email: env::var("ADMIN_EMAIL").unwrap_or_else(|_| "admin@example.com".into()),
            admin_password: env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "Admin@123".into()),
        })
    }

    pub fn confirmation_url(&self, order_id: uuid::Uuid) -> String {
        format!("{}/api/customer/cart/confirmation/{}", self.app_domain, order_id)
    }

    pub fn cart_url(&self) -> String {
        format!("{}/api/customer/cart", self.app_domain)
    }

    pub fn payment_confirmation_url(&self, order_id: uuid::Uuid) -> String {
        format!(
            "{}/api/admin/orders/{}/payment-confirmation",
            self.app_domain, order_id
        )
    }

    pub fn order_url(&self, order_id: uuid::Uuid) -> String {
        format!("{}/api/admin/orders/{}", self.app_domain, order_id)
    }
}

fn parse_port(raw: Option<String>) -> u16 {
    raw.and_then(|p| p.parse::<u16>().ok()).unwrap_or(3000)
}

#[cfg(test)]
pub(crate) fn sample_config() -> AppConfig {
    AppConfig {
        database_url: "postgres://localhost/test".into(),
        host: "127.0.0.1".into(),
        port: 3000,
        jwt_secret: "secret".into(),
        app_domain: "https://shop.test".into(),
        stripe: StripeConfig {
            secret_key: "sk_test".into(),
            api_base: "https://api.stripe.com".into(),
            currency: "usd".into(),
        },
        admin_email: "admin@example.com".into(),
        admin_password: "Admin@123".into(),
    }
}
