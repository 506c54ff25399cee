//! Startup initialisation and demo catalog data.

use anyhow::Result;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, Set,
};
use uuid::Uuid;

use crate::{
    config::AppConfig,
    db::run_migrations,
    entity::{
        categories::{ActiveModel as CategoryActive, Column as CategoryCol, Entity as Categories},
        companies::{ActiveModel as CompanyActive, Column as CompanyCol, Entity as Companies},
        products::{ActiveModel as ProductActive, Column as ProductCol, Entity as Products},
        users::{ActiveModel as UserActive, Column as UserCol, Entity as Users},
    },
    services::auth_service::hash_password,
    status::Role,
};

/// Applies pending migrations and makes sure an administrator exists.
///
/// A migration failure is logged and startup continues; the schema may
/// already be in place from an earlier run.
pub async fn initialize(orm: &DatabaseConnection, config: &AppConfig) -> Result<()> {
    match run_migrations(orm).await {
        Ok(()) => tracing::info!("schema is up to date"),
        Err(err) => tracing::warn!(error = %err, "migrations skipped at startup"),
    }

    ensure_default_admin(orm, config).await?;
    Ok(())
}

/// Creates the default administrator unless some admin account already exists.
/// Returns the id of the admin that was created.
pub async fn ensure_default_admin(
    orm: &DatabaseConnection,
    config: &AppConfig,
) -> Result<Option<Uuid>> {
    let admins = Users::find()
        .filter(UserCol::Role.eq(Role::Admin))
        .count(orm)
        .await?;
    if admins > 0 {
        return Ok(None);
    }

    let password_hash =
        hash_password(&config.admin_password).map_err(|e| anyhow::anyhow!(e.to_string()))?;
    let admin = UserActive {
        id: Set(Uuid::new_v4()),
        email: Set(config.admin_email.to_lowercase()),
        password_hash: Set(password_hash),
        role: Set(Role::Admin),
        name: Set("Default Admin".to_string()),
        street_address: Set(None),
        city: Set(None),
        state: Set(None),
        postal_code: Set(None),
        phone_number: Set(None),
        company_id: Set(None),
        lockout_end: Set(None),
        created_at: NotSet,
    }
    .insert(orm)
    .await?;

    tracing::info!(email = %admin.email, "default admin created");
    Ok(Some(admin.id))
}

struct SeedCompany {
    name: &'static str,
    street_address: &'static str,
    city: &'static str,
    postal_code: &'static str,
    state: &'static str,
    phone_number: &'static str,
}

const COMPANIES: [SeedCompany; 3] = [
    SeedCompany {
        name: "Tech Solution",
        street_address: "123 Tech St",
        city: "Tech City",
        postal_code: "12121",
        state: "IL",
        phone_number: "6669990000",
    },
    SeedCompany {
        name: "Vivid Books",
        street_address: "999 Vid St",
        city: "Vid City",
        postal_code: "66666",
        state: "IL",
        phone_number: "7779990000",
    },
    SeedCompany {
        name: "Readers Club",
        street_address: "999 Main St",
        city: "Lala land",
        postal_code: "99999",
        state: "NY",
        phone_number: "1113335555",
    },
];

const CATEGORIES: [(&str, i32); 3] = [("Action", 1), ("SciFi", 2), ("History", 3)];

// (title, author, isbn, category, list, 1-50, 51-100, 100+) in whole dollars
const PRODUCTS: [(&str, &str, &str, &str, i64, i64, i64, i64); 6] = [
    ("Fortune of Time", "Billy Spark", "SWD9999001", "Action", 99, 90, 85, 80),
    ("Dark Skies", "Nancy Hoover", "CAW777777701", "Action", 40, 30, 25, 20),
    ("Vanish in the Sunset", "Julian Button", "RITO5555501", "Action", 55, 50, 40, 35),
    ("Cotton Candy", "Abby Muscles", "WS3333333301", "SciFi", 70, 65, 60, 55),
    ("Rock in the Ocean", "Ron Parker", "SOTJ1111111101", "SciFi", 30, 27, 25, 20),
    ("Leaves and Wonders", "Laura Phantom", "FOT000000001", "History", 25, 23, 22, 20),
];

const DESCRIPTION: &str = "Praesent vitae sodales libero. Praesent molestie orci augue, \
vitae euismod velit sollicitudin ac. Praesent vestibulum facilisis nibh ut ultricies.";

/// Inserts the demo categories, companies and books. Rows that already exist
/// (matched by name or ISBN) are left alone.
pub async fn seed_catalog(orm: &DatabaseConnection) -> Result<()> {
    let mut category_ids = Vec::with_capacity(CATEGORIES.len());
    for (name, display_order) in CATEGORIES {
        let existing = Categories::find()
            .filter(CategoryCol::Name.eq(name))
            .one(orm)
            .await?;
        let id = match existing {
            Some(category) => category.id,
            None => {
                CategoryActive {
                    id: Set(Uuid::new_v4()),
                    name: Set(name.to_string()),
                    display_order: Set(display_order),
                    created_at: NotSet,
                }
                .insert(orm)
                .await?
                .id
            }
        };
        category_ids.push((name, id));
    }

    for company in &COMPANIES {
        let exists = Companies::find()
            .filter(CompanyCol::Name.eq(company.name))
            .count(orm)
            .await?
            > 0;
        if exists {
            continue;
        }
        CompanyActive {
            id: Set(Uuid::new_v4()),
            name: Set(company.name.to_string()),
            street_address: Set(Some(company.street_address.to_string())),
            city: Set(Some(company.city.to_string())),
            state: Set(Some(company.state.to_string())),
            postal_code: Set(Some(company.postal_code.to_string())),
            phone_number: Set(Some(company.phone_number.to_string())),
            created_at: NotSet,
        }
        .insert(orm)
        .await?;
    }

    for (title, author, isbn, category, list_price, price, price50, price100) in PRODUCTS {
        let exists = Products::find()
            .filter(ProductCol::Isbn.eq(isbn))
            .count(orm)
            .await?
            > 0;
        if exists {
            continue;
        }
        let category_id = category_ids
            .iter()
            .find(|(name, _)| *name == category)
            .map(|(_, id)| *id)
            .ok_or_else(|| anyhow::anyhow!("unknown seed category {category}"))?;

        ProductActive {
            id: Set(Uuid::new_v4()),
            title: Set(title.to_string()),
            description: Set(DESCRIPTION.to_string()),
            isbn: Set(isbn.to_string()),
            author: Set(author.to_string()),
            list_price: Set(list_price * 100),
            price: Set(price * 100),
            price50: Set(price50 * 100),
            price100: Set(price100 * 100),
            category_id: Set(category_id),
            image_url: Set(None),
            created_at: NotSet,
        }
        .insert(orm)
        .await?;
    }

    tracing::info!(
        categories = CATEGORIES.len(),
        companies = COMPANIES.len(),
        products = PRODUCTS.len(),
        "catalog seeded"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::catalog::{MAX_PRICE, MIN_PRICE};

    #[test]
    fn seed_prices_respect_catalog_rules() {
        for (title, _, _, category, list, price, price50, price100) in PRODUCTS {
            assert!(CATEGORIES.iter().any(|(name, _)| *name == category), "{title}");
            for value in [list, price, price50, price100] {
                assert!((MIN_PRICE..=MAX_PRICE).contains(&(value * 100)), "{title}");
            }
            assert!(price >= price50 && price50 >= price100, "{title}");
        }
    }
}
