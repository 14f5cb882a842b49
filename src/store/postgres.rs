//! PostgreSQL catalog store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::{CatalogStore, ProductFilter, StoreError, StoreResult, Visibility};
use crate::domain::aggregates::{
    AdminRole, AdminUser, Banner, Category, Link, PopularSearch, Product, ProductDetails, ProductOption,
    ProductOptionValue, ProductVariant, Setting,
};
use crate::domain::value_objects::{Price, ProductCode, SelectionKey, Slug};

const CATEGORY_COLUMNS: &str = "id, name, slug, icon, sort_order, active, created_at, updated_at";
const PRODUCT_COLUMNS: &str =
    "p.id, p.code, p.name, p.description, p.main_image, p.category_id, p.sort_order, p.active, p.created_at, p.updated_at";
const BANNER_COLUMNS: &str = "id, image, image_desktop, link, sort_order, active, created_at, updated_at";
const LINK_COLUMNS: &str = "id, name, url, icon, sort_order, active, created_at";
const POPULAR_SEARCH_COLUMNS: &str = "id, query, sort_order, created_at";
const ADMIN_COLUMNS: &str = "id, email, password_hash, name, role, created_at";

#[derive(sqlx::FromRow)]
struct OptionRow { id: Uuid, product_id: Uuid, name: String, sort_order: i32 }

#[derive(sqlx::FromRow)]
struct VariantRow { id: Uuid, product_id: Uuid, option_values: String, price: Price, old_price: Option<Price>, in_stock: bool }

impl TryFrom<VariantRow> for ProductVariant {
    type Error = StoreError;
    fn try_from(r: VariantRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: r.id, product_id: r.product_id, option_values: SelectionKey::decode(&r.option_values)?,
            price: r.price, old_price: r.old_price, in_stock: r.in_stock,
        })
    }
}

#[derive(sqlx::FromRow)]
struct AdminRow { id: Uuid, email: String, password_hash: String, name: Option<String>, role: String, created_at: DateTime<Utc> }

impl TryFrom<AdminRow> for AdminUser {
    type Error = StoreError;
    fn try_from(r: AdminRow) -> Result<Self, Self::Error> {
        let role = AdminRole::parse(&r.role).ok_or_else(|| StoreError::Corrupt(format!("unknown admin role {}", r.role)))?;
        Ok(Self { id: r.id, email: r.email, password_hash: r.password_hash, name: r.name, role, created_at: r.created_at })
    }
}

#[derive(Clone)]
pub struct PgCatalogStore { pool: PgPool }

impl PgCatalogStore {
    pub fn new(pool: PgPool) -> Self { Self { pool } }

    /// Loads categories and option/variant trees for a page of product rows.
    async fn load_details(&self, products: Vec<Product>) -> StoreResult<Vec<ProductDetails>> {
        if products.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = products.iter().map(|p| p.id).collect();
        let category_ids: Vec<Uuid> = products.iter().filter_map(|p| p.category_id).collect();

        let categories = sqlx::query_as::<_, Category>(&format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = ANY($1)"))
            .bind(&category_ids).fetch_all(&self.pool).await?;
        let options = sqlx::query_as::<_, OptionRow>(
            "SELECT id, product_id, name, sort_order FROM product_options WHERE product_id = ANY($1) ORDER BY sort_order, seq")
            .bind(&ids).fetch_all(&self.pool).await?;
        let values = sqlx::query_as::<_, ProductOptionValue>(
            "SELECT v.id, v.option_id, v.value, v.color_code, v.image, v.sort_order FROM product_option_values v \
             JOIN product_options o ON o.id = v.option_id WHERE o.product_id = ANY($1) ORDER BY v.sort_order, v.seq")
            .bind(&ids).fetch_all(&self.pool).await?;
        let variants = sqlx::query_as::<_, VariantRow>(
            "SELECT id, product_id, option_values, price, old_price, in_stock FROM product_variants WHERE product_id = ANY($1) ORDER BY seq")
            .bind(&ids).fetch_all(&self.pool).await?
            .into_iter().map(ProductVariant::try_from).collect::<StoreResult<Vec<_>>>()?;

        Ok(products.into_iter().map(|product| {
            let category = product.category_id.and_then(|cid| categories.iter().find(|c| c.id == cid).cloned());
            let options = options.iter().filter(|o| o.product_id == product.id).map(|o| ProductOption {
                id: o.id, product_id: o.product_id, name: o.name.clone(), sort_order: o.sort_order,
                values: values.iter().filter(|v| v.option_id == o.id).cloned().collect(),
            }).collect();
            let variants = variants.iter().filter(|v| v.product_id == product.id).cloned().collect();
            ProductDetails { product, category, options, variants }
        }).collect())
    }

    async fn insert_children(tx: &mut Transaction<'_, Postgres>, product: &ProductDetails) -> StoreResult<()> {
        for option in &product.options {
            sqlx::query("INSERT INTO product_options (id, product_id, name, sort_order) VALUES ($1, $2, $3, $4)")
                .bind(option.id).bind(product.id()).bind(&option.name).bind(option.sort_order)
                .execute(&mut **tx).await?;
            for value in &option.values {
                sqlx::query("INSERT INTO product_option_values (id, option_id, value, color_code, image, sort_order) VALUES ($1, $2, $3, $4, $5, $6)")
                    .bind(value.id).bind(option.id).bind(&value.value).bind(&value.color_code).bind(&value.image).bind(value.sort_order)
                    .execute(&mut **tx).await?;
            }
        }
        for variant in &product.variants {
            sqlx::query("INSERT INTO product_variants (id, product_id, option_values, price, old_price, in_stock) VALUES ($1, $2, $3, $4, $5, $6)")
                .bind(variant.id).bind(product.id()).bind(variant.option_values.encode()?)
                .bind(variant.price).bind(variant.old_price).bind(variant.in_stock)
                .execute(&mut **tx).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
    async fn list_categories(&self, visibility: Visibility) -> StoreResult<Vec<Category>> {
        let q = format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE (NOT $1 OR active) ORDER BY sort_order, seq");
        Ok(sqlx::query_as::<_, Category>(&q).bind(visibility.active_only()).fetch_all(&self.pool).await?)
    }

    async fn find_category(&self, id: Uuid) -> StoreResult<Option<Category>> {
        let q = format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = $1");
        Ok(sqlx::query_as::<_, Category>(&q).bind(id).fetch_optional(&self.pool).await?)
    }

    async fn find_category_by_slug(&self, slug: &Slug, excluding: Option<Uuid>) -> StoreResult<Option<Category>> {
        let q = format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE slug = $1 AND ($2::uuid IS NULL OR id <> $2)");
        Ok(sqlx::query_as::<_, Category>(&q).bind(slug).bind(excluding).fetch_optional(&self.pool).await?)
    }

    async fn insert_category(&self, c: &Category) -> StoreResult<()> {
        sqlx::query("INSERT INTO categories (id, name, slug, icon, sort_order, active, created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)")
            .bind(c.id).bind(&c.name).bind(&c.slug).bind(&c.icon).bind(c.sort_order).bind(c.active).bind(c.created_at).bind(c.updated_at)
            .execute(&self.pool).await?;
        Ok(())
    }

    async fn update_category(&self, c: &Category) -> StoreResult<bool> {
        let result = sqlx::query("UPDATE categories SET name = $2, slug = $3, icon = $4, sort_order = $5, active = $6, updated_at = $7 WHERE id = $1")
            .bind(c.id).bind(&c.name).bind(&c.slug).bind(&c.icon).bind(c.sort_order).bind(c.active).bind(c.updated_at)
            .execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_category(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1").bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_products(&self, filter: &ProductFilter) -> StoreResult<Vec<ProductDetails>> {
        let q = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products p LEFT JOIN categories c ON c.id = p.category_id \
             WHERE (NOT $1 OR p.active) \
               AND ($2::text IS NULL OR p.name ILIKE $2 ESCAPE '\\' \
                    OR p.code ILIKE $2 ESCAPE '\\' \
                    OR COALESCE(p.description, '') ILIKE $2 ESCAPE '\\') \
               AND ($3::text IS NULL OR c.slug = $3) \
             ORDER BY p.sort_order, p.seq");
        let rows = sqlx::query_as::<_, Product>(&q)
            .bind(filter.visibility.active_only()).bind(filter.search_pattern()).bind(filter.category_slug())
            .fetch_all(&self.pool).await?;
        self.load_details(rows).await
    }

    async fn find_product(&self, id: Uuid) -> StoreResult<Option<ProductDetails>> {
        let q = format!("SELECT {PRODUCT_COLUMNS} FROM products p WHERE p.id = $1");
        let row = sqlx::query_as::<_, Product>(&q).bind(id).fetch_optional(&self.pool).await?;
        Ok(self.load_details(row.into_iter().collect()).await?.pop())
    }

    async fn next_product_code(&self) -> StoreResult<ProductCode> {
        let n: i64 = sqlx::query_scalar("SELECT nextval('product_code_seq')").fetch_one(&self.pool).await?;
        Ok(ProductCode::from_sequence(n))
    }

    async fn insert_product(&self, d: &ProductDetails) -> StoreResult<()> {
        let p = &d.product;
        let mut tx = self.pool.begin().await?;
        sqlx::query("INSERT INTO products (id, code, name, description, main_image, category_id, sort_order, active, created_at, updated_at) \
                     VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)")
            .bind(p.id).bind(&p.code).bind(&p.name).bind(&p.description).bind(&p.main_image).bind(p.category_id)
            .bind(p.sort_order).bind(p.active).bind(p.created_at).bind(p.updated_at)
            .execute(&mut *tx).await?;
        Self::insert_children(&mut tx, d).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn replace_product(&self, d: &ProductDetails) -> StoreResult<bool> {
        let p = &d.product;
        let mut tx = self.pool.begin().await?;
        let updated = sqlx::query("UPDATE products SET name = $2, description = $3, main_image = $4, category_id = $5, sort_order = $6, active = $7, updated_at = $8 WHERE id = $1")
            .bind(p.id).bind(&p.name).bind(&p.description).bind(&p.main_image).bind(p.category_id)
            .bind(p.sort_order).bind(p.active).bind(p.updated_at)
            .execute(&mut *tx).await?;
        if updated.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }
        sqlx::query("DELETE FROM product_variants WHERE product_id = $1").bind(p.id).execute(&mut *tx).await?;
        sqlx::query("DELETE FROM product_options WHERE product_id = $1").bind(p.id).execute(&mut *tx).await?;
        Self::insert_children(&mut tx, d).await?;
        tx.commit().await?;
        Ok(true)
    }

    async fn delete_product(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1").bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_banners(&self, visibility: Visibility) -> StoreResult<Vec<Banner>> {
        let q = format!("SELECT {BANNER_COLUMNS} FROM banners WHERE (NOT $1 OR active) ORDER BY sort_order, seq");
        Ok(sqlx::query_as::<_, Banner>(&q).bind(visibility.active_only()).fetch_all(&self.pool).await?)
    }

    async fn find_banner(&self, id: Uuid) -> StoreResult<Option<Banner>> {
        let q = format!("SELECT {BANNER_COLUMNS} FROM banners WHERE id = $1");
        Ok(sqlx::query_as::<_, Banner>(&q).bind(id).fetch_optional(&self.pool).await?)
    }

    async fn insert_banner(&self, b: &Banner) -> StoreResult<()> {
        sqlx::query("INSERT INTO banners (id, image, image_desktop, link, sort_order, active, created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)")
            .bind(b.id).bind(&b.image).bind(&b.image_desktop).bind(&b.link).bind(b.sort_order).bind(b.active).bind(b.created_at).bind(b.updated_at)
            .execute(&self.pool).await?;
        Ok(())
    }

    async fn update_banner(&self, b: &Banner) -> StoreResult<bool> {
        let result = sqlx::query("UPDATE banners SET image = $2, image_desktop = $3, link = $4, sort_order = $5, active = $6, updated_at = $7 WHERE id = $1")
            .bind(b.id).bind(&b.image).bind(&b.image_desktop).bind(&b.link).bind(b.sort_order).bind(b.active).bind(b.updated_at)
            .execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_banner(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM banners WHERE id = $1").bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_links(&self, visibility: Visibility) -> StoreResult<Vec<Link>> {
        let q = format!("SELECT {LINK_COLUMNS} FROM links WHERE (NOT $1 OR active) ORDER BY sort_order, seq");
        Ok(sqlx::query_as::<_, Link>(&q).bind(visibility.active_only()).fetch_all(&self.pool).await?)
    }

    async fn find_link(&self, id: Uuid) -> StoreResult<Option<Link>> {
        let q = format!("SELECT {LINK_COLUMNS} FROM links WHERE id = $1");
        Ok(sqlx::query_as::<_, Link>(&q).bind(id).fetch_optional(&self.pool).await?)
    }

    async fn insert_link(&self, l: &Link) -> StoreResult<()> {
        sqlx::query("INSERT INTO links (id, name, url, icon, sort_order, active, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7)")
            .bind(l.id).bind(&l.name).bind(&l.url).bind(&l.icon).bind(l.sort_order).bind(l.active).bind(l.created_at)
            .execute(&self.pool).await?;
        Ok(())
    }

    async fn update_link(&self, l: &Link) -> StoreResult<bool> {
        let result = sqlx::query("UPDATE links SET name = $2, url = $3, icon = $4, sort_order = $5, active = $6 WHERE id = $1")
            .bind(l.id).bind(&l.name).bind(&l.url).bind(&l.icon).bind(l.sort_order).bind(l.active)
            .execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_link(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM links WHERE id = $1").bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_popular_searches(&self) -> StoreResult<Vec<PopularSearch>> {
        let q = format!("SELECT {POPULAR_SEARCH_COLUMNS} FROM popular_searches ORDER BY sort_order, seq");
        Ok(sqlx::query_as::<_, PopularSearch>(&q).fetch_all(&self.pool).await?)
    }

    async fn find_popular_search(&self, id: Uuid) -> StoreResult<Option<PopularSearch>> {
        let q = format!("SELECT {POPULAR_SEARCH_COLUMNS} FROM popular_searches WHERE id = $1");
        Ok(sqlx::query_as::<_, PopularSearch>(&q).bind(id).fetch_optional(&self.pool).await?)
    }

    async fn insert_popular_search(&self, s: &PopularSearch) -> StoreResult<()> {
        sqlx::query("INSERT INTO popular_searches (id, query, sort_order, created_at) VALUES ($1, $2, $3, $4)")
            .bind(s.id).bind(&s.query).bind(s.sort_order).bind(s.created_at)
            .execute(&self.pool).await?;
        Ok(())
    }

    async fn update_popular_search(&self, s: &PopularSearch) -> StoreResult<bool> {
        let result = sqlx::query("UPDATE popular_searches SET query = $2, sort_order = $3 WHERE id = $1")
            .bind(s.id).bind(&s.query).bind(s.sort_order)
            .execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_popular_search(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM popular_searches WHERE id = $1").bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_settings(&self) -> StoreResult<Vec<Setting>> {
        Ok(sqlx::query_as::<_, Setting>("SELECT key, value FROM settings ORDER BY key").fetch_all(&self.pool).await?)
    }

    async fn upsert_settings(&self, settings: &[Setting]) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        for s in settings {
            sqlx::query("INSERT INTO settings (key, value) VALUES ($1, $2) ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_at = NOW()")
                .bind(&s.key).bind(&s.value)
                .execute(&mut *tx).await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn insert_setting_if_missing(&self, s: &Setting) -> StoreResult<bool> {
        let result = sqlx::query("INSERT INTO settings (key, value) VALUES ($1, $2) ON CONFLICT (key) DO NOTHING")
            .bind(&s.key).bind(&s.value)
            .execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_admin_by_email(&self, email: &str) -> StoreResult<Option<AdminUser>> {
        let q = format!("SELECT {ADMIN_COLUMNS} FROM admin_users WHERE lower(email) = lower($1)");
        sqlx::query_as::<_, AdminRow>(&q).bind(email).fetch_optional(&self.pool).await?
            .map(AdminUser::try_from).transpose()
    }

    async fn insert_admin(&self, u: &AdminUser) -> StoreResult<()> {
        sqlx::query("INSERT INTO admin_users (id, email, password_hash, name, role, created_at) VALUES ($1, $2, $3, $4, $5, $6)")
            .bind(u.id).bind(&u.email).bind(&u.password_hash).bind(&u.name).bind(u.role.as_str()).bind(u.created_at)
            .execute(&self.pool).await?;
        Ok(())
    }
}
