//! Database service for gestor-service.
//!
//! Every business row is scoped to a user account; all queries filter on the
//! caller's user_id so one account can never see another's data. Multi-step
//! writes (documents with items, sales with derived receivables) run inside a
//! single transaction.

use crate::models::{
    next_document_number, split_payment, CreatePayable, CreateProduct, CreateQuote,
    CreateReceivable, CreateSale, CreateTransaction, Customer, CustomerInput, DashboardStats,
    DocumentItemInput, DraftDocument, FinancialSummary, Payable, PaymentStatus, Product,
    ProductVariant, ProductWithVariants, Quote, QuoteItem, QuoteStatus, QuoteWithItems, Receivable,
    Sale, SaleItem, SaleWithItems, StoreSettings, Transaction, UpsertStoreSettings,
    QUOTE_NUMBER_PREFIX, SALE_NUMBER_PREFIX,
};
use crate::services::metrics::{DB_QUERY_DURATION, QUOTES_TOTAL, SALES_TOTAL};
use gestor_core::error::AppError;
use rust_decimal::Decimal;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{info, instrument};
use uuid::Uuid;

const QUOTE_COLUMNS: &str =
    "id, user_id, customer_id, quote_number, issue_date, valid_until, total_amount, status, notes, created_at, updated_at";
const SALE_COLUMNS: &str =
    "id, user_id, customer_id, quote_id, sale_number, sale_date, total_amount, payment_method, payment_status, notes, created_at, updated_at";

/// Database connection pool wrapper.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database connection pool.
    #[instrument(skip(database_url), fields(service = "gestor-service"))]
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, AppError> {
        info!(
            max_connections = max_connections,
            min_connections = min_connections,
            "Connecting to PostgreSQL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .connect(database_url)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to connect: {}", e)))?;

        info!("PostgreSQL connection pool established");

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Check database health.
    #[instrument(skip(self))]
    pub async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Health check failed: {}", e)))?;
        Ok(())
    }

    /// Run database migrations.
    #[instrument(skip(self))]
    pub async fn run_migrations(&self) -> Result<(), AppError> {
        info!("Running database migrations");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Migration failed: {}", e)))?;
        info!("Database migrations completed");
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Customer Operations
    // -------------------------------------------------------------------------

    /// Create a new customer.
    #[instrument(skip(self, input), fields(user_id = %user_id))]
    pub async fn create_customer(
        &self,
        user_id: Uuid,
        input: &CustomerInput,
    ) -> Result<Customer, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_customer"])
            .start_timer();

        let customer = sqlx::query_as::<_, Customer>(
            r#"
            INSERT INTO customers (id, user_id, name, email, phone, cpf_cnpj, address, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, user_id, name, email, phone, cpf_cnpj, address, notes, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.cpf_cnpj)
        .bind(&input.address)
        .bind(&input.notes)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to create customer: {}", e)))?;

        timer.observe_duration();

        info!(customer_id = %customer.id, "Customer created");

        Ok(customer)
    }

    /// Get a customer by ID.
    #[instrument(skip(self), fields(user_id = %user_id, customer_id = %customer_id))]
    pub async fn get_customer(
        &self,
        user_id: Uuid,
        customer_id: Uuid,
    ) -> Result<Option<Customer>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_customer"])
            .start_timer();

        let customer = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, user_id, name, email, phone, cpf_cnpj, address, notes, created_at, updated_at
            FROM customers
            WHERE user_id = $1 AND id = $2
            "#,
        )
        .bind(user_id)
        .bind(customer_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get customer: {}", e)))?;

        timer.observe_duration();

        Ok(customer)
    }

    /// List customers for a user, newest first.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn list_customers(&self, user_id: Uuid) -> Result<Vec<Customer>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_customers"])
            .start_timer();

        let customers = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, user_id, name, email, phone, cpf_cnpj, address, notes, created_at, updated_at
            FROM customers
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list customers: {}", e)))?;

        timer.observe_duration();

        Ok(customers)
    }

    /// Overwrite a customer's editable fields.
    #[instrument(skip(self, input), fields(user_id = %user_id, customer_id = %customer_id))]
    pub async fn update_customer(
        &self,
        user_id: Uuid,
        customer_id: Uuid,
        input: &CustomerInput,
    ) -> Result<Customer, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["update_customer"])
            .start_timer();

        let customer = sqlx::query_as::<_, Customer>(
            r#"
            UPDATE customers
            SET name = $3, email = $4, phone = $5, cpf_cnpj = $6, address = $7, notes = $8,
                updated_at = NOW()
            WHERE user_id = $1 AND id = $2
            RETURNING id, user_id, name, email, phone, cpf_cnpj, address, notes, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(customer_id)
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.cpf_cnpj)
        .bind(&input.address)
        .bind(&input.notes)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to update customer: {}", e)))?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Customer {} not found", customer_id)))?;

        timer.observe_duration();

        Ok(customer)
    }

    /// Delete a customer. Documents referencing it keep a dangling reference
    /// set to NULL by the foreign keys.
    #[instrument(skip(self), fields(user_id = %user_id, customer_id = %customer_id))]
    pub async fn delete_customer(&self, user_id: Uuid, customer_id: Uuid) -> Result<(), AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["delete_customer"])
            .start_timer();

        let result = sqlx::query("DELETE FROM customers WHERE user_id = $1 AND id = $2")
            .bind(user_id)
            .bind(customer_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to delete customer: {}", e))
            })?;

        timer.observe_duration();

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(anyhow::anyhow!(
                "Customer {} not found",
                customer_id
            )));
        }

        info!(customer_id = %customer_id, "Customer deleted");

        Ok(())
    }

    // -------------------------------------------------------------------------
    // Product Operations
    // -------------------------------------------------------------------------

    /// Create a product with its variant set.
    #[instrument(skip(self, input), fields(user_id = %user_id))]
    pub async fn create_product(
        &self,
        user_id: Uuid,
        input: &CreateProduct,
    ) -> Result<ProductWithVariants, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_product"])
            .start_timer();

        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to begin transaction: {}", e))
        })?;

        let product = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (id, user_id, name, description, base_price, is_service, active)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, user_id, name, description, base_price, is_service, active, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.base_price)
        .bind(input.is_service)
        .bind(input.active)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to create product: {}", e)))?;

        let mut variants = Vec::with_capacity(input.variants.len());
        for variant in &input.variants {
            let inserted = sqlx::query_as::<_, ProductVariant>(
                r#"
                INSERT INTO product_variants (id, product_id, name, price_modifier, sku, stock_quantity)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING id, product_id, name, price_modifier, sku, stock_quantity, created_at
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(product.id)
            .bind(&variant.name)
            .bind(variant.price_modifier)
            .bind(&variant.sku)
            .bind(variant.stock_quantity)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to create variant: {}", e))
            })?;
            variants.push(inserted);
        }

        tx.commit().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to commit transaction: {}", e))
        })?;

        timer.observe_duration();

        info!(product_id = %product.id, variant_count = variants.len(), "Product created");

        Ok(ProductWithVariants { product, variants })
    }

    /// Get a product with its variants.
    #[instrument(skip(self), fields(user_id = %user_id, product_id = %product_id))]
    pub async fn get_product(
        &self,
        user_id: Uuid,
        product_id: Uuid,
    ) -> Result<Option<ProductWithVariants>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_product"])
            .start_timer();

        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, user_id, name, description, base_price, is_service, active, created_at, updated_at
            FROM products
            WHERE user_id = $1 AND id = $2
            "#,
        )
        .bind(user_id)
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get product: {}", e)))?;

        let Some(product) = product else {
            timer.observe_duration();
            return Ok(None);
        };

        let variants = self.list_variants(product.id).await?;

        timer.observe_duration();

        Ok(Some(ProductWithVariants { product, variants }))
    }

    /// List products for a user with their variants, newest first.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn list_products(
        &self,
        user_id: Uuid,
        active_only: bool,
    ) -> Result<Vec<ProductWithVariants>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_products"])
            .start_timer();

        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, user_id, name, description, base_price, is_service, active, created_at, updated_at
            FROM products
            WHERE user_id = $1 AND ($2::bool = FALSE OR active = TRUE)
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .bind(active_only)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list products: {}", e)))?;

        // Single batch fetch for all variant sets, grouped in memory.
        let product_ids: Vec<Uuid> = products.iter().map(|p| p.id).collect();
        let variants = sqlx::query_as::<_, ProductVariant>(
            r#"
            SELECT id, product_id, name, price_modifier, sku, stock_quantity, created_at
            FROM product_variants
            WHERE product_id = ANY($1)
            ORDER BY created_at, name
            "#,
        )
        .bind(&product_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list variants: {}", e)))?;

        let mut by_product: HashMap<Uuid, Vec<ProductVariant>> = HashMap::new();
        for variant in variants {
            by_product.entry(variant.product_id).or_default().push(variant);
        }

        let result = products
            .into_iter()
            .map(|product| {
                let variants = by_product.remove(&product.id).unwrap_or_default();
                ProductWithVariants { product, variants }
            })
            .collect();

        timer.observe_duration();

        Ok(result)
    }

    async fn list_variants(&self, product_id: Uuid) -> Result<Vec<ProductVariant>, AppError> {
        sqlx::query_as::<_, ProductVariant>(
            r#"
            SELECT id, product_id, name, price_modifier, sku, stock_quantity, created_at
            FROM product_variants
            WHERE product_id = $1
            ORDER BY created_at, name
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list variants: {}", e)))
    }

    /// Overwrite a product and replace its variant set wholesale.
    ///
    /// Existing variant rows are deleted and re-inserted with new IDs; item
    /// rows on old documents keep their snapshots and get their variant
    /// reference nulled by the foreign key.
    #[instrument(skip(self, input), fields(user_id = %user_id, product_id = %product_id))]
    pub async fn update_product(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        input: &CreateProduct,
    ) -> Result<ProductWithVariants, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["update_product"])
            .start_timer();

        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to begin transaction: {}", e))
        })?;

        let product = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET name = $3, description = $4, base_price = $5, is_service = $6, active = $7,
                updated_at = NOW()
            WHERE user_id = $1 AND id = $2
            RETURNING id, user_id, name, description, base_price, is_service, active, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(product_id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.base_price)
        .bind(input.is_service)
        .bind(input.active)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to update product: {}", e)))?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Product {} not found", product_id)))?;

        sqlx::query("DELETE FROM product_variants WHERE product_id = $1")
            .bind(product_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to clear variants: {}", e))
            })?;

        let mut variants = Vec::with_capacity(input.variants.len());
        for variant in &input.variants {
            let inserted = sqlx::query_as::<_, ProductVariant>(
                r#"
                INSERT INTO product_variants (id, product_id, name, price_modifier, sku, stock_quantity)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING id, product_id, name, price_modifier, sku, stock_quantity, created_at
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(product_id)
            .bind(&variant.name)
            .bind(variant.price_modifier)
            .bind(&variant.sku)
            .bind(variant.stock_quantity)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to create variant: {}", e))
            })?;
            variants.push(inserted);
        }

        tx.commit().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to commit transaction: {}", e))
        })?;

        timer.observe_duration();

        info!(product_id = %product_id, variant_count = variants.len(), "Product updated");

        Ok(ProductWithVariants { product, variants })
    }

    /// Delete a product; variants cascade, item snapshots survive.
    #[instrument(skip(self), fields(user_id = %user_id, product_id = %product_id))]
    pub async fn delete_product(&self, user_id: Uuid, product_id: Uuid) -> Result<(), AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["delete_product"])
            .start_timer();

        let result = sqlx::query("DELETE FROM products WHERE user_id = $1 AND id = $2")
            .bind(user_id)
            .bind(product_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to delete product: {}", e))
            })?;

        timer.observe_duration();

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(anyhow::anyhow!(
                "Product {} not found",
                product_id
            )));
        }

        info!(product_id = %product_id, "Product deleted");

        Ok(())
    }

    /// Resolve raw item payloads against the catalog into a priced draft.
    async fn resolve_items(
        &self,
        user_id: Uuid,
        items: &[DocumentItemInput],
    ) -> Result<DraftDocument, AppError> {
        let mut draft = DraftDocument::new();

        for item in items {
            let product = match item.product_id {
                Some(product_id) => self
                    .get_product(user_id, product_id)
                    .await?
                    .ok_or_else(|| {
                        AppError::BadRequest(anyhow::anyhow!("Selecione um produto"))
                    })?,
                None => {
                    return Err(AppError::BadRequest(anyhow::anyhow!("Selecione um produto")))
                }
            };

            let variant = match item.variant_id {
                Some(variant_id) => Some(
                    product
                        .variants
                        .iter()
                        .find(|v| v.id == variant_id)
                        .cloned()
                        .ok_or_else(|| {
                            AppError::BadRequest(anyhow::anyhow!(
                                "Variação não pertence ao produto selecionado"
                            ))
                        })?,
                ),
                None => None,
            };

            draft.add_item(
                Some(&product.product),
                variant.as_ref(),
                item.quantity,
                item.unit_price,
            )?;
        }

        draft.require_items()?;

        Ok(draft)
    }

    // -------------------------------------------------------------------------
    // Quote Operations
    // -------------------------------------------------------------------------

    /// Create a quote and its items atomically.
    #[instrument(skip(self, input), fields(user_id = %user_id))]
    pub async fn create_quote(
        &self,
        user_id: Uuid,
        input: &CreateQuote,
    ) -> Result<QuoteWithItems, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_quote"])
            .start_timer();

        self.require_customer(user_id, input.customer_id).await?;
        let draft = self.resolve_items(user_id, &input.items).await?;

        let quote_number = input
            .quote_number
            .clone()
            .unwrap_or_else(|| next_document_number(QUOTE_NUMBER_PREFIX));
        let issue_date = input
            .issue_date
            .unwrap_or_else(|| chrono::Utc::now().date_naive());

        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to begin transaction: {}", e))
        })?;

        let quote = sqlx::query_as::<_, Quote>(&format!(
            r#"
            INSERT INTO quotes (id, user_id, customer_id, quote_number, issue_date, valid_until, total_amount, status, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {QUOTE_COLUMNS}
            "#,
        ))
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(input.customer_id)
        .bind(&quote_number)
        .bind(issue_date)
        .bind(input.valid_until)
        .bind(draft.total())
        .bind(QuoteStatus::Pending.as_str())
        .bind(&input.notes)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to create quote: {}", e)))?;

        let mut items = Vec::with_capacity(draft.len());
        for line in draft.items() {
            let inserted = sqlx::query_as::<_, QuoteItem>(
                r#"
                INSERT INTO quote_items (id, quote_id, product_id, variant_id, description, quantity, unit_price, total_price)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                RETURNING id, quote_id, product_id, variant_id, description, quantity, unit_price, total_price, created_at
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(quote.id)
            .bind(line.product_id)
            .bind(line.variant_id)
            .bind(&line.description)
            .bind(line.quantity)
            .bind(line.unit_price)
            .bind(line.total_price)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to create quote item: {}", e))
            })?;
            items.push(inserted);
        }

        tx.commit().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to commit transaction: {}", e))
        })?;

        timer.observe_duration();

        QUOTES_TOTAL.with_label_values(&["pending"]).inc();

        info!(quote_id = %quote.id, quote_number = %quote.quote_number, total = %quote.total_amount, "Quote created");

        Ok(QuoteWithItems { quote, items })
    }

    /// Get a quote with its items.
    #[instrument(skip(self), fields(user_id = %user_id, quote_id = %quote_id))]
    pub async fn get_quote(
        &self,
        user_id: Uuid,
        quote_id: Uuid,
    ) -> Result<Option<QuoteWithItems>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_quote"])
            .start_timer();

        let quote = sqlx::query_as::<_, Quote>(&format!(
            "SELECT {QUOTE_COLUMNS} FROM quotes WHERE user_id = $1 AND id = $2"
        ))
        .bind(user_id)
        .bind(quote_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get quote: {}", e)))?;

        let Some(quote) = quote else {
            timer.observe_duration();
            return Ok(None);
        };

        let items = self.list_quote_items(quote.id).await?;

        timer.observe_duration();

        Ok(Some(QuoteWithItems { quote, items }))
    }

    async fn list_quote_items(&self, quote_id: Uuid) -> Result<Vec<QuoteItem>, AppError> {
        sqlx::query_as::<_, QuoteItem>(
            r#"
            SELECT id, quote_id, product_id, variant_id, description, quantity, unit_price, total_price, created_at
            FROM quote_items
            WHERE quote_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(quote_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list quote items: {}", e)))
    }

    /// List quotes for a user, newest first.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn list_quotes(&self, user_id: Uuid) -> Result<Vec<Quote>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_quotes"])
            .start_timer();

        let quotes = sqlx::query_as::<_, Quote>(&format!(
            "SELECT {QUOTE_COLUMNS} FROM quotes WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list quotes: {}", e)))?;

        timer.observe_duration();

        Ok(quotes)
    }

    /// Set a quote's status. The converted status is reserved for the
    /// conversion flow, and a converted quote never leaves that state.
    #[instrument(skip(self), fields(user_id = %user_id, quote_id = %quote_id))]
    pub async fn update_quote_status(
        &self,
        user_id: Uuid,
        quote_id: Uuid,
        status: QuoteStatus,
    ) -> Result<Quote, AppError> {
        if status == QuoteStatus::Converted {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "Use a conversão em venda para marcar um orçamento como convertido"
            )));
        }

        let timer = DB_QUERY_DURATION
            .with_label_values(&["update_quote_status"])
            .start_timer();

        let quote = sqlx::query_as::<_, Quote>(&format!(
            r#"
            UPDATE quotes
            SET status = $3, updated_at = NOW()
            WHERE user_id = $1 AND id = $2 AND status != 'converted'
            RETURNING {QUOTE_COLUMNS}
            "#,
        ))
        .bind(user_id)
        .bind(quote_id)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to update quote status: {}", e))
        })?;

        let Some(quote) = quote else {
            timer.observe_duration();
            // Distinguish a missing quote from a converted one.
            let exists = sqlx::query("SELECT 1 FROM quotes WHERE user_id = $1 AND id = $2")
                .bind(user_id)
                .bind(quote_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    AppError::DatabaseError(anyhow::anyhow!("Failed to check quote: {}", e))
                })?;
            return Err(match exists {
                Some(_) => AppError::BadRequest(anyhow::anyhow!(
                    "Orçamento convertido não pode ser alterado"
                )),
                None => AppError::NotFound(anyhow::anyhow!("Quote {} not found", quote_id)),
            });
        };

        timer.observe_duration();

        QUOTES_TOTAL.with_label_values(&[status.as_str()]).inc();

        info!(quote_id = %quote_id, status = status.as_str(), "Quote status updated");

        Ok(quote)
    }

    /// Delete a quote; its items cascade.
    #[instrument(skip(self), fields(user_id = %user_id, quote_id = %quote_id))]
    pub async fn delete_quote(&self, user_id: Uuid, quote_id: Uuid) -> Result<(), AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["delete_quote"])
            .start_timer();

        let result = sqlx::query("DELETE FROM quotes WHERE user_id = $1 AND id = $2")
            .bind(user_id)
            .bind(quote_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to delete quote: {}", e))
            })?;

        timer.observe_duration();

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(anyhow::anyhow!("Quote {} not found", quote_id)));
        }

        info!(quote_id = %quote_id, "Quote deleted");

        Ok(())
    }

    /// Convert a quote into a pending sale, copying its items.
    ///
    /// The quote is marked converted, a sale is created with a fresh sale
    /// number linked back to the quote, and the item snapshots are copied as
    /// sale items. All of it commits or none of it does. Conversion does not
    /// register a payment; the sale starts pending.
    #[instrument(skip(self), fields(user_id = %user_id, quote_id = %quote_id))]
    pub async fn convert_quote_to_sale(
        &self,
        user_id: Uuid,
        quote_id: Uuid,
    ) -> Result<SaleWithItems, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["convert_quote_to_sale"])
            .start_timer();

        let quote = self
            .get_quote(user_id, quote_id)
            .await?
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Quote {} not found", quote_id)))?;

        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to begin transaction: {}", e))
        })?;

        // The status guard makes conversion at-most-once even under
        // concurrent requests: only one UPDATE can move the row to converted.
        let marked = sqlx::query(
            r#"
            UPDATE quotes
            SET status = 'converted', updated_at = NOW()
            WHERE user_id = $1 AND id = $2 AND status != 'converted'
            "#,
        )
        .bind(user_id)
        .bind(quote_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to mark quote converted: {}", e))
        })?;

        if marked.rows_affected() == 0 {
            return Err(AppError::Conflict(anyhow::anyhow!(
                "Orçamento já foi convertido em venda"
            )));
        }

        let sale_number = next_document_number(SALE_NUMBER_PREFIX);
        let sale = sqlx::query_as::<_, Sale>(&format!(
            r#"
            INSERT INTO sales (id, user_id, customer_id, quote_id, sale_number, total_amount, payment_status, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {SALE_COLUMNS}
            "#,
        ))
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(quote.quote.customer_id)
        .bind(quote_id)
        .bind(&sale_number)
        .bind(quote.quote.total_amount)
        .bind(PaymentStatus::Pending.as_str())
        .bind(&quote.quote.notes)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to create sale: {}", e)))?;

        let mut items = Vec::with_capacity(quote.items.len());
        for item in &quote.items {
            let inserted = sqlx::query_as::<_, SaleItem>(
                r#"
                INSERT INTO sale_items (id, sale_id, product_id, variant_id, description, quantity, unit_price, total_price)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                RETURNING id, sale_id, product_id, variant_id, description, quantity, unit_price, total_price, created_at
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(sale.id)
            .bind(item.product_id)
            .bind(item.variant_id)
            .bind(&item.description)
            .bind(item.quantity)
            .bind(item.unit_price)
            .bind(item.total_price)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to copy sale item: {}", e))
            })?;
            items.push(inserted);
        }

        tx.commit().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to commit transaction: {}", e))
        })?;

        timer.observe_duration();

        QUOTES_TOTAL.with_label_values(&["converted"]).inc();
        SALES_TOTAL.with_label_values(&["pending"]).inc();

        info!(
            quote_id = %quote_id,
            sale_id = %sale.id,
            sale_number = %sale.sale_number,
            "Quote converted to sale"
        );

        Ok(SaleWithItems { sale, items })
    }

    // -------------------------------------------------------------------------
    // Sale Operations
    // -------------------------------------------------------------------------

    /// Register a sale: header, items and any derived receivable commit as one
    /// transaction.
    #[instrument(skip(self, input), fields(user_id = %user_id))]
    pub async fn create_sale(
        &self,
        user_id: Uuid,
        input: &CreateSale,
    ) -> Result<SaleWithItems, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_sale"])
            .start_timer();

        self.require_customer(user_id, input.customer_id).await?;
        let draft = self.resolve_items(user_id, &input.items).await?;

        let sale_number = input
            .sale_number
            .clone()
            .unwrap_or_else(|| next_document_number(SALE_NUMBER_PREFIX));
        let sale_date = input
            .sale_date
            .unwrap_or_else(|| chrono::Utc::now().date_naive());

        // Rejecting an overpayment here means nothing is persisted.
        let split = split_payment(draft.total(), &input.payment, &sale_number, sale_date)?;

        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to begin transaction: {}", e))
        })?;

        let sale = sqlx::query_as::<_, Sale>(&format!(
            r#"
            INSERT INTO sales (id, user_id, customer_id, sale_number, sale_date, total_amount, payment_method, payment_status, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {SALE_COLUMNS}
            "#,
        ))
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(input.customer_id)
        .bind(&sale_number)
        .bind(sale_date)
        .bind(draft.total())
        .bind(&input.payment_method)
        .bind(split.status.as_str())
        .bind(&input.notes)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to create sale: {}", e)))?;

        let mut items = Vec::with_capacity(draft.len());
        for line in draft.items() {
            let inserted = sqlx::query_as::<_, SaleItem>(
                r#"
                INSERT INTO sale_items (id, sale_id, product_id, variant_id, description, quantity, unit_price, total_price)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                RETURNING id, sale_id, product_id, variant_id, description, quantity, unit_price, total_price, created_at
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(sale.id)
            .bind(line.product_id)
            .bind(line.variant_id)
            .bind(&line.description)
            .bind(line.quantity)
            .bind(line.unit_price)
            .bind(line.total_price)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to create sale item: {}", e))
            })?;
            items.push(inserted);
        }

        if let Some(receivable) = &split.receivable {
            sqlx::query(
                r#"
                INSERT INTO accounts_receivable (id, user_id, customer_id, sale_id, amount, due_date, status, notes)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(input.customer_id)
            .bind(sale.id)
            .bind(receivable.amount)
            .bind(receivable.due_date)
            .bind("pending")
            .bind(&receivable.notes)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to create receivable: {}", e))
            })?;
        }

        tx.commit().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to commit transaction: {}", e))
        })?;

        timer.observe_duration();

        SALES_TOTAL
            .with_label_values(&[split.status.as_str()])
            .inc();

        info!(
            sale_id = %sale.id,
            sale_number = %sale.sale_number,
            total = %sale.total_amount,
            payment_status = %sale.payment_status,
            "Sale registered"
        );

        Ok(SaleWithItems { sale, items })
    }

    /// Get a sale with its items.
    #[instrument(skip(self), fields(user_id = %user_id, sale_id = %sale_id))]
    pub async fn get_sale(
        &self,
        user_id: Uuid,
        sale_id: Uuid,
    ) -> Result<Option<SaleWithItems>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_sale"])
            .start_timer();

        let sale = sqlx::query_as::<_, Sale>(&format!(
            "SELECT {SALE_COLUMNS} FROM sales WHERE user_id = $1 AND id = $2"
        ))
        .bind(user_id)
        .bind(sale_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get sale: {}", e)))?;

        let Some(sale) = sale else {
            timer.observe_duration();
            return Ok(None);
        };

        let items = sqlx::query_as::<_, SaleItem>(
            r#"
            SELECT id, sale_id, product_id, variant_id, description, quantity, unit_price, total_price, created_at
            FROM sale_items
            WHERE sale_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(sale.id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list sale items: {}", e)))?;

        timer.observe_duration();

        Ok(Some(SaleWithItems { sale, items }))
    }

    /// List sales for a user, newest first.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn list_sales(&self, user_id: Uuid) -> Result<Vec<Sale>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_sales"])
            .start_timer();

        let sales = sqlx::query_as::<_, Sale>(&format!(
            "SELECT {SALE_COLUMNS} FROM sales WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list sales: {}", e)))?;

        timer.observe_duration();

        Ok(sales)
    }

    /// Settle a sale: mark it paid and remove its outstanding receivables in
    /// the same transaction, so revenue never counts the balance twice.
    #[instrument(skip(self), fields(user_id = %user_id, sale_id = %sale_id))]
    pub async fn complete_sale(&self, user_id: Uuid, sale_id: Uuid) -> Result<Sale, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["complete_sale"])
            .start_timer();

        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to begin transaction: {}", e))
        })?;

        let sale = sqlx::query_as::<_, Sale>(&format!(
            r#"
            UPDATE sales
            SET payment_status = $3, updated_at = NOW()
            WHERE user_id = $1 AND id = $2
            RETURNING {SALE_COLUMNS}
            "#,
        ))
        .bind(user_id)
        .bind(sale_id)
        .bind(PaymentStatus::Paid.as_str())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to complete sale: {}", e)))?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Sale {} not found", sale_id)))?;

        let removed = sqlx::query(
            "DELETE FROM accounts_receivable WHERE user_id = $1 AND sale_id = $2",
        )
        .bind(user_id)
        .bind(sale_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to remove receivables: {}", e))
        })?;

        tx.commit().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to commit transaction: {}", e))
        })?;

        timer.observe_duration();

        SALES_TOTAL.with_label_values(&["paid"]).inc();

        info!(
            sale_id = %sale_id,
            receivables_removed = removed.rows_affected(),
            "Sale completed"
        );

        Ok(sale)
    }

    /// Delete a sale; items and linked receivables cascade.
    #[instrument(skip(self), fields(user_id = %user_id, sale_id = %sale_id))]
    pub async fn delete_sale(&self, user_id: Uuid, sale_id: Uuid) -> Result<(), AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["delete_sale"])
            .start_timer();

        let result = sqlx::query("DELETE FROM sales WHERE user_id = $1 AND id = $2")
            .bind(user_id)
            .bind(sale_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to delete sale: {}", e)))?;

        timer.observe_duration();

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(anyhow::anyhow!("Sale {} not found", sale_id)));
        }

        info!(sale_id = %sale_id, "Sale deleted");

        Ok(())
    }

    async fn require_customer(&self, user_id: Uuid, customer_id: Uuid) -> Result<(), AppError> {
        self.get_customer(user_id, customer_id)
            .await?
            .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("Cliente é obrigatório")))?;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Receivable Operations
    // -------------------------------------------------------------------------

    /// Create a standalone receivable.
    #[instrument(skip(self, input), fields(user_id = %user_id))]
    pub async fn create_receivable(
        &self,
        user_id: Uuid,
        input: &CreateReceivable,
    ) -> Result<Receivable, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_receivable"])
            .start_timer();

        let receivable = sqlx::query_as::<_, Receivable>(
            r#"
            INSERT INTO accounts_receivable (id, user_id, customer_id, sale_id, amount, due_date, status, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, user_id, customer_id, sale_id, amount, due_date, paid_date, status, notes, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(input.customer_id)
        .bind(input.sale_id)
        .bind(input.amount)
        .bind(input.due_date)
        .bind("pending")
        .bind(&input.notes)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to create receivable: {}", e))
        })?;

        timer.observe_duration();

        info!(receivable_id = %receivable.id, amount = %receivable.amount, "Receivable created");

        Ok(receivable)
    }

    /// List receivables for a user, soonest due first.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn list_receivables(&self, user_id: Uuid) -> Result<Vec<Receivable>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_receivables"])
            .start_timer();

        let receivables = sqlx::query_as::<_, Receivable>(
            r#"
            SELECT id, user_id, customer_id, sale_id, amount, due_date, paid_date, status, notes, created_at, updated_at
            FROM accounts_receivable
            WHERE user_id = $1
            ORDER BY due_date, created_at
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to list receivables: {}", e))
        })?;

        timer.observe_duration();

        Ok(receivables)
    }

    /// Overwrite a receivable's editable fields; settlement state is
    /// untouched.
    #[instrument(skip(self, input), fields(user_id = %user_id, receivable_id = %receivable_id))]
    pub async fn update_receivable(
        &self,
        user_id: Uuid,
        receivable_id: Uuid,
        input: &CreateReceivable,
    ) -> Result<Receivable, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["update_receivable"])
            .start_timer();

        let receivable = sqlx::query_as::<_, Receivable>(
            r#"
            UPDATE accounts_receivable
            SET customer_id = $3, sale_id = $4, amount = $5, due_date = $6, notes = $7,
                updated_at = NOW()
            WHERE user_id = $1 AND id = $2
            RETURNING id, user_id, customer_id, sale_id, amount, due_date, paid_date, status, notes, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(receivable_id)
        .bind(input.customer_id)
        .bind(input.sale_id)
        .bind(input.amount)
        .bind(input.due_date)
        .bind(&input.notes)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to update receivable: {}", e))
        })?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Receivable {} not found", receivable_id)))?;

        timer.observe_duration();

        Ok(receivable)
    }

    /// Mark a receivable as paid, stamping today as the payment date.
    #[instrument(skip(self), fields(user_id = %user_id, receivable_id = %receivable_id))]
    pub async fn mark_receivable_paid(
        &self,
        user_id: Uuid,
        receivable_id: Uuid,
    ) -> Result<Receivable, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["mark_receivable_paid"])
            .start_timer();

        let receivable = sqlx::query_as::<_, Receivable>(
            r#"
            UPDATE accounts_receivable
            SET status = 'paid', paid_date = CURRENT_DATE, updated_at = NOW()
            WHERE user_id = $1 AND id = $2
            RETURNING id, user_id, customer_id, sale_id, amount, due_date, paid_date, status, notes, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(receivable_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to mark receivable paid: {}", e))
        })?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Receivable {} not found", receivable_id)))?;

        timer.observe_duration();

        info!(receivable_id = %receivable_id, "Receivable settled");

        Ok(receivable)
    }

    /// Delete a receivable.
    #[instrument(skip(self), fields(user_id = %user_id, receivable_id = %receivable_id))]
    pub async fn delete_receivable(
        &self,
        user_id: Uuid,
        receivable_id: Uuid,
    ) -> Result<(), AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["delete_receivable"])
            .start_timer();

        let result = sqlx::query("DELETE FROM accounts_receivable WHERE user_id = $1 AND id = $2")
            .bind(user_id)
            .bind(receivable_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to delete receivable: {}", e))
            })?;

        timer.observe_duration();

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(anyhow::anyhow!(
                "Receivable {} not found",
                receivable_id
            )));
        }

        Ok(())
    }

    // -------------------------------------------------------------------------
    // Payable Operations
    // -------------------------------------------------------------------------

    /// Create a payable.
    #[instrument(skip(self, input), fields(user_id = %user_id))]
    pub async fn create_payable(
        &self,
        user_id: Uuid,
        input: &CreatePayable,
    ) -> Result<Payable, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_payable"])
            .start_timer();

        let payable = sqlx::query_as::<_, Payable>(
            r#"
            INSERT INTO accounts_payable (id, user_id, supplier_name, amount, due_date, category, status, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, user_id, supplier_name, amount, due_date, paid_date, category, status, notes, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(&input.supplier_name)
        .bind(input.amount)
        .bind(input.due_date)
        .bind(&input.category)
        .bind("pending")
        .bind(&input.notes)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to create payable: {}", e)))?;

        timer.observe_duration();

        info!(payable_id = %payable.id, amount = %payable.amount, "Payable created");

        Ok(payable)
    }

    /// List payables for a user, soonest due first.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn list_payables(&self, user_id: Uuid) -> Result<Vec<Payable>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_payables"])
            .start_timer();

        let payables = sqlx::query_as::<_, Payable>(
            r#"
            SELECT id, user_id, supplier_name, amount, due_date, paid_date, category, status, notes, created_at, updated_at
            FROM accounts_payable
            WHERE user_id = $1
            ORDER BY due_date, created_at
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list payables: {}", e)))?;

        timer.observe_duration();

        Ok(payables)
    }

    /// Overwrite a payable's editable fields; settlement state is untouched.
    #[instrument(skip(self, input), fields(user_id = %user_id, payable_id = %payable_id))]
    pub async fn update_payable(
        &self,
        user_id: Uuid,
        payable_id: Uuid,
        input: &CreatePayable,
    ) -> Result<Payable, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["update_payable"])
            .start_timer();

        let payable = sqlx::query_as::<_, Payable>(
            r#"
            UPDATE accounts_payable
            SET supplier_name = $3, amount = $4, due_date = $5, category = $6, notes = $7,
                updated_at = NOW()
            WHERE user_id = $1 AND id = $2
            RETURNING id, user_id, supplier_name, amount, due_date, paid_date, category, status, notes, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(payable_id)
        .bind(&input.supplier_name)
        .bind(input.amount)
        .bind(input.due_date)
        .bind(&input.category)
        .bind(&input.notes)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to update payable: {}", e))
        })?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Payable {} not found", payable_id)))?;

        timer.observe_duration();

        Ok(payable)
    }

    /// Mark a payable as paid, stamping today as the payment date.
    #[instrument(skip(self), fields(user_id = %user_id, payable_id = %payable_id))]
    pub async fn mark_payable_paid(
        &self,
        user_id: Uuid,
        payable_id: Uuid,
    ) -> Result<Payable, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["mark_payable_paid"])
            .start_timer();

        let payable = sqlx::query_as::<_, Payable>(
            r#"
            UPDATE accounts_payable
            SET status = 'paid', paid_date = CURRENT_DATE, updated_at = NOW()
            WHERE user_id = $1 AND id = $2
            RETURNING id, user_id, supplier_name, amount, due_date, paid_date, category, status, notes, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(payable_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to mark payable paid: {}", e))
        })?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Payable {} not found", payable_id)))?;

        timer.observe_duration();

        info!(payable_id = %payable_id, "Payable settled");

        Ok(payable)
    }

    /// Delete a payable.
    #[instrument(skip(self), fields(user_id = %user_id, payable_id = %payable_id))]
    pub async fn delete_payable(&self, user_id: Uuid, payable_id: Uuid) -> Result<(), AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["delete_payable"])
            .start_timer();

        let result = sqlx::query("DELETE FROM accounts_payable WHERE user_id = $1 AND id = $2")
            .bind(user_id)
            .bind(payable_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to delete payable: {}", e))
            })?;

        timer.observe_duration();

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(anyhow::anyhow!(
                "Payable {} not found",
                payable_id
            )));
        }

        Ok(())
    }

    // -------------------------------------------------------------------------
    // Transaction Operations
    // -------------------------------------------------------------------------

    /// Record a manual income or expense entry.
    #[instrument(skip(self, input), fields(user_id = %user_id))]
    pub async fn create_transaction(
        &self,
        user_id: Uuid,
        input: &CreateTransaction,
    ) -> Result<Transaction, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_transaction"])
            .start_timer();

        let transaction_date = input
            .transaction_date
            .unwrap_or_else(|| chrono::Utc::now().date_naive());

        let transaction = sqlx::query_as::<_, Transaction>(
            r#"
            INSERT INTO transactions (id, user_id, type, amount, description, category, transaction_date, sale_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, user_id, type, amount, description, category, transaction_date, sale_id, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(input.transaction_type.as_str())
        .bind(input.amount)
        .bind(&input.description)
        .bind(&input.category)
        .bind(transaction_date)
        .bind(input.sale_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to create transaction: {}", e))
        })?;

        timer.observe_duration();

        info!(
            transaction_id = %transaction.id,
            transaction_type = %transaction.transaction_type,
            amount = %transaction.amount,
            "Transaction recorded"
        );

        Ok(transaction)
    }

    /// List transactions for a user, newest first.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn list_transactions(&self, user_id: Uuid) -> Result<Vec<Transaction>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_transactions"])
            .start_timer();

        let transactions = sqlx::query_as::<_, Transaction>(
            r#"
            SELECT id, user_id, type, amount, description, category, transaction_date, sale_id, created_at
            FROM transactions
            WHERE user_id = $1
            ORDER BY transaction_date DESC, created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to list transactions: {}", e))
        })?;

        timer.observe_duration();

        Ok(transactions)
    }

    /// Delete a transaction.
    #[instrument(skip(self), fields(user_id = %user_id, transaction_id = %transaction_id))]
    pub async fn delete_transaction(
        &self,
        user_id: Uuid,
        transaction_id: Uuid,
    ) -> Result<(), AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["delete_transaction"])
            .start_timer();

        let result = sqlx::query("DELETE FROM transactions WHERE user_id = $1 AND id = $2")
            .bind(user_id)
            .bind(transaction_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to delete transaction: {}", e))
            })?;

        timer.observe_duration();

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(anyhow::anyhow!(
                "Transaction {} not found",
                transaction_id
            )));
        }

        Ok(())
    }

    // -------------------------------------------------------------------------
    // Store Settings Operations
    // -------------------------------------------------------------------------

    /// Get the company profile for a user, if one has been saved.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn get_store_settings(
        &self,
        user_id: Uuid,
    ) -> Result<Option<StoreSettings>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_store_settings"])
            .start_timer();

        let settings = sqlx::query_as::<_, StoreSettings>(
            r#"
            SELECT id, user_id, company_name, cnpj, address, phone, email, logo_url, created_at, updated_at
            FROM store_settings
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get settings: {}", e)))?;

        timer.observe_duration();

        Ok(settings)
    }

    /// Create or replace the company profile for a user.
    #[instrument(skip(self, input), fields(user_id = %user_id))]
    pub async fn upsert_store_settings(
        &self,
        user_id: Uuid,
        input: &UpsertStoreSettings,
    ) -> Result<StoreSettings, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["upsert_store_settings"])
            .start_timer();

        let settings = sqlx::query_as::<_, StoreSettings>(
            r#"
            INSERT INTO store_settings (id, user_id, company_name, cnpj, address, phone, email, logo_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (user_id) DO UPDATE
            SET company_name = EXCLUDED.company_name,
                cnpj = EXCLUDED.cnpj,
                address = EXCLUDED.address,
                phone = EXCLUDED.phone,
                email = EXCLUDED.email,
                logo_url = EXCLUDED.logo_url,
                updated_at = NOW()
            RETURNING id, user_id, company_name, cnpj, address, phone, email, logo_url, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(&input.company_name)
        .bind(&input.cnpj)
        .bind(&input.address)
        .bind(&input.phone)
        .bind(&input.email)
        .bind(&input.logo_url)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to save settings: {}", e)))?;

        timer.observe_duration();

        info!(settings_id = %settings.id, "Store settings saved");

        Ok(settings)
    }

    // -------------------------------------------------------------------------
    // Dashboard
    // -------------------------------------------------------------------------

    /// Aggregate counters and financial figures for the dashboard.
    ///
    /// Revenue is settled receivables plus settled sales; a completed sale
    /// never overlaps with a receivable because completion removes them.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn get_dashboard_stats(&self, user_id: Uuid) -> Result<DashboardStats, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_dashboard_stats"])
            .start_timer();

        let (total_customers, total_products, pending_quotes, total_sales) =
            sqlx::query_as::<_, (i64, i64, i64, i64)>(
                r#"
                SELECT
                    (SELECT COUNT(*) FROM customers WHERE user_id = $1),
                    (SELECT COUNT(*) FROM products WHERE user_id = $1),
                    (SELECT COUNT(*) FROM quotes WHERE user_id = $1 AND status = 'pending'),
                    (SELECT COUNT(*) FROM sales WHERE user_id = $1)
                "#,
            )
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to count dashboard rows: {}", e))
            })?;

        let (received, paid_sales, expenses) = sqlx::query_as::<_, (Decimal, Decimal, Decimal)>(
            r#"
            SELECT
                (SELECT COALESCE(SUM(amount), 0) FROM accounts_receivable WHERE user_id = $1 AND status = 'paid'),
                (SELECT COALESCE(SUM(total_amount), 0) FROM sales WHERE user_id = $1 AND payment_status = 'paid'),
                (SELECT COALESCE(SUM(amount), 0) FROM accounts_payable WHERE user_id = $1 AND status = 'paid')
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to sum dashboard figures: {}", e))
        })?;

        timer.observe_duration();

        let revenue = received + paid_sales;

        Ok(DashboardStats {
            total_customers,
            total_products,
            pending_quotes,
            total_sales,
            summary: FinancialSummary {
                revenue,
                expenses,
                balance: revenue - expenses,
            },
        })
    }
}
