//! PostgreSQL integration tests
//!
//! These tests use a shared PostgreSQL container for efficiency.
//! Run with:
//!
//! ```bash
//! cargo test -p postgres-store --test postgres_integration -- --test-threads=1
//! ```

use std::sync::Arc;

use chrono::Utc;
use common::{CategoryId, ProductId, UserId};
use domain::{
    Billing, BillingType, Cart, CartStore, CatalogStore, Category, InvoiceNumber, LineItem,
    Money, Order, OrderStore, Payment, PaymentMethod, PaymentStatus, Product, StoreError,
};
use postgres_store::PostgresStore;
use sqlx::PgPool;
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

/// Shared container info - container stays alive for all tests
struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Postgres>,
    connection_string: String,
}

/// Global shared container
static CONTAINER: OnceCell<Arc<ContainerInfo>> = OnceCell::const_new();

async fn get_container_info() -> Arc<ContainerInfo> {
    CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default().start().await.unwrap();

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();

            let connection_string =
                format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

            // Create a temporary pool just for the schema
            let temp_pool = PgPool::connect(&connection_string).await.unwrap();

            sqlx::raw_sql(include_str!("../../../migrations/001_create_store.sql"))
                .execute(&temp_pool)
                .await
                .unwrap();

            temp_pool.close().await;

            Arc::new(ContainerInfo {
                container,
                connection_string,
            })
        })
        .await
        .clone()
}

/// Get a fresh store with its own pool and cleared tables
async fn get_test_store() -> PostgresStore {
    let info = get_container_info().await;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&info.connection_string)
        .await
        .unwrap();

    sqlx::query("TRUNCATE TABLE orders, order_license_keys, carts, products, categories, invoice_sequence")
        .execute(&pool)
        .await
        .unwrap();

    PostgresStore::new(pool)
}

fn sample_order(user: UserId, invoice: u64) -> Order {
    Order::place(
        user,
        vec![LineItem::new(
            ProductId::new(),
            "POS module",
            2,
            Money::from_minor(500000),
        )],
        Billing {
            kind: BillingType::Receipt,
            tax_id: "11.111.111-1".to_string(),
            name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            phone: None,
            address: "Calle Falsa 123".to_string(),
            city: "Santiago".to_string(),
            region: "RM".to_string(),
            business_name: None,
            business_tax_id: None,
            business_activity: None,
        },
        Payment {
            method: PaymentMethod::CreditCard,
            status: PaymentStatus::Pending,
            transaction_id: None,
            payment_date: None,
            card_last4: None,
        },
        None,
        InvoiceNumber::new(invoice),
        None,
        Utc::now(),
    )
}

mod orders {
    use super::*;

    #[tokio::test]
    #[serial_test::serial]
    async fn insert_and_find_roundtrip() {
        let store = get_test_store().await;
        let user = UserId::new();
        let order = sample_order(user, 1);

        store.insert_order(order.clone()).await.unwrap();

        let loaded = store.find_order(order.id, user).await.unwrap().unwrap();
        assert_eq!(loaded, order);
    }

    #[tokio::test]
    #[serial_test::serial]
    async fn find_is_scoped_to_owner() {
        let store = get_test_store().await;
        let order = sample_order(UserId::new(), 1);
        store.insert_order(order.clone()).await.unwrap();

        let other = store.find_order(order.id, UserId::new()).await.unwrap();
        assert!(other.is_none());
    }

    #[tokio::test]
    #[serial_test::serial]
    async fn duplicate_insert_is_rejected() {
        let store = get_test_store().await;
        let order = sample_order(UserId::new(), 1);
        store.insert_order(order.clone()).await.unwrap();

        let mut again = order;
        again.invoice_number = InvoiceNumber::new(2);
        let result = store.insert_order(again).await;
        assert!(matches!(result, Err(StoreError::Duplicate { .. })));
    }

    #[tokio::test]
    #[serial_test::serial]
    async fn update_bumps_version_and_detects_stale_writes() {
        let store = get_test_store().await;
        let user = UserId::new();
        let order = sample_order(user, 1);
        store.insert_order(order.clone()).await.unwrap();

        let mut current = order.clone();
        current.apply_payment_update(PaymentStatus::Completed, Some("TX-1".to_string()), Utc::now());
        let updated = store.update_order(current).await.unwrap();
        assert_eq!(updated.version, 2);
        assert_eq!(updated.licenses.len(), 2);

        // Stale writer still holds version 1.
        let result = store.update_order(order).await;
        assert!(matches!(result, Err(StoreError::VersionConflict { .. })));

        // The stored document reflects the winning write.
        let loaded = store.find_order(updated.id, user).await.unwrap().unwrap();
        assert_eq!(loaded.version, 2);
        assert_eq!(loaded.payment.status, PaymentStatus::Completed);
    }

    #[tokio::test]
    #[serial_test::serial]
    async fn updating_missing_order_is_not_found() {
        let store = get_test_store().await;
        let result = store.update_order(sample_order(UserId::new(), 9)).await;
        assert!(matches!(result, Err(StoreError::NotFound { .. })));
    }

    #[tokio::test]
    #[serial_test::serial]
    async fn list_orders_newest_first() {
        let store = get_test_store().await;
        let user = UserId::new();

        let mut older = sample_order(user, 1);
        older.created_at = Utc::now() - chrono::Duration::minutes(10);
        let newer = sample_order(user, 2);

        store.insert_order(older.clone()).await.unwrap();
        store.insert_order(newer.clone()).await.unwrap();

        let listed = store.list_orders_for_user(user).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, newer.id);
        assert_eq!(listed[1].id, older.id);

        assert_eq!(store.order_count().await.unwrap(), 2);
    }

    #[tokio::test]
    #[serial_test::serial]
    async fn list_all_orders_filters_by_status() {
        let store = get_test_store().await;
        store
            .insert_order(sample_order(UserId::new(), 1))
            .await
            .unwrap();

        let pending = store
            .list_all_orders(Some(domain::OrderStatus::Pending))
            .await
            .unwrap();
        assert_eq!(pending.len(), 1);

        let cancelled = store
            .list_all_orders(Some(domain::OrderStatus::Cancelled))
            .await
            .unwrap();
        assert!(cancelled.is_empty());
    }
}

mod invoice_sequence {
    use super::*;

    #[tokio::test]
    #[serial_test::serial]
    async fn counter_starts_at_one_and_is_monotonic() {
        let store = get_test_store().await;
        assert_eq!(store.next_invoice_number().await.unwrap(), 1);
        assert_eq!(store.next_invoice_number().await.unwrap(), 2);
        assert_eq!(store.next_invoice_number().await.unwrap(), 3);
    }

    #[tokio::test]
    #[serial_test::serial]
    async fn counter_is_unique_under_concurrent_callers() {
        let store = get_test_store().await;

        let mut handles = Vec::new();
        for _ in 0..20 {
            let store = store.clone();
            handles.push(tokio::spawn(
                async move { store.next_invoice_number().await },
            ));
        }

        let mut seen = std::collections::HashSet::new();
        for handle in handles {
            assert!(seen.insert(handle.await.unwrap().unwrap()));
        }
        assert_eq!(seen.len(), 20);
    }
}

mod carts {
    use super::*;

    #[tokio::test]
    #[serial_test::serial]
    async fn save_and_load_roundtrip() {
        let store = get_test_store().await;
        let user = UserId::new();

        let mut cart = Cart::new(user);
        cart.upsert_item(ProductId::new(), 1);
        cart.total = Money::from_minor(500000);
        store.save_cart(cart.clone()).await.unwrap();

        let loaded = store.load_cart(user).await.unwrap().unwrap();
        assert_eq!(loaded, cart);
    }

    #[tokio::test]
    #[serial_test::serial]
    async fn save_replaces_existing_cart() {
        let store = get_test_store().await;
        let user = UserId::new();

        let mut cart = Cart::new(user);
        cart.upsert_item(ProductId::new(), 1);
        store.save_cart(cart.clone()).await.unwrap();

        cart.clear();
        store.save_cart(cart).await.unwrap();

        let loaded = store.load_cart(user).await.unwrap().unwrap();
        assert!(loaded.is_empty());
    }

    #[tokio::test]
    #[serial_test::serial]
    async fn missing_cart_is_none() {
        let store = get_test_store().await;
        assert!(store.load_cart(UserId::new()).await.unwrap().is_none());
    }
}

mod catalog {
    use super::*;

    #[tokio::test]
    #[serial_test::serial]
    async fn product_roundtrip_and_active_filter() {
        let store = get_test_store().await;
        let category = CategoryId::new();

        let active = Product::new("Active", "d", Money::from_minor(100), category);
        let mut inactive = Product::new("Inactive", "d", Money::from_minor(200), category);
        inactive.is_active = false;

        store.insert_product(active.clone()).await.unwrap();
        store.insert_product(inactive).await.unwrap();

        let loaded = store.product(active.id).await.unwrap().unwrap();
        assert_eq!(loaded, active);

        assert_eq!(store.list_products(true).await.unwrap().len(), 1);
        assert_eq!(store.list_products(false).await.unwrap().len(), 2);
    }

    #[tokio::test]
    #[serial_test::serial]
    async fn categories_roundtrip() {
        let store = get_test_store().await;

        let category = Category::new("Retail", Some("Point-of-sale modules".to_string()));
        store.insert_category(category.clone()).await.unwrap();

        let loaded = store.category(category.id).await.unwrap().unwrap();
        assert_eq!(loaded, category);
        assert_eq!(store.list_categories().await.unwrap().len(), 1);
    }
}
