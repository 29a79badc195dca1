//! Integration tests for the cart store over HTTP and a storage file.
//!
//! These run the full stack: `CatalogClient` against the mock catalog,
//! `JsonCartStorage<FileStore>` in a temp dir, and a `ChannelNotifier`.

#![allow(clippy::unwrap_used)]

use std::path::Path;

use rocketshoes_cart::{
    CART_STORAGE_KEY, CartConfig, CartNotice, ChannelNotifier, FileCartStore, FileStore,
    KeyValueStore, UpdateProductAmount,
};
use rocketshoes_core::ProductId;
use rocketshoes_integration_tests::MockCatalog;
use tempfile::TempDir;
use tokio::sync::mpsc::UnboundedReceiver;

struct Harness {
    mock: MockCatalog,
    dir: TempDir,
}

impl Harness {
    async fn new() -> Self {
        Self {
            mock: MockCatalog::start().await,
            dir: TempDir::new().unwrap(),
        }
    }

    fn storage_path(&self) -> std::path::PathBuf {
        self.dir.path().join("storage.json")
    }

    fn config(&self) -> CartConfig {
        CartConfig {
            catalog: self.mock.config(),
            storage_path: self.storage_path(),
            sentry_dsn: None,
        }
    }

    fn open(&self) -> (FileCartStore<ChannelNotifier>, UnboundedReceiver<CartNotice>) {
        let (notifier, notices) = ChannelNotifier::new();
        (
            FileCartStore::from_config(&self.config(), notifier).unwrap(),
            notices,
        )
    }
}

fn drain(notices: &mut UnboundedReceiver<CartNotice>) -> Vec<CartNotice> {
    let mut out = Vec::new();
    while let Ok(notice) = notices.try_recv() {
        out.push(notice);
    }
    out
}

fn persisted(path: &Path) -> serde_json::Value {
    let raw = FileStore::new(path).get(CART_STORAGE_KEY).unwrap().unwrap();
    serde_json::from_str(&raw).unwrap()
}

fn update(id: i32, amount: i64) -> UpdateProductAmount {
    UpdateProductAmount {
        product_id: ProductId::new(id),
        amount,
    }
}

// =============================================================================
// Shopping flow
// =============================================================================

#[tokio::test]
async fn test_add_update_remove_round_trip() {
    let h = Harness::new().await;
    let (store, mut notices) = h.open();

    store.add_product(ProductId::new(1)).await;
    store.add_product(ProductId::new(1)).await;
    store.add_product(ProductId::new(2)).await;
    store.update_product_amount(update(2, 4)).await;
    store.remove_product(ProductId::new(1)).await;

    let cart = store.cart();
    assert_eq!(cart.len(), 1);
    assert_eq!(cart.amount_of(ProductId::new(2)), 4);
    assert_eq!(cart.subtotal().display(), "R$ 559,60");
    assert!(drain(&mut notices).is_empty());
}

#[tokio::test]
async fn test_snapshot_is_written_to_storage_file() {
    let h = Harness::new().await;
    let (store, _notices) = h.open();

    store.add_product(ProductId::new(3)).await;

    let snapshot = persisted(&h.storage_path());
    let items = snapshot.as_array().unwrap();
    assert_eq!(items.len(), 1);
    let item = items.first().unwrap();
    assert_eq!(item["id"], 3);
    assert_eq!(item["amount"], 1);
    assert_eq!(item["title"], "Tênis Adidas Duramo Lite 2.0");
    assert_eq!(item["price"], 219.9);
}

#[tokio::test]
async fn test_cart_survives_reopen() {
    let h = Harness::new().await;
    {
        let (store, _notices) = h.open();
        store.add_product(ProductId::new(2)).await;
        store.add_product(ProductId::new(2)).await;
        store.add_product(ProductId::new(6)).await;
    }

    let (store, _notices) = h.open();
    let cart = store.cart();
    assert_eq!(cart.amount_of(ProductId::new(2)), 2);
    assert_eq!(cart.amount_of(ProductId::new(6)), 1);
    let order: Vec<i32> = cart.iter().map(|item| item.id.as_i32()).collect();
    assert_eq!(order, vec![2, 6]);
}

#[tokio::test]
async fn test_reload_picks_up_other_handle() {
    let h = Harness::new().await;
    let (first, _n1) = h.open();
    let (second, _n2) = h.open();

    first.add_product(ProductId::new(5)).await;
    assert!(second.cart().is_empty());

    second.reload().await.unwrap();
    assert_eq!(second.cart().amount_of(ProductId::new(5)), 1);
}

// =============================================================================
// Stock validation
// =============================================================================

#[tokio::test]
async fn test_add_beyond_stock_is_rejected() {
    let h = Harness::new().await;
    let (store, mut notices) = h.open();

    // Product 4 has one unit in stock
    store.add_product(ProductId::new(4)).await;
    store.add_product(ProductId::new(4)).await;

    assert_eq!(store.cart().amount_of(ProductId::new(4)), 1);
    assert_eq!(drain(&mut notices), vec![CartNotice::StockExceeded]);
    assert_eq!(persisted(&h.storage_path())[0]["amount"], 1);
}

#[tokio::test]
async fn test_update_beyond_stock_is_rejected() {
    let h = Harness::new().await;
    let (store, mut notices) = h.open();

    store.add_product(ProductId::new(3)).await;
    store.update_product_amount(update(3, 3)).await;

    assert_eq!(store.cart().amount_of(ProductId::new(3)), 1);
    assert_eq!(drain(&mut notices), vec![CartNotice::StockExceeded]);
}

#[tokio::test]
async fn test_restock_allows_more() {
    let h = Harness::new().await;
    let (store, mut notices) = h.open();

    store.add_product(ProductId::new(4)).await;
    h.mock.set_stock(4, 2);
    store.add_product(ProductId::new(4)).await;

    assert_eq!(store.cart().amount_of(ProductId::new(4)), 2);
    assert!(drain(&mut notices).is_empty());
}

#[tokio::test]
async fn test_non_positive_update_makes_no_requests() {
    let h = Harness::new().await;
    let (store, mut notices) = h.open();

    store.add_product(ProductId::new(1)).await;
    let hits = h.mock.stock_hits();
    store.update_product_amount(update(1, 0)).await;
    store.update_product_amount(update(1, -2)).await;

    assert_eq!(h.mock.stock_hits(), hits);
    assert_eq!(store.cart().amount_of(ProductId::new(1)), 1);
    assert!(drain(&mut notices).is_empty());
}

// =============================================================================
// Failures
// =============================================================================

#[tokio::test]
async fn test_unknown_product_notifies_add_failed() {
    let h = Harness::new().await;
    let (store, mut notices) = h.open();

    store.add_product(ProductId::new(42)).await;

    assert!(store.cart().is_empty());
    assert_eq!(drain(&mut notices), vec![CartNotice::AddFailed]);
    assert!(!h.storage_path().exists());
}

#[tokio::test]
async fn test_catalog_outage_leaves_cart_unchanged() {
    let h = Harness::new().await;
    let (store, mut notices) = h.open();

    store.add_product(ProductId::new(1)).await;
    h.mock.set_failing(true);
    store.add_product(ProductId::new(1)).await;
    store.update_product_amount(update(1, 2)).await;

    assert_eq!(store.cart().amount_of(ProductId::new(1)), 1);
    assert_eq!(
        drain(&mut notices),
        vec![CartNotice::AddFailed, CartNotice::UpdateFailed]
    );
}

#[tokio::test]
async fn test_malformed_stock_notifies() {
    let h = Harness::new().await;
    h.mock.break_product(2);
    let (store, mut notices) = h.open();

    store.add_product(ProductId::new(2)).await;

    assert!(store.cart().is_empty());
    assert_eq!(drain(&mut notices), vec![CartNotice::AddFailed]);
}

#[tokio::test]
async fn test_remove_missing_product_notifies() {
    let h = Harness::new().await;
    let (store, mut notices) = h.open();

    store.remove_product(ProductId::new(1)).await;
    store.update_product_amount(update(1, 1)).await;

    assert_eq!(
        drain(&mut notices),
        vec![CartNotice::RemoveFailed, CartNotice::UpdateFailed]
    );
}

#[tokio::test]
async fn test_corrupt_snapshot_starts_empty_and_recovers() {
    let h = Harness::new().await;
    FileStore::new(h.storage_path())
        .set(CART_STORAGE_KEY, "{ not a cart")
        .unwrap();

    let (store, mut notices) = h.open();
    assert!(store.cart().is_empty());

    store.add_product(ProductId::new(1)).await;
    assert!(drain(&mut notices).is_empty());
    assert_eq!(persisted(&h.storage_path())[0]["id"], 1);
}

#[tokio::test]
async fn test_unreadable_storage_file_is_replaced() {
    let h = Harness::new().await;
    std::fs::write(h.storage_path(), "garbage{").unwrap();

    let (store, mut notices) = h.open();
    assert!(store.cart().is_empty());

    for _ in 0..3 {
        store.add_product(ProductId::new(1)).await;
    }

    assert!(drain(&mut notices).is_empty());
    assert_eq!(store.cart().amount_of(ProductId::new(1)), 3);
    assert_eq!(persisted(&h.storage_path())[0]["amount"], 3);
    assert_eq!(
        std::fs::read_to_string(h.storage_path().with_extension("corrupt")).unwrap(),
        "garbage{"
    );

    let (reopened, _notices) = h.open();
    assert_eq!(reopened.cart(), store.cart());
}

#[tokio::test]
async fn test_clear_persists_empty_cart() {
    let h = Harness::new().await;
    let (store, _notices) = h.open();

    store.add_product(ProductId::new(1)).await;
    store.add_product(ProductId::new(2)).await;
    store.clear().await;

    assert!(store.cart().is_empty());
    assert_eq!(persisted(&h.storage_path()), serde_json::json!([]));
}

#[tokio::test]
async fn test_concurrent_adds_respect_stock() {
    let h = Harness::new().await;
    let (store, mut notices) = h.open();

    // Product 3 has two units in stock
    let tasks: Vec<_> = (0..4)
        .map(|_| {
            let store = store.clone();
            tokio::spawn(async move { store.add_product(ProductId::new(3)).await })
        })
        .collect();
    for task in tasks {
        task.await.unwrap();
    }

    assert_eq!(store.cart().amount_of(ProductId::new(3)), 2);
    assert_eq!(
        drain(&mut notices),
        vec![CartNotice::StockExceeded, CartNotice::StockExceeded]
    );
}
