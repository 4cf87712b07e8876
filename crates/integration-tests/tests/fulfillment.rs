//! End-to-end fulfillment flow: warm the cache from the store, place
//! orders, browse, plan a delivery run, and walk the status lifecycle.

use std::sync::Arc;

use robocart_core::{
    ListQuery, OrderSortField, Product, ProductId, ProductSortField, ShippedStatus, SortOrder,
    UserId,
};
use robocart_engine::services::{CatalogService, DeliveryService, OrderService};
use robocart_engine::{CacheIndex, CancelToken, EngineConfig};
use robocart_integration_tests::{MemoryStore, init_tracing};

fn product(id: i32, name: &str, value: u64, weight: u32) -> Product {
    Product {
        id: ProductId::new(id),
        name: name.to_string(),
        description: format!("a {name} for the back office"),
        value,
        weight,
        image: format!("{name}.png"),
    }
}

fn catalog() -> Vec<Product> {
    vec![
        product(1, "anvil", 10, 5),
        product(2, "kettle", 40, 4),
        product(3, "lamp", 30, 6),
        product(4, "mug", 50, 3),
    ]
}

async fn warm(store: &MemoryStore) -> Arc<CacheIndex> {
    Arc::new(CacheIndex::warm(store).await.expect("warm"))
}

#[tokio::test]
async fn test_full_fulfillment_cycle() {
    init_tracing();
    let store = Arc::new(MemoryStore::with_products(catalog()));
    let cache = warm(store.as_ref()).await;
    let config = EngineConfig::default();

    let catalog_svc = CatalogService::new(Arc::clone(&cache), Arc::clone(&store));
    let order_svc = OrderService::new(Arc::clone(&cache));
    let delivery_svc = DeliveryService::new(Arc::clone(&cache), Arc::clone(&store), &config);

    // Place one order per catalog product.
    let user = UserId::new(7);
    let items: Vec<(ProductId, u32)> = (1..=4).map(|id| (ProductId::new(id), 1)).collect();
    let ids = catalog_svc.create_orders(user, &items).await.expect("create");
    assert_eq!(ids.len(), 4);

    // Browse the catalog by value, descending.
    let query = ListQuery {
        sort: ProductSortField::Value,
        order: SortOrder::Desc,
        limit: 2,
        ..ListQuery::default()
    };
    let (page, total) = catalog_svc.list_products(&query);
    assert_eq!(total, 4);
    let names: Vec<&str> = page.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["mug", "kettle"]);

    // The user's history shows all four orders, joined with names.
    let (history, total) = order_svc
        .list_orders(user, &ListQuery::default())
        .expect("list");
    assert_eq!(total, 4);
    assert!(history.iter().all(|o| o.status == ShippedStatus::Shipping));
    assert_eq!(history[0].product_name, "anvil");

    // At capacity 10 over weights 5/4/6/3 the best load is kettle + mug.
    let plan = delivery_svc
        .generate_plan("robot-1", 10)
        .await
        .expect("plan");
    assert_eq!(plan.total_value, 90);
    assert_eq!(plan.total_weight, 7);

    // The claim is visible in the cache and durable in the store.
    assert_eq!(
        delivery_svc.pending_count(&CancelToken::never()).expect("count"),
        2
    );
    let delivering: Vec<_> = store
        .orders()
        .into_iter()
        .filter(|o| o.status == ShippedStatus::Delivering)
        .collect();
    assert_eq!(delivering.len(), 2);

    // Complete one delivery; the store stamps the arrival time.
    let delivered_id = delivering[0].id;
    delivery_svc
        .update_order_status(delivered_id, ShippedStatus::Delivered, &CancelToken::never())
        .await
        .expect("deliver");
    let row = store
        .orders()
        .into_iter()
        .find(|o| o.id == delivered_id)
        .expect("row");
    assert_eq!(row.status, ShippedStatus::Delivered);
    assert!(row.arrived_at.is_some());

    // The history reflects every transition.
    let (history, _) = order_svc
        .list_orders(user, &ListQuery::default())
        .expect("list");
    let delivered = history.iter().filter(|o| o.status == ShippedStatus::Delivered);
    assert_eq!(delivered.count(), 1);
}

#[tokio::test]
async fn test_rewarm_reproduces_live_state() {
    let store = Arc::new(MemoryStore::with_products(catalog()));
    let cache = warm(store.as_ref()).await;
    let config = EngineConfig::default();

    let catalog_svc = CatalogService::new(Arc::clone(&cache), Arc::clone(&store));
    let delivery_svc = DeliveryService::new(Arc::clone(&cache), Arc::clone(&store), &config);

    let user = UserId::new(1);
    catalog_svc
        .create_orders(user, &[(ProductId::new(2), 3), (ProductId::new(4), 1)])
        .await
        .expect("create");
    delivery_svc
        .generate_plan("robot-1", 7)
        .await
        .expect("plan");

    // A cold start from the store must land on the same state the live
    // cache is in. Timestamps are compared by shape only: the live cache
    // stamps placement time itself, a few microseconds apart from the
    // store's stamp.
    let rewarmed = warm(store.as_ref()).await;
    assert_eq!(
        rewarmed.pending_count().expect("count"),
        cache.pending_count().expect("count")
    );
    let shape = |cache: &CacheIndex| {
        cache
            .user_history(user)
            .expect("history")
            .into_iter()
            .map(|o| (o.id, o.product_id, o.status))
            .collect::<Vec<_>>()
    };
    assert_eq!(shape(&rewarmed), shape(&cache));
}

#[tokio::test]
async fn test_order_history_search_after_placement() {
    let store = Arc::new(MemoryStore::with_products(catalog()));
    let cache = warm(store.as_ref()).await;

    let catalog_svc = CatalogService::new(Arc::clone(&cache), Arc::clone(&store));
    let order_svc = OrderService::new(Arc::clone(&cache));

    let user = UserId::new(3);
    catalog_svc
        .create_orders(user, &[(ProductId::new(2), 2), (ProductId::new(3), 1)])
        .await
        .expect("create");

    let query = ListQuery {
        search: "kettle".to_string(),
        sort: OrderSortField::Id,
        limit: 10,
        ..ListQuery::default()
    };
    let (page, total) = order_svc.list_orders(user, &query).expect("list");
    assert_eq!(total, 2);
    assert!(page.iter().all(|o| o.product_name == "kettle"));
}
