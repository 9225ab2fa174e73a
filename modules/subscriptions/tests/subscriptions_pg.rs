#![cfg(feature = "integration")]

mod common;
use anyhow::Result;
use std::sync::Arc;

use common::month;
use db::{ConnectOpts, DbHandle};
use subscriptions::contract::model::{NewSubscription, SubscriptionPatch, TotalFilter};
use subscriptions::domain::error::DomainError;
use subscriptions::domain::repo::SubscriptionsRepository;
use subscriptions::domain::service::{build_update, Service, ServiceConfig};
use subscriptions::infra::storage::PgSubscriptionsRepository;
use subscriptions::Subscriptions;
use uuid::Uuid;

#[tokio::test]
async fn subscriptions_work_with_postgres() -> Result<()> {
    let dut = common::bring_up_postgres().await?;

    let db = DbHandle::connect(&dut.url, ConnectOpts::default()).await?;
    Subscriptions::migrate(&db).await?;
    // Applying twice must be a no-op.
    Subscriptions::migrate(&db).await?;

    let repo = PgSubscriptionsRepository::new(db.pool().clone());
    test_repository_operations(&repo).await?;

    let service = Service::new(Arc::new(repo), ServiceConfig::default());
    test_service_operations(&service).await?;

    db.close().await;
    Ok(())
}

async fn test_repository_operations(repo: &PgSubscriptionsRepository) -> Result<()> {
    let user_id = Uuid::new_v4();
    let created = repo
        .create(NewSubscription {
            service_name: "Yandex Plus".to_string(),
            price: 400,
            user_id,
            start_date: month(1, 2025),
            end_date: Some(month(12, 2025)),
        })
        .await?;
    assert_eq!(created.service_name, "Yandex Plus");
    assert_eq!(created.end_date, Some(month(12, 2025)));

    let found = repo.find_by_id(created.id).await?.expect("row exists");
    assert_eq!(found, created);

    // Only the price changes; end_date stays.
    let stmt = build_update(&SubscriptionPatch {
        price: Some(500),
        ..SubscriptionPatch::new(created.id)
    })
    .expect("price is set");
    assert!(repo.update(stmt).await?);
    let after = repo.find_by_id(created.id).await?.expect("row exists");
    assert_eq!(after.price, 500);
    assert_eq!(after.end_date, Some(month(12, 2025)));
    assert!(after.updated_at >= created.updated_at);

    // Explicit clear of end_date.
    let stmt = build_update(&SubscriptionPatch {
        end_date: Some(None),
        ..SubscriptionPatch::new(created.id)
    })
    .expect("end_date is set");
    assert!(repo.update(stmt).await?);
    assert_eq!(repo.find_by_id(created.id).await?.expect("row").end_date, None);

    let missing = build_update(&SubscriptionPatch {
        price: Some(1),
        ..SubscriptionPatch::new(Uuid::new_v4())
    })
    .expect("price is set");
    assert!(!repo.update(missing).await?);

    let sum = repo
        .sum_price(&TotalFilter {
            start: month(1, 2025),
            end: month(12, 2025),
            user_id: Some(user_id),
            service_name: Some("Yandex Plus".to_string()),
        })
        .await?;
    assert_eq!(sum, 500);

    let none = repo
        .sum_price(&TotalFilter {
            start: month(1, 2030),
            end: month(12, 2030),
            user_id: None,
            service_name: None,
        })
        .await?;
    assert_eq!(none, 0);

    assert!(repo.delete(created.id).await?);
    assert!(!repo.delete(created.id).await?);
    assert!(repo.find_by_id(created.id).await?.is_none());
    Ok(())
}

async fn test_service_operations(service: &Service) -> Result<()> {
    let user_id = Uuid::new_v4();
    for (i, name) in ["Okko", "Kinopoisk", "Spotify"].into_iter().enumerate() {
        service
            .create_subscription(NewSubscription {
                service_name: name.to_string(),
                price: 100 * (i as i32 + 1),
                user_id,
                start_date: month(i as u32 + 1, 2025),
                end_date: None,
            })
            .await?;
    }

    let page = service.list_subscriptions(Some(0), Some(2)).await?;
    assert_eq!(page.total, 3);
    assert_eq!(page.items.len(), 2);
    // Newest first.
    assert_eq!(page.items[0].service_name, "Spotify");

    let total = service
        .total_price(TotalFilter {
            start: month(1, 2025),
            end: month(2, 2025),
            user_id: Some(user_id),
            service_name: None,
        })
        .await?;
    assert_eq!(total, 300);

    let id = page.items[0].id;
    let err = service
        .update_subscription(SubscriptionPatch::new(id))
        .await
        .unwrap_err();
    assert_eq!(err, DomainError::empty_update(id));

    let updated = service
        .update_subscription(SubscriptionPatch {
            service_name: Some("Spotify Family".to_string()),
            ..SubscriptionPatch::new(id)
        })
        .await?;
    assert_eq!(updated.service_name, "Spotify Family");
    Ok(())
}
