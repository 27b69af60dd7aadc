mod common;

use anyhow::Result;
use common::{SampleMonth, memory_service, parse_date, zero_seed_service};
use pennywise::application::AppError;
use pennywise::domain::{Balance, Transaction, TransactionType, find_category, parse_cents};

#[tokio::test]
async fn test_initialize_add_delete_scenario() -> Result<()> {
    let service = memory_service();

    service.initialize().await?;
    assert_eq!(
        service.balance().await,
        Balance {
            income: 1_084_000,
            expense: 188_400,
            total: 254_800,
        }
    );

    service
        .add(Transaction::expense("Dinner", 10_000).with_id("t1"))
        .await?;
    assert_eq!(
        service.balance().await,
        Balance {
            income: 1_084_000,
            expense: 198_400,
            total: 244_800,
        }
    );
    let ids: Vec<String> = service.list().await.into_iter().map(|t| t.id).collect();
    assert_eq!(ids, vec!["t1"]);

    service.delete("t1").await?;
    assert_eq!(service.balance().await, Balance::DEMO_SEED);
    assert!(service.list().await.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_total_tracks_income_minus_expense() -> Result<()> {
    let service = zero_seed_service();
    service.initialize().await?;

    for txn in SampleMonth::transactions() {
        service.add(txn).await?;
        let balance = service.balance().await;
        assert_eq!(balance.total, balance.income - balance.expense);
    }

    let balance = service.balance().await;
    assert_eq!(balance.income, 480_000);
    assert_eq!(balance.expense, 168_350);
    Ok(())
}

#[tokio::test]
async fn test_seed_offset_is_preserved() -> Result<()> {
    let service = memory_service();
    service.initialize().await?;
    let drift = service.balance().await.drift();

    SampleMonth::record(&service).await?;
    service.delete("rent").await?;

    assert_eq!(service.balance().await.drift(), drift);
    assert!(service.check_integrity().await?.is_healthy());
    Ok(())
}

#[tokio::test]
async fn test_add_then_delete_restores_state() -> Result<()> {
    let service = memory_service();
    service.initialize().await?;
    SampleMonth::record(&service).await?;

    let list_before = service.list().await;
    let balance_before = service.balance().await;

    for kind in [TransactionType::Income, TransactionType::Expense] {
        let txn = Transaction::new("Temporary", 12_345, kind).with_id("temp");
        service.add(txn).await?;
        service.delete("temp").await?;

        assert_eq!(service.list().await, list_before);
        assert_eq!(service.balance().await, balance_before);
    }
    Ok(())
}

#[tokio::test]
async fn test_new_transactions_are_prepended() -> Result<()> {
    let service = memory_service();
    SampleMonth::record(&service).await?;

    let ids: Vec<String> = service.list().await.into_iter().map(|t| t.id).collect();
    assert_eq!(ids, vec!["train", "freelance", "groceries", "rent", "salary"]);
    Ok(())
}

#[tokio::test]
async fn test_update_without_amount_or_type_keeps_balance() -> Result<()> {
    let service = memory_service();
    service.initialize().await?;
    SampleMonth::record(&service).await?;
    let before = service.balance().await;

    let mut groceries = service.get("groceries").await?;
    groceries.title = "Weekly groceries".to_string();
    groceries.date = parse_date("2024-03-06");
    groceries.category = find_category("shopping");
    service.update(groceries).await?;

    assert_eq!(service.balance().await, before);
    let stored = service.get("groceries").await?;
    assert_eq!(stored.title, "Weekly groceries");
    assert_eq!(stored.category.map(|c| c.name), Some("Shopping".to_string()));
    Ok(())
}

#[tokio::test]
async fn test_update_expense_to_income_shifts_total_by_twice_amount() -> Result<()> {
    let service = memory_service();
    service.initialize().await?;
    SampleMonth::record(&service).await?;
    let before = service.balance().await;

    let mut train = service.get("train").await?;
    let amount = train.amount;
    train.kind = TransactionType::Income;
    train.category = None;
    service.update(train).await?;

    let after = service.balance().await;
    assert_eq!(after.expense, before.expense - amount);
    assert_eq!(after.income, before.income + amount);
    assert_eq!(after.total, before.total + 2 * amount);
    Ok(())
}

#[tokio::test]
async fn test_update_amount_and_type_together() -> Result<()> {
    let service = zero_seed_service();
    service
        .add(Transaction::income("Refund", 3_000).with_id("r"))
        .await?;

    let mut refund = service.get("r").await?;
    refund.kind = TransactionType::Expense;
    refund.amount = 1_000;
    service.update(refund).await?;

    let balance = service.balance().await;
    assert_eq!(balance.income, 0);
    assert_eq!(balance.expense, 1_000);
    assert_eq!(balance.total, -1_000);
    Ok(())
}

#[tokio::test]
async fn test_update_keeps_position() -> Result<()> {
    let service = memory_service();
    SampleMonth::record(&service).await?;
    let order_before: Vec<String> = service.list().await.into_iter().map(|t| t.id).collect();

    let mut rent = service.get("rent").await?;
    rent.amount = 155_000;
    service.update(rent).await?;

    let order_after: Vec<String> = service.list().await.into_iter().map(|t| t.id).collect();
    assert_eq!(order_after, order_before);
    Ok(())
}

#[tokio::test]
async fn test_delete_unknown_id_leaves_state_unchanged() -> Result<()> {
    let service = memory_service();
    service.initialize().await?;
    SampleMonth::record(&service).await?;
    let list_before = service.list().await;
    let balance_before = service.balance().await;

    let err = service.delete("nope").await.unwrap_err();
    assert!(matches!(err, AppError::TransactionNotFound(ref id) if id == "nope"));

    assert_eq!(service.list().await, list_before);
    assert_eq!(service.balance().await, balance_before);
    Ok(())
}

#[tokio::test]
async fn test_update_unknown_id_fails() -> Result<()> {
    let service = memory_service();
    SampleMonth::record(&service).await?;

    let ghost = Transaction::income("Ghost", 1).with_id("ghost");
    assert!(service.update(ghost).await.unwrap_err().is_not_found());
    assert_eq!(service.list().await.len(), 5);
    Ok(())
}

#[tokio::test]
async fn test_recent_returns_prefix_of_list() -> Result<()> {
    let service = memory_service();
    SampleMonth::record(&service).await?;
    let all = service.list().await;

    for n in [0, 1, 3, 5, 10] {
        let recent = service.recent(n).await;
        assert_eq!(recent.len(), n.min(all.len()));
        assert_eq!(recent.as_slice(), &all[..recent.len()]);
    }

    assert_eq!(service.recent_default().await, all);
    Ok(())
}

#[tokio::test]
async fn test_reset_returns_to_seed() -> Result<()> {
    let service = memory_service();
    service.initialize().await?;
    SampleMonth::record(&service).await?;

    service.reset().await?;

    assert!(service.list().await.is_empty());
    assert_eq!(service.balance().await, Balance::DEMO_SEED);
    assert!(service.store().has("balance").await);
    assert!(!service.store().has("transactions").await);
    Ok(())
}

#[tokio::test]
async fn test_reports_follow_transaction_list() -> Result<()> {
    let service = memory_service();
    service.initialize().await?;
    SampleMonth::record(&service).await?;

    let summary = service.income_expense_summary().await;
    assert_eq!(summary.income, 480_000);
    assert_eq!(summary.expense, 168_350);
    assert_eq!(summary.net, 311_650);
    assert_eq!(summary.transaction_count, 5);

    let breakdown = service.category_breakdown().await;
    let names: Vec<&str> = breakdown
        .categories
        .iter()
        .map(|c| c.category.as_str())
        .collect();
    assert_eq!(names, vec!["Bills", "Transportation", "Food"]);
    assert_eq!(breakdown.total, 168_350);
    Ok(())
}

#[tokio::test]
async fn test_failed_write_leaves_both_records_untouched() -> Result<()> {
    let service = memory_service();
    service.initialize().await?;
    SampleMonth::record(&service).await?;
    let list_before = service.list().await;
    let balance_before = service.balance().await;

    service.store().backend().fail_writes(true);
    let result = service.add(Transaction::expense("Coffee", 450)).await;
    assert!(matches!(result, Err(AppError::Storage(_))));
    assert!(matches!(service.delete("rent").await, Err(AppError::Storage(_))));
    service.store().backend().fail_writes(false);

    assert_eq!(service.list().await, list_before);
    assert_eq!(service.balance().await, balance_before);
    Ok(())
}

#[tokio::test]
async fn test_corrupt_balance_surfaces_on_mutation() -> Result<()> {
    let service = memory_service();
    service
        .store()
        .backend()
        .insert_raw("balance", "\"not a balance\"")
        .await;

    // Reads degrade to the seed, writes refuse to build on bad data
    assert_eq!(service.balance().await, Balance::DEMO_SEED);
    assert!(matches!(
        service.add(Transaction::income("Salary", 1)).await,
        Err(AppError::Storage(_))
    ));
    assert!(matches!(service.initialize().await, Err(AppError::Storage(_))));
    Ok(())
}

#[tokio::test]
async fn test_parsed_amounts_that_overflow_the_balance_are_refused() -> Result<()> {
    let service = zero_seed_service();
    service.initialize().await?;
    let amount = parse_cents("50000000000000000")?;

    service.add(Transaction::income("Lottery", amount)).await?;
    let balance_before = service.balance().await;

    let err = service
        .add(Transaction::income("Lottery again", amount))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::AmountOverflow(_)));

    assert_eq!(service.list().await.len(), 1);
    assert_eq!(service.balance().await, balance_before);
    assert!(service.check_integrity().await?.is_healthy());
    Ok(())
}
