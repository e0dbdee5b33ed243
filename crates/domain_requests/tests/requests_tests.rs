//! Tests for domain_requests
//!
//! Drives intake and the approval workflow against a real ledger and tier
//! engine: tier gating, failed orders leaving no trace, resolution races and
//! the full deposit-then-buy flow.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{
    ApprovalStatus, Decision, DocumentStore, DomainPort, HealthCheckResult, HealthCheckable,
    InMemoryDocumentStore, PortError, PriceFeed, PriceQuote, Principal, StaticPriceFeed, Tomans,
    TracingNotificationSink, UserId,
};
use domain_requests::{
    ApprovalWorkflow, IntakeConfig, OrderAmount, OrderRequest, RequestError, RequestIntake,
    RequestKind, WorkflowConfig, USER_CANCELLED_NOTE,
};
use domain_verification::{
    IdentityDetails, SubmissionPayload, VerificationConfig, VerificationTierEngine,
};
use domain_wallet::WalletLedger;

const BTC_PRICE: Decimal = dec!(2000000000);
const ETH_ADDRESS: &str = "0x52908400098527886E0F7030069857D2E4169EE7";

struct FailingFeed;

impl DomainPort for FailingFeed {}

#[async_trait]
impl PriceFeed for FailingFeed {
    async fn get_price(&self, _symbol: &str) -> Result<PriceQuote, PortError> {
        Err(PortError::unavailable("price-feed"))
    }
}

#[async_trait]
impl HealthCheckable for FailingFeed {
    async fn health_check(&self) -> HealthCheckResult {
        HealthCheckResult::healthy("failing-feed")
    }
}

struct SlowFeed;

impl DomainPort for SlowFeed {}

#[async_trait]
impl PriceFeed for SlowFeed {
    async fn get_price(&self, symbol: &str) -> Result<PriceQuote, PortError> {
        tokio::time::sleep(Duration::from_millis(500)).await;
        Ok(PriceQuote {
            symbol: symbol.to_string(),
            price_tmn: BTC_PRICE,
            as_of: Utc::now(),
        })
    }
}

#[async_trait]
impl HealthCheckable for SlowFeed {
    async fn health_check(&self) -> HealthCheckResult {
        HealthCheckResult::healthy("slow-feed")
    }
}

struct Desk {
    ledger: Arc<WalletLedger>,
    verification: Arc<VerificationTierEngine>,
    documents: Arc<InMemoryDocumentStore>,
    workflow: Arc<ApprovalWorkflow>,
    intake: RequestIntake,
    admin: Principal,
}

fn default_feed() -> Arc<dyn PriceFeed> {
    Arc::new(StaticPriceFeed::new([
        ("BTC", BTC_PRICE),
        ("ETH", dec!(150000000)),
        ("BAD", Decimal::ZERO),
    ]))
}

fn desk_with(prices: Arc<dyn PriceFeed>, config: IntakeConfig) -> Desk {
    let ledger = Arc::new(WalletLedger::new());
    let documents = Arc::new(InMemoryDocumentStore::new(64 * 1024));
    let verification = Arc::new(VerificationTierEngine::new(
        documents.clone(),
        Arc::new(TracingNotificationSink),
        VerificationConfig::default(),
    ));
    let workflow = Arc::new(ApprovalWorkflow::new(
        Arc::clone(&ledger),
        Arc::new(TracingNotificationSink),
        WorkflowConfig::default(),
    ));
    let intake = RequestIntake::new(
        Arc::clone(&verification),
        Arc::clone(&workflow),
        prices,
        config,
    );
    Desk {
        ledger,
        verification,
        documents,
        workflow,
        intake,
        admin: Principal::admin("admin-1"),
    }
}

fn desk() -> Desk {
    desk_with(default_feed(), IntakeConfig::default())
}

fn tmn(value: i64) -> Tomans {
    Tomans::new(value).unwrap()
}

fn identity() -> SubmissionPayload {
    SubmissionPayload::Identity(IdentityDetails {
        full_name: "Reza Karimi".to_string(),
        national_code: "0499370899".to_string(),
        birth_date: NaiveDate::from_ymd_opt(1988, 6, 2).unwrap(),
        card_number: "4111111111111111".to_string(),
    })
}

fn buy_btc(quantity: Decimal) -> OrderRequest {
    OrderRequest {
        kind: RequestKind::Buy,
        coin_symbol: "btc".to_string(),
        amount: OrderAmount::Crypto(quantity),
        wallet_address: None,
    }
}

impl Desk {
    async fn register(&self) -> UserId {
        let user = UserId::new_v7();
        self.verification.register(user).await;
        self.ledger.open_account(user).await;
        user
    }

    async fn verify_to(&self, user: UserId, level: u8) {
        if level >= 1 {
            let submission = self.verification.submit(user, 1, identity()).await.unwrap();
            self.verification
                .resolve(submission.id, Decision::Approve, None, &self.admin)
                .await
                .unwrap();
        }
        if level >= 2 {
            let doc = self.documents.store(b"passport".to_vec()).await.unwrap();
            let submission = self
                .verification
                .submit(user, 2, SubmissionPayload::Documents { documents: vec![doc] })
                .await
                .unwrap();
            self.verification
                .resolve(submission.id, Decision::Approve, None, &self.admin)
                .await
                .unwrap();
        }
    }

    async fn fund(&self, user: UserId, amount: i64) {
        let deposit = self.intake.create_deposit(user, tmn(amount)).await.unwrap();
        self.workflow
            .resolve(deposit.id, Decision::Approve, None, &self.admin)
            .await
            .unwrap();
    }

    /// A level 2 user holding `balance` tomans
    async fn trader(&self, balance: i64) -> UserId {
        let user = self.register().await;
        self.verify_to(user, 2).await;
        if balance > 0 {
            self.fund(user, balance).await;
        }
        user
    }
}

mod gating {
    use super::*;

    #[tokio::test]
    async fn test_deposit_needs_level_one() {
        let d = desk();
        let user = d.register().await;

        let err = d.intake.create_deposit(user, tmn(500_000)).await.unwrap_err();
        assert!(matches!(err, RequestError::PermissionDenied(_)));

        d.verify_to(user, 1).await;
        let deposit = d.intake.create_deposit(user, tmn(500_000)).await.unwrap();
        assert_eq!(deposit.status, ApprovalStatus::Pending);
        assert_eq!(deposit.coin_symbol, "TMN");
        assert_eq!(deposit.pricing().price_at_request(), Decimal::ONE);
    }

    #[tokio::test]
    async fn test_order_needs_level_two() {
        let d = desk();
        let user = d.register().await;
        d.verify_to(user, 1).await;
        d.fund(user, 2_000_000).await;

        let err = d.intake.create_order(user, buy_btc(dec!(0.0005))).await.unwrap_err();
        assert!(matches!(err, RequestError::PermissionDenied(_)));
        assert!(d.ledger.reservations_for(user).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_user_is_denied() {
        let d = desk();
        let err = d
            .intake
            .create_deposit(UserId::new(), tmn(1_000))
            .await
            .unwrap_err();
        assert!(matches!(err, RequestError::PermissionDenied(_)));
    }

    #[tokio::test]
    async fn test_zero_deposit_rejected() {
        let d = desk();
        let user = d.register().await;
        d.verify_to(user, 1).await;

        let err = d.intake.create_deposit(user, Tomans::ZERO).await.unwrap_err();
        assert!(matches!(err, RequestError::Validation(_)));
    }
}

mod intake {
    use super::*;

    #[tokio::test]
    async fn test_buy_snapshots_price_and_reserves() {
        let d = desk();
        let user = d.trader(2_000_000).await;

        let order = d.intake.create_order(user, buy_btc(dec!(0.0005))).await.unwrap();
        assert_eq!(order.coin_symbol, "BTC");
        assert_eq!(order.amount_crypto, Some(dec!(0.0005)));
        assert_eq!(order.total_value_tmn(), tmn(1_000_000));
        assert_eq!(order.pricing().price_at_request(), BTC_PRICE);
        assert!(order.reservation_id.is_some());

        let snapshot = d.ledger.balance(user).await.unwrap();
        assert_eq!(snapshot.balance, tmn(2_000_000));
        assert_eq!(snapshot.available, tmn(1_000_000));
    }

    #[tokio::test]
    async fn test_sell_does_not_reserve() {
        let d = desk();
        let user = d.trader(0).await;

        let order = OrderRequest {
            kind: RequestKind::Sell,
            ..buy_btc(dec!(0.001))
        };
        let sell = d.intake.create_order(user, order).await.unwrap();
        assert!(sell.reservation_id.is_none());
        assert_eq!(sell.total_value_tmn(), tmn(2_000_000));
    }

    #[tokio::test]
    async fn test_budget_order_computes_quantity() {
        let d = desk();
        let user = d.trader(5_000_000).await;

        let order = OrderRequest {
            kind: RequestKind::Trade,
            coin_symbol: "ETH".to_string(),
            amount: OrderAmount::Tomans(tmn(3_000_000)),
            wallet_address: None,
        };
        let trade = d.intake.create_order(user, order).await.unwrap();
        assert_eq!(trade.amount_crypto, Some(dec!(0.02)));
        assert_eq!(trade.total_value_tmn(), tmn(3_000_000));
    }

    #[tokio::test]
    async fn test_deposit_kind_refused_as_order() {
        let d = desk();
        let user = d.trader(0).await;

        let order = OrderRequest {
            kind: RequestKind::Deposit,
            ..buy_btc(dec!(0.001))
        };
        let err = d.intake.create_order(user, order).await.unwrap_err();
        assert!(matches!(err, RequestError::Validation(_)));
    }

    #[tokio::test]
    async fn test_invalid_wallet_address_refused() {
        let d = desk();
        let user = d.trader(2_000_000).await;

        let order = OrderRequest {
            wallet_address: Some(ETH_ADDRESS.to_string()),
            ..buy_btc(dec!(0.0005))
        };
        let err = d.intake.create_order(user, order).await.unwrap_err();
        assert!(matches!(err, RequestError::Validation(ref msg) if msg.contains("BTC")));
        assert!(d.workflow.list_for_user(user).await.is_empty());
        assert_eq!(d.ledger.balance(user).await.unwrap().available, tmn(2_000_000));
    }

    #[tokio::test]
    async fn test_blank_wallet_address_is_ignored() {
        let d = desk();
        let user = d.trader(2_000_000).await;

        let order = OrderRequest {
            wallet_address: Some("   ".to_string()),
            ..buy_btc(dec!(0.0005))
        };
        let buy = d.intake.create_order(user, order).await.unwrap();
        assert!(buy.wallet_address.is_none());
    }

    #[tokio::test]
    async fn test_minimum_order_value() {
        let d = desk_with(
            default_feed(),
            IntakeConfig {
                min_order_value: tmn(500_000),
                ..IntakeConfig::default()
            },
        );
        let user = d.trader(2_000_000).await;

        let err = d.intake.create_order(user, buy_btc(dec!(0.0001))).await.unwrap_err();
        assert!(matches!(err, RequestError::Validation(ref msg) if msg.contains("minimum")));
        assert!(d.ledger.reservations_for(user).await.unwrap().is_empty());
    }
}

mod failed_orders {
    use super::*;

    async fn assert_untouched(d: &Desk, user: UserId, balance: i64) {
        assert!(d
            .workflow
            .list_for_user(user)
            .await
            .iter()
            .all(|r| r.kind == RequestKind::Deposit));
        assert!(d.ledger.reservations_for(user).await.unwrap().is_empty());
        let snapshot = d.ledger.balance(user).await.unwrap();
        assert_eq!(snapshot.balance, tmn(balance));
        assert_eq!(snapshot.available, tmn(balance));
    }

    #[tokio::test]
    async fn test_price_feed_failure() {
        let d = desk_with(Arc::new(FailingFeed), IntakeConfig::default());
        let user = d.trader(2_000_000).await;

        let err = d.intake.create_order(user, buy_btc(dec!(0.0005))).await.unwrap_err();
        assert!(matches!(err, RequestError::PriceUnavailable { ref symbol, .. } if symbol == "BTC"));
        assert_untouched(&d, user, 2_000_000).await;
    }

    #[tokio::test]
    async fn test_price_feed_timeout() {
        let d = desk_with(
            Arc::new(SlowFeed),
            IntakeConfig {
                price_timeout: Duration::from_millis(50),
                ..IntakeConfig::default()
            },
        );
        let user = d.trader(2_000_000).await;

        let err = d.intake.create_order(user, buy_btc(dec!(0.0005))).await.unwrap_err();
        match err {
            RequestError::PriceUnavailable { source, .. } => {
                assert!(matches!(source, PortError::Timeout { .. }))
            }
            other => panic!("expected PriceUnavailable, got {other:?}"),
        }
        assert_untouched(&d, user, 2_000_000).await;
    }

    #[tokio::test]
    async fn test_unquoted_and_zero_priced_symbols() {
        let d = desk();
        let user = d.trader(2_000_000).await;

        let unknown = OrderRequest {
            coin_symbol: "XYZ".to_string(),
            ..buy_btc(dec!(1))
        };
        assert!(matches!(
            d.intake.create_order(user, unknown).await,
            Err(RequestError::PriceUnavailable { .. })
        ));

        let zero = OrderRequest {
            coin_symbol: "BAD".to_string(),
            ..buy_btc(dec!(1))
        };
        assert!(matches!(
            d.intake.create_order(user, zero).await,
            Err(RequestError::PriceUnavailable { .. })
        ));
        assert_untouched(&d, user, 2_000_000).await;
    }

    #[tokio::test]
    async fn test_insufficient_funds() {
        let d = desk();
        let user = d.trader(500_000).await;

        let err = d.intake.create_order(user, buy_btc(dec!(0.0005))).await.unwrap_err();
        match err {
            RequestError::InsufficientFunds { requested, available } => {
                assert_eq!(requested, tmn(1_000_000));
                assert_eq!(available, tmn(500_000));
            }
            other => panic!("expected InsufficientFunds, got {other:?}"),
        }
        assert_untouched(&d, user, 500_000).await;
    }
}

mod resolution {
    use super::*;

    #[tokio::test]
    async fn test_only_admins_resolve() {
        let d = desk();
        let user = d.trader(2_000_000).await;
        let order = d.intake.create_order(user, buy_btc(dec!(0.0005))).await.unwrap();

        let err = d
            .workflow
            .resolve(order.id, Decision::Approve, None, &Principal::user(user))
            .await
            .unwrap_err();
        assert!(matches!(err, RequestError::NotAuthorized(_)));
        assert!(d.workflow.get(order.id).await.unwrap().is_pending());
    }

    #[tokio::test]
    async fn test_reject_requires_note() {
        let d = desk();
        let user = d.trader(2_000_000).await;
        let order = d.intake.create_order(user, buy_btc(dec!(0.0005))).await.unwrap();

        let err = d
            .workflow
            .resolve(order.id, Decision::Reject, Some("  ".into()), &d.admin)
            .await
            .unwrap_err();
        assert!(matches!(err, RequestError::Validation(_)));
        assert_eq!(d.ledger.balance(user).await.unwrap().available, tmn(1_000_000));
    }

    #[tokio::test]
    async fn test_approved_sell_credits_total() {
        let d = desk();
        let user = d.trader(0).await;
        let sell = OrderRequest {
            kind: RequestKind::Sell,
            ..buy_btc(dec!(0.0005))
        };
        let sell = d.intake.create_order(user, sell).await.unwrap();

        let resolved = d
            .workflow
            .resolve(sell.id, Decision::Approve, None, &d.admin)
            .await
            .unwrap();
        assert_eq!(resolved.status, ApprovalStatus::Completed);
        assert_eq!(d.ledger.balance(user).await.unwrap().balance, tmn(1_000_000));
    }

    #[tokio::test]
    async fn test_resolving_twice_is_refused() {
        let d = desk();
        let user = d.trader(2_000_000).await;
        let order = d.intake.create_order(user, buy_btc(dec!(0.0005))).await.unwrap();

        d.workflow
            .resolve(order.id, Decision::Approve, None, &d.admin)
            .await
            .unwrap();
        let err = d
            .workflow
            .resolve(order.id, Decision::Reject, Some("late".into()), &d.admin)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RequestError::AlreadyResolved { status: ApprovalStatus::Completed, .. }
        ));
        assert_eq!(d.ledger.balance(user).await.unwrap().balance, tmn(1_000_000));
    }

    #[tokio::test]
    async fn test_concurrent_approvals_debit_once() {
        let d = desk();
        let user = d.trader(2_000_000).await;
        let order = d.intake.create_order(user, buy_btc(dec!(0.0005))).await.unwrap();

        let first_admin = Principal::admin("admin-1");
        let second_admin = Principal::admin("admin-2");
        let (a, b) = tokio::join!(
            d.workflow.resolve(order.id, Decision::Approve, None, &first_admin),
            d.workflow.resolve(order.id, Decision::Approve, None, &second_admin),
        );

        let successes = [&a, &b].iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1);
        let loser = if a.is_ok() { b } else { a };
        assert!(matches!(loser, Err(RequestError::AlreadyResolved { .. })));

        let snapshot = d.ledger.balance(user).await.unwrap();
        assert_eq!(snapshot.balance, tmn(1_000_000));
        assert_eq!(snapshot.reserved, Tomans::ZERO);
    }

    #[tokio::test]
    async fn test_approve_and_reject_race_has_one_winner() {
        let d = desk();
        let user = d.trader(2_000_000).await;
        let order = d.intake.create_order(user, buy_btc(dec!(0.0005))).await.unwrap();

        let workflow = Arc::clone(&d.workflow);
        let admin = d.admin.clone();
        let approve = tokio::spawn(async move {
            workflow
                .resolve(order.id, Decision::Approve, None, &admin)
                .await
        });
        let workflow = Arc::clone(&d.workflow);
        let admin = d.admin.clone();
        let reject = tokio::spawn(async move {
            workflow
                .resolve(order.id, Decision::Reject, Some("suspicious".into()), &admin)
                .await
        });
        let (approve, reject) = (approve.await.unwrap(), reject.await.unwrap());
        assert!(approve.is_ok() != reject.is_ok());

        let snapshot = d.ledger.balance(user).await.unwrap();
        assert_eq!(snapshot.reserved, Tomans::ZERO);
        let stored = d.workflow.get(order.id).await.unwrap();
        if approve.is_ok() {
            assert_eq!(stored.status, ApprovalStatus::Completed);
            assert_eq!(snapshot.balance, tmn(1_000_000));
        } else {
            assert_eq!(stored.status, ApprovalStatus::Rejected);
            assert_eq!(snapshot.balance, tmn(2_000_000));
        }
    }

    #[tokio::test]
    async fn test_cancel_after_approval_refused() {
        let d = desk();
        let user = d.trader(2_000_000).await;
        let order = d.intake.create_order(user, buy_btc(dec!(0.0005))).await.unwrap();
        d.workflow
            .resolve(order.id, Decision::Approve, None, &d.admin)
            .await
            .unwrap();

        assert!(matches!(
            d.workflow.cancel(order.id, user).await,
            Err(RequestError::AlreadyResolved { .. })
        ));
    }

    #[tokio::test]
    async fn test_user_cancel_restores_funds() {
        let d = desk();
        let user = d.trader(2_000_000).await;
        let order = d.intake.create_order(user, buy_btc(dec!(0.0005))).await.unwrap();

        let cancelled = d.workflow.cancel(order.id, user).await.unwrap();
        assert_eq!(cancelled.status, ApprovalStatus::Rejected);
        assert_eq!(cancelled.admin_note.as_deref(), Some(USER_CANCELLED_NOTE));
        assert!(cancelled.reservation_id.is_none());
        assert_eq!(d.ledger.balance(user).await.unwrap().available, tmn(2_000_000));
    }
}

mod completion {
    use super::*;

    #[tokio::test]
    async fn test_addressed_buy_waits_for_transfer() {
        let d = desk();
        let user = d.trader(2_000_000).await;
        let order = OrderRequest {
            coin_symbol: "ETH".to_string(),
            wallet_address: Some(ETH_ADDRESS.to_string()),
            ..buy_btc(dec!(0.01))
        };
        let order = d.intake.create_order(user, order).await.unwrap();

        let approved = d
            .workflow
            .resolve(order.id, Decision::Approve, None, &d.admin)
            .await
            .unwrap();
        assert_eq!(approved.status, ApprovalStatus::Approved);
        assert!(approved.completed_at.is_none());
        assert_eq!(d.ledger.balance(user).await.unwrap().balance, tmn(500_000));

        let done = d
            .workflow
            .mark_completed(order.id, Some("tx 0xfeed".into()), &d.admin)
            .await
            .unwrap();
        assert_eq!(done.status, ApprovalStatus::Completed);
        assert!(done.completed_at.is_some());
        assert_eq!(done.admin_note.as_deref(), Some("tx 0xfeed"));
    }

    #[tokio::test]
    async fn test_complete_requires_approved() {
        let d = desk();
        let user = d.trader(2_000_000).await;
        let order = d.intake.create_order(user, buy_btc(dec!(0.0005))).await.unwrap();

        let err = d
            .workflow
            .mark_completed(order.id, None, &d.admin)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RequestError::NotPending { status: ApprovalStatus::Pending, .. }
        ));
    }
}

mod queues {
    use super::*;

    #[tokio::test]
    async fn test_pending_queue_filters_by_kind() {
        let d = desk();
        let user = d.trader(3_000_000).await;
        d.intake.create_deposit(user, tmn(100_000)).await.unwrap();
        d.intake.create_order(user, buy_btc(dec!(0.0005))).await.unwrap();

        assert_eq!(d.workflow.list_pending(None).await.len(), 2);
        let buys = d.workflow.list_pending(Some(RequestKind::Buy)).await;
        assert_eq!(buys.len(), 1);
        assert_eq!(buys[0].kind, RequestKind::Buy);
    }

    #[tokio::test]
    async fn test_user_listing_is_private_and_newest_first() {
        let d = desk();
        let alice = d.trader(3_000_000).await;
        let bob = d.trader(0).await;
        let order = d.intake.create_order(alice, buy_btc(dec!(0.0005))).await.unwrap();

        let mine = d.workflow.list_for_user(alice).await;
        assert_eq!(mine[0].id, order.id);
        assert!(mine.iter().all(|r| r.user_id == alice));
        assert!(d
            .workflow
            .list_for_user(bob)
            .await
            .iter()
            .all(|r| r.user_id == bob));
    }
}

mod scenario {
    use super::*;

    #[tokio::test]
    async fn test_deposit_then_buy_lifecycle() {
        let d = desk();
        let user = d.register().await;

        // level 0 cannot trade
        let err = d.intake.create_order(user, buy_btc(dec!(0.0005))).await.unwrap_err();
        assert!(matches!(err, RequestError::PermissionDenied(_)));

        d.verify_to(user, 2).await;
        d.fund(user, 2_000_000).await;
        assert_eq!(d.ledger.balance(user).await.unwrap().balance, tmn(2_000_000));

        let first = d.intake.create_order(user, buy_btc(dec!(0.0005))).await.unwrap();
        assert_eq!(d.ledger.balance(user).await.unwrap().available, tmn(1_000_000));

        let rejected = d
            .workflow
            .resolve(first.id, Decision::Reject, Some("price moved".into()), &d.admin)
            .await
            .unwrap();
        assert_eq!(rejected.status, ApprovalStatus::Rejected);
        let snapshot = d.ledger.balance(user).await.unwrap();
        assert_eq!(snapshot.balance, tmn(2_000_000));
        assert_eq!(snapshot.available, tmn(2_000_000));

        let second = d.intake.create_order(user, buy_btc(dec!(0.0005))).await.unwrap();
        let approved = d
            .workflow
            .resolve(second.id, Decision::Approve, None, &d.admin)
            .await
            .unwrap();
        assert_eq!(approved.status, ApprovalStatus::Completed);

        let snapshot = d.ledger.balance(user).await.unwrap();
        assert_eq!(snapshot.balance, tmn(1_000_000));
        assert_eq!(snapshot.reserved, Tomans::ZERO);
    }
}
