//! Wired Back Office for Tests
//!
//! Assembles the ledger, tier engine, workflow and intake over in-memory
//! collaborators, plus helpers that walk a user up the tiers and fund
//! their wallet through the real approval path.

use std::sync::Arc;

use core_kernel::{
    Decision, DocumentStore, InMemoryDocumentStore, PriceFeed, Principal, StaticPriceFeed, UserId,
};
use domain_requests::{ApprovalWorkflow, IntakeConfig, RequestIntake, WorkflowConfig};
use domain_verification::{VerificationConfig, VerificationTierEngine};
use domain_wallet::WalletLedger;
use once_cell::sync::Lazy;

use crate::builders::{documents_payload, IdentityBuilder};
use crate::doubles::RecordingNotificationSink;
use crate::fixtures::{PriceFixtures, PrincipalFixtures, TomanFixtures};

static TRACING: Lazy<()> = Lazy::new(|| {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
});

/// Installs a test-friendly subscriber once per process
///
/// Honors `RUST_LOG`, so `RUST_LOG=debug cargo test` shows engine logs.
pub fn init_test_tracing() {
    Lazy::force(&TRACING);
}

/// The back office components, sharing one notification recorder
pub struct TestBackOffice {
    pub ledger: Arc<WalletLedger>,
    pub verification: Arc<VerificationTierEngine>,
    pub workflow: Arc<ApprovalWorkflow>,
    pub intake: RequestIntake,
    pub documents: Arc<InMemoryDocumentStore>,
    pub notifications: Arc<RecordingNotificationSink>,
    pub admin: Principal,
}

impl Default for TestBackOffice {
    fn default() -> Self {
        Self::new()
    }
}

impl TestBackOffice {
    /// Quotes the fixture price table with default timeouts
    pub fn new() -> Self {
        Self::with_prices(
            Arc::new(StaticPriceFeed::new(PriceFixtures::table())),
            IntakeConfig::default(),
        )
    }

    pub fn with_prices(prices: Arc<dyn PriceFeed>, intake_config: IntakeConfig) -> Self {
        init_test_tracing();

        let ledger = Arc::new(WalletLedger::new());
        let documents = Arc::new(InMemoryDocumentStore::new(64 * 1024));
        let notifications = Arc::new(RecordingNotificationSink::new());
        let verification = Arc::new(VerificationTierEngine::new(
            documents.clone(),
            notifications.clone(),
            VerificationConfig::default(),
        ));
        let workflow = Arc::new(ApprovalWorkflow::new(
            Arc::clone(&ledger),
            notifications.clone(),
            WorkflowConfig::default(),
        ));
        let intake = RequestIntake::new(
            Arc::clone(&verification),
            Arc::clone(&workflow),
            prices,
            intake_config,
        );

        Self {
            ledger,
            verification,
            workflow,
            intake,
            documents,
            notifications,
            admin: PrincipalFixtures::admin(),
        }
    }

    /// Registers a level 0 user with an empty wallet
    pub async fn register(&self) -> UserId {
        let user = UserId::new_v7();
        self.verification.register(user).await;
        self.ledger.open_account(user).await;
        user
    }

    /// Files and approves submissions until the user reaches `level`
    pub async fn verify_to(&self, user: UserId, level: u8) {
        let current = self.verification.profile(user).await.unwrap().kyc_level().value();
        for target in (current + 1)..=level {
            let payload = if target == 1 {
                IdentityBuilder::new().build_payload()
            } else {
                let doc = self.documents.store(b"passport scan".to_vec()).await.unwrap();
                documents_payload(vec![doc])
            };
            let submission = self.verification.submit(user, target, payload).await.unwrap();
            self.verification
                .resolve(submission.id, Decision::Approve, None, &self.admin)
                .await
                .unwrap();
        }
    }

    /// Deposits and approves `amount` tomans; the user must be level 1 or above
    pub async fn fund(&self, user: UserId, amount: i64) {
        let deposit = self
            .intake
            .create_deposit(user, TomanFixtures::tomans(amount))
            .await
            .unwrap();
        self.workflow
            .resolve(deposit.id, Decision::Approve, None, &self.admin)
            .await
            .unwrap();
    }

    /// A level 2 user holding `balance` tomans
    pub async fn trader(&self, balance: i64) -> UserId {
        let user = self.register().await;
        self.verify_to(user, 2).await;
        if balance > 0 {
            self.fund(user, balance).await;
        }
        user
    }
}
