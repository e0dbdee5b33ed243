//! Back office application service
//!
//! Wires the ledger, tier engine, workflow and intake together and exposes
//! the use cases the HTTP layer needs. Handlers stay thin and only translate
//! between DTOs and these calls.

use std::sync::Arc;
use std::time::Duration;

use config::ConfigError;
use tracing::instrument;

use core_kernel::{
    bounded, AdapterHealth, Decision, DocumentRef, DocumentStore, HealthCheckResult,
    InMemoryDocumentStore, NotificationSink, PriceFeed, Principal, RequestId, StaticPriceFeed,
    SubmissionId, Tomans, TracingNotificationSink, UserId,
};
use domain_requests::{
    ApprovalWorkflow, FinancialRequest, IntakeConfig, OrderRequest, RequestIntake, RequestKind,
    WorkflowConfig,
};
use domain_verification::{
    SubmissionPayload, UserProfile, VerificationConfig, VerificationSubmission,
    VerificationTierEngine,
};
use domain_wallet::{BalanceSnapshot, WalletLedger};

use crate::config::ApiConfig;
use crate::error::ApiError;

/// Settings for the wired components
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub intake: IntakeConfig,
    pub workflow: WorkflowConfig,
    pub verification: VerificationConfig,
    pub document_timeout: Duration,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            intake: IntakeConfig::default(),
            workflow: WorkflowConfig::default(),
            verification: VerificationConfig::default(),
            document_timeout: Duration::from_secs(5),
        }
    }
}

impl ServiceSettings {
    pub fn from_config(config: &ApiConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            intake: config.intake_config()?,
            workflow: config.workflow_config(),
            verification: config.verification_config(),
            document_timeout: config.document_timeout(),
        })
    }
}

/// A user's profile together with their wallet figures
#[derive(Debug, Clone)]
pub struct UserOverview {
    pub profile: UserProfile,
    pub wallet: BalanceSnapshot,
}

/// The back office use cases
pub struct BackOffice {
    ledger: Arc<WalletLedger>,
    verification: Arc<VerificationTierEngine>,
    workflow: Arc<ApprovalWorkflow>,
    intake: RequestIntake,
    prices: Arc<dyn PriceFeed>,
    documents: Arc<dyn DocumentStore>,
    document_timeout: Duration,
}

impl BackOffice {
    pub fn new(
        prices: Arc<dyn PriceFeed>,
        documents: Arc<dyn DocumentStore>,
        notifier: Arc<dyn NotificationSink>,
        settings: ServiceSettings,
    ) -> Self {
        let ledger = Arc::new(WalletLedger::new());
        let verification = Arc::new(VerificationTierEngine::new(
            Arc::clone(&documents),
            Arc::clone(&notifier),
            settings.verification,
        ));
        let workflow = Arc::new(ApprovalWorkflow::new(
            Arc::clone(&ledger),
            notifier,
            settings.workflow,
        ));
        let intake = RequestIntake::new(
            Arc::clone(&verification),
            Arc::clone(&workflow),
            Arc::clone(&prices),
            settings.intake,
        );

        Self {
            ledger,
            verification,
            workflow,
            intake,
            prices,
            documents,
            document_timeout: settings.document_timeout,
        }
    }

    /// Builds the service over the in-process reference adapters
    pub fn from_config(config: &ApiConfig) -> Result<Self, ConfigError> {
        let prices = StaticPriceFeed::new(config.price_table()?);
        let documents = InMemoryDocumentStore::new(config.max_document_bytes);
        Ok(Self::new(
            Arc::new(prices),
            Arc::new(documents),
            Arc::new(TracingNotificationSink),
            ServiceSettings::from_config(config)?,
        ))
    }

    /// Creates the user's profile and wallet; calling it again is harmless
    #[instrument(skip_all, fields(user_id = %user_id))]
    pub async fn register_user(&self, user_id: UserId) -> Result<UserOverview, ApiError> {
        self.verification.register(user_id).await;
        if self.ledger.open_account(user_id).await {
            tracing::info!("wallet opened");
        }
        self.user_overview(user_id).await
    }

    pub async fn user_overview(&self, user_id: UserId) -> Result<UserOverview, ApiError> {
        let profile = self.verification.profile(user_id).await?;
        let wallet = self.ledger.balance(user_id).await?;
        Ok(UserOverview { profile, wallet })
    }

    /// Stores a KYC document for a registered user
    #[instrument(skip_all, fields(user_id = %user_id, size = bytes.len()))]
    pub async fn upload_document(
        &self,
        user_id: UserId,
        bytes: Vec<u8>,
    ) -> Result<DocumentRef, ApiError> {
        self.verification.profile(user_id).await?;
        let reference = bounded("store_document", self.document_timeout, self.documents.store(bytes))
            .await?;
        tracing::info!(document = %reference, "document stored");
        Ok(reference)
    }

    pub async fn submit_verification(
        &self,
        user_id: UserId,
        target_level: u8,
        payload: SubmissionPayload,
    ) -> Result<VerificationSubmission, ApiError> {
        Ok(self.verification.submit(user_id, target_level, payload).await?)
    }

    pub async fn submissions_for(&self, user_id: UserId) -> Vec<VerificationSubmission> {
        self.verification.submissions_for(user_id).await
    }

    pub async fn pending_submissions(&self) -> Vec<VerificationSubmission> {
        self.verification.list_pending().await
    }

    pub async fn resolve_submission(
        &self,
        submission_id: SubmissionId,
        decision: Decision,
        note: Option<String>,
        admin: &Principal,
    ) -> Result<VerificationSubmission, ApiError> {
        Ok(self
            .verification
            .resolve(submission_id, decision, note, admin)
            .await?)
    }

    pub async fn create_deposit(
        &self,
        user_id: UserId,
        amount: Tomans,
    ) -> Result<FinancialRequest, ApiError> {
        Ok(self.intake.create_deposit(user_id, amount).await?)
    }

    pub async fn create_order(
        &self,
        user_id: UserId,
        order: OrderRequest,
    ) -> Result<FinancialRequest, ApiError> {
        Ok(self.intake.create_order(user_id, order).await?)
    }

    pub async fn requests_for(&self, user_id: UserId) -> Vec<FinancialRequest> {
        self.workflow.list_for_user(user_id).await
    }

    pub async fn cancel_request(
        &self,
        user_id: UserId,
        request_id: RequestId,
    ) -> Result<FinancialRequest, ApiError> {
        Ok(self.workflow.cancel(request_id, user_id).await?)
    }

    pub async fn pending_requests(&self, kind: Option<RequestKind>) -> Vec<FinancialRequest> {
        self.workflow.list_pending(kind).await
    }

    pub async fn resolve_request(
        &self,
        request_id: RequestId,
        decision: Decision,
        note: Option<String>,
        admin: &Principal,
    ) -> Result<FinancialRequest, ApiError> {
        Ok(self
            .workflow
            .resolve(request_id, decision, note, admin)
            .await?)
    }

    pub async fn complete_request(
        &self,
        request_id: RequestId,
        note: Option<String>,
        admin: &Principal,
    ) -> Result<FinancialRequest, ApiError> {
        Ok(self.workflow.mark_completed(request_id, note, admin).await?)
    }

    /// Health of the collaborators the service depends on
    pub async fn readiness(&self) -> Vec<HealthCheckResult> {
        let (prices, documents) =
            tokio::join!(self.prices.health_check(), self.documents.health_check());
        vec![prices, documents]
    }

    /// Returns true if every collaborator reports healthy
    pub fn is_ready(results: &[HealthCheckResult]) -> bool {
        results.iter().all(|r| r.status == AdapterHealth::Healthy)
    }
}
