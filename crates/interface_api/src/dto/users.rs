//! User DTOs

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use core_kernel::{DocumentRef, SubmissionId, UserId};
use domain_verification::{KycLevel, KycStatus};

use crate::service::UserOverview;

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user_id: UserId,
    pub kyc_level: KycLevel,
    pub kyc_status: KycStatus,
    pub pending_submission: Option<SubmissionId>,
    pub full_name: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub masked_card_number: Option<String>,
    pub documents: Vec<DocumentRef>,
    pub balance_tmn: i64,
    pub reserved_tmn: i64,
    pub available_tmn: i64,
    pub created_at: DateTime<Utc>,
}

impl From<UserOverview> for UserResponse {
    fn from(overview: UserOverview) -> Self {
        let UserOverview { profile, wallet } = overview;
        Self {
            user_id: profile.user_id,
            kyc_level: profile.kyc_level(),
            kyc_status: profile.kyc_status(),
            pending_submission: profile.pending_submission(),
            masked_card_number: profile.masked_card_number(),
            full_name: profile.full_name,
            birth_date: profile.birth_date,
            documents: profile.kyc_documents.into_iter().collect(),
            balance_tmn: wallet.balance.value(),
            reserved_tmn: wallet.reserved.value(),
            available_tmn: wallet.available.value(),
            created_at: profile.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DocumentResponse {
    pub document: DocumentRef,
    pub size_bytes: usize,
}
