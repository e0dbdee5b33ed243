//! Request and response bodies

pub mod users;
pub mod verification;
pub mod requests;

use serde::Deserialize;
use validator::Validate;

use core_kernel::Decision;

/// Body of an admin approve/reject call
#[derive(Debug, Deserialize, Validate)]
pub struct ResolveRequest {
    pub decision: Decision,
    #[validate(length(max = 500))]
    pub note: Option<String>,
}
