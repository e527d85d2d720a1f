//! Seller Records

use jiff::Timestamp;
use serde::Serialize;

use crate::{domain::users::records::UserUuid, uuids::TypedUuid};

/// Seller UUID
pub type SellerUuid = TypedUuid<SellerRecord>;

/// Seller Record
#[derive(Debug, Clone, Serialize)]
pub struct SellerRecord {
    pub uuid: SellerUuid,

    /// The user account behind this seller. One seller per user.
    pub user_uuid: UserUuid,

    pub name: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
