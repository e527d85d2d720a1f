//! Seller Data

use crate::domain::{sellers::records::SellerUuid, users::records::UserUuid};

/// New Seller Data
#[derive(Debug, Clone, PartialEq)]
pub struct NewSeller {
    /// UUID to assign to the seller row.
    pub uuid: SellerUuid,

    /// Owning user; a user may register at most one seller.
    pub user_uuid: UserUuid,

    /// Storefront name.
    pub name: String,
}
