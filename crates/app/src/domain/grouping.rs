//! Seller grouping.

use crate::domain::sellers::records::SellerUuid;

/// Groups items by the seller they belong to, preserving the order in
/// which sellers are first seen.
///
/// Checkout fans a multi-seller cart out into one order per seller;
/// this is the grouping policy behind that fan-out, kept as a pure
/// function so it can be tested without a database.
pub(crate) fn group_by_seller<T, F>(items: Vec<T>, seller_of: F) -> Vec<(SellerUuid, Vec<T>)>
where
    F: Fn(&T) -> SellerUuid,
{
    let mut groups: Vec<(SellerUuid, Vec<T>)> = Vec::new();

    for item in items {
        let seller = seller_of(&item);

        match groups.iter_mut().find(|(uuid, _)| *uuid == seller) {
            Some((_, bucket)) => bucket.push(item),
            None => groups.push((seller, vec![item])),
        }
    }

    groups
}
