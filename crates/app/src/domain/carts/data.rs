//! Cart Data

use crate::domain::{
    carts::records::{CartItemId, CartLine},
    commodities::records::CommodityId,
    users::UserId,
};

/// Most units of a commodity that one add-to-cart request may carry.
pub const MAX_ADD_QUANTITY: u32 = 5;

/// Most units of a commodity a single cart line may hold.
pub const MAX_LINE_QUANTITY: u32 = 6;

/// New Cart Item Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCartItem {
    pub commodity_id: CommodityId,
    pub quantity: u32,
}

/// Why a selection of cart items cannot be billed or bought.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionProblem {
    /// Nothing was selected.
    Empty,

    /// At least one selected item belongs to somebody else.
    NotOwned,

    /// At least one selected item no longer exists.
    Missing,
}

/// Sort and deduplicate selected cart item ids.
pub(crate) fn normalize_selection(mut items: Vec<CartItemId>) -> Vec<CartItemId> {
    items.sort_unstable();
    items.dedup();
    items
}

/// Check that `lines`, loaded for the normalized `selected` ids, are all present and owned by
/// `user`. Ownership problems win over missing lines.
pub(crate) fn check_selection(
    user: UserId,
    selected: &[CartItemId],
    lines: &[CartLine],
) -> Result<(), SelectionProblem> {
    if selected.is_empty() {
        return Err(SelectionProblem::Empty);
    }

    if lines.iter().any(|line| line.user_id != user) {
        return Err(SelectionProblem::NotOwned);
    }

    if lines.len() < selected.len() {
        return Err(SelectionProblem::Missing);
    }

    Ok(())
}
