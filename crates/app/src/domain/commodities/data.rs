//! Commodity Data

use serde::Serialize;

use crate::domain::{
    commodities::records::{CategoryId, CommodityRecord, SellStatus},
    pagination::Pagination,
};

/// New Commodity Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCommodity {
    pub name: String,
    pub cover_img: String,
    pub category_id: i64,
    pub selling_price: u64,
    pub stock_num: u32,
    pub sell_status: SellStatus,
}

/// New Category Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCategory {
    pub parent_id: Option<CategoryId>,
    pub name: String,
    pub rank: i32,
}

/// Catalogue search. Unset fields do not filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommodityFilter {
    /// Substring of the commodity name, matched case-sensitively.
    pub keyword: Option<String>,

    /// Category whose whole subtree is searched.
    pub category_id: Option<CategoryId>,
}

impl CommodityFilter {
    /// `LIKE` pattern for the keyword, with wildcards in the keyword itself escaped.
    pub(crate) fn name_pattern(&self) -> Option<String> {
        let keyword = self.keyword.as_deref().filter(|k| !k.is_empty())?;

        let mut pattern = String::with_capacity(keyword.len() + 2);

        pattern.push('%');

        for c in keyword.chars() {
            if matches!(c, '%' | '_' | '\\') {
                pattern.push('\\');
            }

            pattern.push(c);
        }

        pattern.push('%');

        Some(pattern)
    }
}

/// One page of catalogue search results, ordered by id.
#[derive(Debug, Clone, Serialize)]
pub struct CommodityPage {
    pub commodities: Vec<CommodityRecord>,
    pub pagination: Pagination,
    pub total_rows: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keyword(k: &str) -> CommodityFilter {
        CommodityFilter {
            keyword: Some(k.to_string()),
            category_id: None,
        }
    }

    #[test]
    fn keyword_becomes_a_substring_pattern() {
        assert_eq!(keyword("mug").name_pattern().as_deref(), Some("%mug%"));
    }

    #[test]
    fn like_wildcards_in_keywords_match_literally() {
        assert_eq!(
            keyword("100%_off\\").name_pattern().as_deref(),
            Some("%100\\%\\_off\\\\%")
        );
    }

    #[test]
    fn blank_keyword_does_not_filter() {
        assert_eq!(keyword("").name_pattern(), None);
        assert_eq!(CommodityFilter::default().name_pattern(), None);
    }
}
