//! Page metadata conventions.
//!
//! Every page root carries `id="{entity}--{category}"` and
//! `data-page-category` with one of the constants below.

/// List of records
pub const PAGE_CAT_LIST: &str = "list";

/// Detail / edit form
pub const PAGE_CAT_DETAIL: &str = "detail";

/// Analytical dashboard
pub const PAGE_CAT_DASHBOARD: &str = "dashboard";

pub const ALL_CATEGORIES: &[&str] = &[PAGE_CAT_LIST, PAGE_CAT_DETAIL, PAGE_CAT_DASHBOARD];

/// `{entity}--{category}` with a known category
pub fn is_valid_page_id(id: &str) -> bool {
    match id.split_once("--") {
        Some((entity, category)) => !entity.is_empty() && ALL_CATEGORIES.contains(&category),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_id_format() {
        assert!(is_valid_page_id("d404_group_drilldown--dashboard"));
        assert!(!is_valid_page_id("d404_group_drilldown"));
        assert!(!is_valid_page_id("--dashboard"));
        assert!(!is_valid_page_id("d404_group_drilldown--chart"));
    }
}
