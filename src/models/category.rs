use serde::{Deserialize, Serialize};

use super::Gender;

pub const ICE_CREAM_CATEGORY_ID: &str = "iceCreamServings";

/// A fixed catalog entry. Never created or edited at runtime; bookings
/// embed a copy by value so catalog changes don't rewrite history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CupCategory {
    pub id: String,
    pub label_key: String,
    pub cups: u32,
    pub duration_hours: u32,
    #[serde(default)]
    pub women_only: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_key: Option<String>,
}

impl CupCategory {
    fn new(id: &str, label_key: &str, cups: u32, duration_hours: u32) -> Self {
        Self {
            id: id.to_string(),
            label_key: label_key.to_string(),
            cups,
            duration_hours,
            women_only: false,
            unit_key: None,
        }
    }

    pub fn is_ice_cream(&self) -> bool {
        self.id == ICE_CREAM_CATEGORY_ID
    }
}

pub fn cup_catalog() -> Vec<CupCategory> {
    vec![
        CupCategory::new("10cups", "cat10cups", 10, 2),
        CupCategory::new("20cups", "cat20cups", 20, 2),
        CupCategory::new("30cups", "cat30cups", 30, 2),
        CupCategory::new("50cups", "cat50cups", 50, 3),
        CupCategory::new("80cups", "cat80cups", 80, 3),
        CupCategory::new("100cups", "cat100cups", 100, 3),
        CupCategory::new("150cups", "cat150cups", 150, 4),
        CupCategory::new("300cups", "cat300cups", 300, 4),
        CupCategory {
            id: ICE_CREAM_CATEGORY_ID.to_string(),
            label_key: "catIceCreamServings".to_string(),
            cups: 15,
            duration_hours: 1,
            women_only: true,
            unit_key: Some("servingsLabel".to_string()),
        },
    ]
}

pub fn find_category(id: &str) -> Option<CupCategory> {
    cup_catalog().into_iter().find(|c| c.id == id)
}

/// Categories a customer may pick from the regular list. The ice-cream
/// add-on never appears here: it is only reachable through the women's
/// yes/no sub-choice. Women-only entries are hidden from men.
pub fn selectable_categories(gender: Gender) -> Vec<CupCategory> {
    cup_catalog()
        .into_iter()
        .filter(|c| !c.is_ice_cream())
        .filter(|c| !(gender == Gender::Men && c.women_only))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_has_nine_entries() {
        assert_eq!(cup_catalog().len(), 9);
    }

    #[test]
    fn test_find_category() {
        let cat = find_category("50cups").unwrap();
        assert_eq!(cat.cups, 50);
        assert_eq!(cat.duration_hours, 3);
        assert!(!cat.women_only);
    }

    #[test]
    fn test_find_category_unknown() {
        assert!(find_category("5000cups").is_none());
    }

    #[test]
    fn test_ice_cream_excluded_from_regular_list() {
        for gender in [Gender::Men, Gender::Women] {
            let list = selectable_categories(gender);
            assert!(list.iter().all(|c| !c.is_ice_cream()));
        }
    }

    #[test]
    fn test_women_only_hidden_from_men() {
        let list = selectable_categories(Gender::Men);
        assert!(list.iter().all(|c| !c.women_only));
        assert_eq!(list.len(), 8);
    }

    #[test]
    fn test_women_see_full_regular_list() {
        let list = selectable_categories(Gender::Women);
        assert_eq!(list.len(), 8);
    }

    #[test]
    fn test_category_serde_round_trip() {
        let cat = find_category(ICE_CREAM_CATEGORY_ID).unwrap();
        let json = serde_json::to_string(&cat).unwrap();
        let back: CupCategory = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cat);
        assert!(json.contains("womenOnly"));
    }
}
