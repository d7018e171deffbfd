use sitekit_core::{Category, CategoryCatalog, UNASSIGNED_CATEGORY};

#[test]
fn test_standard_catalog_has_fallback() {
    let catalog = CategoryCatalog::standard();
    assert!(catalog.contains("residential"));
    assert_eq!(catalog.resolve(None).key, UNASSIGNED_CATEGORY);
    assert_eq!(catalog.resolve(Some("volcano")).key, UNASSIGNED_CATEGORY);
}

#[test]
fn test_canonical_tag() {
    let catalog = CategoryCatalog::standard();
    assert_eq!(catalog.canonical_tag(Some("road")), "road");
    assert_eq!(catalog.canonical_tag(Some("")), UNASSIGNED_CATEGORY);
    assert_eq!(catalog.canonical_tag(None), UNASSIGNED_CATEGORY);
}

#[test]
fn test_fallback_can_be_replaced_not_removed() {
    let mut catalog = CategoryCatalog::new();
    catalog.insert(Category::new(UNASSIGNED_CATEGORY, "Undecided", "#FFFFFF").with_livability(1.0));
    assert_eq!(catalog.resolve(Some("anything")).name, "Undecided");
    assert_eq!(catalog.len(), 1);
}

#[test]
fn test_catalog_entries_deserialize_with_defaults() {
    let category: Category =
        serde_json::from_str(r##"{"key":"pier","name":"Pier","display_color":"#795548"}"##)
            .expect("parse");
    assert_eq!(category.cost, 0.0);
    assert_eq!(category.livability_score, 0.0);
}
