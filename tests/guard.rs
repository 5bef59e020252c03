//! Tests for guards and the expression catalog.
mod common;
use common::*;
use kairo::prelude::*;
use std::sync::Arc;

#[test]
fn test_catalog_from_json() {
    let catalog = sample_catalog();
    assert_eq!(catalog.len(), 3);

    let categories: Vec<&str> = catalog.categories().map(|(name, _)| name).collect();
    assert_eq!(categories, vec!["Combat", "Movement"]);

    let falling = catalog.find_by_shorthand("falling").expect("alias field parsed");
    assert_eq!(falling.expression, "self.velocity.y < 0");
    assert!(catalog.find_by_shorthand("flying").is_none());
}

#[test]
fn test_catalog_rejects_bad_shorthands() {
    let mut catalog = sample_catalog();
    assert!(matches!(
        catalog.add_option("Misc", ExpressionOption::new("", "true")),
        Err(CatalogError::EmptyShorthand { .. })
    ));
    assert!(matches!(
        catalog.add_option("Misc", ExpressionOption::new("falling", "true")),
        Err(CatalogError::DuplicateShorthand(s)) if s == "falling"
    ));
    assert!(matches!(
        catalog.add_option("Misc", ExpressionOption::new("x".repeat(5000), "true")),
        Err(CatalogError::ShorthandTooLong { .. })
    ));
    assert!(matches!(
        ExpressionCatalog::from_json_str("{ not json"),
        Err(CatalogError::JsonParseError(_))
    ));
    assert!(matches!(
        ExpressionCatalog::from_file("/nonexistent/catalog.json"),
        Err(CatalogError::Io { .. })
    ));
}

#[test]
fn test_structured_guard_joins_options() {
    let catalog = sample_catalog();
    let mut guard = Guard::new(Id::new(1));
    assert_eq!(guard.mode(), GuardMode::Structured);
    assert_eq!(guard.as_expression_text(), "");

    let on_ground = catalog.find_by_shorthand("on ground").expect("option");
    let low_health = catalog.find_by_shorthand("low health").expect("option");
    assert!(guard.toggle_option(Arc::clone(&on_ground)));
    assert!(guard.toggle_option(low_health));

    assert_eq!(
        guard.as_expression_text(),
        "self.health < 20 and self.on_ground"
    );
    assert_eq!(guard.preview(), "low health and on ground");

    assert!(!guard.toggle_option(on_ground));
    assert_eq!(guard.as_expression_text(), "self.health < 20");
}

#[test]
fn test_free_text_guard_is_verbatim() {
    let catalog = sample_catalog();
    let mut guard = Guard::new(Id::new(1));
    guard.insert_option(catalog.find_by_shorthand("falling").expect("option"));
    guard.set_text("self.x > 1 or self.y");
    guard.set_mode(GuardMode::FreeText);

    assert_eq!(guard.as_expression_text(), "self.x > 1 or self.y");
    // The structured selection survives a mode switch.
    guard.set_mode(GuardMode::Structured);
    assert_eq!(guard.as_expression_text(), "self.velocity.y < 0");
}

#[test]
fn test_copy_config_keeps_guard_id() {
    let catalog = sample_catalog();
    let mut source = Guard::new(Id::new(10));
    source.set_mode(GuardMode::FreeText);
    source.set_text("a");
    source.insert_option(catalog.find_by_shorthand("falling").expect("option"));

    let mut dest = Guard::new(Id::new(20));
    dest.copy_config_from(&source);

    assert_eq!(dest.id(), Id::new(20));
    assert!(dest.same_config(&source));
    assert_ne!(dest, source);
}

#[test]
fn test_guard_text_is_bounded() {
    let mut guard = Guard::new(Id::new(1));
    guard.set_text(&"a".repeat(10_000));
    assert_eq!(guard.text().len(), kairo::text::MAX_TEXT_LEN);
}
