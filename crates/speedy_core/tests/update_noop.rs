use speedy_core::{update, BatchRegistry, Msg};

#[test]
fn update_is_noop() {
    let registry = BatchRegistry::new();
    let (next, effects) = update(registry.clone(), Msg::NoOp);

    assert_eq!(registry, next);
    assert!(effects.is_empty());
}

#[test]
fn tick_does_not_touch_items() {
    let registry = BatchRegistry::new();
    let (mut next, effects) = update(registry, Msg::Tick);

    assert!(next.is_empty());
    assert!(effects.is_empty());
    assert!(!next.consume_dirty());
}
