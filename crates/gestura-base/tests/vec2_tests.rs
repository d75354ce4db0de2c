use gestura_base::Vec2;

#[test]
fn test_vec2_area() {
    assert_eq!(Vec2::new(300usize, 533).area(), 159_900);
    assert_eq!(Vec2::new(0usize, 480).area(), 0);
}

#[test]
fn test_vec2_default_is_origin() {
    assert_eq!(Vec2::<i32>::default(), Vec2::new(0, 0));
}
