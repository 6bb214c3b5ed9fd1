use super::*;

#[test]
fn test_defaults() {
    let config = SearchConfig::default();
    assert_eq!(config.pruning.stop_at_accumulated_prob, 0.10);
    assert_eq!(config.width.moves_to_consider, 2);
    assert_eq!(config.annotation.blunder_move_diff, -200.0);
    assert_eq!(config.multi_pv.end_node, 1);
    assert_eq!(config.cache, CachePolicy::Unbounded);
    assert!(config.validate().is_ok());
}

#[test]
fn test_partial_toml_overrides() {
    let config = SearchConfig::from_toml_str(
        r#"
        [pruning]
        stop_at_accumulated_prob = 0.05

        [width]
        additional_moves_at_root = 1

        [cache]
        policy = "lru"
        capacity = 1000
        "#,
    )
    .unwrap();
    assert_eq!(config.pruning.stop_at_accumulated_prob, 0.05);
    assert_eq!(config.pruning.clear_best_move_prob, 0.70);
    assert_eq!(config.width.moves_to_consider, 2);
    assert_eq!(config.width.additional_moves_at_root, 1);
    assert_eq!(config.cache, CachePolicy::Lru { capacity: 1000 });
}

#[test]
fn test_rejects_invalid_values() {
    let err =
        SearchConfig::from_toml_str("[pruning]\nskip_opp_moves_with_prob = 1.5\n").unwrap_err();
    assert!(matches!(err, SearchError::Config(_)));

    let err = SearchConfig::from_toml_str("[width]\nmoves_to_consider = 0\n").unwrap_err();
    assert!(matches!(err, SearchError::Config(_)));

    let err = SearchConfig::from_toml_str("[pruning\n").unwrap_err();
    assert!(matches!(err, SearchError::Toml(_)));
}

#[test]
fn test_load_missing_file() {
    let err = SearchConfig::load(Path::new("/nonexistent/chancellor.toml")).unwrap_err();
    assert!(matches!(err, SearchError::Io { .. }));
}
