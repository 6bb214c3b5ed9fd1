use super::*;
use proptest::prelude::*;

#[test]
fn test_known_values() {
    assert_eq!(expected_win_rate(0.0, 0), 8.0);
    assert_eq!(expected_win_rate(100.0, 0), 37.0);
    assert_eq!(expected_win_rate(100.0, 40), 23.0);
    assert_eq!(expected_win_rate(300.0, 20), 441.0);
    assert_eq!(expected_win_rate(-200.0, 60), 0.0);
}

#[test]
fn test_mate_sentinel_saturates() {
    assert_eq!(expected_win_rate(4000.0, 10), 1000.0);
    assert_eq!(expected_win_rate(-4000.0, 10), 0.0);
    assert_eq!(expected_win_rate(5000.0, 300), 1000.0);
}

#[test]
fn test_ply_is_capped() {
    assert_eq!(expected_win_rate(50.0, 240), expected_win_rate(50.0, 400));
}

#[test]
fn test_expected_score() {
    assert_eq!(expected_score(0.0, 0), 500.0);
    assert_eq!(expected_score(100.0, 0), 517.5);
    assert_eq!(expected_score(300.0, 20), 720.5);
    assert_eq!(expected_score(4000.0, 10), 1000.0);
}

proptest! {
    #[test]
    fn prop_monotonic_in_centipawns(cp in -5000i32..5000, delta in 0i32..500, ply in 0usize..400) {
        let lower = expected_win_rate(cp as f64, ply);
        let higher = expected_win_rate((cp + delta) as f64, ply);
        prop_assert!(lower <= higher);
    }

    #[test]
    fn prop_draw_remainder_is_non_negative(cp in -5000i32..5000, ply in 0usize..400) {
        let ours = expected_win_rate(cp as f64, ply);
        let theirs = expected_win_rate(-cp as f64, ply);
        prop_assert!(ours + theirs <= 1000.0);
        prop_assert!((0.0..=1000.0).contains(&expected_score(cp as f64, ply)));
    }
}
