/// Rounds to the next integer away from zero: `2.1 -> 3`, `-2.1 -> -3`.
/// Whole numbers are returned unchanged.
pub fn round_away_from_zero(value: f64) -> i64 {
    if value > 0.0 {
        value.ceil() as i64
    } else {
        value.floor() as i64
    }
}
