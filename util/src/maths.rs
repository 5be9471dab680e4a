//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Map a value from one range into another.
pub fn lin_map<T>(source_range: (T, T), target_range: (T, T), value: T) -> T
where 
    T: Float 
{
    target_range.0 
        + ((value - source_range.0) 
        * (target_range.1 - target_range.0) 
        / (source_range.1 - source_range.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lin_map() {
        assert_eq!(lin_map((0f64, 180f64), (2f64, 12f64), 0f64), 2f64);
        assert_eq!(lin_map((0f64, 180f64), (2f64, 12f64), 90f64), 7f64);
        assert_eq!(lin_map((0f64, 180f64), (2f64, 12f64), 180f64), 12f64);
        assert_eq!(lin_map((0f64, 1f64), (1f64, 0f64), 0.25f64), 0.75f64);
    }
}
