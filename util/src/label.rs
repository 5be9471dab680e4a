//! Angle labels embedded in training image file names
//!
//! Images recorded while driving are named `<stem>_angle_<deg>.<ext>`, for
//! example `frame_000042_angle_120.jpg`. The steering angle is recovered from
//! the name when the images are reviewed.

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Token preceding the angle in a labelled file name.
pub const ANGLE_TOKEN: &str = "angle_";

/// Angle assumed for files without a readable label: straight ahead.
pub const DEFAULT_ANGLE_DEG: i32 = 90;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Build a labelled file name.
pub fn format_name(stem: &str, angle_deg: i32, ext: &str) -> String {
    format!("{}_{}{}.{}", stem, ANGLE_TOKEN, angle_deg, ext)
}

/// Parse the steering angle out of a file name.
///
/// The angle is the text between the first `angle_` and the following `.`
/// (or the end of the name). If the token is missing, or the text is not an
/// integer, [`DEFAULT_ANGLE_DEG`] is returned.
pub fn parse_angle(file_name: &str) -> i32 {
    let rest = match file_name.find(ANGLE_TOKEN) {
        Some(i) => &file_name[i + ANGLE_TOKEN.len()..],
        None => return DEFAULT_ANGLE_DEG
    };

    let digits = rest.split('.').next().unwrap_or("");

    digits.parse().unwrap_or(DEFAULT_ANGLE_DEG)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_angle() {
        assert_eq!(parse_angle("car_angle_120.jpg"), 120);
        assert_eq!(parse_angle("frame_000001_angle_30.jpeg"), 30);
        assert_eq!(parse_angle("angle_150"), 150);
    }

    #[test]
    fn test_parse_angle_defaults() {
        assert_eq!(parse_angle("car.jpg"), DEFAULT_ANGLE_DEG);
        assert_eq!(parse_angle("car_angle_.jpg"), DEFAULT_ANGLE_DEG);
        assert_eq!(parse_angle("car_angle_left.png"), DEFAULT_ANGLE_DEG);
    }

    #[test]
    fn test_format_name_is_parsed_back() {
        let name = format_name("frame_000007", 60, "jpg");
        assert_eq!(name, "frame_000007_angle_60.jpg");
        assert_eq!(parse_angle(&name), 60);
    }
}
