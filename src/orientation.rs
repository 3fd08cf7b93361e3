//! EXIF orientation arithmetic.
//!
//! The Orientation tag packs a rotation and an optional mirror into a single
//! code:
//!
//! ```text
//! Code  Rotation  Mirrored
//!   1       0°      no
//!   2       0°      yes
//!   3     180°      no
//!   4     180°      yes
//!   5      90°      yes
//!   6      90°      no
//!   7     270°      yes
//!   8     270°      no
//! ```
//!
//! Rotating or mirroring an image therefore never touches pixel data: the
//! editor reads the current code, transforms it here, and writes the new code
//! back. This module is pure math with no I/O.

/// A decoded Orientation tag value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Orientation {
    /// Clockwise rotation in degrees: 0, 90, 180, or 270.
    rotation: u16,
    mirrored: bool,
}

impl Orientation {
    /// Upright and unmirrored: code 1, also the value assumed for images
    /// that carry no Orientation tag at all.
    pub const NORMAL: Self = Self {
        rotation: 0,
        mirrored: false,
    };

    /// Decode an Orientation tag code. Returns `None` for codes above 8.
    /// Code 0 is not defined by EXIF but occasionally written by broken
    /// encoders; it is treated as upright.
    pub fn from_code(code: u8) -> Option<Self> {
        let (rotation, mirrored) = match code {
            0 | 1 => (0, false),
            2 => (0, true),
            3 => (180, false),
            4 => (180, true),
            5 => (90, true),
            6 => (90, false),
            7 => (270, true),
            8 => (270, false),
            _ => return None,
        };
        Some(Self { rotation, mirrored })
    }

    /// The Orientation tag code for this state, always 1-8.
    pub fn code(self) -> u8 {
        match (self.rotation, self.mirrored) {
            (0, false) => 1,
            (0, true) => 2,
            (180, false) => 3,
            (180, true) => 4,
            (90, true) => 5,
            (90, false) => 6,
            (270, true) => 7,
            (270, false) => 8,
            _ => unreachable!("rotation is always a multiple of 90"),
        }
    }

    /// Rotate clockwise by `quarter_turns` 90° steps. Negative counts rotate
    /// counter-clockwise; four turns in either direction are the identity.
    pub fn rotated_cw(self, quarter_turns: i32) -> Self {
        let degrees = (i32::from(self.rotation) + quarter_turns * 90).rem_euclid(360);
        Self {
            rotation: degrees as u16,
            ..self
        }
    }

    /// Mirror left-to-right.
    pub fn flipped(self) -> Self {
        Self {
            mirrored: !self.mirrored,
            ..self
        }
    }

    /// Mirror top-to-bottom: a 180° turn followed by a left-right flip.
    pub fn flipped_vertically(self) -> Self {
        self.rotated_cw(2).flipped()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_codes_round_trip() {
        for code in 1..=8 {
            let orientation = Orientation::from_code(code).unwrap();
            assert_eq!(orientation.code(), code);
        }
    }

    #[test]
    fn code_zero_normalizes_to_upright() {
        assert_eq!(Orientation::from_code(0), Some(Orientation::NORMAL));
        assert_eq!(Orientation::from_code(0).unwrap().code(), 1);
    }

    #[test]
    fn codes_above_eight_are_rejected() {
        assert_eq!(Orientation::from_code(9), None);
        assert_eq!(Orientation::from_code(255), None);
    }

    #[test]
    fn quarter_turns_from_upright() {
        let start = Orientation::NORMAL;
        assert_eq!(start.rotated_cw(0).code(), 1);
        assert_eq!(start.rotated_cw(1).code(), 6);
        assert_eq!(start.rotated_cw(2).code(), 3);
        assert_eq!(start.rotated_cw(3).code(), 8);
    }

    #[test]
    fn four_turns_are_identity_from_every_code() {
        for code in 1..=8 {
            let start = Orientation::from_code(code).unwrap();
            assert_eq!(start.rotated_cw(4), start, "code {code}");
            assert_eq!(start.rotated_cw(-4), start, "code {code}");
        }
    }

    #[test]
    fn negative_turns_rotate_counter_clockwise() {
        for code in 1..=8 {
            let start = Orientation::from_code(code).unwrap();
            assert_eq!(start.rotated_cw(-1), start.rotated_cw(3), "code {code}");
        }
    }

    #[test]
    fn turn_counts_wrap_past_full_rotations() {
        let start = Orientation::from_code(6).unwrap();
        assert_eq!(start.rotated_cw(5), start.rotated_cw(1));
        assert_eq!(start.rotated_cw(-7), start.rotated_cw(1));
    }

    #[test]
    fn horizontal_mirror_pairs() {
        for (start, expected) in [(1, 2), (2, 1), (3, 4), (4, 3), (5, 6), (6, 5), (7, 8), (8, 7)] {
            let orientation = Orientation::from_code(start).unwrap();
            assert_eq!(orientation.flipped().code(), expected, "code {start}");
        }
    }

    #[test]
    fn vertical_mirror_pairs() {
        for (start, expected) in [(1, 4), (2, 3), (3, 2), (4, 1), (5, 8), (6, 7), (7, 6), (8, 5)] {
            let orientation = Orientation::from_code(start).unwrap();
            assert_eq!(
                orientation.flipped_vertically().code(),
                expected,
                "code {start}"
            );
        }
    }

    #[test]
    fn mirroring_twice_is_identity() {
        for code in 1..=8 {
            let start = Orientation::from_code(code).unwrap();
            assert_eq!(start.flipped().flipped(), start, "code {code}");
            assert_eq!(
                start.flipped_vertically().flipped_vertically(),
                start,
                "code {code}"
            );
        }
    }
}
