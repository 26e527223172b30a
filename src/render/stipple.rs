//! Screen-space dash cycles.
//!
//! Each pattern is a repeating cycle along the line, measured in device
//! pixels, with one or more "on" sub-intervals. These tables are a pixel-exact
//! visual contract shared by the CPU reference below and the WGSL fragment
//! stage in [`super::pipeline`]; intervals are half-open `[start, end)`.

use crate::style::DashPattern;

/// Upper bound on on-intervals per cycle (Phantom and DashDotDot use all 3).
pub const MAX_INTERVALS: usize = 3;

pub fn cycle_length(pattern: DashPattern) -> f32 {
    match pattern {
        DashPattern::Continuous => 0.0,
        DashPattern::Dashed => 18.0,
        DashPattern::Dotted => 8.0,
        DashPattern::DashDot => 22.0,
        DashPattern::DashDotDot => 30.0,
        DashPattern::Center => 42.0,
        DashPattern::Hidden => 12.0,
        DashPattern::Phantom => 54.0,
        DashPattern::Selected => 6.0,
    }
}

pub fn on_intervals(pattern: DashPattern) -> &'static [[f32; 2]] {
    match pattern {
        DashPattern::Continuous => &[],
        DashPattern::Dashed => &[[0.0, 12.0]],
        DashPattern::Dotted => &[[0.0, 2.0]],
        DashPattern::DashDot => &[[0.0, 12.0], [16.0, 18.0]],
        DashPattern::DashDotDot => &[[0.0, 12.0], [16.0, 18.0], [22.0, 24.0]],
        DashPattern::Center => &[[0.0, 24.0], [30.0, 36.0]],
        DashPattern::Hidden => &[[0.0, 6.0]],
        DashPattern::Phantom => &[[0.0, 24.0], [30.0, 36.0], [42.0, 48.0]],
        DashPattern::Selected => &[[0.0, 4.0]],
    }
}

/// CPU reference for the fragment-stage test: is the pixel at `distance_px`
/// along the line visible under `pattern`?
pub fn is_on(pattern: DashPattern, distance_px: f32) -> bool {
    let cycle = cycle_length(pattern);
    if cycle <= 0.0 {
        return true;
    }
    let d = distance_px.rem_euclid(cycle);
    on_intervals(pattern)
        .iter()
        .any(|iv| d >= iv[0] && d < iv[1])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dashed_sample_vector() {
        // cycle 18, on [0, 12)
        let expect = [
            (0.0, true),
            (11.0, true),
            (12.0, false),
            (13.0, false),
            (17.0, false),
            (18.0, true),
        ];
        for (d, on) in expect {
            assert_eq!(is_on(DashPattern::Dashed, d), on, "offset {d}");
        }
    }

    #[test]
    fn continuous_is_always_on() {
        for d in [0.0, 1.5, 100.0, 1.0e6] {
            assert!(is_on(DashPattern::Continuous, d));
        }
    }

    #[test]
    fn tables_stay_inside_their_cycles() {
        for pattern in DashPattern::ALL {
            let cycle = cycle_length(pattern);
            let intervals = on_intervals(pattern);
            assert!(intervals.len() <= MAX_INTERVALS);
            for iv in intervals {
                assert!(iv[0] < iv[1], "{pattern}: empty interval");
                assert!(iv[1] <= cycle, "{pattern}: interval outside cycle");
            }
        }
    }

    #[test]
    fn selected_pattern_cycle() {
        // cycle 6, on [0, 4)
        assert!(is_on(DashPattern::Selected, 3.9));
        assert!(!is_on(DashPattern::Selected, 4.0));
        assert!(!is_on(DashPattern::Selected, 5.9));
        assert!(is_on(DashPattern::Selected, 6.0));
    }

    #[test]
    fn phantom_middle_dashes() {
        // cycle 54, on [0,24) [30,36) [42,48)
        assert!(is_on(DashPattern::Phantom, 23.9));
        assert!(!is_on(DashPattern::Phantom, 24.0));
        assert!(is_on(DashPattern::Phantom, 30.0));
        assert!(!is_on(DashPattern::Phantom, 36.0));
        assert!(is_on(DashPattern::Phantom, 47.0));
        assert!(!is_on(DashPattern::Phantom, 48.0));
    }

    #[test]
    fn negative_distances_wrap() {
        // -6 along a Dashed line lands at 12 within the cycle: off.
        assert!(!is_on(DashPattern::Dashed, -6.0));
        assert!(is_on(DashPattern::Dashed, -18.0));
    }
}
