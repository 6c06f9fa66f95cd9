/// Maps a heading into [0, 360) by repeated whole-turn adjustment (not `rem_euclid`).
pub fn normalize_heading(mut heading_deg: f64) -> f64 {
    if !heading_deg.is_finite() {
        return heading_deg;
    }
    while heading_deg >= 360.0 {
        heading_deg -= 360.0;
    }
    while heading_deg < 0.0 {
        heading_deg += 360.0;
    }
    heading_deg
}

/// Signed difference `to - from` folded onto the shorter arc, in (-180, 180].
pub fn shortest_arc(from_deg: f64, to_deg: f64) -> f64 {
    let mut diff = to_deg - from_deg;
    if diff > 180.0 {
        diff -= 360.0;
    }
    if diff < -180.0 {
        diff += 360.0;
    }
    diff
}

pub fn interpolate_heading(from_deg: f64, to_deg: f64, weight: f64) -> f64 {
    normalize_heading(from_deg + shortest_arc(from_deg, to_deg) * weight)
}
