pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Spherical destination point: start at (`latitude_deg`, `longitude_deg`), travel
/// `distance_m` along the great circle leaving at `bearing_rad` (clockwise from north).
///
/// Returns `(latitude_deg, longitude_deg)` with longitude folded into [-180, 180].
pub fn destination_point(
    latitude_deg: f64,
    longitude_deg: f64,
    bearing_rad: f64,
    distance_m: f64,
) -> (f64, f64) {
    if distance_m == 0.0 {
        return (latitude_deg, longitude_deg);
    }

    let lat1 = latitude_deg.to_radians();
    let lon1 = longitude_deg.to_radians();
    let angular = distance_m / EARTH_RADIUS_METERS;

    let dest_lat =
        (lat1.sin() * angular.cos() + lat1.cos() * angular.sin() * bearing_rad.cos()).asin();
    let dest_lon = lon1
        + (bearing_rad.sin() * angular.sin() * lat1.cos())
            .atan2(angular.cos() - lat1.sin() * dest_lat.sin());

    let mut longitude = dest_lon.to_degrees();
    if longitude > 180.0 {
        longitude -= 360.0;
    } else if longitude < -180.0 {
        longitude += 360.0;
    }
    (dest_lat.to_degrees(), longitude)
}
