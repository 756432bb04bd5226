//! Vincenty's inverse solution of the geodesic problem.

use geokyc_types::Coordinate;

use crate::GeodesicError;

/// Iteration cap for the longitude-on-auxiliary-sphere loop.
const MAX_ITERATIONS: u32 = 200;
/// Convergence threshold on lambda, in radians (~0.006 mm).
const CONVERGENCE_THRESHOLD: f64 = 1e-12;

/// A reference ellipsoid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ellipsoid {
    /// Semi-major axis in metres.
    pub a: f64,
    /// Flattening.
    pub f: f64,
}

impl Ellipsoid {
    /// Semi-minor axis in metres.
    pub fn b(&self) -> f64 {
        (1.0 - self.f) * self.a
    }
}

pub const WGS84: Ellipsoid = Ellipsoid {
    a: 6_378_137.0,
    f: 1.0 / 298.257_223_563,
};

/// Distance in kilometres between two coordinates on WGS84.
///
/// The pair is put in a canonical order before solving, so swapping the
/// arguments gives the same result bit for bit.
pub fn vincenty_distance_km(a: &Coordinate, b: &Coordinate) -> Result<f64, GeodesicError> {
    let (p1, p2) = if (a.lat, a.lon) <= (b.lat, b.lon) {
        (a, b)
    } else {
        (b, a)
    };
    inverse(&WGS84, p1, p2).map(|metres| metres / 1000.0)
}

/// Solve the inverse problem, returning the ellipsoidal distance in metres.
fn inverse(e: &Ellipsoid, p1: &Coordinate, p2: &Coordinate) -> Result<f64, GeodesicError> {
    let f = e.f;
    let a = e.a;
    let b = e.b();

    let l = (p2.lon - p1.lon).to_radians();
    let u1 = ((1.0 - f) * p1.lat.to_radians().tan()).atan();
    let u2 = ((1.0 - f) * p2.lat.to_radians().tan()).atan();
    let (sin_u1, cos_u1) = u1.sin_cos();
    let (sin_u2, cos_u2) = u2.sin_cos();

    let mut lambda = l;
    let mut iterations = 0;

    let (sin_sigma, cos_sigma, sigma, cos_sq_alpha, cos_2sigma_m) = loop {
        let (sin_lambda, cos_lambda) = lambda.sin_cos();
        let sin_sigma = ((cos_u2 * sin_lambda).powi(2)
            + (cos_u1 * sin_u2 - sin_u1 * cos_u2 * cos_lambda).powi(2))
        .sqrt();
        if sin_sigma == 0.0 {
            // Coincident points.
            return Ok(0.0);
        }
        let cos_sigma = sin_u1 * sin_u2 + cos_u1 * cos_u2 * cos_lambda;
        let sigma = sin_sigma.atan2(cos_sigma);
        let sin_alpha = cos_u1 * cos_u2 * sin_lambda / sin_sigma;
        let cos_sq_alpha = 1.0 - sin_alpha * sin_alpha;
        // Both points on the equator: cos²α is zero and the term vanishes.
        let cos_2sigma_m = if cos_sq_alpha != 0.0 {
            cos_sigma - 2.0 * sin_u1 * sin_u2 / cos_sq_alpha
        } else {
            0.0
        };
        let c = f / 16.0 * cos_sq_alpha * (4.0 + f * (4.0 - 3.0 * cos_sq_alpha));
        let previous = lambda;
        lambda = l
            + (1.0 - c)
                * f
                * sin_alpha
                * (sigma
                    + c * sin_sigma
                        * (cos_2sigma_m
                            + c * cos_sigma * (-1.0 + 2.0 * cos_2sigma_m * cos_2sigma_m)));

        iterations += 1;
        if !lambda.is_finite() {
            return Err(GeodesicError::NoConvergence { iterations });
        }
        if (lambda - previous).abs() < CONVERGENCE_THRESHOLD {
            break (sin_sigma, cos_sigma, sigma, cos_sq_alpha, cos_2sigma_m);
        }
        if iterations >= MAX_ITERATIONS {
            return Err(GeodesicError::NoConvergence { iterations });
        }
    };

    let u_sq = cos_sq_alpha * (a * a - b * b) / (b * b);
    let big_a = 1.0 + u_sq / 16384.0 * (4096.0 + u_sq * (-768.0 + u_sq * (320.0 - 175.0 * u_sq)));
    let big_b = u_sq / 1024.0 * (256.0 + u_sq * (-128.0 + u_sq * (74.0 - 47.0 * u_sq)));
    let delta_sigma = big_b
        * sin_sigma
        * (cos_2sigma_m
            + big_b / 4.0
                * (cos_sigma * (-1.0 + 2.0 * cos_2sigma_m * cos_2sigma_m)
                    - big_b / 6.0
                        * cos_2sigma_m
                        * (-3.0 + 4.0 * sin_sigma * sin_sigma)
                        * (-3.0 + 4.0 * cos_2sigma_m * cos_2sigma_m)));

    Ok(b * big_a * (sigma - delta_sigma))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(lat: f64, lon: f64) -> Coordinate {
        Coordinate::new(lat, lon).unwrap()
    }

    #[test]
    fn flinders_peak_to_buninyong() {
        // Reference line from Vincenty's 1975 paper: 54 972.271 m.
        let d = vincenty_distance_km(
            &c(-37.951_033_42, 144.424_867_89),
            &c(-37.652_821_14, 143.926_495_54),
        )
        .unwrap();
        assert!((d - 54.972_271).abs() < 0.001, "got {d}");
    }

    #[test]
    fn one_degree_of_equator() {
        let d = vincenty_distance_km(&c(0.0, 0.0), &c(0.0, 1.0)).unwrap();
        assert!((d - 111.319_491).abs() < 0.001, "got {d}");
    }

    #[test]
    fn montreal_to_toronto() {
        let d = vincenty_distance_km(&c(45.5017, -73.5673), &c(43.6532, -79.3832)).unwrap();
        assert!((d - 505.375).abs() < 0.01, "got {d}");
    }

    #[test]
    fn coincident_points_are_zero() {
        let p = c(52.2297, 21.0122);
        assert_eq!(vincenty_distance_km(&p, &p).unwrap(), 0.0);
    }

    #[test]
    fn antipodal_points_report_no_distance() {
        let err = vincenty_distance_km(&c(0.0, 0.0), &c(0.0, 180.0)).unwrap_err();
        assert!(matches!(err, GeodesicError::NoConvergence { .. }));
        assert!(vincenty_distance_km(&c(0.0, 0.0), &c(0.5, 179.7)).is_err());
    }

    #[test]
    fn swapped_arguments_are_identical() {
        let a = c(30.2741, 120.1551);
        let b = c(30.7522, 120.75);
        assert_eq!(
            vincenty_distance_km(&a, &b).unwrap(),
            vincenty_distance_km(&b, &a).unwrap()
        );
    }
}
