// THEORY:
// A blob outline is a circle whose radius is perturbed independently at every
// sampled angle. For an angle θ and a uniform draw u in [0,1):
//
//     r_eff = radius * (1 + wobble * (u - 0.5))
//
// so with wobble in [0,1] every point stays within radius*(1 ± wobble/2) of
// the center. Nothing is validated or clamped: a negative radius or a wobble
// above 1 yields self-intersecting outlines, which is still valid geometry.

use crate::core_modules::geometry::{Contour, Point2D};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// How the `point_count` angles are spread around the circle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AngularSampling {
    /// `2π·i/n` for i in `0..n`. No duplicate point at the seam.
    #[default]
    Exclusive,
    /// `2π·i/(n-1)`, including both 0 and 2π like a linspace. The first and
    /// last points coincide (up to the perturbation).
    Inclusive,
}

impl AngularSampling {
    /// The angle of sample `i` out of `n`.
    pub fn angle(self, i: usize, n: usize) -> f64 {
        match self {
            AngularSampling::Exclusive => TAU * i as f64 / n as f64,
            AngularSampling::Inclusive if n > 1 => TAU * i as f64 / (n - 1) as f64,
            AngularSampling::Inclusive => 0.0,
        }
    }
}

/// Generates a wobbly closed outline around `center` using exclusive sampling.
pub fn generate_contour<R: Rng>(
    center: Point2D,
    radius: f64,
    point_count: usize,
    wobble: f64,
    rng: &mut R,
) -> Contour {
    generate_contour_with(center, radius, point_count, wobble, AngularSampling::default(), rng)
}

/// Same as [`generate_contour`] with an explicit angular sampling rule.
pub fn generate_contour_with<R: Rng>(
    center: Point2D,
    radius: f64,
    point_count: usize,
    wobble: f64,
    sampling: AngularSampling,
    rng: &mut R,
) -> Contour {
    let points = (0..point_count)
        .map(|i| {
            let theta = sampling.angle(i, point_count);
            let u: f64 = rng.random();
            let r_eff = radius * (1.0 + wobble * (u - 0.5));
            Point2D::new(center.x + r_eff * theta.cos(), center.y + r_eff * theta.sin())
        })
        .collect();
    Contour::from_points(points)
}
