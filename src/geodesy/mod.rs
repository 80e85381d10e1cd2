//! Conformal (Gauss–Krüger) projection between geographic coordinates and a
//! local metric plane.
//!
//! The plane is left-handed in map terms: `x` grows northward and `y` grows
//! eastward, both in meters from the projection origin. The series used here
//! are the Krüger n-expansions truncated at the fifth (sixth for `delta`)
//! order, which keeps the error below a millimeter within a few hundred
//! kilometers of the origin meridian. Farther out the series diverge; results
//! there are not guarded against.

use serde::{Deserialize, Serialize};

/// Geographic position in degrees.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LngLat {
	/// Longitude, degrees east.
	pub lng: f64,
	/// Latitude, degrees north.
	pub lat: f64,
}

impl LngLat {
	/// Build a position from longitude and latitude in degrees.
	pub const fn new(lng: f64, lat: f64) -> Self {
		Self { lng, lat }
	}

	/// `[lng, lat]`, the GeoJSON position order.
	pub fn to_position(self) -> Vec<f64> {
		vec![self.lng, self.lat]
	}
}

/// Point on the projected plane, meters. `x` is northing, `y` is easting.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PlanePoint {
	/// Northward offset from the origin.
	pub x: f64,
	/// Eastward offset from the origin.
	pub y: f64,
}

impl PlanePoint {
	/// Build a plane point.
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}
}

impl std::ops::Add for PlanePoint {
	type Output = PlanePoint;

	fn add(self, rhs: PlanePoint) -> PlanePoint {
		PlanePoint::new(self.x + rhs.x, self.y + rhs.y)
	}
}

/// Reference ellipsoid together with the projection scale factor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ellipsoid {
	/// Semi-major axis, meters.
	pub a: f64,
	/// Inverse flattening.
	pub inverse_flattening: f64,
	/// Scale factor on the origin meridian.
	pub m0: f64,
}

impl Ellipsoid {
	/// GRS80 with the 0.9999 scale factor of the Japanese plane rectangular
	/// coordinate system.
	pub const GRS80: Ellipsoid = Ellipsoid {
		a: 6_378_137.0,
		inverse_flattening: 298.257_222_101,
		m0: 0.9999,
	};

	/// Third flattening `n = 1 / (2F - 1)`.
	pub fn third_flattening(&self) -> f64 {
		1.0 / (2.0 * self.inverse_flattening - 1.0)
	}
}

impl Default for Ellipsoid {
	fn default() -> Self {
		Self::GRS80
	}
}

/// Rotate a plane point about the plane origin by `theta_deg` degrees.
pub fn rotate(theta_deg: f64, point: PlanePoint) -> PlanePoint {
	let (sin, cos) = theta_deg.to_radians().sin_cos();
	PlanePoint {
		x: cos * point.x - sin * point.y,
		y: sin * point.x + cos * point.y,
	}
}

/// Series coefficients, all polynomials in the third flattening `n`.
#[derive(Clone, Debug, PartialEq)]
struct Coefficients {
	/// Meridian arc coefficients `A0..A5`.
	arc: [f64; 6],
	/// Forward series `alpha1..alpha5`.
	alpha: [f64; 5],
	/// Inverse series `beta1..beta5`.
	beta: [f64; 5],
	/// Conformal-to-geodetic latitude series `delta1..delta6`.
	delta: [f64; 6],
}

impl Coefficients {
	fn new(n: f64) -> Self {
		let n2 = n * n;
		let n3 = n2 * n;
		let n4 = n3 * n;
		let n5 = n4 * n;
		let n6 = n5 * n;

		let arc = [
			1.0 + n2 / 4.0 + n4 / 64.0,
			-1.5 * (n - n3 / 8.0 - n5 / 64.0),
			15.0 / 16.0 * (n2 - n4 / 4.0),
			-35.0 / 48.0 * (n3 - 5.0 / 16.0 * n5),
			315.0 / 512.0 * n4,
			-693.0 / 1280.0 * n5,
		];

		let alpha = [
			n / 2.0 - 2.0 / 3.0 * n2 + 5.0 / 16.0 * n3 + 41.0 / 180.0 * n4 - 127.0 / 288.0 * n5,
			13.0 / 48.0 * n2 - 3.0 / 5.0 * n3 + 557.0 / 1440.0 * n4 + 281.0 / 630.0 * n5,
			61.0 / 240.0 * n3 - 103.0 / 140.0 * n4 + 15061.0 / 26880.0 * n5,
			49561.0 / 161280.0 * n4 - 179.0 / 168.0 * n5,
			34729.0 / 80640.0 * n5,
		];

		let beta = [
			n / 2.0 - 2.0 / 3.0 * n2 + 37.0 / 96.0 * n3 - 1.0 / 360.0 * n4 - 81.0 / 512.0 * n5,
			n2 / 48.0 + n3 / 15.0 - 437.0 / 1440.0 * n4 + 46.0 / 105.0 * n5,
			17.0 / 480.0 * n3 - 37.0 / 840.0 * n4 - 209.0 / 4480.0 * n5,
			4397.0 / 161280.0 * n4 - 11.0 / 504.0 * n5,
			4583.0 / 161280.0 * n5,
		];

		let delta = [
			2.0 * n - 2.0 / 3.0 * n2 - 2.0 * n3 + 116.0 / 45.0 * n4 + 26.0 / 45.0 * n5
				- 2854.0 / 675.0 * n6,
			7.0 / 3.0 * n2 - 8.0 / 5.0 * n3 - 227.0 / 45.0 * n4 + 2704.0 / 315.0 * n5
				+ 2323.0 / 945.0 * n6,
			56.0 / 15.0 * n3 - 136.0 / 35.0 * n4 - 1262.0 / 105.0 * n5 + 73814.0 / 2835.0 * n6,
			4279.0 / 630.0 * n4 - 332.0 / 35.0 * n5 - 399572.0 / 14175.0 * n6,
			4174.0 / 315.0 * n5 - 144838.0 / 6237.0 * n6,
			601676.0 / 22275.0 * n6,
		];

		Self {
			arc,
			alpha,
			beta,
			delta,
		}
	}
}

/// Projection anchored at a fixed origin. Construction does all of the
/// coefficient work; `forward` and `inverse` only evaluate the series.
#[derive(Clone, Debug, PartialEq)]
pub struct GaussKruger {
	origin: LngLat,
	ellipsoid: Ellipsoid,
	n: f64,
	coefficients: Coefficients,
	/// `m0 * a / (1 + n) * A0`, the rectifying radius scaled by `m0`.
	big_a: f64,
	/// Scaled meridian arc from the equator to the origin latitude.
	big_s: f64,
}

impl GaussKruger {
	/// Projection on GRS80 anchored at `origin`.
	pub fn new(origin: LngLat) -> Self {
		Self::with_ellipsoid(origin, Ellipsoid::GRS80)
	}

	/// Projection on an arbitrary ellipsoid.
	pub fn with_ellipsoid(origin: LngLat, ellipsoid: Ellipsoid) -> Self {
		let n = ellipsoid.third_flattening();
		let coefficients = Coefficients::new(n);
		let scale = ellipsoid.m0 * ellipsoid.a / (1.0 + n);
		let big_a = scale * coefficients.arc[0];

		let phi0 = origin.lat.to_radians();
		let arc_terms: f64 = coefficients.arc[1..]
			.iter()
			.enumerate()
			.map(|(i, a_j)| a_j * (2.0 * (i + 1) as f64 * phi0).sin())
			.sum();
		let big_s = scale * (coefficients.arc[0] * phi0 + arc_terms);

		Self {
			origin,
			ellipsoid,
			n,
			coefficients,
			big_a,
			big_s,
		}
	}

	/// The projection origin.
	pub fn origin(&self) -> LngLat {
		self.origin
	}

	/// The ellipsoid the projection was built on.
	pub fn ellipsoid(&self) -> Ellipsoid {
		self.ellipsoid
	}

	/// Geographic → plane.
	pub fn forward(&self, p: LngLat) -> PlanePoint {
		let phi = p.lat.to_radians();
		let d_lambda = (p.lng - self.origin.lng).to_radians();

		let k = 2.0 * self.n.sqrt() / (1.0 + self.n);
		let sin_phi = phi.sin();
		let t = (sin_phi.atanh() - k * (k * sin_phi).atanh()).sinh();
		let t_bar = (1.0 + t * t).sqrt();

		let (lambda_s, lambda_c) = d_lambda.sin_cos();
		let xi = (t / lambda_c).atan();
		let eta = (lambda_s / t_bar).atanh();

		let mut x = xi;
		let mut y = eta;
		for (i, alpha) in self.coefficients.alpha.iter().enumerate() {
			let j = 2.0 * (i + 1) as f64;
			x += alpha * (j * xi).sin() * (j * eta).cosh();
			y += alpha * (j * xi).cos() * (j * eta).sinh();
		}

		PlanePoint {
			x: self.big_a * x - self.big_s,
			y: self.big_a * y,
		}
	}

	/// Plane → geographic.
	pub fn inverse(&self, p: PlanePoint) -> LngLat {
		let xi = (p.x + self.big_s) / self.big_a;
		let eta = p.y / self.big_a;

		let mut xi_prime = xi;
		let mut eta_prime = eta;
		for (i, beta) in self.coefficients.beta.iter().enumerate() {
			let j = 2.0 * (i + 1) as f64;
			xi_prime -= beta * (j * xi).sin() * (j * eta).cosh();
			eta_prime -= beta * (j * xi).cos() * (j * eta).sinh();
		}

		let chi = (xi_prime.sin() / eta_prime.cosh()).asin();
		let phi = self
			.coefficients
			.delta
			.iter()
			.enumerate()
			.fold(chi, |acc, (i, delta)| {
				acc + delta * (2.0 * (i + 1) as f64 * chi).sin()
			});
		let d_lambda = eta_prime.sinh().atan2(xi_prime.cos());

		LngLat {
			lng: self.origin.lng + d_lambda.to_degrees(),
			lat: phi.to_degrees(),
		}
	}
}
