use crate::error::{LinsysError, Result};
use crate::scalar::decimal::{Decimal, NEAR_ZERO_TOLERANCE};
use itertools::Itertools;
use num_traits::{One, Zero};
use pyo3::prelude::*;
use std::f64::consts::PI;
use std::fmt;
use std::ops::Index;

// Tolerance, in radians, of the 0 / pi comparison in `is_parallel`
const ANGLE_TOLERANCE: f64 = 1e-10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AngleUnit {
    Radians,
    Degrees,
}

/// Immutable vector of fixed dimension. Every operation returns a new vector.
#[pyclass(frozen)]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Vector {
    coordinates: Vec<Decimal>,
}

impl Vector {
    pub fn new(coordinates: Vec<Decimal>) -> Result<Vector> {
        if coordinates.is_empty() {
            return Err(LinsysError::EmptyInput);
        }
        Ok(Vector { coordinates })
    }

    /// Builds a vector from numeric literals such as `"1"`, `"-0.5"` or `"1e-3"`.
    pub fn parse<I, S>(literals: I) -> Result<Vector>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Vector::new(
            literals
                .into_iter()
                .map(|literal| literal.as_ref().parse())
                .collect::<Result<_>>()?,
        )
    }

    pub fn zero(dimension: usize) -> Result<Vector> {
        Vector::new(vec![Decimal::zero(); dimension])
    }

    pub fn dimension(&self) -> usize {
        self.coordinates.len()
    }

    pub fn coordinates(&self) -> &[Decimal] {
        &self.coordinates
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Decimal> {
        self.coordinates.iter()
    }

    fn check_dimension(&self, v: &Vector) -> Result<()> {
        if self.dimension() != v.dimension() {
            return Err(LinsysError::DimensionMismatch {
                expected: self.dimension(),
                found: v.dimension(),
            });
        }
        Ok(())
    }

    fn zip_with(&self, v: &Vector, f: impl Fn(&Decimal, &Decimal) -> Decimal) -> Result<Vector> {
        self.check_dimension(v)?;
        Ok(Vector {
            coordinates: self.iter().zip(v.iter()).map(|(x, y)| f(x, y)).collect(),
        })
    }

    pub fn plus(&self, v: &Vector) -> Result<Vector> {
        self.zip_with(v, |x, y| x + y)
    }

    pub fn minus(&self, v: &Vector) -> Result<Vector> {
        self.zip_with(v, |x, y| x - y)
    }

    pub fn times_scalar(&self, c: &Decimal) -> Vector {
        Vector {
            coordinates: self.iter().map(|x| c * x).collect(),
        }
    }

    pub fn dot(&self, v: &Vector) -> Result<Decimal> {
        self.check_dimension(v)?;
        Ok(self.iter().zip(v.iter()).map(|(x, y)| x * y).sum())
    }

    pub fn magnitude(&self) -> Decimal {
        self.iter().map(|x| x * x).sum::<Decimal>().sqrt()
    }

    /// Fails only when the magnitude is exactly zero; tiny vectors still normalize.
    pub fn normalize(&self) -> Result<Vector> {
        let inverse = Decimal::one()
            .checked_div(&self.magnitude())
            .ok_or(LinsysError::ZeroVectorNormalization)?;
        Ok(self.times_scalar(&inverse))
    }

    pub fn is_zero(&self) -> bool {
        self.is_zero_within(&NEAR_ZERO_TOLERANCE)
    }

    pub fn is_zero_within(&self, tolerance: &Decimal) -> bool {
        self.magnitude() < *tolerance
    }

    pub fn is_orthogonal(&self, v: &Vector) -> Result<bool> {
        self.is_orthogonal_within(v, &NEAR_ZERO_TOLERANCE)
    }

    pub fn is_orthogonal_within(&self, v: &Vector, tolerance: &Decimal) -> Result<bool> {
        Ok(self.dot(v)?.is_near_zero_within(tolerance))
    }

    pub fn angle_with(&self, v: &Vector, unit: AngleUnit) -> Result<f64> {
        self.check_dimension(v)?;
        let no_angle = |error: LinsysError| match error {
            LinsysError::ZeroVectorNormalization => LinsysError::ZeroVectorAngle,
            other => other,
        };
        let u1 = self.normalize().map_err(no_angle)?;
        let u2 = v.normalize().map_err(no_angle)?;

        // rounding may push the cosine slightly outside of [-1, 1]
        let cosine = u1.dot(&u2)?.clamp(-Decimal::one(), Decimal::one());
        let angle = cosine.to_f64().acos();
        Ok(match unit {
            AngleUnit::Radians => angle,
            AngleUnit::Degrees => angle.to_degrees(),
        })
    }

    /// The zero vector is parallel to everything.
    pub fn is_parallel(&self, v: &Vector) -> Result<bool> {
        self.check_dimension(v)?;
        // must short-circuit: the angle is undefined for zero vectors
        if self.is_zero() || v.is_zero() {
            return Ok(true);
        }
        let angle = self.angle_with(v, AngleUnit::Radians)?;
        Ok(angle < ANGLE_TOLERANCE || (angle - PI).abs() < ANGLE_TOLERANCE)
    }

    /// Projection of `self` onto `basis`.
    pub fn component_parallel_to(&self, basis: &Vector) -> Result<Vector> {
        self.check_dimension(basis)?;
        let unit = basis.normalize()?;
        let weight = self.dot(&unit)?;
        Ok(unit.times_scalar(&weight))
    }

    pub fn component_orthogonal_to(&self, basis: &Vector) -> Result<Vector> {
        self.minus(&self.component_parallel_to(basis)?)
    }
}

impl Index<usize> for Vector {
    type Output = Decimal;

    fn index(&self, index: usize) -> &Decimal {
        &self.coordinates[index]
    }
}

impl<'a> IntoIterator for &'a Vector {
    type Item = &'a Decimal;
    type IntoIter = std::slice::Iter<'a, Decimal>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Display for Vector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Vector: ({})", self.coordinates.iter().join(", "))
    }
}

// --------------------------------------------------
//                      PYTHON
// --------------------------------------------------

#[pymethods]
impl Vector {
    #[new]
    fn py_new(coordinates: &Bound<'_, PyAny>) -> PyResult<Self> {
        let items = coordinates
            .try_iter()
            .map_err(|_| LinsysError::NonIterableInput)?;
        let coordinates = items
            .map(|item| item?.extract::<Decimal>())
            .collect::<PyResult<Vec<_>>>()?;
        Ok(Vector::new(coordinates)?)
    }

    #[getter(coordinates)]
    fn py_coordinates(&self) -> Vec<f64> {
        self.iter().map(Decimal::to_f64).collect()
    }

    #[getter(dimension)]
    fn py_dimension(&self) -> usize {
        self.dimension()
    }

    fn __len__(&self) -> usize {
        self.dimension()
    }

    fn __str__(&self) -> String {
        self.to_string()
    }

    fn __repr__(&self) -> String {
        self.to_string()
    }

    fn __eq__(&self, other: &Vector) -> bool {
        self == other
    }

    #[pyo3(name = "plus")]
    fn py_plus(&self, v: &Vector) -> PyResult<Vector> {
        Ok(self.plus(v)?)
    }

    #[pyo3(name = "minus")]
    fn py_minus(&self, v: &Vector) -> PyResult<Vector> {
        Ok(self.minus(v)?)
    }

    #[pyo3(name = "times_scalar")]
    fn py_times_scalar(&self, c: Decimal) -> Vector {
        self.times_scalar(&c)
    }

    fn __mul__(&self, c: Decimal) -> Vector {
        self.times_scalar(&c)
    }

    #[pyo3(name = "dot")]
    fn py_dot(&self, v: &Vector) -> PyResult<f64> {
        Ok(self.dot(v)?.to_f64())
    }

    #[pyo3(name = "magnitude")]
    fn py_magnitude(&self) -> f64 {
        self.magnitude().to_f64()
    }

    #[pyo3(name = "normalize")]
    fn py_normalize(&self) -> PyResult<Vector> {
        Ok(self.normalize()?)
    }

    #[pyo3(name = "is_zero", signature = (tolerance=None))]
    fn py_is_zero(&self, tolerance: Option<Decimal>) -> bool {
        match tolerance {
            Some(tolerance) => self.is_zero_within(&tolerance),
            None => self.is_zero(),
        }
    }

    #[pyo3(name = "is_orthogonal", signature = (v, tolerance=None))]
    fn py_is_orthogonal(&self, v: &Vector, tolerance: Option<Decimal>) -> PyResult<bool> {
        Ok(match tolerance {
            Some(tolerance) => self.is_orthogonal_within(v, &tolerance)?,
            None => self.is_orthogonal(v)?,
        })
    }

    #[pyo3(name = "angle_with", signature = (v, in_degrees=false))]
    fn py_angle_with(&self, v: &Vector, in_degrees: bool) -> PyResult<f64> {
        let unit = if in_degrees {
            AngleUnit::Degrees
        } else {
            AngleUnit::Radians
        };
        Ok(self.angle_with(v, unit)?)
    }

    #[pyo3(name = "is_parallel")]
    fn py_is_parallel(&self, v: &Vector) -> PyResult<bool> {
        Ok(self.is_parallel(v)?)
    }

    #[pyo3(name = "component_parallel_to")]
    fn py_component_parallel_to(&self, basis: &Vector) -> PyResult<Vector> {
        Ok(self.component_parallel_to(basis)?)
    }

    #[pyo3(name = "component_orthogonal_to")]
    fn py_component_orthogonal_to(&self, basis: &Vector) -> PyResult<Vector> {
        Ok(self.component_orthogonal_to(basis)?)
    }
}

// --------------------------------------------------
//                      TESTS
// --------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::Rng;

    fn v(literals: &[&str]) -> Vector {
        Vector::parse(literals).unwrap()
    }

    fn assert_coordinates_eq(vector: &Vector, expected: &[f64]) {
        assert_eq!(vector.dimension(), expected.len());
        for (x, e) in vector.iter().zip(expected) {
            assert_abs_diff_eq!(x.to_f64(), *e, epsilon = 1e-9);
        }
    }

    fn random_vector(rng: &mut impl Rng, dimension: usize) -> Vector {
        let thousand = Decimal::from(1000);
        Vector::new(
            (0..dimension)
                .map(|_| Decimal::from(rng.gen_range(-10000..10000)) / &thousand)
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_vector_construction() {
        assert_eq!(Vector::new(vec![]), Err(LinsysError::EmptyInput));
        assert_eq!(Vector::parse(Vec::<&str>::new()), Err(LinsysError::EmptyInput));
        assert_eq!(Vector::zero(0), Err(LinsysError::EmptyInput));
        assert_eq!(
            Vector::parse(["1", "x"]),
            Err(LinsysError::InvalidLiteral("x".into()))
        );

        let a = v(&["1", "-2.5", "3"]);
        assert_eq!(a.dimension(), 3);
        assert_eq!(a[1], "-2.5".parse::<Decimal>().unwrap());
        assert_eq!(a.to_string(), "Vector: (1, -2.5, 3)");
        assert_eq!(Vector::zero(2).unwrap().to_string(), "Vector: (0, 0)");
    }

    #[test]
    fn test_vector_arithmetic() {
        let v1 = v(&["8.218", "-9.341"]);
        let v2 = v(&["-1.129", "2.111"]);
        assert_eq!(v1.plus(&v2).unwrap(), v(&["7.089", "-7.23"]));

        let v3 = v(&["7.119", "8.215"]);
        let v4 = v(&["-8.223", "0.878"]);
        assert_eq!(v3.minus(&v4).unwrap(), v(&["15.342", "7.337"]));

        let v5 = v(&["1.671", "-1.012", "-0.318"]);
        assert_eq!(
            v5.times_scalar(&"7.41".parse().unwrap()),
            v(&["12.38211", "-7.49892", "-2.35638"])
        );

        assert_eq!(
            v1.plus(&v5),
            Err(LinsysError::DimensionMismatch {
                expected: 2,
                found: 3
            })
        );
        assert!(v1.minus(&v5).is_err());
        assert!(v1.dot(&v5).is_err());
    }

    #[test]
    fn test_vector_dot_and_magnitude() {
        assert_eq!(
            v(&["7.887", "4.138"]).dot(&v(&["-8.802", "6.776"])).unwrap(),
            "-41.382286".parse::<Decimal>().unwrap()
        );
        assert_eq!(
            v(&["-5.955", "-4.904", "-1.874"])
                .dot(&v(&["-4.496", "-8.755", "7.103"]))
                .unwrap(),
            "56.397178".parse::<Decimal>().unwrap()
        );

        assert_eq!(v(&["3", "4"]).magnitude(), Decimal::from(5));
        assert_abs_diff_eq!(
            v(&["-0.221", "7.437"]).magnitude().to_f64(),
            7.440282924728065,
            epsilon = 1e-12
        );
        assert_abs_diff_eq!(
            v(&["8.813", "-1.331", "-6.247"]).magnitude().to_f64(),
            10.884187567292289,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_vector_normalize() {
        assert_coordinates_eq(
            &v(&["5.581", "-2.136"]).normalize().unwrap(),
            &[0.9339352140866403, -0.35744232526233],
        );
        assert_coordinates_eq(
            &v(&["1.996", "3.108", "-4.554"]).normalize().unwrap(),
            &[0.3404012959433014, 0.5300437012984873, -0.7766470449528028],
        );
        assert_eq!(
            Vector::zero(3).unwrap().normalize(),
            Err(LinsysError::ZeroVectorNormalization)
        );

        // below the zero tolerance but still normalizable
        let tiny = v(&["1e-12", "0"]);
        assert!(tiny.is_zero());
        assert_eq!(tiny.normalize().unwrap(), v(&["1", "0"]));

        // squares below the last kept digit vanish
        assert_eq!(
            v(&["1e-25"]).normalize(),
            Err(LinsysError::ZeroVectorNormalization)
        );
    }

    #[test]
    fn test_vector_angle() {
        assert_abs_diff_eq!(
            v(&["3.183", "-7.627"])
                .angle_with(&v(&["-2.668", "5.319"]), AngleUnit::Radians)
                .unwrap(),
            3.0720263098372476,
            epsilon = 1e-9
        );
        assert_abs_diff_eq!(
            v(&["7.35", "0.221", "5.188"])
                .angle_with(&v(&["2.751", "8.259", "3.985"]), AngleUnit::Degrees)
                .unwrap(),
            60.27581120523091,
            epsilon = 1e-9
        );
        assert_eq!(
            v(&["1", "1"]).angle_with(&v(&["2", "2"]), AngleUnit::Radians),
            Ok(0.0)
        );
        assert_eq!(
            v(&["1", "1"]).angle_with(&v(&["-3", "-3"]), AngleUnit::Radians),
            Ok(PI)
        );
        assert_eq!(
            v(&["1", "1"]).angle_with(&v(&["0", "0"]), AngleUnit::Radians),
            Err(LinsysError::ZeroVectorAngle)
        );
        assert_eq!(
            v(&["1", "1"]).angle_with(&v(&["0", "0", "1"]), AngleUnit::Radians),
            Err(LinsysError::DimensionMismatch {
                expected: 2,
                found: 3
            })
        );
    }

    #[test]
    fn test_vector_parallel_orthogonal() {
        let cases = [
            (
                v(&["-7.579", "-7.88"]),
                v(&["22.737", "23.64"]),
                true,
                false,
            ),
            (
                v(&["-2.029", "9.97", "4.172"]),
                v(&["-9.231", "-6.639", "-7.245"]),
                false,
                false,
            ),
            (
                v(&["-2.328", "-7.284", "-1.214"]),
                v(&["-1.821", "1.072", "-2.94"]),
                false,
                true,
            ),
            (v(&["2.118", "4.827"]), v(&["0", "0"]), true, true),
        ];
        for (a, b, parallel, orthogonal) in cases {
            assert_eq!(a.is_parallel(&b).unwrap(), parallel, "{} / {}", a, b);
            assert_eq!(b.is_parallel(&a).unwrap(), parallel, "{} / {}", b, a);
            assert_eq!(a.is_orthogonal(&b).unwrap(), orthogonal, "{} / {}", a, b);
        }

        let zero = Vector::zero(2).unwrap();
        assert!(zero.is_parallel(&zero).unwrap());
        assert!(v(&["1e-12", "0"]).is_parallel(&v(&["0", "1"])).unwrap());
        assert!(v(&["1", "2"]).is_parallel(&zero.plus(&v(&["1", "2"])).unwrap()).unwrap());
        assert!(v(&["0.001", "0"])
            .is_orthogonal_within(&v(&["1", "0"]), &"0.01".parse().unwrap())
            .unwrap());
        assert!(!v(&["0.001", "0"]).is_zero());
        assert!(v(&["0.001", "0"]).is_zero_within(&"0.01".parse().unwrap()));
    }

    #[test]
    fn test_vector_projection() {
        let a = v(&["3.039", "1.879"]);
        let basis = v(&["0.825", "2.036"]);
        assert_coordinates_eq(
            &a.component_parallel_to(&basis).unwrap(),
            &[1.0826069624844668, 2.671742758325302],
        );

        let a = v(&["-9.88", "-3.264", "-8.159"]);
        let basis = v(&["-2.155", "-9.353", "-9.473"]);
        let orthogonal = a.component_orthogonal_to(&basis).unwrap();
        assert_coordinates_eq(
            &orthogonal,
            &[-8.350081043195763, 3.376061254287722, -1.4337460427811841],
        );
        assert!(orthogonal.is_orthogonal(&basis).unwrap());

        let zero = Vector::zero(3).unwrap();
        assert_eq!(
            a.component_parallel_to(&zero),
            Err(LinsysError::ZeroVectorNormalization)
        );
        assert_eq!(
            a.component_orthogonal_to(&zero),
            Err(LinsysError::ZeroVectorNormalization)
        );
    }

    #[test]
    fn test_vector_properties() {
        let mut rng = rand::thread_rng();
        for dimension in 1..=4 {
            for _ in 0..25 {
                let a = random_vector(&mut rng, dimension);
                let b = random_vector(&mut rng, dimension);

                assert_eq!(a.plus(&b).unwrap().minus(&b).unwrap(), a);
                assert_eq!(a.dot(&b).unwrap(), b.dot(&a).unwrap());

                if !a.is_zero() {
                    let unit = a.normalize().unwrap();
                    assert!((unit.magnitude() - Decimal::one()).is_near_zero());
                }
                if !b.is_zero() {
                    let parallel = a.component_parallel_to(&b).unwrap();
                    let orthogonal = a.component_orthogonal_to(&b).unwrap();
                    assert_eq!(parallel.plus(&orthogonal).unwrap(), a);
                    assert!(parallel.is_parallel(&b).unwrap());
                }
            }
        }
    }
}
