use crate::error::{LinsysError, Result};
use crate::scalar::decimal::Decimal;
use crate::vector::vector::Vector;
use num_traits::{One, Zero};
use pyo3::prelude::*;
use std::fmt;

/// Dimension of `Plane::default()`.
pub const DEFAULT_DIMENSION: usize = 3;

/// The linear equation `normal_vector . x = constant_term`.
///
/// Two planes compare equal when their equations are proportional, so `x + y = 1` and
/// `-2x - 2y = -2` are the same plane. Planes whose normal vectors are both degenerate are
/// always equal, whatever their constant terms.
#[pyclass(frozen)]
#[derive(Debug, Clone)]
pub struct Plane {
    normal_vector: Vector,
    constant_term: Decimal,
}

impl Plane {
    pub fn new(normal_vector: Vector, constant_term: Decimal) -> Plane {
        Plane {
            normal_vector,
            constant_term,
        }
    }

    /// The trivial equation `0 = 0`.
    pub fn zero(dimension: usize) -> Result<Plane> {
        Ok(Plane::new(Vector::zero(dimension)?, Decimal::zero()))
    }

    pub fn dimension(&self) -> usize {
        self.normal_vector.dimension()
    }

    pub fn normal_vector(&self) -> &Vector {
        &self.normal_vector
    }

    pub fn constant_term(&self) -> &Decimal {
        &self.constant_term
    }

    /// Index of the first coordinate of `vector` that is not near zero.
    pub fn first_nonzero_index(vector: &Vector) -> Result<usize> {
        vector
            .iter()
            .position(|x| !x.is_near_zero())
            .ok_or(LinsysError::DegenerateRow)
    }

    pub fn is_degenerate(&self) -> bool {
        Plane::first_nonzero_index(&self.normal_vector).is_err()
    }

    pub fn is_parallel_to(&self, plane: &Plane) -> Result<bool> {
        self.normal_vector.is_parallel(&plane.normal_vector)
    }

    /// A point of the plane: zero everywhere but at the first nonzero coefficient.
    pub fn basepoint(&self) -> Result<Vector> {
        let index = Plane::first_nonzero_index(&self.normal_vector)?;
        let mut coordinates = vec![Decimal::zero(); self.dimension()];
        coordinates[index] = &self.constant_term / &self.normal_vector[index];
        Vector::new(coordinates)
    }

    pub fn times_scalar(&self, c: &Decimal) -> Plane {
        Plane::new(self.normal_vector.times_scalar(c), c * &self.constant_term)
    }

    // The same equation with the coefficient at `index` scaled to one
    fn scaled_to_unit_at(&self, index: usize) -> Plane {
        self.times_scalar(&(Decimal::one() / &self.normal_vector[index]))
    }
}

impl Default for Plane {
    fn default() -> Plane {
        Plane::zero(DEFAULT_DIMENSION).expect("default dimension is nonzero")
    }
}

impl PartialEq for Plane {
    fn eq(&self, other: &Plane) -> bool {
        if self.dimension() != other.dimension() {
            return false;
        }
        let index = match (
            Plane::first_nonzero_index(&self.normal_vector),
            Plane::first_nonzero_index(&other.normal_vector),
        ) {
            (Err(_), Err(_)) => return true,
            (Ok(index), Ok(other_index)) if index == other_index => index,
            _ => return false,
        };

        // both sides are brought to a unit leading coefficient, so the test is symmetric
        let (a, b) = (self.scaled_to_unit_at(index), other.scaled_to_unit_at(index));
        a.normal_vector
            .iter()
            .zip(b.normal_vector.iter())
            .all(|(x, y)| (x - y).is_near_zero())
            && (&a.constant_term - &b.constant_term).is_near_zero()
    }
}

impl fmt::Display for Plane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} x = {}", self.normal_vector, self.constant_term)
    }
}

// --------------------------------------------------
//                      PYTHON
// --------------------------------------------------

#[pymethods]
impl Plane {
    #[new]
    #[pyo3(signature = (normal_vector=None, constant_term=None))]
    fn py_new(normal_vector: Option<Vector>, constant_term: Option<Decimal>) -> Self {
        let normal_vector = normal_vector.unwrap_or_else(|| Plane::default().normal_vector);
        Plane::new(normal_vector, constant_term.unwrap_or_default())
    }

    #[getter(normal_vector)]
    fn py_normal_vector(&self) -> Vector {
        self.normal_vector.clone()
    }

    #[getter(constant_term)]
    fn py_constant_term(&self) -> f64 {
        self.constant_term.to_f64()
    }

    #[getter(dimension)]
    fn py_dimension(&self) -> usize {
        self.dimension()
    }

    fn __str__(&self) -> String {
        self.to_string()
    }

    fn __repr__(&self) -> String {
        self.to_string()
    }

    fn __eq__(&self, other: &Plane) -> bool {
        self == other
    }

    #[staticmethod]
    #[pyo3(name = "first_nonzero_index")]
    fn py_first_nonzero_index(vector: &Vector) -> PyResult<usize> {
        Ok(Plane::first_nonzero_index(vector)?)
    }

    #[pyo3(name = "is_parallel_to")]
    fn py_is_parallel_to(&self, plane: &Plane) -> PyResult<bool> {
        Ok(self.is_parallel_to(plane)?)
    }

    #[pyo3(name = "basepoint")]
    fn py_basepoint(&self) -> PyResult<Vector> {
        Ok(self.basepoint()?)
    }
}

// --------------------------------------------------
//                      TESTS
// --------------------------------------------------
