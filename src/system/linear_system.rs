use crate::error::{LinsysError, Result};
use crate::scalar::decimal::Decimal;
use crate::system::plane::Plane;
use itertools::Itertools;
use num_traits::One;
use pyo3::prelude::*;
use std::fmt;
use std::ops::Index;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Solvability {
    NoSolution,
    InfinitelyManySolutions,
    UniqueSolution,
}

impl fmt::Display for Solvability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Solvability::NoSolution => write!(f, "No solutions"),
            Solvability::InfinitelyManySolutions => write!(f, "Infinitely many solutions"),
            Solvability::UniqueSolution => write!(f, "Unique solution"),
        }
    }
}

/// An ordered list of equations living in the same dimension.
#[pyclass]
#[derive(Debug, Clone, PartialEq)]
pub struct LinearSystem {
    planes: Vec<Plane>,
    dimension: usize,
}

impl LinearSystem {
    pub fn new(planes: Vec<Plane>) -> Result<LinearSystem> {
        let dimension = planes.first().ok_or(LinsysError::EmptyInput)?.dimension();
        if let Some(plane) = planes.iter().find(|p| p.dimension() != dimension) {
            return Err(LinsysError::DimensionMismatch {
                expected: dimension,
                found: plane.dimension(),
            });
        }
        Ok(LinearSystem { planes, dimension })
    }

    pub fn len(&self) -> usize {
        self.planes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.planes.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn planes(&self) -> &[Plane] {
        &self.planes
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Plane> {
        self.planes.iter()
    }

    fn check_row(&self, row: usize) -> Result<()> {
        if row >= self.len() {
            return Err(LinsysError::RowOutOfRange {
                index: row as isize,
                len: self.len(),
            });
        }
        Ok(())
    }

    /// Resolves a Python-style row index, negative values counting from the end.
    pub fn resolve_row(&self, row: isize) -> Result<usize> {
        let resolved = if row < 0 {
            row + self.len() as isize
        } else {
            row
        };
        usize::try_from(resolved)
            .ok()
            .filter(|&r| r < self.len())
            .ok_or(LinsysError::RowOutOfRange {
                index: row,
                len: self.len(),
            })
    }

    pub fn get(&self, row: usize) -> Result<&Plane> {
        self.check_row(row)?;
        Ok(&self.planes[row])
    }

    pub fn set(&mut self, row: usize, plane: Plane) -> Result<()> {
        self.check_row(row)?;
        if plane.dimension() != self.dimension {
            return Err(LinsysError::DimensionMismatch {
                expected: self.dimension,
                found: plane.dimension(),
            });
        }
        self.planes[row] = plane;
        Ok(())
    }

    pub fn swap_rows(&mut self, row1: usize, row2: usize) -> Result<()> {
        self.check_row(row1)?;
        self.check_row(row2)?;
        self.planes.swap(row1, row2);
        Ok(())
    }

    /// Scales both sides of the equation at `row`. A zero coefficient is accepted and
    /// leaves the degenerate equation `0 = 0`.
    pub fn multiply_coefficient_and_row(
        &mut self,
        coefficient: &Decimal,
        row: usize,
    ) -> Result<()> {
        self.check_row(row)?;
        self.planes[row] = self.planes[row].times_scalar(coefficient);
        Ok(())
    }

    pub fn add_multiple_times_row_to_row(
        &mut self,
        coefficient: &Decimal,
        row_to_add: usize,
        row_to_be_added_to: usize,
    ) -> Result<()> {
        self.check_row(row_to_add)?;
        self.check_row(row_to_be_added_to)?;

        let source = &self.planes[row_to_add];
        let target = &self.planes[row_to_be_added_to];
        let normal_vector = source
            .normal_vector()
            .times_scalar(coefficient)
            .plus(target.normal_vector())?;
        let constant_term = source.constant_term() * coefficient + target.constant_term();

        self.planes[row_to_be_added_to] = Plane::new(normal_vector, constant_term);
        Ok(())
    }

    /// Column of the leading coefficient of every row, `None` for degenerate rows.
    pub fn indices_of_first_nonzero_terms_in_each_row(&self) -> Vec<Option<usize>> {
        self.planes
            .iter()
            .map(|p| match Plane::first_nonzero_index(p.normal_vector()) {
                Ok(index) => Some(index),
                Err(_) => None,
            })
            .collect()
    }

    fn coefficient(&self, row: usize, col: usize) -> &Decimal {
        &self.planes[row].normal_vector()[col]
    }

    /// Row-echelon form of the system, computed on a copy.
    ///
    /// Walks a `(row, col)` cursor: a near-zero pivot is replaced by the first row below
    /// with a usable coefficient in that column, or the column is skipped when there is
    /// none. Pivots are not normalized to one.
    pub fn compute_triangular_form(&self) -> Result<LinearSystem> {
        let mut system = self.clone();
        log::debug!(
            "computing triangular form of {} equations in {} variables",
            system.len(),
            system.dimension
        );

        let mut col = 0;
        for row in 0..system.len() {
            while col < system.dimension {
                if system.coefficient(row, col).is_near_zero()
                    && !system.swap_with_row_below_for_nonzero_coefficient(row, col)?
                {
                    col += 1;
                    continue;
                }
                system.clear_coefficients_below(row, col)?;
                col += 1;
                break;
            }
        }

        log::debug!(
            "leading terms: {:?}",
            system.indices_of_first_nonzero_terms_in_each_row()
        );
        Ok(system)
    }

    fn swap_with_row_below_for_nonzero_coefficient(
        &mut self,
        row: usize,
        col: usize,
    ) -> Result<bool> {
        let candidate =
            (row + 1..self.len()).find(|&k| !self.coefficient(k, col).is_near_zero());
        match candidate {
            Some(k) => {
                log::trace!("swapping rows {} and {} for column {}", row, k, col);
                self.swap_rows(row, k)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn clear_coefficients_below(&mut self, row: usize, col: usize) -> Result<()> {
        let pivot = self.coefficient(row, col).clone();
        for k in row + 1..self.len() {
            let alpha = -(self.coefficient(k, col) / &pivot);
            log::trace!("adding {} times row {} to row {}", alpha, row, k);
            self.add_multiple_times_row_to_row(&alpha, row, k)?;
        }
        Ok(())
    }

    /// Reduced row-echelon form: the triangular form with every pivot scaled to one and
    /// cleared from the rows above it.
    pub fn compute_rref(&self) -> Result<LinearSystem> {
        let mut system = self.compute_triangular_form()?;
        let pivots = system.indices_of_first_nonzero_terms_in_each_row();

        for (row, pivot) in pivots.into_iter().enumerate().rev() {
            let Some(col) = pivot else {
                continue;
            };
            let scale = Decimal::one() / system.coefficient(row, col);
            system.multiply_coefficient_and_row(&scale, row)?;
            for above in 0..row {
                let alpha = -system.coefficient(above, col).clone();
                system.add_multiple_times_row_to_row(&alpha, row, above)?;
            }
        }
        Ok(system)
    }

    /// Leading terms strictly move right and degenerate rows come last.
    pub fn is_triangular_form(&self) -> bool {
        let mut previous = None;
        let mut seen_degenerate = false;
        for pivot in self.indices_of_first_nonzero_terms_in_each_row() {
            match (pivot, previous) {
                (None, _) => seen_degenerate = true,
                (Some(_), _) if seen_degenerate => return false,
                (Some(col), Some(prev)) if col <= prev => return false,
                (Some(col), _) => previous = Some(col),
            }
        }
        true
    }

    /// Classifies the solution set from the triangular form: a `0 = k` row with `k != 0`
    /// means no solution, fewer pivots than variables means infinitely many.
    pub fn solvability(&self) -> Result<Solvability> {
        let triangular = self.compute_triangular_form()?;
        let pivots = triangular.indices_of_first_nonzero_terms_in_each_row();

        let contradiction = triangular
            .iter()
            .zip(&pivots)
            .any(|(plane, pivot)| pivot.is_none() && !plane.constant_term().is_near_zero());
        if contradiction {
            return Ok(Solvability::NoSolution);
        }
        if pivots.iter().flatten().count() < self.dimension {
            return Ok(Solvability::InfinitelyManySolutions);
        }
        Ok(Solvability::UniqueSolution)
    }
}

impl Index<usize> for LinearSystem {
    type Output = Plane;

    fn index(&self, row: usize) -> &Plane {
        &self.planes[row]
    }
}

impl fmt::Display for LinearSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Linear System:")?;
        write!(
            f,
            "{}",
            self.planes
                .iter()
                .enumerate()
                .map(|(i, p)| format!("Equation {}: {}", i + 1, p))
                .join("\n")
        )
    }
}

// --------------------------------------------------
//                      PYTHON
// --------------------------------------------------

#[pymethods]
impl LinearSystem {
    #[new]
    fn py_new(planes: Vec<Plane>) -> PyResult<Self> {
        Ok(LinearSystem::new(planes)?)
    }

    #[getter(dimension)]
    fn py_dimension(&self) -> usize {
        self.dimension
    }

    fn __len__(&self) -> usize {
        self.len()
    }

    fn __getitem__(&self, row: isize) -> PyResult<Plane> {
        Ok(self.get(self.resolve_row(row)?)?.clone())
    }

    fn __setitem__(&mut self, row: isize, plane: Plane) -> PyResult<()> {
        Ok(self.set(self.resolve_row(row)?, plane)?)
    }

    fn __str__(&self) -> String {
        self.to_string()
    }

    #[pyo3(name = "swap_rows")]
    fn py_swap_rows(&mut self, row1: usize, row2: usize) -> PyResult<()> {
        Ok(self.swap_rows(row1, row2)?)
    }

    #[pyo3(name = "multiply_coefficient_and_row")]
    fn py_multiply_coefficient_and_row(
        &mut self,
        coefficient: Decimal,
        row: usize,
    ) -> PyResult<()> {
        Ok(self.multiply_coefficient_and_row(&coefficient, row)?)
    }

    #[pyo3(name = "add_multiple_times_row_to_row")]
    fn py_add_multiple_times_row_to_row(
        &mut self,
        coefficient: Decimal,
        row_to_add: usize,
        row_to_be_added_to: usize,
    ) -> PyResult<()> {
        Ok(self.add_multiple_times_row_to_row(
            &coefficient,
            row_to_add,
            row_to_be_added_to,
        )?)
    }

    // degenerate rows are reported as -1
    #[pyo3(name = "indices_of_first_nonzero_terms_in_each_row")]
    fn py_indices_of_first_nonzero_terms_in_each_row(&self) -> Vec<i64> {
        self.indices_of_first_nonzero_terms_in_each_row()
            .into_iter()
            .map(|index| index.map_or(-1, |i| i as i64))
            .collect()
    }

    #[pyo3(name = "compute_triangular_form")]
    fn py_compute_triangular_form(&self) -> PyResult<LinearSystem> {
        Ok(self.compute_triangular_form()?)
    }

    #[pyo3(name = "compute_rref")]
    fn py_compute_rref(&self) -> PyResult<LinearSystem> {
        Ok(self.compute_rref()?)
    }

    #[pyo3(name = "is_triangular_form")]
    fn py_is_triangular_form(&self) -> bool {
        self.is_triangular_form()
    }

    #[pyo3(name = "solvability")]
    fn py_solvability(&self) -> PyResult<String> {
        Ok(self.solvability()?.to_string())
    }
}

// --------------------------------------------------
//                      TESTS
// --------------------------------------------------
