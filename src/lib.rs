use pyo3::prelude::*;

pub mod error;
pub mod scalar {
    pub mod decimal;
}
pub mod vector {
    pub mod vector;
}
pub mod system {
    pub mod linear_system;
    pub mod plane;
}

pub use error::{LinsysError, Result};
pub use scalar::decimal::Decimal;
pub use system::linear_system::{LinearSystem, Solvability};
pub use system::plane::Plane;
pub use vector::vector::{AngleUnit, Vector};

/// A Python module implemented in Rust.
#[pymodule]
fn rust_linsys(_py: Python, m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<vector::vector::Vector>()?;
    m.add_class::<system::plane::Plane>()?;
    m.add_class::<system::linear_system::LinearSystem>()?;
    m.add("DEFAULT_DIMENSION", system::plane::DEFAULT_DIMENSION)?;
    m.add("NO_SOLUTIONS_MSG", Solvability::NoSolution.to_string())?;
    m.add(
        "INF_SOLUTIONS_MSG",
        Solvability::InfinitelyManySolutions.to_string(),
    )?;
    Ok(())
}
