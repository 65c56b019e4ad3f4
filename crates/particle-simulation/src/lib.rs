//! # Particle Simulation
//!
//! The shared particle update rule run two ways: by a compute kernel over a
//! device buffer ([`GpuBackend`]) and by a host loop whose result is uploaded
//! every frame ([`CpuBackend`]). Both implement [`Backend`].

pub mod backend;
pub mod cpu_backend;
pub mod device;
pub mod error;
pub mod gpu_backend;
pub mod host;
pub mod storage;

pub use backend::*;
pub use cpu_backend::*;
pub use device::*;
pub use error::*;
pub use gpu_backend::*;
pub use host::*;
pub use storage::*;
