//! Errors reported while building a scene or running a simulation.

// others
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FluoError {
    #[error("No tissue volume configured!")]
    NoVolume,
    #[error("No fiber configured!")]
    NoLights,
    #[error("No sensors configured!")]
    NoSensors,
    #[error("No \"density\" values provided for volume grid")]
    MissingDensity,
    #[error("Volume grid has {found} density values but nx*ny*nz = {expected}")]
    DensityCountMismatch { found: usize, expected: usize },
    #[error("Monte Carlo fluorescence needs an \"interface\" sensor")]
    MissingInterface,
    #[error("Monte Carlo fluorescence needs a \"detector\" sensor")]
    MissingDetector,
    #[error("Volume format {0:?} unknown, use \"raw\" or \"pbrt\"")]
    UnknownFormat(String),
    #[error("{kind} {name:?} unknown")]
    UnknownName { kind: String, name: String },
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("The fluorescence integrators can only use laser beams")]
    NonLaserLight,
    #[error("The single scattering fluorescence integrator only works with cleared fluorescent volumes")]
    NonClearedVolume,
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Image(#[from] image::ImageError),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("A worker thread panicked")]
    WorkerPanic,
}

impl FluoError {
    /// A required scene element is missing. The batch simulators end
    /// the run successfully in that case.
    pub fn is_missing_requirement(&self) -> bool {
        matches!(
            self,
            FluoError::NoVolume | FluoError::NoLights | FluoError::NoSensors
        )
    }
}

pub type Result<T> = std::result::Result<T, FluoError>;
