use thiserror::Error;

/// Mount point failures at bind time. Not retried.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountError {
    #[error("mount point is missing")]
    Missing,

    #[error("mount point is already detached")]
    Detached,
}

/// Errors that abort the `Mounting -> Running` transition.
#[derive(Error, Debug)]
pub enum SetupError {
    #[error(transparent)]
    Mount(#[from] MountError),

    /// GPU adapter or device unavailable. Fatal to setup.
    #[error("surface creation failed: {0}")]
    SurfaceCreation(String),

    /// A backdrop instance can only be mounted from the `Unmounted` state.
    #[error("backdrop is already mounted")]
    AlreadyMounted,
}

/// Failures while drawing a single frame.
///
/// A draw error is fatal to its tick: the driver does not schedule a
/// successor and the surrounding host decides whether to log and stop.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DrawError {
    #[error("drawing surface lost")]
    SurfaceLost,

    #[error("GPU out of memory")]
    OutOfMemory,

    #[error("draw failed: {0}")]
    Other(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mount_error_converts_into_setup_error() {
        let err: SetupError = MountError::Missing.into();
        assert!(matches!(err, SetupError::Mount(MountError::Missing)));
    }

    #[test]
    fn errors_format_human_readable_messages() {
        assert_eq!(MountError::Missing.to_string(), "mount point is missing");
        assert_eq!(
            SetupError::SurfaceCreation("no adapter".into()).to_string(),
            "surface creation failed: no adapter"
        );
        assert_eq!(DrawError::SurfaceLost.to_string(), "drawing surface lost");
    }
}
