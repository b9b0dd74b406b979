pub mod animation;
pub mod camera;
pub mod clock;
pub mod error;
pub mod factory;
pub mod lifecycle;
pub mod math;
pub mod mesh;
pub mod render;
pub mod scene;
pub mod surface;
pub mod viewport;

pub use animation::{AnimationDriver, AnimationHandle, FrameScheduler};
pub use error::{DrawError, MountError, SetupError};
pub use factory::{GeometryKind, SceneObject};
pub use lifecycle::{Backdrop, LifecycleState, DEFAULT_OBJECT_COUNT};
pub use scene::SceneGraph;
pub use surface::{DrawTarget, SurfaceBinder};
pub use viewport::Viewport;
