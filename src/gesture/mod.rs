pub mod history;
pub mod labels;
pub mod normalize;
pub mod smoother;

pub use history::{DEFAULT_HISTORY_LEN, PointHistory};
pub use labels::{LabelError, LabelSet, UNKNOWN_GESTURE};
pub use normalize::{STATIC_FEATURE_LEN, normalize_landmarks};
pub use smoother::GestureSmoother;
