pub mod easing;
pub mod value;
pub mod error;
pub mod playback;
pub mod tween;
pub mod sequence;
pub mod playable;
pub mod scheduler;
pub mod builder;
pub mod binding;
pub mod time;
pub mod config;

// Re-export key types at crate root for convenience
pub use easing::{Easing, EasingCurve, EasingFn};
pub use value::{ease, lerp, Color, Lerp};
pub use error::TweenError;
pub use playback::{LoopCount, LoopMode, PlaybackState};
pub use tween::Tween;
pub use sequence::{InsertMode, Sequence};
pub use playable::Playable;
pub use scheduler::{CallbackFault, Scheduler, SchedulerHandle, TickReport, TweenId};
pub use builder::{create_sequence, tween_property, tween_value, SequenceBuilder, TweenBuilder};
pub use binding::{tween_field, tween_shared};
pub use time::FixedTimestep;
pub use config::SchedulerConfig;
