pub mod enums;
pub mod event;
pub mod upstream;

pub use enums::{EventStatus, EventType};
pub use event::{TimelineEvent, TimelinePage};
pub use upstream::{Fetched, UpstreamSource};
