pub mod scheduler;
pub mod session;
pub mod store;

pub use scheduler::{IntervalPreview, ScheduleResult, Scheduler, SchedulerConfig, SchedulerConfigError};
pub use session::{ReviewSession, SessionError, SessionStatus, SessionView, SlotState};
pub use store::{CardStore, StoreError};
