//! Local copy of the sign-up state of a MACI contract, generated from its logs.

mod event_log_report;
mod local_maci_state;
mod local_state_generator;

pub use event_log_report::{EventLogReport, ReplayedAction};
pub use local_maci_state::{LocalMaciState, PollJoinedRecord, PollState};
pub use local_state_generator::{GeneratedLocalState, LocalStateGenerator, LocalStateRequest};
