//! Agent module — the intake message loop and lead dispatch.

pub mod agent_loop;
pub mod dispatch;

pub use agent_loop::{APOLOGY, IntakeAgent};
pub use dispatch::{DispatchReport, ForwardOutcome, IntakeDeps, dispatch_completion};
