pub mod abort;
pub mod matcher;
pub mod replace;
pub mod status;

pub use abort::AbortFlag;
pub use matcher::{RegexEngineOpts, RegexMatcher};
pub use replace::{apply_plan, plan_in_str, Confirm, Decision, EditOp, Proposal, ReplaceAll, ReplacePlan};
pub use status::StatusLine;
