//! Bot command replies and pipeline lifecycle

mod lifecycle;
mod reply;

pub use lifecycle::{Lifecycle, LifecycleStatus};
pub use reply::{
    CommandReply, EMPTY_QUESTION_MESSAGE, GENERIC_FAILURE_MESSAGE, MESSAGE_LIMIT,
    NOT_READY_MESSAGE, format_answer, refresh_failed, refresh_succeeded, truncate_chars,
};
