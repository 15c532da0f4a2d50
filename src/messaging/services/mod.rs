//! Application services for the messaging subsystem.
//!
//! Services orchestrate domain operations across the ports, implementing
//! the mutation pipeline, thread resolution, the unread/conversation index,
//! account purging, and send gating.

mod inbox;
mod pipeline;
mod purge;
mod thread;
mod throttle;

pub use inbox::InboxService;
pub use pipeline::{MessagePipeline, SendRequest};
pub use purge::AccountPurge;
pub use thread::ThreadResolver;
pub use throttle::{
    AccessWindow, AccessWindowConfig, OutsideAccessWindow, RateLimitConfig, RateLimited,
    RateLimiter,
};
