//! Identity and session state for the signed-in administrator.
//! Keep the public surface thin and split implementation across sub-modules.

pub mod claims;
mod clock;
mod session;
mod store;
mod user;

pub use claims::{decode, is_expired, Claims, Credential};
pub use clock::{Clock, FixedClock, SystemClock};
pub use session::{HydrateOutcome, Session, SessionManager, SessionStatus};
pub use store::{
    CompanionCookie, FileSessionStore, MemorySessionStore, SessionSlots, SessionStore, COOKIE_NAME, TOKEN_KEY,
    USER_KEY,
};
pub use user::UserRecord;
