//! System-wide constants for the encouragement contract.

/// Allocation keyword under which tips are escrowed.
pub const TIP_KEYWORD: &str = "Tip";

/// Default encouragement handed to everyone.
pub const DEFAULT_BASIC_MESSAGE: &str = "You're doing great!";

/// Default encouragement for tippers and first contact over a connection.
pub const DEFAULT_PREMIUM_MESSAGE: &str = "Wow, just wow. I have never seen such talent!";

/// Minimum tip (in whole units) that earns the premium message.
pub const DEFAULT_PREMIUM_THRESHOLD: u64 = 1;

/// Reason attached to user offers rejected while no admin offer is active.
pub const NO_LONGER_GIVING: &str = "We are no longer giving encouragement";

/// Reply returned when the admin invitation is redeemed.
pub const ADMIN_REDEEMED: &str = "admin invite redeemed";

/// Invitation description for the admin invitation.
pub const ADMIN_INVITATION_DESC: &str = "admin";

/// Invitation description for user invitations.
pub const ENCOURAGEMENT_INVITATION_DESC: &str = "encouragement";

/// Default port for the connection front door.
pub const DEFAULT_LISTEN_PORT: u16 = 7447;

/// Longest inbound frame (excluding the newline) the listener accepts.
pub const MAX_FRAME_LEN: usize = 64 * 1024;

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Contract name, used in connection greetings.
pub const CONTRACT_NAME: &str = "encouragement dapp";
