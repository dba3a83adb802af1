mod profile;
mod role;
mod session;

pub use profile::{Profile, SignUp};
pub use role::Role;
pub use session::{Claims, Identity, TokenGrant};
