pub mod broadcaster;
pub mod protocol;
pub mod session;

pub use broadcaster::ChatBroadcaster;
