//! Control protocol for lunalight: line-delimited JSON over TCP.
//!
//! A front-end submits dates and observer locations and reads back the
//! resulting light, camera and illumination state.
//!
//! Start the server in your app:
//! ```ignore
//! let handler = Arc::new(Mutex::new(MyHandler::new()));
//! let _server = ControlServer::start(handler, DEFAULT_PORT);
//! ```

pub mod protocol;
pub mod server;

pub use protocol::*;
pub use server::{ControlHandler, ControlServer};

/// Default control server port
pub const DEFAULT_PORT: u16 = 9742;
