//! API middleware.

mod session_gate;

pub use session_gate::{
    expired_session_cookie, is_resumable, session_cookie, session_gate, session_handle, AllowList,
    CurrentUser,
};
