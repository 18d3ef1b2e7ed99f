pub mod admin_gate;
pub mod flush_cookies;
pub mod session_scope;
pub mod site_resolver;

pub use admin_gate::admin_entry_gate_middleware;
pub use flush_cookies::flush_cookies_middleware;
pub use session_scope::bind_session_scope_middleware;
pub use site_resolver::{resolve_site_middleware, resolve_site_optional_middleware};
