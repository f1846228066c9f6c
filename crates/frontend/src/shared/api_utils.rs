//! Backend address for API requests

/// Port the backend listens on
pub const BACKEND_PORT: u16 = 3000;

/// `{protocol}//{hostname}:3000` of the current page, empty outside a browser
pub fn api_base() -> String {
    let Some(window) = web_sys::window() else {
        return String::new();
    };
    let location = window.location();
    let protocol = location.protocol().unwrap_or_else(|_| "http:".to_string());
    let hostname = location
        .hostname()
        .unwrap_or_else(|_| "127.0.0.1".to_string());
    format!("{}//{}:{}", protocol, hostname, BACKEND_PORT)
}

/// `path` should start with `/api/`
pub fn api_url(path: &str) -> String {
    format!("{}{}", api_base(), path)
}
