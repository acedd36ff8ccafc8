/// Page the login window opens; it redirects to the login dialog when needed.
pub const CHECKIN_URL: &str = "https://www.hoyolab.com/checkin-list";

pub const WINDOW_TITLE: &str = "HoyoDaily Login";
pub const WINDOW_WIDTH: f64 = 600.0;
pub const WINDOW_HEIGHT: f64 = 700.0;

/// Injected into every page load. Polls `document.cookie` once a second and
/// posts the whole string to the host once both session cookies are present.
/// The same string is never posted twice.
pub const COOKIE_WATCH_SCRIPT: &str = r#"
(function () {
    var lastSent = null;
    setInterval(function () {
        var cookies = document.cookie;
        if (cookies === lastSent) {
            return;
        }
        if (cookies.indexOf("ltuid_v2=") !== -1 && cookies.indexOf("ltoken_v2=") !== -1) {
            lastSent = cookies;
            window.ipc.postMessage(cookies);
        }
    }, 1000);
})();
"#;
