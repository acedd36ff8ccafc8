// JSON response fixtures for API mocking
// Allow dead code since fixtures are used by different test files compiled separately
#![allow(dead_code)]

/// Sign endpoint: reward claimed just now
pub const SIGN_SUCCESS: &str = r#"{
    "retcode": 0,
    "message": "OK",
    "data": {
        "code": "",
        "first_bind": false,
        "gt_result": {
            "risk_code": 0,
            "gt": "",
            "challenge": "",
            "success": 0,
            "is_risk": false
        }
    }
}"#;

/// Sign endpoint: today's reward was already claimed
pub const SIGN_ALREADY_CLAIMED: &str = r#"{
    "retcode": -5003,
    "message": "Traveler, you've already checked in today~",
    "data": null
}"#;

/// Sign endpoint: cookie rejected
pub const SIGN_NOT_LOGGED_IN: &str = r#"{
    "retcode": -100,
    "message": "Please log in",
    "data": null
}"#;

/// Sign endpoint: response without a retcode
pub const SIGN_NO_RETCODE: &str = r#"{
    "message": "unexpected",
    "data": {}
}"#;

/// Saved config file as written by the app
pub const CONFIG_JSON: &str = r#"{
    "ltuid_v2": "123456789",
    "ltoken_v2": "v2_CAISDGNpZXc"
}"#;
