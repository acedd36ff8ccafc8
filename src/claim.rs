//! HoYoLAB daily reward claims.

use std::{fmt, time::Duration};

use serde::Deserialize;
use serde_json::json;
use ureq::Agent;

use crate::config::Credential;

/// Browser user agent sent with every claim; the API rejects library agents.
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

pub const REFERER: &str = "https://act.hoyolab.com/";
pub const ORIGIN: &str = "https://act.hoyolab.com";
pub const LANG: &str = "en-us";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Retcode returned when today's reward has already been claimed.
pub const RETCODE_ALREADY_CLAIMED: i64 = -5003;

/// A game with a daily check-in event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Game {
    pub name: &'static str,
    pub act_id: &'static str,
    pub host: &'static str,
    pub path: &'static str,
}

pub const GENSHIN: Game = Game {
    name: "Genshin",
    act_id: "e202102251931481",
    host: "https://sg-hk4e-api.hoyolab.com",
    path: "/event/sol/sign",
};

pub const STAR_RAIL: Game = Game {
    name: "Star Rail",
    act_id: "e202303301540311",
    host: "https://sg-public-api.hoyolab.com",
    path: "/event/luna/os/sign",
};

/// Games claimed on every cycle, in report order.
pub const GAMES: [Game; 2] = [GENSHIN, STAR_RAIL];

/// Result of one game's claim request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimOutcome {
    Success,
    AlreadyClaimed,
    /// The API answered but not with a success code. `None` when the body
    /// carried no usable retcode.
    ApiError(Option<i64>),
    /// The request never got an answer (connect, DNS, timeout).
    NetworkError,
}

impl ClaimOutcome {
    pub fn from_retcode(retcode: i64) -> Self {
        match retcode {
            0 => ClaimOutcome::Success,
            RETCODE_ALREADY_CLAIMED => ClaimOutcome::AlreadyClaimed,
            code => ClaimOutcome::ApiError(Some(code)),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ClaimOutcome::ApiError(_) | ClaimOutcome::NetworkError)
    }
}

impl fmt::Display for ClaimOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClaimOutcome::Success => write!(f, "✅ Success"),
            ClaimOutcome::AlreadyClaimed => write!(f, "👌 Done"),
            ClaimOutcome::ApiError(Some(code)) => write!(f, "❌ Err({})", code),
            ClaimOutcome::ApiError(None) => write!(f, "❌ APIErr"),
            ClaimOutcome::NetworkError => write!(f, "❌ NetErr"),
        }
    }
}

/// Outcome of a full claim cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleReport {
    /// No credential; nothing was sent.
    NeedLogin,
    Completed(Vec<(Game, ClaimOutcome)>),
}

impl CycleReport {
    /// Human-readable summary, e.g. `Genshin: ✅ Success | Star Rail: 👌 Done`.
    pub fn summary(&self) -> String {
        match self {
            CycleReport::NeedLogin => "Need Login".to_string(),
            CycleReport::Completed(results) => results
                .iter()
                .map(|(game, outcome)| format!("{}: {}", game.name, outcome))
                .collect::<Vec<_>>()
                .join(" | "),
        }
    }

    /// A report is worth a notification when something was claimed or failed.
    /// Cycles where everything was already claimed stay silent.
    pub fn should_notify(&self) -> bool {
        match self {
            CycleReport::NeedLogin => false,
            CycleReport::Completed(results) => results
                .iter()
                .any(|(_, o)| *o == ClaimOutcome::Success || o.is_error()),
        }
    }
}

#[derive(Deserialize)]
struct SignResponse {
    retcode: Option<serde_json::Value>,
}

/// Pulls an integer retcode out of a sign response body.
///
/// Integral floats (`-5003.0`) and numeric strings are accepted.
pub fn parse_retcode(body: &str) -> Option<i64> {
    let response: SignResponse = serde_json::from_str(body).ok()?;
    match response.retcode? {
        serde_json::Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[derive(Debug, Clone, Default)]
pub struct ClaimerConfig {
    /// Replaces each game's host; the per-game path is kept.
    pub base_url: Option<String>,
    pub timeout: Option<Duration>,
}

pub struct Claimer {
    agent: Agent,
    base_url: Option<String>,
}

impl Default for Claimer {
    fn default() -> Self {
        Self::new()
    }
}

impl Claimer {
    pub fn new() -> Self {
        Self::with_config(ClaimerConfig::default())
    }

    pub fn with_config(config: ClaimerConfig) -> Self {
        let agent_config = Agent::config_builder()
            .timeout_global(Some(config.timeout.unwrap_or(DEFAULT_TIMEOUT)))
            .http_status_as_error(false)
            .user_agent(USER_AGENT)
            .build();

        Claimer {
            agent: agent_config.into(),
            base_url: config.base_url.map(|url| url.trim_end_matches('/').to_string()),
        }
    }

    pub fn endpoint(&self, game: &Game) -> String {
        let base = self.base_url.as_deref().unwrap_or(game.host);
        format!("{}{}", base, game.path)
    }

    /// Sends the sign request for one game and classifies the answer.
    pub fn claim(&self, game: &Game, credential: &Credential) -> ClaimOutcome {
        let endpoint = self.endpoint(game);

        let response = self
            .agent
            .post(&endpoint)
            .header("Cookie", &credential.cookie_header())
            .header("Referer", REFERER)
            .header("Origin", ORIGIN)
            .header("Content-Type", "application/json")
            .send_json(json!({
                "act_id": game.act_id,
                "lang": LANG,
            }));

        let mut response = match response {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(game = game.name, error = %e, "Claim request failed");
                return ClaimOutcome::NetworkError;
            }
        };

        let status = response.status().as_u16();
        let body = match response.body_mut().read_to_string() {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(game = game.name, status, error = %e, "Failed to read claim response");
                return ClaimOutcome::ApiError(None);
            }
        };

        let outcome = match parse_retcode(&body) {
            Some(retcode) => ClaimOutcome::from_retcode(retcode),
            None => ClaimOutcome::ApiError(None),
        };

        tracing::debug!(game = game.name, status, outcome = %outcome, "Claim response");
        outcome
    }

    /// Claims every tracked game. Skips the network entirely without a credential.
    pub fn run_cycle(&self, credential: &Credential) -> CycleReport {
        if !credential.is_logged_in() {
            tracing::info!("No credential stored, skipping check-in");
            return CycleReport::NeedLogin;
        }

        let results = GAMES
            .iter()
            .map(|game| (*game, self.claim(game, credential)))
            .collect();

        let report = CycleReport::Completed(results);
        tracing::info!(summary = %report.summary(), "Check-in cycle finished");
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_from_retcode() {
        assert_eq!(ClaimOutcome::from_retcode(0), ClaimOutcome::Success);
        assert_eq!(ClaimOutcome::from_retcode(-5003), ClaimOutcome::AlreadyClaimed);
        assert_eq!(
            ClaimOutcome::from_retcode(-100),
            ClaimOutcome::ApiError(Some(-100))
        );
    }

    #[test]
    fn test_outcome_display() {
        assert_eq!(ClaimOutcome::Success.to_string(), "✅ Success");
        assert_eq!(ClaimOutcome::AlreadyClaimed.to_string(), "👌 Done");
        assert_eq!(ClaimOutcome::ApiError(Some(-10002)).to_string(), "❌ Err(-10002)");
        assert_eq!(ClaimOutcome::ApiError(None).to_string(), "❌ APIErr");
        assert_eq!(ClaimOutcome::NetworkError.to_string(), "❌ NetErr");
    }

    #[test]
    fn test_parse_retcode() {
        assert_eq!(parse_retcode(r#"{"retcode":0,"message":"OK"}"#), Some(0));
        assert_eq!(parse_retcode(r#"{"retcode":-5003.0}"#), Some(-5003));
        assert_eq!(parse_retcode(r#"{"retcode":"-100"}"#), Some(-100));
        assert_eq!(parse_retcode(r#"{"retcode":1.5}"#), None);
        assert_eq!(parse_retcode(r#"{"message":"no code"}"#), None);
        assert_eq!(parse_retcode(r#"{"retcode":null}"#), None);
        assert_eq!(parse_retcode("<html>bad gateway</html>"), None);
    }

    #[test]
    fn test_summary_and_notify() {
        let all_done = CycleReport::Completed(vec![
            (GENSHIN, ClaimOutcome::AlreadyClaimed),
            (STAR_RAIL, ClaimOutcome::AlreadyClaimed),
        ]);
        assert_eq!(all_done.summary(), "Genshin: 👌 Done | Star Rail: 👌 Done");
        assert!(!all_done.should_notify());

        let mixed = CycleReport::Completed(vec![
            (GENSHIN, ClaimOutcome::Success),
            (STAR_RAIL, ClaimOutcome::AlreadyClaimed),
        ]);
        assert!(mixed.should_notify());

        let failed = CycleReport::Completed(vec![
            (GENSHIN, ClaimOutcome::AlreadyClaimed),
            (STAR_RAIL, ClaimOutcome::NetworkError),
        ]);
        assert_eq!(failed.summary(), "Genshin: 👌 Done | Star Rail: ❌ NetErr");
        assert!(failed.should_notify());

        assert!(!CycleReport::NeedLogin.should_notify());
    }

    #[test]
    fn test_endpoint_override_keeps_path() {
        let claimer = Claimer::with_config(ClaimerConfig {
            base_url: Some("http://127.0.0.1:1234/".to_string()),
            timeout: None,
        });
        assert_eq!(
            claimer.endpoint(&GENSHIN),
            "http://127.0.0.1:1234/event/sol/sign"
        );
        assert_eq!(
            Claimer::new().endpoint(&STAR_RAIL),
            "https://sg-public-api.hoyolab.com/event/luna/os/sign"
        );
    }
}
