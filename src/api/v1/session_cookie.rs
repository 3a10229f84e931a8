use crate::settings;
use cookie::time::Duration;
use cookie::{Cookie, SameSite};

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";
pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";

/// Client-side lifetimes of the session cookies. Independent of (and not
/// shorter than) the expiry signed into the tokens themselves.
#[derive(Debug, Clone)]
pub struct CookiePolicy {
    pub access_max_age: Duration,
    pub refresh_max_age: Duration,
    pub secure: bool,
}

impl Default for CookiePolicy {
    fn default() -> Self {
        CookiePolicy {
            access_max_age: Duration::hours(24),
            refresh_max_age: Duration::hours(168),
            secure: false,
        }
    }
}

/// Longest cookie lifetime accepted from settings, in hours.
pub const MAX_COOKIE_AGE_HOURS: i64 = 400 * 24;

fn max_age(name: &str, hours: i64) -> anyhow::Result<Duration> {
    if !(1..=MAX_COOKIE_AGE_HOURS).contains(&hours) {
        anyhow::bail!("cookie.{name} must be between 1 and {MAX_COOKIE_AGE_HOURS}, got {hours}");
    }
    Ok(Duration::hours(hours))
}

impl TryFrom<&settings::Cookie> for CookiePolicy {
    type Error = anyhow::Error;

    fn try_from(cfg: &settings::Cookie) -> anyhow::Result<Self> {
        Ok(CookiePolicy {
            access_max_age: max_age("access_max_age_hours", cfg.access_max_age_hours)?,
            refresh_max_age: max_age("refresh_max_age_hours", cfg.refresh_max_age_hours)?,
            secure: cfg.secure,
        })
    }
}

impl CookiePolicy {
    fn build(&self, name: &'static str, value: String, max_age: Duration) -> String {
        Cookie::build((name, value))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .max_age(max_age)
            .build()
            .to_string()
    }

    /// `Set-Cookie` values establishing a session.
    pub fn session_cookies(&self, access_token: &str, refresh_token: &str) -> [String; 2] {
        [
            self.build(ACCESS_TOKEN_COOKIE, access_token.to_string(), self.access_max_age),
            self.build(REFRESH_TOKEN_COOKIE, refresh_token.to_string(), self.refresh_max_age),
        ]
    }

    /// `Set-Cookie` values that make the client drop both cookies.
    pub fn cleared_cookies(&self) -> [String; 2] {
        [
            self.build(ACCESS_TOKEN_COOKIE, String::new(), Duration::ZERO),
            self.build(REFRESH_TOKEN_COOKIE, String::new(), Duration::ZERO),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_cookies_carry_names_and_lifetimes() {
        let [access, refresh] = CookiePolicy::default().session_cookies("aaa", "rrr");
        assert!(access.starts_with("access_token=aaa"));
        assert!(access.contains("Max-Age=86400"));
        assert!(access.contains("HttpOnly"));
        assert!(refresh.starts_with("refresh_token=rrr"));
        assert!(refresh.contains("Max-Age=604800"));
    }

    #[test]
    fn cleared_cookies_expire_immediately() {
        let [access, refresh] = CookiePolicy::default().cleared_cookies();
        assert!(access.starts_with("access_token=;"));
        assert!(access.contains("Max-Age=0"));
        assert!(refresh.contains("Max-Age=0"));
    }

    #[test]
    fn cookie_ages_from_settings_are_bounded() {
        let cfg = |access, refresh| settings::Cookie {
            access_max_age_hours: access,
            refresh_max_age_hours: refresh,
            secure: true,
        };

        let policy = CookiePolicy::try_from(&cfg(1, 2)).unwrap();
        assert_eq!(policy.refresh_max_age, Duration::hours(2));
        assert!(policy.secure);

        assert!(CookiePolicy::try_from(&cfg(i64::MAX, 168)).is_err());
        assert!(CookiePolicy::try_from(&cfg(24, -1)).is_err());
        assert!(CookiePolicy::try_from(&cfg(24, 0)).is_err());
    }
}
