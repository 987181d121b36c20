use super::*;
use std::sync::Mutex;

// Env mutation is process-wide; every test in this file takes the lock.
static ENV_LOCK: Mutex<()> = Mutex::new(());

/// # Safety
/// Callers must hold `ENV_LOCK`.
unsafe fn clear_sweatlo_env() {
    unsafe {
        std::env::remove_var("SWEATLO_BASE_URL");
        std::env::remove_var("SWEATLO_REQUEST_TIMEOUT_SECS");
        std::env::remove_var("SWEATLO_CONNECT_TIMEOUT_SECS");
        std::env::remove_var("SWEATLO_LOGIN_ROUTE");
    }
}

#[test]
fn from_env_uses_defaults_when_unset() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    unsafe { clear_sweatlo_env() };

    let cfg = ClientConfig::from_env().unwrap();
    assert_eq!(cfg, ClientConfig::default());
    assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
    assert_eq!(cfg.login_route, "/login");
    assert_eq!(
        cfg.timeouts,
        Timeouts { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    );
}

#[test]
fn from_env_parses_overrides_and_trims_trailing_slash() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    unsafe {
        clear_sweatlo_env();
        std::env::set_var("SWEATLO_BASE_URL", "https://sweatlo.example/api/");
        std::env::set_var("SWEATLO_REQUEST_TIMEOUT_SECS", "45");
        std::env::set_var("SWEATLO_CONNECT_TIMEOUT_SECS", " 3 ");
        std::env::set_var("SWEATLO_LOGIN_ROUTE", "/signin");
    }

    let cfg = ClientConfig::from_env().unwrap();
    assert_eq!(cfg.base_url, "https://sweatlo.example/api");
    assert_eq!(cfg.timeouts, Timeouts { request_secs: 45, connect_secs: 3 });
    assert_eq!(cfg.login_route, "/signin");

    unsafe { clear_sweatlo_env() };
}

#[test]
fn from_env_falls_back_on_unparsable_timeouts() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    unsafe {
        clear_sweatlo_env();
        std::env::set_var("SWEATLO_REQUEST_TIMEOUT_SECS", "soon");
    }

    let cfg = ClientConfig::from_env().unwrap();
    assert_eq!(cfg.timeouts.request_secs, DEFAULT_REQUEST_TIMEOUT_SECS);

    unsafe { clear_sweatlo_env() };
}

#[test]
fn from_env_rejects_base_url_without_scheme() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    unsafe {
        clear_sweatlo_env();
        std::env::set_var("SWEATLO_BASE_URL", "localhost:8080/api");
    }

    let err = ClientConfig::from_env().unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { var: "SWEATLO_BASE_URL", .. }));

    unsafe { clear_sweatlo_env() };
}

#[test]
fn from_env_rejects_relative_login_route() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    unsafe {
        clear_sweatlo_env();
        std::env::set_var("SWEATLO_LOGIN_ROUTE", "login");
    }

    let err = ClientConfig::from_env().unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { var: "SWEATLO_LOGIN_ROUTE", .. }));

    unsafe { clear_sweatlo_env() };
}

#[test]
fn with_base_url_normalizes_whitespace_and_slash() {
    let cfg = ClientConfig::with_base_url("  http://127.0.0.1:9000/api//  ");
    assert_eq!(cfg.base_url, "http://127.0.0.1:9000/api");
    assert_eq!(cfg.login_route, DEFAULT_LOGIN_ROUTE);
}
