use dotenvy::dotenv;
use once_cell::sync::Lazy;
use std::env;
use std::str::FromStr;
use std::time::Duration;

pub static CONFIG: Lazy<Config> = Lazy::new(|| {
    dotenv().ok(); // Load .env file if present
    Config::from_env()
});

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub max_results_per_site: u32,
    pub use_cache: bool,
    pub request_timeout: Duration,
    pub notification_ttl: Duration,
    pub bind_addr: String,
    pub demo_latency: Duration,
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_url: "http://localhost:8000".to_string(),
            max_results_per_site: 3,
            use_cache: true,
            request_timeout: Duration::from_secs(30),
            notification_ttl: Duration::from_millis(4000),
            bind_addr: "127.0.0.1:8000".to_string(),
            demo_latency: Duration::from_millis(2000),
            log_filter: "info".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Config {
        let defaults = Config::default();
        Config {
            api_url: get_env_or_default("PRICEFIND_API_URL", &defaults.api_url),
            max_results_per_site: parse_env_or(
                "PRICEFIND_MAX_RESULTS_PER_SITE",
                defaults.max_results_per_site,
            ),
            use_cache: parse_env_or("PRICEFIND_USE_CACHE", defaults.use_cache),
            request_timeout: Duration::from_secs(parse_env_or(
                "PRICEFIND_TIMEOUT_SECS",
                defaults.request_timeout.as_secs(),
            )),
            notification_ttl: Duration::from_millis(parse_env_or(
                "PRICEFIND_NOTIFY_MS",
                defaults.notification_ttl.as_millis() as u64,
            )),
            bind_addr: get_env_or_default("PRICEFIND_BIND_ADDR", &defaults.bind_addr),
            demo_latency: Duration::from_millis(parse_env_or(
                "PRICEFIND_LATENCY_MS",
                defaults.demo_latency.as_millis() as u64,
            )),
            log_filter: get_env_or_default("PRICEFIND_LOG", &defaults.log_filter),
        }
    }
}

fn get_env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Falls back to `default` when the variable is unset or doesn't parse.
fn parse_env_or<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            log::warn!("ignoring invalid value for {key}: {raw:?}");
            default
        }),
        Err(_) => default,
    }
}

#[test]
fn test_defaults_match_search_contract() {
    let config = Config::default();
    assert_eq!(config.max_results_per_site, 3);
    assert!(config.use_cache);
    assert_eq!(config.notification_ttl, Duration::from_millis(4000));
}

#[test]
fn test_parse_env_or_falls_back_on_garbage() {
    // SAFETY: test-local variable name, not read by any other test
    unsafe { env::set_var("PRICEFIND_TEST_GARBAGE_U32", "three") };
    assert_eq!(parse_env_or("PRICEFIND_TEST_GARBAGE_U32", 7u32), 7);
    unsafe { env::set_var("PRICEFIND_TEST_GARBAGE_U32", " 5 ") };
    assert_eq!(parse_env_or("PRICEFIND_TEST_GARBAGE_U32", 7u32), 5);
    assert!(parse_env_or("PRICEFIND_TEST_UNSET_BOOL", true));
}
