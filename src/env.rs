/// Environment variable names used by this crate for convenient
/// configuration of the hook from microservices.
///
/// These are purely helpers; the core hook types remain decoupled from
/// environment access.

/// Document store base HTTP URL, e.g. `http://127.0.0.1:9200`.
pub const LOG_HOOK_URL_ENV: &str = "LOG_HOOK_ELASTIC_URL";

/// Target index name.
pub const LOG_HOOK_INDEX_ENV: &str = "LOG_HOOK_INDEX";

/// Optional user name for basic auth.
pub const LOG_HOOK_USER_ENV: &str = "LOG_HOOK_ELASTIC_USER";

/// Optional password for basic auth.
pub const LOG_HOOK_PASSWORD_ENV: &str = "LOG_HOOK_ELASTIC_PASSWORD";

/// Logical service name stamped on every record.
pub const LOG_HOOK_SERVICE_ENV: &str = "LOG_HOOK_SERVICE";

/// Service version stamped on every record.
pub const LOG_HOOK_VERSION_ENV: &str = "LOG_HOOK_SERVICE_VERSION";

/// Minimum severity shipped to the store, `"panic"` through `"debug"`.
pub const LOG_HOOK_MIN_LEVEL_ENV: &str = "LOG_HOOK_MIN_LEVEL";

/// Read an environment variable or fall back to a provided default.
pub fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
