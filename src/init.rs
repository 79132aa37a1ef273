use crate::elastic::{ElasticConfig, ElasticStore};
use crate::env;
use crate::hook::{ElasticHook, HookError};
use crate::layer::ElasticLayer;
use crate::level::Severity;
use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

/// Configuration for wiring the delivery hook into the global subscriber.
///
/// **Fields**
/// - `url`: base HTTP URL of the document store.
/// - `user` / `password`: optional basic-auth credentials.
/// - `service` / `version`: identity stamped on every shipped record.
/// - `min_level`: least severe level that is shipped.
/// - `index`: target index name.
/// - `enable_stdout`: if `true`, a `tracing_subscriber::fmt::Layer` is added
///   on top of [`ElasticLayer`] and events are also printed to the console.
#[derive(Clone, Debug)]
pub struct HookConfig {
    pub url: String,
    pub user: Option<String>,
    pub password: Option<String>,
    pub service: String,
    pub version: String,
    pub min_level: Severity,
    pub index: String,
    pub enable_stdout: bool,
}

impl Default for HookConfig {
    fn default() -> Self {
        HookConfig {
            url: "http://localhost:9200".to_string(),
            user: None,
            password: None,
            service: "app".to_string(),
            version: "0.0.0".to_string(),
            min_level: Severity::Info,
            index: "logs".to_string(),
            enable_stdout: true,
        }
    }
}

impl HookConfig {
    /// Build a config from the `LOG_HOOK_*` environment variables, falling
    /// back to the defaults above for anything unset or unparsable.
    pub fn from_env() -> Self {
        let defaults = HookConfig::default();
        HookConfig {
            url: env::env_or(env::LOG_HOOK_URL_ENV, &defaults.url),
            user: std::env::var(env::LOG_HOOK_USER_ENV).ok(),
            password: std::env::var(env::LOG_HOOK_PASSWORD_ENV).ok(),
            service: env::env_or(env::LOG_HOOK_SERVICE_ENV, &defaults.service),
            version: env::env_or(env::LOG_HOOK_VERSION_ENV, &defaults.version),
            min_level: env::env_or(env::LOG_HOOK_MIN_LEVEL_ENV, "")
                .parse()
                .unwrap_or(defaults.min_level),
            index: env::env_or(env::LOG_HOOK_INDEX_ENV, &defaults.index),
            enable_stdout: defaults.enable_stdout,
        }
    }
}

/// Construct the hook against the configured store and install it as the
/// global `tracing` subscriber.
///
/// **Effects**
///
/// Verifies (and if needed creates) the target index, then installs a
/// [`Registry`] combined with [`ElasticLayer`] as the global default, so
/// all `tracing` events in the process are observed by the hook. When
/// `enable_stdout` is set, a `fmt` layer is stacked on top.
///
/// **Returns**
///
/// The hook handle, which doubles as the teardown surface: call
/// [`ElasticHook::cancel`] on shutdown to stop all further deliveries.
pub async fn init_tracing_with_config(config: HookConfig) -> Result<Arc<ElasticHook>, HookError> {
    let store = Arc::new(ElasticStore::new(ElasticConfig {
        url: config.url,
        user: config.user,
        password: config.password,
    }));

    let hook = Arc::new(
        ElasticHook::new(
            store,
            config.service,
            config.version,
            config.min_level,
            config.index,
        )
        .await?,
    );

    let layer = ElasticLayer::new(Arc::clone(&hook));
    if config.enable_stdout {
        let fmt_layer = tracing_subscriber::fmt::layer();
        let subscriber = Registry::default().with(layer).with(fmt_layer);
        tracing::subscriber::set_global_default(subscriber).expect("set global subscriber");
    } else {
        let subscriber = Registry::default().with(layer);
        tracing::subscriber::set_global_default(subscriber).expect("set global subscriber");
    }

    Ok(hook)
}

/// Initialize tracing with configuration taken from the environment.
///
/// Equivalent to calling [`init_tracing_with_config`] with
/// [`HookConfig::from_env`]. This is the recommended entrypoint for typical
/// microservices.
pub async fn init_tracing() -> Result<Arc<ElasticHook>, HookError> {
    init_tracing_with_config(HookConfig::from_env()).await
}
