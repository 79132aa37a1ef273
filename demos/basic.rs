use tracing::{error, info, warn};

use tracing_elastic_sink::init::{init_tracing_with_config, HookConfig};
use tracing_elastic_sink::level::Severity;

#[tokio::main]
async fn main() {
    let hook = init_tracing_with_config(HookConfig {
        url: "http://localhost:9200".to_string(),
        service: "demo".to_string(),
        version: "0.1.0".to_string(),
        min_level: Severity::Warn,
        index: "demo-logs".to_string(),
        ..HookConfig::default()
    })
    .await
    .expect("document store reachable");

    info!("below the minimum level, console only");
    warn!(user = "alice", "password attempt limit reached");
    error!(order = 1234, "payment backend unreachable");

    // Each call above blocked until the store answered; nothing is queued,
    // so cancelling here loses no events.
    hook.cancel();
}
