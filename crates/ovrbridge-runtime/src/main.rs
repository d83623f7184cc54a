//! ovrbridge-replay
//!
//! Replays a recorded native message script through a dispatcher on the tick
//! driver, logging every delivery, then prints the dispatch counters as JSON.
//!
//! Usage: `ovrbridge-replay [config.yaml] <script.json>`

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use ovrbridge_core::Message;
use ovrbridge_runtime::native::NativeTransport;
use ovrbridge_runtime::replay::ReplayScript;
use ovrbridge_runtime::{config, driver, obs, Dispatcher, Request};

fn log_delivery(target: &str, msg: &Message) {
    match msg.error() {
        Some(err) => tracing::info!(
            target_kind = target,
            message_type = %msg.message_type(),
            request_id = %msg.request_id(),
            error = %err,
            "delivered error"
        ),
        None => tracing::info!(
            target_kind = target,
            message_type = %msg.message_type(),
            request_id = %msg.request_id(),
            payload = msg.payload().map(|p| p.kind()).unwrap_or("none"),
            "delivered"
        ),
    }
}

#[tokio::main]
async fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let (cfg_path, script_path) = match args.as_slice() {
        [script] => (None, script.as_str()),
        [cfg, script] => (Some(cfg.as_str()), script.as_str()),
        _ => {
            eprintln!("usage: ovrbridge-replay [config.yaml] <script.json>");
            std::process::exit(2);
        }
    };

    let cfg = match cfg_path {
        Some(p) => config::load_from_file(p).expect("config load failed"),
        None => config::BridgeConfig::default(),
    };
    obs::init_tracing(&cfg.logging.filter).expect("tracing init failed");

    let script = ReplayScript::load_from_file(script_path).expect("script load failed");
    tracing::info!(
        description = %script.description,
        messages = script.messages.len(),
        "replay starting"
    );

    let transport = Arc::new(script.to_transport());
    let dispatcher = Arc::new(Dispatcher::new(
        Arc::clone(&transport) as Arc<dyn NativeTransport>
    ));

    for id in &script.track_requests {
        let req = Request::new(*id).on_complete(|msg| log_delivery("request", &msg));
        if let Err(e) = dispatcher.register_request(req) {
            tracing::warn!(request_id = id, error = %e, "request not tracked");
        }
    }
    for ty in &script.notifications {
        if let Err(e) = dispatcher.on_notification(*ty, |msg| log_delivery("notification", &msg)) {
            tracing::warn!(message_type = %ty, error = %e, "handler not registered");
        }
    }

    let (stop_tx, stop_rx) = watch::channel(false);
    let drive = tokio::spawn({
        let dispatcher = Arc::clone(&dispatcher);
        let poll = cfg.poll.clone();
        async move { driver::run_ticks(dispatcher, &poll, stop_rx).await }
    });

    let mut idle = tokio::time::interval(Duration::from_millis(cfg.poll.tick_interval_ms));
    while transport.pending() > 0 {
        idle.tick().await;
    }
    // One more tick so the last popped batch has been dispatched.
    idle.tick().await;
    let _ = stop_tx.send(true);

    let report = drive.await.expect("tick driver panicked");
    tracing::info!(?report, "replay finished");

    let stats = dispatcher.stats();
    println!(
        "{}",
        serde_json::to_string_pretty(&stats).expect("stats serialize failed")
    );
}
