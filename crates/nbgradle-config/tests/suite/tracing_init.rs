use nbgradle_config::{init_tracing, with_captured_logs, LoggingConfig};

#[test]
fn init_tracing_only_installs_once() {
    let config = LoggingConfig::default();
    let first = init_tracing(&config);
    assert_eq!(init_tracing(&LoggingConfig { json: true, ..config }), first);
}

#[test]
fn captured_logs_stay_on_the_current_thread() {
    let ((), text) = with_captured_logs(&LoggingConfig::default(), || {
        tracing::info!(target: "nbgradle.test", "logged here");
        std::thread::spawn(|| tracing::info!(target: "nbgradle.test", "logged elsewhere"))
            .join()
            .unwrap();
    });
    assert!(text.contains("logged here"), "{text}");
    assert!(!text.contains("logged elsewhere"), "{text}");
}
