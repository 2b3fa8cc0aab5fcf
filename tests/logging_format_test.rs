//! The global subscriber installs once per process.

use ccdu::core::logging::{self, LogFormat, LogLevel, LogSettings};

#[test]
fn second_init_is_a_noop() {
    let dir = tempfile::tempdir().unwrap();
    let settings = LogSettings {
        level: LogLevel::Debug,
        format: LogFormat::Json,
        file: Some(dir.path().join("ccdu.log")),
    };

    let first = logging::init(&settings);
    tracing::info!(target: "ccdu", "written to the log file");
    let second = logging::init(&LogSettings::default());

    assert!(first);
    assert!(!second);
    let written = std::fs::read_to_string(dir.path().join("ccdu.log")).unwrap();
    assert!(written.contains("written to the log file"));
    assert!(written.trim_start().starts_with('{'));
}
