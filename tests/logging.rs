use std::{fs, thread::sleep, time::Duration};

use serial_test::serial;
use tempfile::tempdir;

#[test]
#[serial]
fn writes_log_file_and_keeps_first_subscriber() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("reticle.log");
    let later = dir.path().join("later.log");
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, "not a folder").unwrap();

    reticle_toggle::logging::init(true, Some(path.clone()));
    tracing::info!("reticle test line");
    reticle_toggle::logging::init(false, Some(later.clone()));
    tracing::info!("second line");
    reticle_toggle::logging::init(false, Some(blocker.join("sub").join("x.log")));

    sleep(Duration::from_millis(100));

    assert!(path.exists(), "log file was not created");
    let contents = fs::read_to_string(&path).unwrap();
    assert!(contents.contains("reticle test line"));
    assert!(contents.contains("second line"));
    assert!(contents.contains("unable to open log file"));
    assert!(
        !later.exists() || fs::read_to_string(&later).unwrap().is_empty(),
        "a later init must not replace the installed subscriber"
    );
    assert!(blocker.is_file());
}
