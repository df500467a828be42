//! The C ABI keeps process-wide state, so the whole lifecycle runs in one test.

use rmcs::ffi::{RMCSGetStatus, RMCSInit, RMCSSetLogFile, RMCSStop, RMCSSwitchCamera};
use rmcs::logging::{self, LogSink};
use std::ffi::CString;
use std::fs;

#[test]
fn test_c_abi_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("rmcs_log.txt");
    let bad_path = CString::new(dir.path().join("missing/rmcs_log.txt").to_str().unwrap()).unwrap();
    let good_path = CString::new(log_path.to_str().unwrap()).unwrap();

    // Log sink: null and unopenable paths are rejected, then set once
    assert_eq!(unsafe { RMCSSetLogFile(std::ptr::null()) }, -1);
    assert_eq!(unsafe { RMCSSetLogFile(bad_path.as_ptr()) }, -1);
    assert_eq!(unsafe { RMCSSetLogFile(good_path.as_ptr()) }, 0);
    assert_eq!(unsafe { RMCSSetLogFile(good_path.as_ptr()) }, -1);
    assert_eq!(logging::sink(), Some(&LogSink::File(log_path.clone())));

    // Controls before init
    assert_eq!(RMCSGetStatus(), 0);
    assert_eq!(RMCSSwitchCamera(2), -1);
    assert_eq!(RMCSStop(), 0);

    // Init, then a second init while running
    assert_eq!(RMCSInit(), 0);
    assert_eq!(RMCSGetStatus(), 1);
    assert_eq!(RMCSGetStatus(), 1);
    assert_eq!(RMCSInit(), 1);

    // The default catalog has no camera 99 and no clips on disk here
    assert_eq!(RMCSSwitchCamera(99), -2);
    assert_eq!(RMCSSwitchCamera(2), -2);
    assert_eq!(RMCSGetStatus(), 1);

    // Stop, then everything reports not running
    assert_eq!(RMCSStop(), 0);
    assert_eq!(RMCSGetStatus(), 0);
    assert_eq!(RMCSSwitchCamera(2), -1);
    assert_eq!(RMCSStop(), 0);

    // A new session can start after stop
    assert_eq!(RMCSInit(), 0);
    assert_eq!(RMCSGetStatus(), 1);
    assert_eq!(RMCSStop(), 0);

    let log = fs::read_to_string(&log_path).unwrap();
    assert!(log.contains("Initializing RMCS"));
    assert!(log.contains("RMCS stopped"));
}
