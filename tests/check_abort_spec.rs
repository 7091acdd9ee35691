// Re-runs this test binary as a child process to observe check termination.

use std::process::{Command, Output};
use std::thread;
use std::time::Duration;

use krt::check::{assert_failed, set_assert_handler, AssertionEvent};

krt::export_c_shims!(abort_child);

const CHILD_ENV: &str = "KRT_CHECK_CHILD";
const RETURNED: i32 = 3;

fn run_child(scenario: &str) -> Output {
    let exe = std::env::current_exe().expect("current test binary");
    Command::new(exe)
        .args(["child_entry", "--exact", "--nocapture", "--test-threads=1"])
        .env(CHILD_ENV, scenario)
        .output()
        .expect("spawn child")
}

fn stderr_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn assert_aborted(output: &Output) {
    assert!(!output.status.success());
    assert_ne!(output.status.code(), Some(RETURNED));
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        assert_eq!(output.status.signal(), Some(6));
    }
}

fn slow_trace(_args: core::fmt::Arguments<'_>) {
    thread::sleep(Duration::from_millis(500));
}

fn failing_handler(_event: &AssertionEvent<'_>) -> ! {
    assert_failed(&AssertionEvent::new("inner.rs", 2, "inner", "handler"))
}

fn concurrent_failures() -> ! {
    krt::set_trace_hook(slow_trace);
    let _worker = thread::spawn(|| {
        assert_failed(&AssertionEvent::new("worker.rs", 10, "1 == 2", "worker"));
    });
    thread::sleep(Duration::from_millis(100));
    assert_failed(&AssertionEvent::new("main.rs", 20, "3 == 4", "main"))
}

#[test]
fn child_entry() {
    let Ok(scenario) = std::env::var(CHILD_ENV) else {
        return;
    };
    match scenario.as_str() {
        "check_false" => krt::check!(1 == 2),
        "check_true" => krt::check!(true),
        "event_x_42" => assert_failed(&AssertionEvent::new("x", 42, "1 == 2", "child")),
        "check_message" => krt::check!(false, "queue depth {}", 17),
        "c_assert" => unsafe {
            krt::ffi::c_assert_fail(
                c"ptr != NULL".as_ptr(),
                c"driver.c".as_ptr(),
                88,
                c"driver_init".as_ptr(),
            )
        },
        "c_assert_short" => unsafe {
            abort_child__assert(c"bsd.c".as_ptr(), 7, c"len < cap".as_ptr())
        },
        "c_assert_negative_line" => unsafe {
            krt::ffi::c_assert_fail(c"x".as_ptr(), c"gen.c".as_ptr(), -5, c"emit".as_ptr())
        },
        "concurrent" => concurrent_failures(),
        "nested" => {
            set_assert_handler(failing_handler);
            assert_failed(&AssertionEvent::new("outer.rs", 1, "outer", "child"))
        }
        other => panic!("unknown scenario {other}"),
    }
    std::process::exit(RETURNED);
}

#[test]
fn termination_event_names_file_line_and_condition() {
    let output = run_child("event_x_42");
    assert_aborted(&output);
    let stderr = stderr_of(&output);
    assert!(stderr.contains("x:42"));
    assert!(stderr.contains("1 == 2"));
}

#[test]
fn passing_check_returns() {
    let output = run_child("check_true");
    assert_eq!(output.status.code(), Some(RETURNED));
    assert!(!stderr_of(&output).contains("check failed"));
}

#[test]
fn c_assert_is_routed_into_checks() {
    let output = run_child("c_assert");
    assert_aborted(&output);
    let stderr = stderr_of(&output);
    assert!(stderr.contains("driver.c:88: driver_init: check failed: ptr != NULL"));
}

#[test]
fn exported_short_assert_is_routed_into_checks() {
    let output = run_child("c_assert_short");
    assert_aborted(&output);
    assert!(stderr_of(&output).contains("bsd.c:7: ?: check failed: len < cap"));
}

#[test]
fn negative_c_line_keeps_raw_value() {
    let output = run_child("c_assert_negative_line");
    assert_aborted(&output);
    assert!(stderr_of(&output).contains("gen.c:0: emit: check failed: x: invalid line -5"));
}

#[test]
fn concurrent_failure_does_not_silence_first_report() {
    let output = run_child("concurrent");
    assert_aborted(&output);
    let stderr = stderr_of(&output);
    assert!(stderr.contains("worker.rs:10: worker: check failed: 1 == 2"), "{stderr}");
}

#[test]
fn nested_failure_is_written_before_abort() {
    let output = run_child("nested");
    assert_aborted(&output);
    let stderr = stderr_of(&output);
    assert!(
        stderr.contains("nested check failure: inner.rs:2: handler: check failed: inner"),
        "{stderr}"
    );
    assert!(!stderr.contains("outer.rs:1"));
}

#[cfg(feature = "checks")]
#[test]
fn failing_check_aborts() {
    let output = run_child("check_false");
    assert_aborted(&output);
    let stderr = stderr_of(&output);
    assert!(stderr.contains("check_abort_spec.rs"));
    assert!(stderr.contains("check failed: 1 == 2"));
}

#[cfg(feature = "checks")]
#[test]
fn failing_check_reports_message() {
    let output = run_child("check_message");
    assert_aborted(&output);
    assert!(stderr_of(&output).contains("check failed: false: queue depth 17"));
}

#[cfg(not(feature = "checks"))]
#[test]
fn suppressed_check_returns() {
    for scenario in ["check_false", "check_message"] {
        let output = run_child(scenario);
        assert_eq!(output.status.code(), Some(RETURNED), "{scenario}");
        assert!(!stderr_of(&output).contains("check failed"));
    }
}
