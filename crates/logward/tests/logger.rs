#![allow(clippy::unwrap_used)]

use std::{
    panic::{catch_unwind, AssertUnwindSafe},
    sync::{Arc, Mutex},
};

use logward::{
    handlers::test_util::{CapturingHandler, SharedBuffer},
    Level, Logger, Options, TextHandler,
};

#[test]
fn text_scenario_emits_three_records_in_order() {
    let buffer = SharedBuffer::default();
    let log = Logger::from_handler(Arc::new(TextHandler::new(Level::DEBUG, buffer.clone())));

    log.debug("x", &[]);
    log.infof(format_args!("y-{}", "z"));
    log.warn("w", &[]);

    let output = buffer.contents();
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines.len(), 3, "output: {output:?}");
    assert!(lines[0].contains("DEBUG") && lines[0].contains('x'));
    assert!(lines[1].contains("INFO") && lines[1].contains("y-z"));
    assert!(lines[2].contains("WARN") && lines[2].contains('w'));
}

#[test]
fn formatted_calls_skip_work_when_filtered() {
    let capture = CapturingHandler::with_min_level(Level::ERROR);
    let log = Logger::from_handler(capture.clone());

    log.debugf(format_args!("expensive {}", "render"));
    log.infof(format_args!("also {}", "skipped"));
    assert!(capture.is_empty());

    log.errorf(format_args!("kept {}", 1));
    let records = capture.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].message, "kept 1");
}

#[test]
fn panic_raises_a_fault_carrying_the_literal_message() {
    let capture = CapturingHandler::new();
    let log = Logger::from_handler(capture.clone());

    let fault = catch_unwind(AssertUnwindSafe(|| log.panic("boom", &["k".into(), 1.into()])))
        .expect_err("panic must unwind");
    let message = fault.downcast_ref::<String>().unwrap();
    assert_eq!(message, "boom");

    let records = capture.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].level, Level::PANIC);
    assert_eq!(records[0].attrs.len(), 1);
}

#[test]
fn panic_fires_even_when_the_minimum_level_filters_it() {
    let capture = CapturingHandler::with_min_level(Level::FATAL);
    let log = Logger::from_handler(capture.clone());

    let fault = catch_unwind(AssertUnwindSafe(|| log.panic("still", &[]))).expect_err("unwinds");
    assert_eq!(fault.downcast_ref::<String>().unwrap(), "still");
    // The record is still offered to the handler; filtering is its call.
    assert_eq!(capture.len(), 1);
}

#[test]
fn panicf_formats_the_fault_payload() {
    let log = Logger::from_handler(CapturingHandler::shared());
    let fault = catch_unwind(AssertUnwindSafe(|| log.panicf(format_args!("bad {}", 7))))
        .expect_err("unwinds");
    assert_eq!(fault.downcast_ref::<String>().unwrap(), "bad 7");
}

#[test]
fn fatal_invokes_the_exit_seam_with_status_one_exactly_once() {
    let capture = CapturingHandler::new();
    let codes = Arc::new(Mutex::new(Vec::new()));
    let probe = Arc::clone(&codes);
    let log = Logger::from_handler(capture.clone())
        .with_exit_hook(move |code| probe.lock().unwrap().push(code));

    log.fatal("goodbye", &[]);

    assert_eq!(*codes.lock().unwrap(), vec![1]);
    let records = capture.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].level, Level::FATAL);
    assert_eq!(records[0].message, "goodbye");
}

#[test]
fn fatalf_also_exits_with_status_one() {
    let codes = Arc::new(Mutex::new(Vec::new()));
    let probe = Arc::clone(&codes);
    let log = Logger::from_handler(CapturingHandler::shared())
        .with_exit_hook(move |code| probe.lock().unwrap().push(code));

    log.fatalf(format_args!("code {}", "red"));
    assert_eq!(*codes.lock().unwrap(), vec![1]);
}

#[test]
fn explicit_handler_overrides_format_and_level_options() {
    let capture = CapturingHandler::new();
    let log = Logger::with_options(Options {
        level: Some("ERROR".to_owned()),
        format: Some("TEXT".to_owned()),
        handler: Some(capture.clone()),
        ..Options::default()
    });

    // The capturing handler accepts everything; the ERROR option must not
    // have been applied on top of it.
    log.debug("through", &[]);
    assert_eq!(capture.len(), 1);
}

#[test]
fn log_attrs_takes_ready_made_attributes() {
    let capture = CapturingHandler::new();
    let log = Logger::from_handler(capture.clone());

    log.log_attrs(
        &logward::Context::background(),
        Level::NOTICE,
        "attrs",
        vec![logward::Attr::new("a", 1), logward::Attr::new("b", 2)],
    );

    let records = capture.records();
    assert_eq!(records[0].level, Level::NOTICE);
    assert_eq!(records[0].attrs.len(), 2);
}

#[test]
fn group_then_attrs_qualifies_keys() {
    let capture = CapturingHandler::new();
    let log = Logger::from_handler(capture.clone())
        .with_group("request")
        .with(&["method".into(), "GET".into()]);

    log.info("hit", &["status".into(), 200.into()]);

    let records = capture.records();
    let keys: Vec<&str> = records[0].attrs.iter().map(|a| a.key.as_str()).collect();
    assert_eq!(keys, vec!["request.method", "request.status"]);
}
