// vim: tw=80
//! Custom assertions, as written by `understudy-gen generate-assertions`

use pretty_assertions::assert_eq;
use std::rc::Rc;

use understudy::*;

#[path = "generated/custom_assertions.rs"]
mod custom_assertions;

use custom_assertions::{IsEmpty, IsPositive};

#[test]
fn holds() {
    let recorder = Recorder::new();
    assert!(IsPositive(&recorder, 5, None));
    assert!(recorder.is_clean());
}

#[test]
fn default_message() {
    let recorder = Recorder::new();
    assert!(!IsPositive(&recorder, -1, None));
    assert_eq!(recorder.take_failures(), vec![Failure::Assertion {
        message: "expected positive value".to_owned()
    }]);
}

#[test]
fn override_message() {
    let recorder = Recorder::new();
    assert!(!IsPositive(&recorder, 0, Some("balance must be positive")));
    assert_eq!(recorder.take_failures()[0].to_string(),
               "balance must be positive");
}

#[test]
fn empty_override_uses_the_default() {
    let recorder = Recorder::new();
    IsPositive(&recorder, 0, Some(""));
    assert_eq!(recorder.take_failures()[0].to_string(),
               "expected positive value");
}

#[test]
fn failures_do_not_stop_the_test() {
    let recorder = Rc::new(Recorder::new());
    let substitute = Substitute::with_reporter(recorder.clone());
    IsPositive(&*recorder, -1, None);
    IsPositive(&*recorder, -2, Some("second"));
    substitute.expect("foo", params![]);
    substitute.verify();
    assert_eq!(recorder.take_failures().len(), 3);
}

#[test]
fn location_is_the_caller() {
    let recorder = Recorder::new();
    let line = line!() + 1;
    IsPositive(&recorder, 0, None);
    let recorded = recorder.recorded();
    assert_eq!(recorded[0].location.line(), line);
    recorder.take_failures();
}

#[test]
fn borrowed_parameters() {
    let recorder = Recorder::new();
    assert!(IsEmpty(&recorder, "", None));
    assert!(!IsEmpty(&recorder, "x", Some("name must be blank")));
    assert_eq!(recorder.take_failures(), vec![Failure::Assertion {
        message: "name must be blank".to_owned()
    }]);
}
