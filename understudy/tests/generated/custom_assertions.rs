// @generated by understudy-gen. Do not edit.

#![allow(non_snake_case)]
/// Asserts `value > 0`.
#[track_caller]
pub fn IsPositive(
    reporter: &dyn ::understudy::Reporter,
    value: i32,
    message: ::std::option::Option<&str>,
) -> bool {
    let holds: bool = { value > 0 };
    if !holds {
        let message = message
            .filter(|m| !m.is_empty())
            .unwrap_or("expected positive value");
        reporter
            .report(
                ::understudy::Failure::Assertion {
                    message: ::std::string::ToString::to_string(message),
                },
                ::std::panic::Location::caller(),
            );
    }
    holds
}
/// Asserts `s.is_empty()`.
#[track_caller]
pub fn IsEmpty(
    reporter: &dyn ::understudy::Reporter,
    s: &str,
    message: ::std::option::Option<&str>,
) -> bool {
    let holds: bool = { s.is_empty() };
    if !holds {
        let message = message
            .filter(|m| !m.is_empty())
            .unwrap_or("expected empty string");
        reporter
            .report(
                ::understudy::Failure::Assertion {
                    message: ::std::string::ToString::to_string(message),
                },
                ::std::panic::Location::caller(),
            );
    }
    holds
}
