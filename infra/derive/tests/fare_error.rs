use std::borrow::Cow;

mod demo {
    use std::borrow::Cow;

    #[fare_derive::fare_error]
    pub enum DemoError {
        #[error("IO error{}: {source}", format_context(.context))]
        Io { source: std::io::Error, context: Option<Cow<'static, str>> },

        #[error("Shape mismatch: expected {expected}, found {found}")]
        Shape { expected: usize, found: usize },

        #[error("Internal error{}: {message}", format_context(.context))]
        Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
    }
}

use demo::{DemoError, DemoErrorExt};

fn missing_file() -> Result<Vec<u8>, DemoError> {
    Ok(std::fs::read("/definitely/not/here.bin")?)
}

#[test]
fn source_errors_convert_with_question_mark() {
    let err = missing_file().expect_err("file should be missing");
    assert!(matches!(err, DemoError::Io { context: None, .. }));
    assert!(err.to_string().starts_with("IO error: "));
}

#[test]
fn context_is_attached_to_foreign_results() {
    let err = std::fs::read("/definitely/not/here.bin")
        .context("reading artifact")
        .expect_err("file should be missing");

    let DemoError::Io { context, .. } = &err else {
        panic!("expected Io variant, got {err:?}");
    };
    assert_eq!(context.as_deref(), Some("reading artifact"));
    assert!(err.to_string().starts_with("IO error (reading artifact): "));
}

#[test]
fn context_is_attached_to_own_results() {
    let result: Result<(), DemoError> = Err("boom".into());
    let err = result.context("while testing").expect_err("should stay an error");

    assert_eq!(err.to_string(), "Internal error (while testing): boom");
}

#[test]
fn variants_without_context_are_left_untouched() {
    let result: Result<(), DemoError> = Err(DemoError::Shape { expected: 6, found: 7 });
    let err = result.context("ignored").expect_err("should stay an error");

    assert_eq!(err.to_string(), "Shape mismatch: expected 6, found 7");
}

#[test]
fn internal_accepts_owned_strings() {
    let err = DemoError::from(format!("code {}", 42));
    assert!(
        matches!(&err, DemoError::Internal { message: Cow::Owned(m), .. } if m == "code 42")
    );
}
