use quire_derive::quire_error;
use std::borrow::Cow;
use std::path::PathBuf;

#[quire_error]
pub enum DemoError {
    #[error("Read failed for {}{}: {source}", .path.display(), format_context(.context))]
    Read { path: PathBuf, source: std::io::Error, context: Option<Cow<'static, str>> },

    #[error("Remove failed for {}{}: {source}", .path.display(), format_context(.context))]
    Remove { path: PathBuf, source: std::io::Error, context: Option<Cow<'static, str>> },

    #[error("Bad number{}: {source}", format_context(.context))]
    Parse { source: std::num::ParseIntError, context: Option<Cow<'static, str>> },

    #[error("Missing name{}", format_context(.context))]
    MissingName { context: Option<Cow<'static, str>> },
}

fn parse(raw: &str) -> Result<u32, DemoError> {
    Ok(raw.parse::<u32>()?)
}

#[test]
fn quire_error_ui() {
    let t = trybuild::TestCases::new();
    t.pass("tests/ui/quire_error_pass.rs");
}

#[test]
fn unique_source_converts_with_question_mark() {
    let err = parse("seven").expect_err("not a number");
    assert!(matches!(err, DemoError::Parse { context: None, .. }));
}

#[test]
fn context_is_attached_to_source_result() {
    let err = "x".parse::<u32>().context("Parsing shard count").expect_err("not a number");
    assert_eq!(err.to_string().split(':').next(), Some("Bad number (Parsing shard count)"));
}

#[test]
fn context_is_attached_to_own_result() {
    let res: Result<(), DemoError> = Err(DemoError::MissingName { context: None });
    let err = res.context("collection").expect_err("error expected");
    assert_eq!(err.to_string(), "Missing name (collection)");
}

#[test]
fn shared_source_variants_are_built_explicitly() {
    let err = DemoError::Remove {
        path: PathBuf::from("db/fish"),
        source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        context: None,
    };
    assert!(err.to_string().starts_with("Remove failed for db/fish:"));
}
