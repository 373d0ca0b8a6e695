use quire_derive::quire_error;
use std::borrow::Cow;
use std::path::PathBuf;

#[quire_error]
pub enum DemoError {
    #[error("Read failed for {}{}: {source}", .path.display(), format_context(.context))]
    Read { path: PathBuf, source: std::io::Error, context: Option<Cow<'static, str>> },

    #[error("Write failed for {}{}: {source}", .path.display(), format_context(.context))]
    Write { path: PathBuf, source: std::io::Error, context: Option<Cow<'static, str>> },

    #[error("Bad number{}: {source}", format_context(.context))]
    Parse { source: std::num::ParseIntError, context: Option<Cow<'static, str>> },

    #[error("Missing name{}", format_context(.context))]
    MissingName { context: Option<Cow<'static, str>> },
}

fn parse(raw: &str) -> Result<u32, DemoError> {
    Ok(raw.parse::<u32>()?)
}

fn main() {
    let _ = parse("7");
}
