use std::fmt::Formatter;

/// Write an error followed by every `source` in its chain, one per line. Used
/// as the `Debug` impl of our error enums so that logs carry the full cause
/// chain, not just the outermost message.
pub fn error_chain_fmt(
    e: &impl std::error::Error,
    f: &mut Formatter<'_>,
) -> std::fmt::Result {
    writeln!(f, "{e}\n")?;
    let mut current = e.source();
    while let Some(cause) = current {
        writeln!(f, "Caused by:\n\t{cause}")?;
        current = cause.source();
    }
    Ok(())
}
