//! Error reporting helpers shared by `run` and the REPL

use knot_interpreter::SessionError;
use miette::{MietteHandlerOpts, NamedSource, Report};

/// Configure miette for error reporting
pub fn setup_miette_handler() {
    miette::set_hook(Box::new(|_| {
        Box::new(
            MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .tab_width(4)
                .with_cause_chain()
                .build(),
        )
    }))
    .ok();
}

/// Turn a session error into a report that shows the offending source.
///
/// Parse errors carry their own source. Runtime errors are labelled with a
/// span from wherever the failing code was written: the prelude, an earlier
/// REPL input, another script or a loaded snapshot. `source` is attached only
/// when the error names `name` as its origin and the label fits inside it.
pub fn report(error: SessionError, name: &str, source: &str) -> Report {
    let attach = match &error {
        SessionError::Parse(_) => false,
        SessionError::Evaluation(error) => {
            error.origin() == Some(name)
                && error
                    .span()
                    .is_some_and(|span| span.offset() + span.len() <= source.len())
        }
    };

    let report = Report::new(error);
    if attach {
        report.with_source_code(NamedSource::new(name, source.to_string()))
    } else {
        report
    }
}
