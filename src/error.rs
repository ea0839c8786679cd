use thiserror::Error;

/// Errors that can occur while driving the assembler stand-in or writing an object file.
///
/// Fatal conditions from the original toolchain (an unsupported symbol attribute, `zerofill`,
/// an unresolvable symbol offset) are not represented here: they are modeled as panics, since
/// they are compiler bugs rather than input the writer could meaningfully recover from. See
/// `crate::writer` and `crate::streamer` for where those panics occur.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Failed to write to the output sink.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
