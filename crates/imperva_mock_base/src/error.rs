use std::error::Error as StdError;
use std::fmt;
use std::path::PathBuf;

use tracing_error::{SpanTrace, SpanTraceStatus};

/* 📖 # Why a custom error type and not use anyhow/eyre/thiserror etc?

- Better control over error handling
- No dependencies to compile and integrate
- More transparency into error handling logic
 */

/// Error variants that can occur inside the mock server plumbing.
///
/// Simulated vendor errors (9413, 6001, ...) are *not* represented here; those
/// are ordinary responses. This type covers failures of the mock itself.
#[derive(Debug)]
pub enum ErrorKind {
    /// File system operation failed
    FileError {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The HTTP listener could not be bound or driven
    ServerError { address: String, message: String },

    /// Catch-all for other errors with a message
    Message { message: String },
}

/* 📖 # Why separate ErrorKind and MockError?
ErrorKind carries the structural variant callers can match on, MockError adds the
context stack and the span trace captured at construction time. Context strings
are pushed rather than nested so long propagation chains stay cheap.
*/

/// Error type wrapping an [`ErrorKind`] with context and a captured span trace.
pub struct MockError {
    kind: ErrorKind,
    context: Vec<String>,
    span_trace: SpanTrace,
}

impl MockError {
    /// Creates a new error from an ErrorKind, capturing the current span trace.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: vec![],
            span_trace: SpanTrace::capture(),
        }
    }

    /// Shorthand for an [`ErrorKind::Message`] error.
    pub fn message(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Message {
            message: message.into(),
        })
    }

    /// Attaches context to an error.
    /// Context is displayed before the error message.
    pub fn context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }

    /// Attaches context using lazy evaluation.
    pub fn with_context<F>(mut self, f: F) -> Self
    where
        F: FnOnce() -> String,
    {
        self.context.push(f());
        self
    }

    /// Returns a reference to the underlying ErrorKind.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Context strings in the order they were attached.
    pub fn get_context(&self) -> &[String] {
        &self.context
    }

    /// The span trace captured when the error was created.
    pub fn span_trace(&self) -> &SpanTrace {
        &self.span_trace
    }

    /// Returns the innermost error in the chain.
    pub fn root_cause(&self) -> &(dyn StdError + 'static) {
        let mut current: &(dyn StdError + 'static) = self;
        while let Some(next) = current.source() {
            current = next;
        }
        current
    }
}

impl From<ErrorKind> for MockError {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

impl StdError for MockError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match &self.kind {
            ErrorKind::FileError { source, .. } => Some(source),
            ErrorKind::ServerError { .. } | ErrorKind::Message { .. } => None,
        }
    }
}

impl fmt::Display for MockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, ctx) in self.context.iter().enumerate() {
            if i == 0 {
                write!(f, "{}", ctx)?;
            } else {
                write!(f, ": {}", ctx)?;
            }
        }

        if !self.context.is_empty() {
            write!(f, ": ")?;
        }

        write!(f, "{}", self.kind_message())
    }
}

impl MockError {
    fn fmt_tree(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let last = self.context.len().saturating_sub(1);
        for (i, ctx) in self.context.iter().enumerate() {
            let branch = if i == last { "└─" } else { "├─" };
            writeln!(f, "{branch} {ctx}")?;
        }
        Ok(())
    }

    fn kind_message(&self) -> String {
        match &self.kind {
            ErrorKind::FileError { path, source } => {
                format!("File error at {}: {}", path.display(), source)
            }
            ErrorKind::ServerError { address, message } => {
                format!("HTTP server error on {}: {}", address, message)
            }
            ErrorKind::Message { message } => message.clone(),
        }
    }
}

/* 📖 # Why a hand-written Debug impl?
Errors end up in test failure output and in logs. The message with its context
stack as a tree, followed by the span trace, reads far better than the derived struct dump.
*/
impl fmt::Debug for MockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.kind_message())?;
        self.fmt_tree(f)?;
        if self.span_trace.status() == SpanTraceStatus::CAPTURED {
            writeln!(f, "Trace: {}", self.span_trace)?;
        }
        Ok(())
    }
}

/* 📖 # Why use Box<MockError> in the result type?

Boxing the error reduces the size of the result type, making it more efficient to return in the common case.
The span trace makes the unboxed error fairly large.
*/

/// Standard result type for the mock server crates.
pub type MockResult<T> = std::result::Result<T, Box<MockError>>;

/// Extension trait for attaching context to Results.
pub trait ResultExt<T> {
    /// Attaches context to an error, consuming and re-wrapping it.
    fn context(self, context: impl Into<String>) -> MockResult<T>;

    /// Attaches context using lazy evaluation.
    /// Context is only evaluated if the result is an error.
    fn with_context<F>(self, f: F) -> MockResult<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for MockResult<T> {
    fn context(self, context: impl Into<String>) -> MockResult<T> {
        self.map_err(|err| Box::new(err.context(context)))
    }

    fn with_context<F>(self, f: F) -> MockResult<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|err| Box::new(err.with_context(f)))
    }
}

/// Build a boxed [`MockError`] from a format string.
#[macro_export]
macro_rules! err {
    ($($arg:tt)*) => {
        Box::new($crate::MockError::message(format!($($arg)*)))
    };
}

/// Return early with a boxed [`MockError`] built from a format string.
#[macro_export]
macro_rules! bail {
    ($($arg:tt)*) => {
        return Err($crate::err!($($arg)*))
    };
}
