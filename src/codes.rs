//! Translation of native `gsapi` result codes
//!
//! The engine reports every outcome as a plain `i32`: zero (or positive) on
//! success and a negative value from a fixed table on failure. `ErrorCode`
//! gives every possible value exactly one categorized meaning.

use std::fmt;

/// Categorized meaning of a native result code.
///
/// `ErrorCode::from_raw` is total: codes that are not in the engine's table
/// become `Unknown` with the raw value preserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    Success,
    UnknownError,
    DictFull,
    DictStackOverflow,
    DictStackUnderflow,
    ExecStackOverflow,
    Interrupt,
    InvalidAccess,
    InvalidExit,
    InvalidFileAccess,
    InvalidFont,
    InvalidRestore,
    IoError,
    LimitCheck,
    NoCurrentPoint,
    RangeCheck,
    StackOverflow,
    StackUnderflow,
    SyntaxError,
    Timeout,
    TypeCheck,
    Undefined,
    UndefinedFilename,
    UndefinedResult,
    UnmatchedMark,
    VmError,
    ConfigurationError,
    UndefinedResource,
    Unregistered,
    InvalidContext,
    InvalidId,
    /// The interpreter hit an unrecoverable condition
    Fatal,
    /// The interpreter executed `quit`
    Quit,
    /// More input is required to continue
    NeedInput,
    /// Informational return, not a document problem
    Info,
    /// A code missing from the table, kept for diagnostics
    Unknown(i32),
}

/// Broad grouping of error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Success,
    /// Problems in the document content (range, type, syntax, fonts)
    Content,
    /// Operand, dictionary or execution stack exhaustion
    Stack,
    /// Missing or invalid names, files and resources
    Resource,
    Io,
    /// Memory and implementation limits
    Limit,
    /// Engine-level termination semantics: fatal, quit, need-input, info
    Control,
    Unknown,
}

const TABLE: &[(i32, ErrorCode)] = &[
    (0, ErrorCode::Success),
    (-1, ErrorCode::UnknownError),
    (-2, ErrorCode::DictFull),
    (-3, ErrorCode::DictStackOverflow),
    (-4, ErrorCode::DictStackUnderflow),
    (-5, ErrorCode::ExecStackOverflow),
    (-6, ErrorCode::Interrupt),
    (-7, ErrorCode::InvalidAccess),
    (-8, ErrorCode::InvalidExit),
    (-9, ErrorCode::InvalidFileAccess),
    (-10, ErrorCode::InvalidFont),
    (-11, ErrorCode::InvalidRestore),
    (-12, ErrorCode::IoError),
    (-13, ErrorCode::LimitCheck),
    (-14, ErrorCode::NoCurrentPoint),
    (-15, ErrorCode::RangeCheck),
    (-16, ErrorCode::StackOverflow),
    (-17, ErrorCode::StackUnderflow),
    (-18, ErrorCode::SyntaxError),
    (-19, ErrorCode::Timeout),
    (-20, ErrorCode::TypeCheck),
    (-21, ErrorCode::Undefined),
    (-22, ErrorCode::UndefinedFilename),
    (-23, ErrorCode::UndefinedResult),
    (-24, ErrorCode::UnmatchedMark),
    (-25, ErrorCode::VmError),
    (-26, ErrorCode::ConfigurationError),
    (-27, ErrorCode::UndefinedResource),
    (-28, ErrorCode::Unregistered),
    (-29, ErrorCode::InvalidContext),
    (-30, ErrorCode::InvalidId),
    (-100, ErrorCode::Fatal),
    (-101, ErrorCode::Quit),
    (-106, ErrorCode::NeedInput),
    (-110, ErrorCode::Info),
];

impl ErrorCode {
    /// Map a raw native code to its categorized kind
    pub fn from_raw(code: i32) -> Self {
        TABLE
            .iter()
            .find(|(raw, _)| *raw == code)
            .map(|(_, kind)| *kind)
            .unwrap_or(ErrorCode::Unknown(code))
    }

    /// The raw native value for this kind
    pub fn raw(self) -> i32 {
        if let ErrorCode::Unknown(code) = self {
            return code;
        }
        TABLE
            .iter()
            .find(|(_, kind)| *kind == self)
            .map(|(raw, _)| *raw)
            .unwrap_or_default()
    }

    pub fn is_success(self) -> bool {
        self == ErrorCode::Success
    }

    /// Fatal, quit and need-input signal how the interpreter terminated
    /// rather than a problem with the document.
    pub fn is_control(self) -> bool {
        self.category() == ErrorCategory::Control
    }

    pub fn category(self) -> ErrorCategory {
        use ErrorCode::*;
        match self {
            Success => ErrorCategory::Success,
            RangeCheck | TypeCheck | SyntaxError | InvalidFont | NoCurrentPoint
            | UndefinedResult | UnmatchedMark | InvalidRestore | InvalidExit => {
                ErrorCategory::Content
            }
            DictStackOverflow | DictStackUnderflow | ExecStackOverflow | StackOverflow
            | StackUnderflow => ErrorCategory::Stack,
            Undefined | UndefinedFilename | UndefinedResource | InvalidAccess
            | InvalidFileAccess | InvalidContext | InvalidId | Unregistered
            | ConfigurationError => ErrorCategory::Resource,
            IoError | Interrupt | Timeout => ErrorCategory::Io,
            VmError | LimitCheck | DictFull => ErrorCategory::Limit,
            Fatal | Quit | NeedInput | Info => ErrorCategory::Control,
            UnknownError | Unknown(_) => ErrorCategory::Unknown,
        }
    }

    fn describe(self) -> &'static str {
        use ErrorCode::*;
        match self {
            Success => "success",
            UnknownError => "unknown error",
            DictFull => "dictionary full",
            DictStackOverflow => "dictionary stack overflow",
            DictStackUnderflow => "dictionary stack underflow",
            ExecStackOverflow => "execution stack overflow",
            Interrupt => "interrupted",
            InvalidAccess => "invalid access",
            InvalidExit => "invalid exit",
            InvalidFileAccess => "invalid file access",
            InvalidFont => "invalid font",
            InvalidRestore => "invalid restore",
            IoError => "I/O error",
            LimitCheck => "implementation limit exceeded",
            NoCurrentPoint => "no current point",
            RangeCheck => "range check",
            StackOverflow => "operand stack overflow",
            StackUnderflow => "operand stack underflow",
            SyntaxError => "syntax error",
            Timeout => "timeout",
            TypeCheck => "type check",
            Undefined => "undefined",
            UndefinedFilename => "undefined file name",
            UndefinedResult => "undefined result",
            UnmatchedMark => "unmatched mark",
            VmError => "VM error",
            ConfigurationError => "configuration error",
            UndefinedResource => "undefined resource",
            Unregistered => "unregistered",
            InvalidContext => "invalid context",
            InvalidId => "invalid id",
            Fatal => "fatal error",
            Quit => "quit",
            NeedInput => "need more input",
            Info => "informational",
            Unknown(_) => "unrecognized code",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code {})", self.describe(), self.raw())
    }
}

/// Pass non-negative codes through, translate negative ones.
pub fn check(code: i32) -> std::result::Result<i32, ErrorCode> {
    if code < 0 {
        Err(ErrorCode::from_raw(code))
    } else {
        Ok(code)
    }
}
