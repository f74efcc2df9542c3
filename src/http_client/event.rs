/// Classification of a failed attempt. Present iff `status_code` is absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Timeout,
    Connect,
    Read,
    Other,
}

impl ErrorKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Timeout => "timeout",
            ErrorKind::Connect => "connect",
            ErrorKind::Read => "read",
            ErrorKind::Other => "other",
        }
    }
}

/// One per attempted request that produced a terminal outcome. Exactly one
/// of `status_code`/`error_kind` is set.
#[derive(Debug, Clone)]
pub struct RequestEvent {
    pub run_id: String,
    /// Wall-clock seconds since epoch at the first attempt's start.
    pub wall_time: f64,
    /// Monotonic seconds since an arbitrary run-local epoch at completion.
    pub mono_time: f64,
    pub latency_ms: f64,
    pub status_code: Option<u16>,
    pub error_kind: Option<ErrorKind>,
    pub bytes_sent: u64,
    pub bytes_received: u64,
}

impl RequestEvent {
    pub fn success(&self) -> bool {
        matches!(self.status_code, Some(code) if (200..300).contains(&code))
    }
}
