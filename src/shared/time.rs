use chrono::{DateTime, SecondsFormat, Utc};

/// Clock trait for abstracting time operations
/// Provides methods for getting current time in different formats
pub trait Clock: Send + Sync {
    /// Get current time as a UTC instant
    fn now(&self) -> DateTime<Utc>;

    /// Get current time as RFC3339 string with a `Z` suffix
    /// Format: "2024-01-15T10:30:00Z"
    fn now_rfc3339(&self) -> String;

    /// Get current time as epoch seconds (for token expiry checks)
    fn now_epoch_seconds(&self) -> i64;

    /// Get current time as epoch milliseconds (the platform's native unit)
    fn now_epoch_millis(&self) -> i64;
}

/// Production implementation of Clock using system time
#[derive(Debug, Clone, Default)]
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn now_rfc3339(&self) -> String {
        Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    fn now_epoch_seconds(&self) -> i64 {
        Utc::now().timestamp()
    }

    fn now_epoch_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Test implementation of Clock with fixed/controllable time
/// Useful for deterministic testing
#[derive(Debug, Clone)]
pub struct FixedClock {
    timestamp: DateTime<Utc>,
}

impl FixedClock {
    /// Create a new FixedClock with the given timestamp
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        Self { timestamp }
    }

    /// Create a FixedClock from RFC3339 string
    pub fn from_rfc3339(timestamp_str: &str) -> Result<Self, chrono::ParseError> {
        let timestamp = DateTime::parse_from_rfc3339(timestamp_str)?.with_timezone(&Utc);
        Ok(Self { timestamp })
    }

    /// Create a FixedClock from epoch milliseconds
    ///
    /// Out-of-range inputs pin the clock to the Unix epoch.
    pub fn from_epoch_millis(millis: i64) -> Self {
        let timestamp = DateTime::from_timestamp_millis(millis).unwrap_or_default();
        Self { timestamp }
    }

    /// Advance time by the given number of seconds
    pub fn advance_seconds(&mut self, seconds: i64) {
        self.timestamp += chrono::Duration::seconds(seconds);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn now_rfc3339(&self) -> String {
        self.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    fn now_epoch_seconds(&self) -> i64 {
        self.timestamp.timestamp()
    }

    fn now_epoch_millis(&self) -> i64 {
        self.timestamp.timestamp_millis()
    }
}
