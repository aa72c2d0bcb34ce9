/// HTTP header names for fingerprint injection
pub mod names {
    /// Header carrying the raw JA3 hash of the client's ClientHello
    ///
    /// Appended whenever a hash is available for the connection, in both
    /// enforcement modes.
    pub const JA3: &str = "ja3";

    /// Header carrying the client family classified from the JA3 hash
    ///
    /// Only appended under strict enforcement, where the hash is looked up
    /// in the fingerprint database.
    pub const BROWSER: &str = "browser";
}

/// HTTP header names for X-Forwarded-* headers
pub mod forwarded {
    /// Header name for X-Forwarded-For
    ///
    /// Contains the client IP address(es) in a comma-separated list.
    pub const FOR: &str = "x-forwarded-for";

    /// Header name for X-Forwarded-Proto
    ///
    /// Contains the protocol used by the client ("http" or "https").
    pub const PROTO: &str = "x-forwarded-proto";
}
