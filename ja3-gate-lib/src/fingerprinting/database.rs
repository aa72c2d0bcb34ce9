use ahash::AHashMap;
use std::borrow::Cow;
use std::sync::{Arc, LazyLock};

/// Known JA3 hashes and the client family that produced them.
pub const BUILTIN_FINGERPRINTS: &[(&str, &str)] = &[
    ("09e8da600773390473b708b18c586b6b", "IOS"),
    ("1c6a21040d734c88908c9f569db6e84e", "Android"),
    ("44f7ed5185d22c92b96da72dbe68d307", "Safari"),
    ("47e81c30acfb7136fd63c8c90db110f2", "IOS"),
    ("4ae9619a31749ee24c7e77ec3162be41", "IOS"),
    ("4e3f1cb6f800f5f840099be45843aa0e", "Android"),
    ("664f25de9096f23cf8dae21a69a3ec6c", "Android"),
    ("aa56c057ad164ec4fdcb7a5a283be9fc", "Chrome"),
    ("b1efda11c805621e0f9cdc311958cb8c", "Firefox"),
    ("b6c462146270c94ed8e339bcf4fff25f", "Android"),
    ("ba3f95f76ace81b9429d294856c194b5", "Firefox"),
    ("e65e53f6d9a7a0df7e97cf1bd5ba6082", "Android"),
    ("26615da679e653f4882c85942232900e", "Git"),
];

static BUILTIN: LazyLock<Arc<FingerprintDatabase>> =
    LazyLock::new(|| Arc::new(FingerprintDatabase::from_records(BUILTIN_FINGERPRINTS)));

/// Immutable JA3 hash to client family table
///
/// Built once and never mutated afterwards, so it can be shared across
/// connections without synchronization. Hashes are stored lower-case and
/// lookups are case-insensitive.
#[derive(Debug, Clone, Default)]
pub struct FingerprintDatabase {
    entries: AHashMap<String, String>,
}

impl FingerprintDatabase {
    /// The process-wide database built from [`BUILTIN_FINGERPRINTS`]
    pub fn builtin() -> Arc<FingerprintDatabase> {
        Arc::clone(&*BUILTIN)
    }

    /// Builds a database from `(hash, label)` pairs.
    ///
    /// The first occurrence of a hash wins.
    pub fn from_records(records: &[(&str, &str)]) -> Self {
        let mut entries = AHashMap::with_capacity(records.len());
        for (hash, label) in records {
            entries
                .entry(hash.to_ascii_lowercase())
                .or_insert_with(|| (*label).to_string());
        }
        Self { entries }
    }

    /// Returns the client family for `hash`, or `None` if the hash is unknown.
    pub fn classify(&self, hash: &str) -> Option<&str> {
        let key = if hash.bytes().any(|b| b.is_ascii_uppercase()) {
            Cow::Owned(hash.to_ascii_lowercase())
        } else {
            Cow::Borrowed(hash)
        };
        self.entries.get(key.as_ref()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(h, l)| (h.as_str(), l.as_str()))
    }
}
