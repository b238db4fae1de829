use crate::params::OutputFormat;

/// Memo of the most recent successful format conversion.
///
/// Holds at most one entry, keyed by the exact source content and the
/// format pair. An entry is only served while the source still matches,
/// so the scorer never consumes a conversion of stale content. Any draft
/// mutation outside the conversion path must call
/// [`invalidate`](Self::invalidate) rather than rely on the key check.
#[derive(Debug, Default)]
pub struct ConversionCache {
    entry: Option<CacheEntry>,
}

#[derive(Debug, Clone)]
struct CacheEntry {
    source: String,
    from: OutputFormat,
    to: OutputFormat,
    converted: String,
}

impl ConversionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached conversion for `source`, if it is still current.
    pub fn lookup(&self, source: &str, from: OutputFormat, to: OutputFormat) -> Option<&str> {
        self.entry
            .as_ref()
            .filter(|e| e.source == source && e.from == from && e.to == to)
            .map(|e| e.converted.as_str())
    }

    /// Remember a successful conversion, replacing any previous entry.
    pub fn store(
        &mut self,
        source: String,
        from: OutputFormat,
        to: OutputFormat,
        converted: String,
    ) {
        self.entry = Some(CacheEntry {
            source,
            from,
            to,
            converted,
        });
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    pub fn is_empty(&self) -> bool {
        self.entry.is_none()
    }
}
