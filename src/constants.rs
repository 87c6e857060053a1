// Tuning constants for batch fetching and unit conversion.

// === Fetching ===
/// Items requested per page when enumerating a library.
pub const DEFAULT_PAGE_SIZE: usize = 100;
/// Backends enumerated at the same time by `LibraryFetcher::fetch_from_backends`.
pub const DEFAULT_MAX_CONCURRENT_BACKENDS: usize = 4;

// === Units ===
/// Jellyfin and Emby measure run time in 100ns ticks.
pub const TICKS_PER_SECOND: i64 = 10_000_000;
