//! Platform-specific marker traits and time source.
//!
//! Native targets require `Send`/`Sync` for values crossing await points;
//! browser WASM targets do not, and take their clock from `web-time`.

#[cfg(not(all(target_arch = "wasm32", any(target_os = "unknown", target_os = "none"))))]
pub use std::time::SystemTime;

#[cfg(all(target_arch = "wasm32", any(target_os = "unknown", target_os = "none")))]
pub use web_time::SystemTime;

/// Seconds since the Unix epoch, as used for `oauth_timestamp`.
#[must_use]
pub fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Marker trait for types that may be `Send`, depending on platform.
#[cfg(not(all(target_arch = "wasm32", any(target_os = "unknown", target_os = "none"))))]
pub trait MaybeSend: Send {}
#[cfg(not(all(target_arch = "wasm32", any(target_os = "unknown", target_os = "none"))))]
impl<T: Send> MaybeSend for T {}

/// Marker trait for types that may be `Send`, depending on platform.
#[cfg(all(target_arch = "wasm32", any(target_os = "unknown", target_os = "none")))]
pub trait MaybeSend {}
#[cfg(all(target_arch = "wasm32", any(target_os = "unknown", target_os = "none")))]
impl<T> MaybeSend for T {}

/// Marker trait for types that may be `Send + Sync`, depending on platform.
#[cfg(not(all(target_arch = "wasm32", any(target_os = "unknown", target_os = "none"))))]
pub trait MaybeSendSync: Send + Sync {}
#[cfg(not(all(target_arch = "wasm32", any(target_os = "unknown", target_os = "none"))))]
impl<T: Send + Sync> MaybeSendSync for T {}

/// Marker trait for types that may be `Send + Sync`, depending on platform.
#[cfg(all(target_arch = "wasm32", any(target_os = "unknown", target_os = "none")))]
pub trait MaybeSendSync {}
#[cfg(all(target_arch = "wasm32", any(target_os = "unknown", target_os = "none")))]
impl<T> MaybeSendSync for T {}
