/// Platform backends behind the enumeration and service seams.
///
/// [`fs_source`] serves the storage driver through `std::fs` on every
/// platform; [`win32`] binds the native find APIs and shell lookups on
/// Windows.
pub mod fs_source;
#[cfg(windows)]
pub mod win32;

pub use fs_source::FsStorageSource;
#[cfg(windows)]
pub use win32::{ShellDisplayNames, Win32FindStream, Win32StreamSource};
