/// FolderLens Core — directory enumeration and entry classification.
///
/// This crate contains the whole listing engine with zero UI dependencies,
/// reusable from any frontend (widget, CLI, tests).
///
/// # Modules
///
/// - [`model`] — Entry variants, visibility filters and type labels.
/// - [`record`] — Native find-data records and their decoding.
/// - [`classify`] — One record in, at most one classified entry out.
/// - [`services`] — Shell collaborator seams (names, links, git, streams,
///   etc.) with std-backed defaults.
/// - [`enumerate`] — The two scan drivers plus batching, cancellation and
///   error taxonomy.
/// - [`platform`] — `std::fs` storage source everywhere; native find and
///   shell bindings on Windows.
pub mod classify;
pub mod enumerate;
pub mod model;
pub mod platform;
pub mod record;
pub mod services;
