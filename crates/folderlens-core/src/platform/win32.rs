/// Native Win32 backends: the find-first/find-next record stream, alternate
/// data stream discovery, and localized display names via the shell.
///
/// Everything here copies native structs field-for-field into the crate's
/// own record types; decoding and policy live upstream in [`crate::record`]
/// and the classifier. Find handles close on drop.
use std::ffi::c_void;
use std::path::Path;

use windows::core::PCWSTR;
use windows::Win32::Foundation::{
    ERROR_ACCESS_DENIED, ERROR_FILE_NOT_FOUND, ERROR_HANDLE_EOF, ERROR_NO_MORE_FILES,
    ERROR_PATH_NOT_FOUND, HANDLE,
};
use windows::Win32::Storage::FileSystem::{
    FindClose, FindFirstFileW, FindFirstStreamW, FindNextFileW, FindNextStreamW,
    FindStreamInfoStandard, FILE_FLAGS_AND_ATTRIBUTES, WIN32_FIND_DATAW, WIN32_FIND_STREAM_DATA,
};
use windows::Win32::UI::Shell::{SHGetFileInfoW, SHFILEINFOW, SHGFI_DISPLAYNAME};

use crate::enumerate::win32::FindStream;
use crate::enumerate::SourceError;
use crate::record::{Filetime, RawFindData};
use crate::services::{ShellNameSource, StreamRecord, StreamSource};

/// An open find-first/find-next walk over one directory.
///
/// `FindFirstFileW` already returns the first record, so [`open`] parks it
/// and [`next`](FindStream::next) hands it out before touching
/// `FindNextFileW`.
pub struct Win32FindStream {
    handle: HANDLE,
    first: Option<RawFindData>,
    exhausted: bool,
}

impl Win32FindStream {
    /// Open a find stream over every entry of `dir` (pattern `dir\*`).
    pub fn open(dir: &Path) -> Result<Self, SourceError> {
        let pattern = dir.join("*");
        let wide = to_wide(&pattern);

        let mut data = WIN32_FIND_DATAW::default();
        let handle = match unsafe { FindFirstFileW(PCWSTR(wide.as_ptr()), &mut data) } {
            Ok(handle) => handle,
            Err(err) => return Err(find_error(err)),
        };

        Ok(Self {
            handle,
            first: Some(copy_find_data(&data)),
            exhausted: false,
        })
    }
}

impl FindStream for Win32FindStream {
    fn next(&mut self) -> Result<Option<RawFindData>, SourceError> {
        if let Some(first) = self.first.take() {
            return Ok(Some(first));
        }
        if self.exhausted {
            return Ok(None);
        }

        let mut data = WIN32_FIND_DATAW::default();
        match unsafe { FindNextFileW(self.handle, &mut data) } {
            Ok(()) => Ok(Some(copy_find_data(&data))),
            Err(err) if err.code() == ERROR_NO_MORE_FILES.to_hresult() => {
                self.exhausted = true;
                Ok(None)
            }
            Err(err) => {
                self.exhausted = true;
                Err(find_error(err))
            }
        }
    }
}

impl Drop for Win32FindStream {
    fn drop(&mut self) {
        unsafe {
            let _ = FindClose(self.handle);
        }
    }
}

/// Alternate data streams through `FindFirstStreamW`.
///
/// Any failure lists as "no extra streams": the main entry still appears,
/// it just carries no stream children.
pub struct Win32StreamSource;

impl StreamSource for Win32StreamSource {
    fn streams(&self, path: &Path) -> Vec<StreamRecord> {
        let wide = to_wide(path);

        let mut data = WIN32_FIND_STREAM_DATA::default();
        let handle = match unsafe {
            FindFirstStreamW(
                PCWSTR(wide.as_ptr()),
                FindStreamInfoStandard,
                &mut data as *mut WIN32_FIND_STREAM_DATA as *mut c_void,
                0,
            )
        } {
            Ok(handle) => handle,
            Err(err) => {
                // ERROR_HANDLE_EOF just means the entry has no streams at
                // all, which is the norm for directories.
                if err.code() != ERROR_HANDLE_EOF.to_hresult() {
                    tracing::debug!("stream scan of {} failed: {err}", path.display());
                }
                return Vec::new();
            }
        };

        let mut records = vec![stream_record(&data)];
        loop {
            data = WIN32_FIND_STREAM_DATA::default();
            let next = unsafe {
                FindNextStreamW(
                    handle,
                    &mut data as *mut WIN32_FIND_STREAM_DATA as *mut c_void,
                )
            };
            match next {
                Ok(()) => records.push(stream_record(&data)),
                Err(err) => {
                    if err.code() != ERROR_HANDLE_EOF.to_hresult() {
                        tracing::debug!("stream walk of {} stopped early: {err}", path.display());
                    }
                    break;
                }
            }
        }

        unsafe {
            let _ = FindClose(handle);
        }
        records
    }
}

/// Localized folder names through `SHGetFileInfoW`.
///
/// The shell call is the expensive lookup behind
/// [`DisplayNameCache`](crate::services::names::DisplayNameCache); failures
/// return `None` so the on-disk name stands and nothing is cached.
pub struct ShellDisplayNames;

impl ShellNameSource for ShellDisplayNames {
    fn display_name(&self, path: &Path) -> Option<String> {
        let wide = to_wide(path);
        let mut info = SHFILEINFOW::default();

        let ok = unsafe {
            SHGetFileInfoW(
                PCWSTR(wide.as_ptr()),
                FILE_FLAGS_AND_ATTRIBUTES(0),
                Some(&mut info),
                std::mem::size_of::<SHFILEINFOW>() as u32,
                SHGFI_DISPLAYNAME,
            )
        };
        if ok == 0 {
            return None;
        }

        let name = utf16_until_nul(&info.szDisplayName);
        if name.is_empty() {
            None
        } else {
            Some(name)
        }
    }
}

// ── native struct copying ───────────────────────────────────────────────

/// Field-for-field copy of a find-data record. The fixed UTF-16 name
/// buffer is the only part decoded here; attribute mask, the three
/// FILETIME dword pairs, the split size and the reparse tag pass through
/// untouched.
fn copy_find_data(data: &WIN32_FIND_DATAW) -> RawFindData {
    RawFindData {
        name: utf16_until_nul(&data.cFileName),
        attributes: data.dwFileAttributes,
        creation_time: Filetime {
            low: data.ftCreationTime.dwLowDateTime,
            high: data.ftCreationTime.dwHighDateTime,
        },
        last_access_time: Filetime {
            low: data.ftLastAccessTime.dwLowDateTime,
            high: data.ftLastAccessTime.dwHighDateTime,
        },
        last_write_time: Filetime {
            low: data.ftLastWriteTime.dwLowDateTime,
            high: data.ftLastWriteTime.dwHighDateTime,
        },
        file_size_high: data.nFileSizeHigh,
        file_size_low: data.nFileSizeLow,
        // dwReserved0 carries the reparse tag whenever the reparse
        // attribute is set; the decoded record ignores it otherwise.
        reparse_tag: data.dwReserved0,
    }
}

fn stream_record(data: &WIN32_FIND_STREAM_DATA) -> StreamRecord {
    StreamRecord {
        raw_name: utf16_until_nul(&data.cStreamName),
        size_bytes: data.StreamSize.max(0) as u64,
    }
}

fn find_error(err: windows::core::Error) -> SourceError {
    if err.code() == ERROR_FILE_NOT_FOUND.to_hresult()
        || err.code() == ERROR_PATH_NOT_FOUND.to_hresult()
    {
        SourceError::NotFound
    } else if err.code() == ERROR_ACCESS_DENIED.to_hresult() {
        SourceError::AccessDenied
    } else {
        SourceError::Other(err.message())
    }
}

/// Null-terminated UTF-16 copy of a path for PCWSTR parameters.
fn to_wide(path: &Path) -> Vec<u16> {
    path.to_string_lossy()
        .encode_utf16()
        .chain(std::iter::once(0u16))
        .collect()
}

/// Decode a fixed UTF-16 buffer up to its terminator.
fn utf16_until_nul(buf: &[u16]) -> String {
    let len = buf.iter().position(|&c| c == 0).unwrap_or(buf.len());
    String::from_utf16_lossy(&buf[..len])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wide(text: &str) -> Vec<u16> {
        text.encode_utf16().collect()
    }

    #[test]
    fn utf16_buffers_decode_up_to_the_terminator() {
        let mut buf = [0u16; 16];
        let name = wide("notes.txt");
        buf[..name.len()].copy_from_slice(&name);
        // Leftover garbage after the terminator must not leak through.
        buf[12] = u16::from(b'X');

        assert_eq!(utf16_until_nul(&buf), "notes.txt");
        assert_eq!(utf16_until_nul(&[0u16; 4]), "");
    }

    #[test]
    fn find_data_copies_through_field_for_field() {
        let mut data = WIN32_FIND_DATAW {
            dwFileAttributes: 0x0412,
            nFileSizeHigh: 2,
            nFileSizeLow: 1,
            dwReserved0: 0xA000_000C,
            ..Default::default()
        };
        data.ftLastWriteTime.dwLowDateTime = 7;
        data.ftLastWriteTime.dwHighDateTime = 9;
        let name = wide("link");
        data.cFileName[..name.len()].copy_from_slice(&name);

        let raw = copy_find_data(&data);
        assert_eq!(raw.name, "link");
        assert_eq!(raw.attributes, 0x0412);
        assert_eq!(raw.last_write_time, Filetime { low: 7, high: 9 });
        assert_eq!(raw.file_size_high, 2);
        assert_eq!(raw.file_size_low, 1);
        assert_eq!(raw.reparse_tag, 0xA000_000C);
    }

    #[test]
    fn stream_sizes_clamp_negative_values_to_zero() {
        let mut data = WIN32_FIND_STREAM_DATA::default();
        data.StreamSize = -1;
        let name = wide(":Zone.Identifier:$DATA");
        data.cStreamName[..name.len()].copy_from_slice(&name);

        let record = stream_record(&data);
        assert_eq!(record.raw_name, ":Zone.Identifier:$DATA");
        assert_eq!(record.size_bytes, 0);
    }
}
