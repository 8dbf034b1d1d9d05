//! Directory entries and the metadata they expose to queries.

use std::borrow::Cow;
use std::cell::RefCell;
use std::collections::HashMap;
use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::field::FieldKind;
use crate::{Error, Result};

/// What kind of filesystem object an entry is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
    /// A symbolic link whose target could not be read.
    Symlink,
}

impl EntryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EntryKind::File => "file",
            EntryKind::Directory => "directory",
            EntryKind::Symlink => "symlink",
        }
    }
}

/// Metadata for one directory entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryMetadata {
    pub name: String,
    /// Full path of the entry (directory joined with name).
    pub path: PathBuf,
    /// Text after the last `.` of the name, empty when there is none.
    pub extension: String,
    pub created_at: DateTime<Local>,
    pub modified_at: DateTime<Local>,
    pub owner: String,
    pub group: String,
    pub size: u64,
    pub kind: EntryKind,
    /// ls-style mode string, e.g. `-rw-r--r--`.
    pub permission: String,
    /// Hard link count.
    pub links: u64,
}

/// A field's value in its native type.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue<'a> {
    Text(Cow<'a, str>),
    Number(u64),
    Date(DateTime<Local>),
}

impl EntryMetadata {
    pub fn value(&self, field: FieldKind) -> FieldValue<'_> {
        match field {
            FieldKind::Permission => FieldValue::Text(Cow::Borrowed(&self.permission)),
            FieldKind::Links => FieldValue::Number(self.links),
            FieldKind::Owner => FieldValue::Text(Cow::Borrowed(&self.owner)),
            FieldKind::Group => FieldValue::Text(Cow::Borrowed(&self.group)),
            FieldKind::FileSize => FieldValue::Number(self.size),
            FieldKind::LastMod => FieldValue::Date(self.modified_at),
            FieldKind::CreateDt => FieldValue::Date(self.created_at),
            FieldKind::Name => FieldValue::Text(Cow::Borrowed(&self.name)),
            FieldKind::Extension => FieldValue::Text(Cow::Borrowed(&self.extension)),
            FieldKind::Path => FieldValue::Text(self.path.to_string_lossy()),
            FieldKind::Type => FieldValue::Text(Cow::Borrowed(self.kind.as_str())),
        }
    }

    /// Textual form of a field, as displayed and as compared by `=`,
    /// `!=` and `LIKE`.
    pub fn render(&self, field: FieldKind, date_format: &str) -> String {
        match self.value(field) {
            FieldValue::Text(text) => text.into_owned(),
            FieldValue::Number(n) => n.to_string(),
            FieldValue::Date(date) => date.format(date_format).to_string(),
        }
    }
}

/// Extension of an entry name.
pub fn extension_of(name: &str) -> &str {
    name.rsplit_once('.').map(|(_, ext)| ext).unwrap_or_default()
}

/// Source of directory listings and entry metadata.
pub trait EntrySource {
    /// Names of the immediate entries of `dir`, excluding `.` and `..`,
    /// in listing order. Names are raw and need not be valid UTF-8.
    fn list(&self, dir: &Path) -> Result<Vec<OsString>>;

    /// Metadata for `name` inside `dir`.
    fn metadata(&self, dir: &Path, name: &OsStr) -> Result<EntryMetadata>;
}

/// [`EntrySource`] backed by the local filesystem.
#[derive(Debug, Default)]
pub struct FsSource {
    users: RefCell<HashMap<u32, String>>,
    groups: RefCell<HashMap<u32, String>>,
}

impl FsSource {
    pub fn new() -> Self {
        Self::default()
    }

    fn owner_name(&self, uid: u32) -> String {
        self.users
            .borrow_mut()
            .entry(uid)
            .or_insert_with(|| user_name(uid).unwrap_or_else(|| uid.to_string()))
            .clone()
    }

    fn group_name(&self, gid: u32) -> String {
        self.groups
            .borrow_mut()
            .entry(gid)
            .or_insert_with(|| group_name(gid).unwrap_or_else(|| gid.to_string()))
            .clone()
    }
}

impl EntrySource for FsSource {
    fn list(&self, dir: &Path) -> Result<Vec<OsString>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(dir).map_err(|e| Error::fs(dir, e))? {
            let entry = entry.map_err(|e| Error::fs(dir, e))?;
            let name = entry.file_name();
            if name != "." && name != ".." {
                names.push(name);
            }
        }
        Ok(names)
    }

    fn metadata(&self, dir: &Path, name: &OsStr) -> Result<EntryMetadata> {
        let path = dir.join(name);
        // Stat the raw name; only the displayed text is lossy
        let name = name.to_string_lossy();

        // Follow symlinks; a dangling link still reports itself
        let (meta, kind) = match fs::metadata(&path) {
            Ok(meta) => {
                let kind = if meta.is_dir() {
                    EntryKind::Directory
                } else {
                    EntryKind::File
                };
                (meta, kind)
            }
            Err(err) => match fs::symlink_metadata(&path) {
                Ok(meta) if meta.file_type().is_symlink() => (meta, EntryKind::Symlink),
                _ => return Err(Error::fs(path, err)),
            },
        };

        let modified_at: DateTime<Local> = meta
            .modified()
            .map_err(|e| Error::fs(&path, e))?
            .into();
        let created_at = created_time(&meta).unwrap_or(modified_at);
        let (owner, group) = self.ownership(&meta);

        Ok(EntryMetadata {
            extension: extension_of(&name).to_string(),
            name: name.into_owned(),
            created_at,
            modified_at,
            owner,
            group,
            size: meta.len(),
            kind,
            permission: permission_string(&meta),
            links: link_count(&meta),
            path,
        })
    }
}

#[cfg(unix)]
impl FsSource {
    fn ownership(&self, meta: &fs::Metadata) -> (String, String) {
        use std::os::unix::fs::MetadataExt;
        (self.owner_name(meta.uid()), self.group_name(meta.gid()))
    }
}

#[cfg(not(unix))]
impl FsSource {
    fn ownership(&self, _meta: &fs::Metadata) -> (String, String) {
        (String::new(), String::new())
    }
}

/// Birth time when the platform has one, otherwise the inode change time.
fn created_time(meta: &fs::Metadata) -> Option<DateTime<Local>> {
    if let Ok(created) = meta.created() {
        return Some(created.into());
    }
    change_time(meta)
}

#[cfg(unix)]
fn change_time(meta: &fs::Metadata) -> Option<DateTime<Local>> {
    use chrono::TimeZone;
    use std::os::unix::fs::MetadataExt;
    Local
        .timestamp_opt(meta.ctime(), meta.ctime_nsec() as u32)
        .single()
}

#[cfg(not(unix))]
fn change_time(_meta: &fs::Metadata) -> Option<DateTime<Local>> {
    None
}

#[cfg(unix)]
fn link_count(meta: &fs::Metadata) -> u64 {
    use std::os::unix::fs::MetadataExt;
    meta.nlink()
}

#[cfg(not(unix))]
fn link_count(_meta: &fs::Metadata) -> u64 {
    1
}

#[cfg(unix)]
fn permission_string(meta: &fs::Metadata) -> String {
    use std::os::unix::fs::PermissionsExt;
    mode_string(meta.file_type().is_dir(), meta.file_type().is_symlink(), meta.permissions().mode())
}

#[cfg(not(unix))]
fn permission_string(meta: &fs::Metadata) -> String {
    let write = if meta.permissions().readonly() { '-' } else { 'w' };
    let kind = if meta.is_dir() { 'd' } else { '-' };
    format!("{}r{}-r{}-r{}-", kind, write, write, write)
}

/// Render a unix mode as `drwxr-xr-x`, including setuid/setgid/sticky bits.
pub fn mode_string(is_dir: bool, is_symlink: bool, mode: u32) -> String {
    let mut out = String::with_capacity(10);
    out.push(if is_symlink {
        'l'
    } else if is_dir {
        'd'
    } else {
        '-'
    });

    // (read, write, exec, special bit, special char when exec set/unset)
    let triplets = [
        (0o400, 0o200, 0o100, 0o4000, ('s', 'S')),
        (0o040, 0o020, 0o010, 0o2000, ('s', 'S')),
        (0o004, 0o002, 0o001, 0o1000, ('t', 'T')),
    ];
    for (r, w, x, special, (set_exec, set_no_exec)) in triplets {
        out.push(if mode & r != 0 { 'r' } else { '-' });
        out.push(if mode & w != 0 { 'w' } else { '-' });
        out.push(match (mode & x != 0, mode & special != 0) {
            (true, true) => set_exec,
            (false, true) => set_no_exec,
            (true, false) => 'x',
            (false, false) => '-',
        });
    }
    out
}

#[cfg(unix)]
fn user_name(uid: u32) -> Option<String> {
    let mut pwd: libc::passwd = unsafe { std::mem::zeroed() };
    let mut result: *mut libc::passwd = std::ptr::null_mut();
    let mut buf: Vec<libc::c_char> = vec![0; 1024];
    loop {
        let rc = unsafe {
            libc::getpwuid_r(uid, &mut pwd, buf.as_mut_ptr(), buf.len(), &mut result)
        };
        if rc == libc::ERANGE && buf.len() < 1 << 16 {
            buf.resize(buf.len() * 2, 0);
            continue;
        }
        if rc != 0 || result.is_null() {
            return None;
        }
        let name = unsafe { std::ffi::CStr::from_ptr(pwd.pw_name) };
        return Some(name.to_string_lossy().into_owned());
    }
}

#[cfg(unix)]
fn group_name(gid: u32) -> Option<String> {
    let mut grp: libc::group = unsafe { std::mem::zeroed() };
    let mut result: *mut libc::group = std::ptr::null_mut();
    let mut buf: Vec<libc::c_char> = vec![0; 1024];
    loop {
        let rc = unsafe {
            libc::getgrgid_r(gid, &mut grp, buf.as_mut_ptr(), buf.len(), &mut result)
        };
        if rc == libc::ERANGE && buf.len() < 1 << 16 {
            buf.resize(buf.len() * 2, 0);
            continue;
        }
        if rc != 0 || result.is_null() {
            return None;
        }
        let name = unsafe { std::ffi::CStr::from_ptr(grp.gr_name) };
        return Some(name.to_string_lossy().into_owned());
    }
}

#[cfg(not(unix))]
fn user_name(_uid: u32) -> Option<String> {
    None
}

#[cfg(not(unix))]
fn group_name(_gid: u32) -> Option<String> {
    None
}
