//! Named entry points for the optional capabilities.
//!
//! A generic filesystem front end registers plugins by method name and
//! forwards calls to whichever adapter declares the matching capability.

use crate::error::Error;
use crate::filesystem::{Concatenator, FileContents, MimetypeConverter, UidResolver};
use crate::mimetype;

pub trait Plugin {
    /// Name the plugin is dispatched under.
    fn method(&self) -> &'static str;
}

/// `resolveUid(uid)`: path of the document with that identifier.
pub struct UidResolverPlugin<'a, A: UidResolver + ?Sized> {
    adapter: &'a A,
}

impl<'a, A: UidResolver + ?Sized> UidResolverPlugin<'a, A> {
    pub fn new(adapter: &'a A) -> Self {
        Self { adapter }
    }

    pub fn handle(&self, uid: &str) -> Result<String, Error> {
        self.adapter.resolve_uid(uid)
    }
}

impl<A: UidResolver + ?Sized> Plugin for UidResolverPlugin<'_, A> {
    fn method(&self) -> &'static str {
        "resolveUid"
    }
}

/// `convert(path, mimetype)`, limited to mimetypes of the extension map.
pub struct MimetypeConverterPlugin<'a, A: MimetypeConverter + ?Sized> {
    adapter: &'a A,
}

impl<'a, A: MimetypeConverter + ?Sized> MimetypeConverterPlugin<'a, A> {
    pub fn new(adapter: &'a A) -> Self {
        Self { adapter }
    }

    pub fn handle(&self, path: &str, mimetype: &str) -> Result<FileContents, Error> {
        if !mimetype::is_known(mimetype) {
            return Err(Error::UnsupportedMimetype {
                mimetype: mimetype.to_string(),
            });
        }
        self.adapter.convert(path, mimetype)
    }
}

impl<A: MimetypeConverter + ?Sized> Plugin for MimetypeConverterPlugin<'_, A> {
    fn method(&self) -> &'static str {
        "convert"
    }
}

/// `concatenate(paths, by_uid)`.
pub struct ConcatenatorPlugin<'a, A: Concatenator + ?Sized> {
    adapter: &'a A,
}

impl<'a, A: Concatenator + ?Sized> ConcatenatorPlugin<'a, A> {
    pub fn new(adapter: &'a A) -> Self {
        Self { adapter }
    }

    /// With `by_uid` the entries are identifiers rather than paths.
    pub fn handle(&self, entries: &[&str], by_uid: bool) -> Result<FileContents, Error> {
        if by_uid {
            self.adapter.concatenate_by_uids(entries)
        } else {
            self.adapter.concatenate(entries)
        }
    }
}

impl<A: Concatenator + ?Sized> Plugin for ConcatenatorPlugin<'_, A> {
    fn method(&self) -> &'static str {
        "concatenate"
    }
}
