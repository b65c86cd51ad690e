//! Path targets validated against the filesystem while casting.
//!
//! Failures surface as [`CastError::Path`], which error reporting prints as
//! `<path>: <reason>` rather than the usual `<key>: <reason> '<value>'`.

use std::fs;
use std::io;
use std::ops::Deref;
use std::path::{Path, PathBuf};

use crate::cast::{CastError, Castable};

fn describe(err: &io::Error) -> String {
    let text = match err.kind() {
        io::ErrorKind::NotFound => "No such file or directory",
        io::ErrorKind::PermissionDenied => "Permission denied",
        io::ErrorKind::NotADirectory => "Not a directory",
        io::ErrorKind::IsADirectory => "Is a directory",
        _ => return err.to_string(),
    };
    text.to_string()
}

fn path_error(text: &str) -> CastError {
    CastError::Path(text.to_string())
}

fn metadata(path: &Path) -> Result<fs::Metadata, CastError> {
    fs::metadata(path).map_err(|err| CastError::Path(describe(&err)))
}

fn check_exists(path: &Path) -> Result<(), CastError> {
    metadata(path).map(|_| ())
}

fn check_readable_file(path: &Path) -> Result<(), CastError> {
    if metadata(path)?.is_dir() {
        return Err(path_error("Is a directory"));
    }
    fs::File::open(path)
        .map(|_| ())
        .map_err(|err| CastError::Path(describe(&err)))
}

fn check_writable_file(path: &Path) -> Result<(), CastError> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_dir() => Err(path_error("Is a directory")),
        Ok(meta) if meta.permissions().readonly() => Err(path_error("Permission denied")),
        Ok(_) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            // A missing file is fine as long as it can be created.
            let parent = match path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent,
                _ => Path::new("."),
            };
            check_writable_directory(parent)
        }
        Err(err) => Err(CastError::Path(describe(&err))),
    }
}

fn check_executable_file(path: &Path) -> Result<(), CastError> {
    let meta = metadata(path)?;
    if meta.is_dir() {
        return Err(path_error("Is a directory"));
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if meta.permissions().mode() & 0o111 == 0 {
            return Err(path_error("Permission denied"));
        }
    }
    Ok(())
}

fn check_readable_directory(path: &Path) -> Result<(), CastError> {
    if !metadata(path)?.is_dir() {
        return Err(path_error("Not a directory"));
    }
    fs::read_dir(path)
        .map(|_| ())
        .map_err(|err| CastError::Path(describe(&err)))
}

fn check_writable_directory(path: &Path) -> Result<(), CastError> {
    let meta = metadata(path)?;
    if !meta.is_dir() {
        return Err(path_error("Not a directory"));
    }
    if meta.permissions().readonly() {
        return Err(path_error("Permission denied"));
    }
    Ok(())
}

macro_rules! validated_path {
    ($($(#[$meta:meta])* $name:ident => $check:path;)*) => {$(
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
        pub struct $name(PathBuf);

        impl $name {
            pub fn as_path(&self) -> &Path {
                &self.0
            }

            pub fn into_path_buf(self) -> PathBuf {
                self.0
            }
        }

        impl Deref for $name {
            type Target = Path;

            fn deref(&self) -> &Path {
                &self.0
            }
        }

        impl AsRef<Path> for $name {
            fn as_ref(&self) -> &Path {
                &self.0
            }
        }

        impl Castable for $name {
            type Cursor = ();

            fn from_token(_: &mut (), raw: &str) -> Result<Self, CastError> {
                let path = PathBuf::from(raw);
                $check(&path)?;
                Ok(Self(path))
            }
        }
    )*};
}

validated_path! {
    /// Any existing filesystem entry.
    ExistingPath => check_exists;
    /// An existing file that can be opened for reading.
    ReadableFile => check_readable_file;
    /// A file that exists and is writable, or can be created.
    WritableFile => check_writable_file;
    ExecutableFile => check_executable_file;
    /// An existing directory whose entries can be listed.
    ReadableDirectory => check_readable_directory;
    WritableDirectory => check_writable_directory;
}
