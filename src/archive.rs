//! Zip and tar.gz creation/extraction behind a small provider trait.

use crate::errors::ShellError;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::Path;
use walkdir::WalkDir;
use zip::write::{FileOptions, ZipWriter};
use zip::{CompressionMethod, ZipArchive};

/// Suffix appended to `zip` targets that lack it.
pub const ZIP_EXTENSION: &str = ".zip";

/// Suffix appended to `tar` targets that lack it.
pub const TAR_GZ_EXTENSION: &str = ".tar.gz";

/// Archive codecs consumed by the shell. Entries are stored relative to
/// the source directory; extraction writes below `destination`.
pub trait ArchiveProvider: Send + Sync {
    fn create_zip(&self, source_dir: &Path, archive: &Path) -> crate::Result<()>;

    fn extract_zip(&self, archive: &Path, destination: &Path) -> crate::Result<()>;

    fn create_tar_gz(&self, source_dir: &Path, archive: &Path) -> crate::Result<()>;

    fn extract_tar_gz(&self, archive: &Path, destination: &Path) -> crate::Result<()>;
}

/// Provider backed by the `zip`, `tar` and `flate2` crates.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdArchiver;

impl ArchiveProvider for StdArchiver {
    fn create_zip(&self, source_dir: &Path, archive: &Path) -> crate::Result<()> {
        require_dir(source_dir)?;
        let file = File::create(archive).map_err(|err| ShellError::io(archive, err))?;
        let mut writer = ZipWriter::new(BufWriter::new(file));
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

        for entry in WalkDir::new(source_dir).min_depth(1).sort_by_file_name() {
            let entry = entry.map_err(|err| ShellError::io(source_dir, io::Error::from(err)))?;
            let name = archive_name(source_dir, entry.path())?;
            if entry.file_type().is_dir() {
                writer.add_directory(name, options).map_err(ShellError::archive)?;
            } else {
                writer.start_file(name, options).map_err(ShellError::archive)?;
                let mut input =
                    File::open(entry.path()).map_err(|err| ShellError::io(entry.path(), err))?;
                io::copy(&mut input, &mut writer).map_err(|err| ShellError::io(entry.path(), err))?;
            }
        }
        writer.finish().map_err(ShellError::archive)?;
        Ok(())
    }

    fn extract_zip(&self, archive: &Path, destination: &Path) -> crate::Result<()> {
        let file = File::open(archive).map_err(|err| ShellError::io(archive, err))?;
        let mut zip = ZipArchive::new(file).map_err(ShellError::archive)?;
        zip.extract(destination).map_err(ShellError::archive)
    }

    fn create_tar_gz(&self, source_dir: &Path, archive: &Path) -> crate::Result<()> {
        require_dir(source_dir)?;
        let file = File::create(archive).map_err(|err| ShellError::io(archive, err))?;
        let encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
        let mut builder = tar::Builder::new(encoder);
        builder
            .append_dir_all(".", source_dir)
            .map_err(|err| ShellError::io(source_dir, err))?;
        builder
            .into_inner()
            .and_then(GzEncoder::finish)
            .map_err(|err| ShellError::io(archive, err))?;
        Ok(())
    }

    fn extract_tar_gz(&self, archive: &Path, destination: &Path) -> crate::Result<()> {
        let file = File::open(archive).map_err(|err| ShellError::io(archive, err))?;
        let mut tar = tar::Archive::new(GzDecoder::new(file));
        tar.unpack(destination)
            .map_err(|err| ShellError::archive(format!("{}: {err}", archive.display())))
    }
}

/// Appends `extension` unless the name already ends with it.
pub fn with_extension(name: &str, extension: &str) -> String {
    if name.ends_with(extension) {
        name.to_string()
    } else {
        format!("{name}{extension}")
    }
}

fn require_dir(path: &Path) -> crate::Result<()> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(ShellError::not_found(path))
    }
}

fn archive_name(root: &Path, path: &Path) -> crate::Result<String> {
    let relative = path
        .strip_prefix(root)
        .map_err(|_| ShellError::invalid_input(format!("{} is outside {}", path.display(), root.display())))?;
    Ok(relative
        .components()
        .map(|part| part.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn sample_tree(root: &Path) -> std::path::PathBuf {
        let src = root.join("project");
        fs::create_dir_all(src.join("docs")).unwrap();
        fs::write(src.join("readme.md"), "# hi").unwrap();
        fs::write(src.join("docs/guide.txt"), "steps").unwrap();
        src
    }

    #[test]
    fn zip_keeps_relative_layout() {
        let temp = tempdir().expect("tempdir");
        let src = sample_tree(temp.path());
        let archive = temp.path().join("out.zip");
        StdArchiver.create_zip(&src, &archive).expect("zip");

        let out = temp.path().join("unpacked");
        fs::create_dir(&out).unwrap();
        StdArchiver.extract_zip(&archive, &out).expect("unzip");
        assert_eq!(fs::read_to_string(out.join("readme.md")).unwrap(), "# hi");
        assert_eq!(fs::read_to_string(out.join("docs/guide.txt")).unwrap(), "steps");
    }

    #[test]
    fn tar_gz_keeps_relative_layout() {
        let temp = tempdir().expect("tempdir");
        let src = sample_tree(temp.path());
        let archive = temp.path().join("out.tar.gz");
        StdArchiver.create_tar_gz(&src, &archive).expect("tar");

        let out = temp.path().join("unpacked");
        fs::create_dir(&out).unwrap();
        StdArchiver.extract_tar_gz(&archive, &out).expect("untar");
        assert_eq!(fs::read_to_string(out.join("docs/guide.txt")).unwrap(), "steps");
    }

    #[test]
    fn missing_source_is_not_found() {
        let temp = tempdir().expect("tempdir");
        let err = StdArchiver
            .create_zip(&temp.path().join("nope"), &temp.path().join("x.zip"))
            .expect_err("missing");
        assert!(matches!(err, ShellError::NotFound(_)));
    }

    #[test]
    fn extension_is_added_once() {
        assert_eq!(with_extension("backup", ZIP_EXTENSION), "backup.zip");
        assert_eq!(with_extension("backup.zip", ZIP_EXTENSION), "backup.zip");
        assert_eq!(with_extension("b.tar.gz", TAR_GZ_EXTENSION), "b.tar.gz");
    }
}
