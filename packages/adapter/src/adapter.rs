//! [`RepositoryAdapter`]: the filesystem contract on top of a document
//! repository.

use std::io::Read;

use docrepo_automation::{properties, Automation, AutomationExt, Blob, Document, OperationId};

use crate::blob_pipeline::{BlobPipeline, SpooledContent};
use crate::concatenation::ConcatenationService;
use crate::config::AdapterConfig;
use crate::error::Error;
use crate::filesystem::{
    Capabilities, Capability, Concatenator, FileContents, FileStream, Filesystem,
    MimetypeConverter, UidResolver, Visibility, WriteOptions,
};
use crate::locator::DocumentLocator;
use crate::materializer::DirectoryMaterializer;
use crate::metadata::{now, DirectoryRecord, FileRecord, MetadataNormalizer};
use crate::path_codec::{basename, dirname, to_internal, PathCodec};
use crate::relocation::{MoveCopyCompensator, RelocationKind};

/// Stores files as documents of a remote repository.
///
/// Files are `File` documents whose attached blob holds the content;
/// directories are `Folder` documents. The adapter keeps no state between
/// calls: every operation resolves what it needs from the repository
/// again.
pub struct RepositoryAdapter<C: Automation> {
    client: C,
    codec: PathCodec,
}

impl<C: Automation> RepositoryAdapter<C> {
    pub fn new(client: C, config: &AdapterConfig) -> Self {
        Self {
            client,
            codec: PathCodec::new(&config.root_prefix),
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn path_codec(&self) -> &PathCodec {
        &self.codec
    }

    fn normalizer(&self) -> MetadataNormalizer<'_> {
        MetadataNormalizer::new(&self.codec)
    }

    fn mimetype_for(
        &self,
        path: &str,
        spool: &SpooledContent,
        options: &WriteOptions,
    ) -> Result<String, Error> {
        match &options.mimetype {
            Some(mimetype) => Ok(mimetype.clone()),
            None => spool.sniff_mimetype(path),
        }
    }

    /// Create the file document for `path` and upload `spool` into it.
    fn create_file(
        &self,
        path: &str,
        spool: SpooledContent,
        options: &WriteOptions,
    ) -> Result<FileRecord, Error> {
        let internal = self.codec.apply_prefix(path);
        let parent = dirname(&internal);
        let name = basename(&internal);
        let mimetype = self.mimetype_for(path, &spool, options)?;

        DirectoryMaterializer::new(&self.client).ensure_path(&parent)?;

        log::debug!("Creating file {} under {}...", name, parent);
        let doc = self
            .client
            .operation(OperationId::DocumentCreate)
            .input_path(to_internal(&parent))
            .param("type", "File")
            .param("name", name)
            .param("properties", properties([("dc:title", name)]))
            .execute_document()?;

        let blob = BlobPipeline::new(&self.client).upload(&doc.path, spool.path(), &mimetype)?;

        Ok(self.normalizer().normalize(
            &doc.path,
            doc.last_modified_timestamp().unwrap_or_else(now),
            blob.size()?,
            blob.mime_type(),
            Some(&doc.uid),
        ))
    }

    /// Replace the content of the existing file at `path` with `spool`.
    fn replace_content(
        &self,
        path: &str,
        spool: SpooledContent,
        options: &WriteOptions,
    ) -> Result<FileRecord, Error> {
        let internal = self.codec.apply_prefix(path);
        let mimetype = self.mimetype_for(path, &spool, options)?;

        let blob = BlobPipeline::new(&self.client).upload(&internal, spool.path(), &mimetype)?;

        Ok(self
            .normalizer()
            .normalize(&internal, now(), blob.size()?, blob.mime_type(), None))
    }

    /// Resolve the file at `path` and fetch its content.
    fn fetch(&self, path: &str) -> Result<(FileRecord, Blob), Error> {
        let internal = self.codec.apply_prefix(path);
        let doc = DocumentLocator::new(&self.client).find_by_path(&internal)?;
        let blob = BlobPipeline::new(&self.client).fetch_blob(&internal)?;
        Ok((self.document_record(&doc, &blob)?, blob))
    }

    fn document_record(&self, doc: &Document, blob: &Blob) -> Result<FileRecord, Error> {
        Ok(self.normalizer().normalize(
            &doc.path,
            doc.last_modified_timestamp().unwrap_or_else(now),
            blob.size()?,
            blob.mime_type(),
            Some(&doc.uid),
        ))
    }

    fn with_contents(record: FileRecord, blob: Blob) -> Result<FileContents, Error> {
        Ok(FileContents {
            record,
            contents: blob.contents()?,
        })
    }

    /// Contents of a merged blob, recorded under its local spool path.
    ///
    /// The spool is removed once the contents are read, so the recorded
    /// path only names where the merge result was received.
    fn merged(&self, blob: Blob) -> Result<FileContents, Error> {
        let spool = blob.path().to_string_lossy().into_owned();
        let record = self
            .normalizer()
            .spooled(&spool, now(), blob.size()?, blob.mime_type());
        Self::with_contents(record, blob)
    }

    fn relocate(&self, kind: RelocationKind, from: &str, to: &str) -> Result<(), Error> {
        MoveCopyCompensator::new(&self.client, &self.codec).relocate(kind, from, to)?;
        Ok(())
    }

    fn unsupported<T>(operation: &'static str) -> Result<T, Error> {
        Err(Error::UnsupportedOperation { operation })
    }
}

impl<C: Automation> Filesystem for RepositoryAdapter<C> {
    fn write(
        &self,
        path: &str,
        contents: &[u8],
        options: &WriteOptions,
    ) -> Result<FileRecord, Error> {
        self.create_file(path, SpooledContent::from_bytes(contents)?, options)
    }

    fn write_stream(
        &self,
        path: &str,
        reader: &mut dyn Read,
        options: &WriteOptions,
    ) -> Result<FileRecord, Error> {
        self.create_file(path, SpooledContent::from_reader(reader)?, options)
    }

    fn update(
        &self,
        path: &str,
        contents: &[u8],
        options: &WriteOptions,
    ) -> Result<FileRecord, Error> {
        self.replace_content(path, SpooledContent::from_bytes(contents)?, options)
    }

    fn update_stream(
        &self,
        path: &str,
        reader: &mut dyn Read,
        options: &WriteOptions,
    ) -> Result<FileRecord, Error> {
        self.replace_content(path, SpooledContent::from_reader(reader)?, options)
    }

    fn rename(&self, from: &str, to: &str) -> Result<(), Error> {
        self.relocate(RelocationKind::Move, from, to)
    }

    fn copy(&self, from: &str, to: &str) -> Result<(), Error> {
        self.relocate(RelocationKind::Copy, from, to)
    }

    fn delete(&self, path: &str) -> Result<(), Error> {
        let internal = to_internal(&self.codec.apply_prefix(path));
        log::debug!("Deleting {}...", internal);
        Ok(self
            .client
            .operation(OperationId::DocumentDelete)
            .input_path(internal)
            .execute_void()?)
    }

    fn delete_dir(&self, path: &str) -> Result<(), Error> {
        self.delete(path)
    }

    fn create_dir(&self, path: &str) -> Result<DirectoryRecord, Error> {
        let path = if path == "." { "" } else { path };
        let internal = self.codec.apply_prefix(path);
        DirectoryMaterializer::new(&self.client).ensure_path(&internal)?;
        Ok(self.normalizer().directory(&internal))
    }

    fn has(&self, path: &str) -> Result<bool, Error> {
        DocumentLocator::new(&self.client).exists(&self.codec.apply_prefix(path))
    }

    fn read(&self, path: &str) -> Result<FileContents, Error> {
        let (record, blob) = self.fetch(path)?;
        Ok(FileContents {
            record,
            contents: blob.contents()?,
        })
    }

    fn read_stream(&self, path: &str) -> Result<FileStream, Error> {
        let (record, blob) = self.fetch(path)?;
        Ok(FileStream {
            record,
            stream: Box::new(blob.into_reader()?),
        })
    }

    fn list_contents(&self, _directory: &str, _recursive: bool) -> Result<Vec<FileRecord>, Error> {
        Self::unsupported("listContents")
    }

    fn get_metadata(&self, _path: &str) -> Result<FileRecord, Error> {
        Self::unsupported("getMetadata")
    }

    fn get_size(&self, _path: &str) -> Result<u64, Error> {
        Self::unsupported("getSize")
    }

    fn get_mimetype(&self, _path: &str) -> Result<String, Error> {
        Self::unsupported("getMimetype")
    }

    fn get_timestamp(&self, _path: &str) -> Result<i64, Error> {
        Self::unsupported("getTimestamp")
    }

    fn get_visibility(&self, _path: &str) -> Result<Visibility, Error> {
        Self::unsupported("getVisibility")
    }

    fn set_visibility(&self, _path: &str, _visibility: Visibility) -> Result<(), Error> {
        Self::unsupported("setVisibility")
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::none()
            .with(Capability::ResolveUid)
            .with(Capability::Convert)
            .with(Capability::Concatenate)
    }
}

impl<C: Automation> UidResolver for RepositoryAdapter<C> {
    fn resolve_uid(&self, uid: &str) -> Result<String, Error> {
        let doc = DocumentLocator::new(&self.client).resolve(uid)?;
        Ok(self.codec.to_external(&doc.path))
    }
}

impl<C: Automation> MimetypeConverter for RepositoryAdapter<C> {
    fn convert(&self, path: &str, mimetype: &str) -> Result<FileContents, Error> {
        let internal = self.codec.apply_prefix(path);
        log::debug!("Converting {} to {}...", internal, mimetype);
        let blob = self
            .client
            .operation(OperationId::BlobConvert)
            .input_path(to_internal(&internal))
            .param("mimeType", mimetype)
            .execute_blob()?;
        let record = self
            .normalizer()
            .normalize(&internal, now(), blob.size()?, blob.mime_type(), None);
        Self::with_contents(record, blob)
    }
}

impl<C: Automation> Concatenator for RepositoryAdapter<C> {
    fn concatenate(&self, paths: &[&str]) -> Result<FileContents, Error> {
        let internal: Vec<String> = paths.iter().map(|p| self.codec.apply_prefix(p)).collect();
        let blob = ConcatenationService::new(&self.client).merge_by_paths(internal.as_slice())?;
        self.merged(blob)
    }

    fn concatenate_by_uids(&self, uids: &[&str]) -> Result<FileContents, Error> {
        let blob = ConcatenationService::new(&self.client).merge_by_uids(uids)?;
        self.merged(blob)
    }
}
