//! Object access on top of the compound-file directory.
//!
//! Every persisted object is a storage holding a `properties` stream.
//! Strong references name child storages: a single reference names the
//! child directly, vectors and sets name a collection whose elements are
//! `{name}{key}` storages listed by a `{name} index` stream.

use std::io::{Read, Seek};

use cfb::CompoundFile;
use tracing::warn;

use crate::error::{AafError, AafResult};
use crate::pid;
use crate::property::{decode_utf16, set_keys, vector_keys, PropertySet};

/// Name of the stream holding an object's properties.
pub const PROPERTIES_STREAM: &str = "properties";

/// A persisted object: its storage path and decoded properties.
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub path: String,
    pub properties: PropertySet,
}

/// Reads objects out of an AAF compound file.
pub struct ObjectStore<F> {
    file: CompoundFile<F>,
}

impl<F: Read + Seek> ObjectStore<F> {
    /// Opens the compound-file structure of `inner`.
    pub fn open(inner: F) -> AafResult<Self> {
        Ok(Self {
            file: CompoundFile::open(inner)?,
        })
    }

    /// The root object.
    pub fn root(&mut self) -> AafResult<StoredObject> {
        self.object("/")
    }

    /// Reads the object stored at `path`.
    pub fn object(&mut self, path: &str) -> AafResult<StoredObject> {
        let stream_path = join(path, PROPERTIES_STREAM);
        if !self.file.is_stream(&stream_path) {
            return Err(AafError::missing("properties stream", path));
        }
        let bytes = self.read_stream(&stream_path)?;
        Ok(StoredObject {
            path: path.to_string(),
            properties: PropertySet::parse(&bytes)?,
        })
    }

    /// Object targeted by a single strong reference, if the property is set.
    pub fn child(&mut self, parent: &StoredObject, pid: u16) -> AafResult<Option<StoredObject>> {
        let Some(property) = parent.properties.get(pid) else {
            return Ok(None);
        };
        if property.form != pid::SF_STRONG_OBJECT_REFERENCE {
            return Err(AafError::UnexpectedForm {
                pid,
                form: property.form,
            });
        }
        let name = decode_utf16(&property.data);
        self.object(&join(&parent.path, &name)).map(Some)
    }

    /// Objects targeted by a strong reference of any kind, in stored order.
    ///
    /// Elements that cannot be read are logged and skipped.
    pub fn children(&mut self, parent: &StoredObject, pid: u16) -> AafResult<Vec<StoredObject>> {
        let Some(property) = parent.properties.get(pid) else {
            return Ok(Vec::new());
        };
        let form = property.form;
        let name = decode_utf16(&property.data);

        let keys = match form {
            pid::SF_STRONG_OBJECT_REFERENCE => {
                return Ok(self.child(parent, pid)?.into_iter().collect());
            }
            pid::SF_STRONG_OBJECT_REFERENCE_VECTOR => vector_keys(&self.index(parent, &name)?)?,
            pid::SF_STRONG_OBJECT_REFERENCE_SET => set_keys(&self.index(parent, &name)?)?,
            _ => return Err(AafError::UnexpectedForm { pid, form }),
        };

        let mut objects = Vec::with_capacity(keys.len());
        for key in keys {
            let path = join(&parent.path, &element_name(&name, key));
            match self.object(&path) {
                Ok(object) => objects.push(object),
                Err(e) => warn!(path = %path, error = %e, "skipping unreadable element"),
            }
        }
        Ok(objects)
    }

    /// Byte length of the stream named by a data-stream property.
    ///
    /// `None` when the property is not set; a named stream that does not
    /// exist counts as empty.
    pub fn data_stream_len(&mut self, object: &StoredObject, pid: u16) -> AafResult<Option<u64>> {
        let Some(property) = object.properties.get(pid) else {
            return Ok(None);
        };
        if property.form != pid::SF_DATA_STREAM {
            return Err(AafError::UnexpectedForm {
                pid,
                form: property.form,
            });
        }
        // Leading byte is the stream's byte order.
        let name = decode_utf16(property.data.get(1..).unwrap_or_default());
        let path = join(&object.path, &name);
        Ok(Some(self.file.entry(&path).map(|e| e.len()).unwrap_or(0)))
    }

    fn index(&mut self, parent: &StoredObject, name: &str) -> AafResult<Vec<u8>> {
        let path = join(&parent.path, &index_name(name));
        if !self.file.is_stream(&path) {
            return Err(AafError::missing("collection index", path));
        }
        self.read_stream(&path)
    }

    fn read_stream(&mut self, path: &str) -> AafResult<Vec<u8>> {
        let mut stream = self.file.open_stream(path)?;
        let mut bytes = Vec::new();
        stream.read_to_end(&mut bytes)?;
        Ok(bytes)
    }
}

/// Storage name of a collection element.
pub fn element_name(collection: &str, key: u32) -> String {
    format!("{collection}{{{key:x}}}")
}

/// Stream name of a collection index.
pub fn index_name(collection: &str) -> String {
    format!("{collection} index")
}

/// Joins a storage path and a child name.
pub fn join(parent: &str, name: &str) -> String {
    if parent.ends_with('/') {
        format!("{parent}{name}")
    } else {
        format!("{parent}/{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names() {
        assert_eq!(element_name("Mobs-1901", 26), "Mobs-1901{1a}");
        assert_eq!(index_name("Slots-4403"), "Slots-4403 index");
        assert_eq!(join("/", "Header-2"), "/Header-2");
        assert_eq!(join("/Header-2", "Content-3b03"), "/Header-2/Content-3b03");
    }
}
