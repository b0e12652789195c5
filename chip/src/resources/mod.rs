use std::{
    fs::File,
    io::{prelude::*, Seek},
    path::Path,
};
use zip::read::ZipArchive;

use crate::LoadError;

/// Represents an archive of roms
/// it contains all kind of information about the information of the archives
pub struct RomArchives<R: Read + Seek> {
    archive: ZipArchive<R>,
}

impl RomArchives<File> {
    /// Will open the zip archive at the given location
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| LoadError::Io {
            name: path.display().to_string(),
            source,
        })?;
        Self::from_reader(file)
    }
}

impl<R: Read + Seek> RomArchives<R> {
    /// Will generate a new rom archive object based of the given zip data
    pub fn from_reader(reader: R) -> Result<Self, LoadError> {
        Ok(RomArchives {
            archive: ZipArchive::new(reader)?,
        })
    }

    /// Will return all the rom names available to be chosen
    pub fn file_names(&self) -> Vec<&'_ str> {
        self.archive.file_names().collect()
    }

    /// Will decompress the information from the zip archive
    pub fn get_file_data(&mut self, name: &str) -> Result<Rom, LoadError> {
        let mut file = self.archive.by_name(name)?;
        let mut data = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut data).map_err(|source| LoadError::Io {
            name: name.to_string(),
            source,
        })?;
        log::debug!("extracted rom '{}' with {} bytes", name, data.len());
        Ok(Rom::new(name, data))
    }
}

#[derive(Clone, Debug, PartialEq)]
/// Represents a single rom with it's information
pub struct Rom {
    /// The rom name
    name: String,
    /// The raw program, loaded verbatim at the start of the program memory
    data: Box<[u8]>,
}

impl Rom {
    /// Will generate a new rom based of the given data
    pub fn new<D: Into<Box<[u8]>>>(name: &str, data: D) -> Self {
        Rom {
            name: name.to_string(),
            data: data.into(),
        }
    }

    /// Will read the rom from the given file, the file name is used as the rom name.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let data = std::fs::read(path).map_err(|source| LoadError::Io {
            name: name.clone(),
            source,
        })?;
        Ok(Rom::new(&name, data))
    }

    /// Will return a slice internal values of the given data
    pub fn get_data(&self) -> &[u8] {
        &self.data
    }

    /// Will return the name of the rom.
    pub fn get_name(&self) -> &str {
        &self.name
    }
}
