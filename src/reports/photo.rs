use std::{
    fs::{self, OpenOptions},
    io::{self, Write},
    path::Path,
};

use crate::validation::sanitize_file_name;

const FALLBACK_NAME: &str = "photo";

/// An uploaded photo which has not been written to disk yet.
#[derive(Debug, Clone)]
pub struct Photo {
    file_name: String,
    data: Vec<u8>,
}

impl Photo {
    pub fn new(file_name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            data: data.into(),
        }
    }

    /// Writes the photo into `dir` under its (sanitized) name, adding `_1`,
    /// `_2`, ... before the extension until the name is unused. Returns the
    /// path to reference it by, relative to the static directory.
    pub fn save(&self, dir: &Path) -> io::Result<String> {
        fs::create_dir_all(dir)?;

        let name = sanitize_file_name(&self.file_name)
            .unwrap_or_else(|| FALLBACK_NAME.to_string());
        let (stem, ext) = match name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => {
                (stem.to_string(), format!(".{ext}"))
            }
            _ => (name.clone(), String::new()),
        };

        let mut counter = 0u64;
        loop {
            let candidate = match counter {
                0 => format!("{stem}{ext}"),
                n => format!("{stem}_{n}{ext}"),
            };
            // create_new makes the existence check and creation one step
            match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(dir.join(&candidate))
            {
                Ok(mut file) => {
                    file.write_all(&self.data)?;
                    return Ok(format!("uploads/{candidate}"));
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    counter += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Deletes a photo written by [`Photo::save`], given the reference it
/// returned.
pub fn remove_saved(dir: &Path, reference: &str) {
    let Some(name) = reference.strip_prefix("uploads/") else {
        return;
    };
    if let Err(e) = fs::remove_file(dir.join(name)) {
        tracing::warn!(error = %e, photo = %reference, "could not remove photo");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::temp_data_dir;

    #[test]
    fn names_are_deduplicated_before_the_extension() {
        let dir = temp_data_dir();
        let photo = Photo::new("crack.png", b"png".to_vec());

        assert_eq!(photo.save(&dir).unwrap(), "uploads/crack.png");
        assert_eq!(photo.save(&dir).unwrap(), "uploads/crack_1.png");
        assert_eq!(photo.save(&dir).unwrap(), "uploads/crack_2.png");
        assert_eq!(fs::read(dir.join("crack_1.png")).unwrap(), b"png");
    }

    #[test]
    fn names_without_extension() {
        let dir = temp_data_dir();
        let photo = Photo::new("IMG 0001", b"x".to_vec());
        assert_eq!(photo.save(&dir).unwrap(), "uploads/IMG_0001");
        assert_eq!(photo.save(&dir).unwrap(), "uploads/IMG_0001_1");
    }

    #[test]
    fn hostile_names_stay_inside_the_directory() {
        let dir = temp_data_dir();
        let photo = Photo::new("../../../etc/cron.d/evil", b"x".to_vec());
        assert_eq!(photo.save(&dir).unwrap(), "uploads/evil");
        assert!(dir.join("evil").exists());

        let photo = Photo::new("..", b"x".to_vec());
        assert_eq!(photo.save(&dir).unwrap(), "uploads/photo");
    }
}
