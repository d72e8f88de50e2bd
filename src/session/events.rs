use std::path::PathBuf;

use chrono::NaiveDate;
use log::warn;

use super::{Session, SessionError, SessionEvent};
use crate::data;

#[derive(Debug)]
enum UploadSource {
    Path(PathBuf),
    Bytes { name: String, content: Vec<u8> },
}

/// Replaces the session's dataset with a new file.
#[derive(Debug)]
pub struct Upload {
    source: UploadSource,
}

impl Upload {
    pub fn from_path(path: impl Into<PathBuf>) -> Upload {
        Upload {
            source: UploadSource::Path(path.into()),
        }
    }

    pub fn from_bytes(name: &str, content: Vec<u8>) -> Upload {
        Upload {
            source: UploadSource::Bytes {
                name: name.to_string(),
                content,
            },
        }
    }
}

impl SessionEvent for Upload {
    fn apply(&self, session: &mut Session) -> Result<(), SessionError> {
        let loaded = match &self.source {
            UploadSource::Path(path) => {
                data::read_upload(path).and_then(|bytes| data::load_dataset(&path.display().to_string(), &bytes))
            },
            UploadSource::Bytes { name, content } => data::load_dataset(name, content),
        };

        match loaded {
            Ok(dataset) => {
                session.replace_dataset(Some(dataset));
                Ok(())
            },
            Err(err) => {
                // Nothing computed from the previous file may be shown after a failed upload.
                warn!("upload rejected: {}", err);
                session.replace_dataset(None);
                Err(err.into())
            },
        }
    }
}

#[derive(Debug)]
pub struct SetStartDate {
    date: NaiveDate,
}

impl SetStartDate {
    pub fn new(date: NaiveDate) -> SetStartDate {
        SetStartDate { date }
    }
}

impl SessionEvent for SetStartDate {
    fn apply(&self, session: &mut Session) -> Result<(), SessionError> {
        session.set_start(self.date);
        Ok(())
    }
}

#[derive(Debug)]
pub struct SetEndDate {
    date: NaiveDate,
}

impl SetEndDate {
    pub fn new(date: NaiveDate) -> SetEndDate {
        SetEndDate { date }
    }
}

impl SessionEvent for SetEndDate {
    fn apply(&self, session: &mut Session) -> Result<(), SessionError> {
        session.set_end(self.date);
        Ok(())
    }
}
