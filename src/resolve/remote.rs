//! Symbolic fingerprinting of remote (URL) references

use super::entry::OpenedFileEntry;
use crate::config::RemoteTreatment;
use chrono::{Local, SecondsFormat};

/// Build the single entry for a remote reference without fetching it
pub fn remote_entry(url: &str, treatment: RemoteTreatment) -> OpenedFileEntry {
    let content = match treatment {
        RemoteTreatment::Unchanged => url.to_string(),
        RemoteTreatment::AlwaysChanged => Local::now().to_rfc3339_opts(SecondsFormat::Nanos, true),
    };
    OpenedFileEntry::synthetic(url, content.into_bytes())
}
