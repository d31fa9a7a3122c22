//! Offline mail source over JSON message dumps (`format=full` payloads).
//!
//! A path is either one `.json` file or a directory of them. Each file holds
//! one message or an array of messages.

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use spendmail_ingest::{FetchError, MailQuery, MailSource, RawMessage};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Deserialize)]
#[serde(untagged)]
enum Dump {
    Many(Vec<RawMessage>),
    One(Box<RawMessage>),
}

pub struct DumpSource {
    messages: Vec<RawMessage>,
    /// Skip the sender allow-list
    any_sender: bool,
}

impl DumpSource {
    pub fn load(path: &Path, any_sender: bool) -> Result<Self> {
        let mut messages = Vec::new();
        for file in dump_files(path)? {
            messages.extend(read_dump(&file)?);
        }
        Ok(Self {
            messages,
            any_sender,
        })
    }

    /// Messages the provider query would have returned
    pub fn matching(&self, query: &MailQuery) -> Vec<&RawMessage> {
        self.messages
            .iter()
            .filter(|m| self.any_sender || sender_allowed(m, &query.senders))
            .take(query.max_results)
            .collect()
    }
}

fn sender_allowed(msg: &RawMessage, senders: &[String]) -> bool {
    if senders.is_empty() {
        return true;
    }
    let Some(from) = msg.sender() else {
        return false;
    };
    let from = from.to_lowercase();
    senders.iter().any(|s| from.contains(&s.to_lowercase()))
}

fn dump_files(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    if !path.is_dir() {
        bail!("input not found: {}", path.display());
    }
    let mut files: Vec<PathBuf> = fs::read_dir(path)
        .with_context(|| format!("read dir {}", path.display()))?
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();
    Ok(files)
}

fn read_dump(path: &Path) -> Result<Vec<RawMessage>> {
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let dump: Dump =
        serde_json::from_str(&s).with_context(|| format!("parse message dump {}", path.display()))?;
    let mut messages = match dump {
        Dump::Many(v) => v,
        Dump::One(m) => vec![*m],
    };

    // Dumps without ids get one from the file name.
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let single = messages.len() == 1;
    for (i, msg) in messages.iter_mut().enumerate() {
        if msg.id.is_empty() {
            msg.id = if single { stem.clone() } else { format!("{stem}-{i}") };
        }
    }
    Ok(messages)
}

impl MailSource for DumpSource {
    async fn list_message_ids(&self, query: &MailQuery) -> Result<Vec<String>, FetchError> {
        Ok(self.matching(query).into_iter().map(|m| m.id.clone()).collect())
    }

    async fn fetch_message(&self, id: &str) -> Result<RawMessage, FetchError> {
        self.messages
            .iter()
            .find(|m| m.id == id)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(id.to_string()))
    }
}
