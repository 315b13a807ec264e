// src/chat_log.rs
//! Append-only chat log (request/response pairs) and its CSV export.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

pub const CSV_HEADER: [&str; 6] = ["Question", "Intent", "Confidence", "Entity", "Output", "Time"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogRecord {
    pub id: Uuid,
    pub request: Value,
    pub response: Value,
    pub time: DateTime<Utc>,
}

impl LogRecord {
    pub fn new(request: Value, response: Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            request,
            response,
            time: Utc::now(),
        }
    }
}

pub trait LogSink: Send + Sync {
    fn append(&self, record: LogRecord);
    /// All records, oldest first.
    fn list(&self) -> Vec<LogRecord>;
    fn clear(&self);
}

/// Capped in-memory sink; the oldest records are dropped past `cap`.
#[derive(Debug)]
pub struct InMemoryLogStore {
    inner: Mutex<Vec<LogRecord>>,
    cap: usize,
}

impl InMemoryLogStore {
    pub fn with_capacity(cap: usize) -> Self {
        let cap = cap.clamp(1, 100_000);
        Self {
            inner: Mutex::new(Vec::with_capacity(cap.min(1024))),
            cap,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<LogRecord>> {
        match self.inner.lock() {
            Ok(g) => g,
            Err(poison) => poison.into_inner(),
        }
    }
}

impl LogSink for InMemoryLogStore {
    fn append(&self, record: LogRecord) {
        let mut v = self.lock();
        v.push(record);
        if v.len() > self.cap {
            let excess = v.len() - self.cap;
            v.drain(0..excess);
        }
    }

    fn list(&self) -> Vec<LogRecord> {
        self.lock().clone()
    }

    fn clear(&self) {
        self.lock().clear();
        tracing::info!(target: "chat_log", "chat log cleared");
    }
}

fn str_at<'a>(v: &'a Value, path: &[&str]) -> Option<&'a str> {
    let mut cur = v;
    for key in path {
        cur = cur.get(key)?;
    }
    cur.as_str()
}

fn output_text(response: &Value) -> Option<String> {
    match response.get("output")?.get("text")? {
        Value::String(s) => Some(s.clone()),
        Value::Array(lines) => Some(
            lines
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join(" "),
        ),
        _ => None,
    }
}

/// One CSV row: question, intent, confidence, entity, output, time.
pub fn csv_row(record: &LogRecord) -> [String; 6] {
    let question = str_at(&record.request, &["input", "text"])
        .unwrap_or_default()
        .to_string();

    let mut intent = String::new();
    let mut confidence = "0".to_string();
    let mut entity = String::new();
    let mut output = String::new();

    if record.response.is_object() {
        intent = "<no intent>".to_string();
        if let Some(first) = record
            .response
            .get("intents")
            .and_then(Value::as_array)
            .and_then(|a| a.first())
        {
            intent = str_at(first, &["intent"]).unwrap_or_default().to_string();
            if let Some(c) = first.get("confidence").and_then(Value::as_f64) {
                confidence = c.to_string();
            }
        }

        entity = "<no entity>".to_string();
        if let Some(first) = record
            .response
            .get("entities")
            .and_then(Value::as_array)
            .and_then(|a| a.first())
        {
            entity = format!(
                "{} : {}",
                str_at(first, &["entity"]).unwrap_or_default(),
                str_at(first, &["value"]).unwrap_or_default()
            );
        }

        output = output_text(&record.response)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "<no dialog>".to_string());
    }

    [
        question,
        intent,
        confidence,
        entity,
        output,
        record.time.format("%Y-%m-%d %H:%M:%S").to_string(),
    ]
}

/// Render records as CSV, sorted by time ascending (stable for equal times).
pub fn export_csv(records: &[LogRecord]) -> anyhow::Result<String> {
    let mut sorted: Vec<&LogRecord> = records.iter().collect();
    sorted.sort_by_key(|r| r.time);

    let mut w = csv::Writer::from_writer(Vec::new());
    w.write_record(CSV_HEADER)?;
    for r in sorted {
        w.write_record(csv_row(r))?;
    }
    let bytes = w.into_inner().map_err(|e| anyhow::anyhow!("flushing csv: {e}"))?;
    Ok(String::from_utf8(bytes)?)
}
