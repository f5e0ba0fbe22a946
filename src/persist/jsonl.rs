//! JSONL Audit Gateway
//!
//! Append-only JSONL writer for exam records. Thread-safe, persistent,
//! and crash-resistant; doubles as the local durable record when the
//! remote store is unreachable. One JSON document per line, size-based
//! file rotation.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{Datelike, Timelike, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use super::{CancellationNotice, PersistenceGateway};
use crate::attempt::ExamResult;
use crate::error::{ProctorError, ProctorResult};
use crate::violation::ViolationRecord;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Maximum file size before rotation (50 MB)
const MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;

/// Default log directory name
const LOG_DIR: &str = "proctor_logs";

/// Log file extension
const LOG_EXT: &str = ".jsonl";

// ============================================================================
// AUDIT LINES
// ============================================================================

/// One line of the audit log.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "record")]
pub enum AuditLine {
    Violation(ViolationRecord),
    Result(ExamResult),
    Cancellation(CancellationNotice),
}

// ============================================================================
// WRITER
// ============================================================================

struct AuditWriter {
    writer: BufWriter<File>,
    current_file: PathBuf,
    current_size: u64,
    base_dir: PathBuf,
}

impl AuditWriter {
    fn new(base_dir: PathBuf) -> std::io::Result<Self> {
        std::fs::create_dir_all(&base_dir)?;
        let (file_path, file) = Self::open_new_file(&base_dir)?;
        Ok(Self {
            writer: BufWriter::new(file),
            current_file: file_path,
            current_size: 0,
            base_dir,
        })
    }

    /// Open a new log file with timestamp
    fn open_new_file(base_dir: &Path) -> std::io::Result<(PathBuf, File)> {
        let now = Utc::now();
        let filename = format!(
            "proctor_{}_{:02}_{:02}_{:02}{:02}{:02}{}",
            now.year(),
            now.month(),
            now.day(),
            now.hour(),
            now.minute(),
            now.second(),
            LOG_EXT
        );
        let file_path = base_dir.join(&filename);

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&file_path)?;

        log::info!("Opened proctor audit log: {:?}", file_path);
        Ok((file_path, file))
    }

    fn append(&mut self, line: &AuditLine) -> std::io::Result<()> {
        let json = serde_json::to_string(line)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        let bytes = json.as_bytes();

        if self.current_size + bytes.len() as u64 > MAX_FILE_SIZE {
            self.rotate()?;
        }

        self.writer.write_all(bytes)?;
        self.writer.write_all(b"\n")?;
        self.current_size += bytes.len() as u64 + 1;

        // Flush for durability
        self.writer.flush()
    }

    fn rotate(&mut self) -> std::io::Result<()> {
        self.writer.flush()?;
        let (new_path, new_file) = Self::open_new_file(&self.base_dir)?;
        self.writer = BufWriter::new(new_file);
        log::info!("Rotated from {:?} to {:?}", self.current_file, new_path);
        self.current_file = new_path;
        self.current_size = 0;
        Ok(())
    }
}

// ============================================================================
// GATEWAY
// ============================================================================

/// Append-only JSONL gateway. Owned per host process; no globals, so
/// parallel test attempts stay independent.
pub struct JsonlGateway {
    writer: Mutex<AuditWriter>,
    base_dir: PathBuf,
}

impl JsonlGateway {
    /// Create a gateway writing under `base_dir`.
    pub fn new(base_dir: impl Into<PathBuf>) -> std::io::Result<Self> {
        let base_dir = base_dir.into();
        Ok(Self {
            writer: Mutex::new(AuditWriter::new(base_dir.clone())?),
            base_dir,
        })
    }

    /// Create a gateway in the platform's local data directory.
    pub fn open_default() -> std::io::Result<Self> {
        let dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("exam-proctor")
            .join(LOG_DIR);
        Self::new(dir)
    }

    pub fn current_file(&self) -> PathBuf {
        self.writer.lock().current_file.clone()
    }

    fn append(&self, line: &AuditLine) -> ProctorResult<()> {
        self.writer
            .lock()
            .append(line)
            .map_err(|e| ProctorError::Persistence(e.to_string()))
    }

    /// All log files in the audit directory, oldest first (filenames
    /// embed the timestamp).
    pub fn list_log_files(&self) -> std::io::Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        if self.base_dir.is_dir() {
            for entry in std::fs::read_dir(&self.base_dir)? {
                let path = entry?.path();
                if path.extension().map_or(false, |e| e == "jsonl") {
                    files.push(path);
                }
            }
        }
        files.sort();
        Ok(files)
    }

    /// Read every parseable line from one log file. Malformed lines are
    /// skipped, not fatal.
    pub fn read_lines(path: &Path) -> std::io::Result<Vec<AuditLine>> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let mut lines = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.is_empty() {
                continue;
            }
            if let Ok(parsed) = serde_json::from_str::<AuditLine>(&line) {
                lines.push(parsed);
            }
        }
        Ok(lines)
    }

    fn scan_results(&self) -> ProctorResult<Vec<ExamResult>> {
        let files = self
            .list_log_files()
            .map_err(|e| ProctorError::Persistence(e.to_string()))?;
        let mut results = Vec::new();
        for path in files {
            let lines =
                Self::read_lines(&path).map_err(|e| ProctorError::Persistence(e.to_string()))?;
            for line in lines {
                if let AuditLine::Result(result) = line {
                    results.push(result);
                }
            }
        }
        Ok(results)
    }
}

#[async_trait]
impl PersistenceGateway for JsonlGateway {
    async fn find_prior_attempt(
        &self,
        student_id: &str,
        exam_id: &str,
    ) -> ProctorResult<Option<ExamResult>> {
        let results = self.scan_results()?;
        Ok(results
            .into_iter()
            .filter(|r| r.student_id == student_id && r.exam_id == exam_id)
            .max_by_key(|r| r.submitted_at))
    }

    async fn append_violation(&self, record: &ViolationRecord) -> ProctorResult<()> {
        self.append(&AuditLine::Violation(record.clone()))
    }

    async fn save_result(&self, result: &ExamResult) -> ProctorResult<()> {
        self.append(&AuditLine::Result(result.clone()))
    }

    async fn save_cancellation(&self, notice: &CancellationNotice) -> ProctorResult<()> {
        self.append(&AuditLine::Cancellation(notice.clone()))
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attempt::ExamOutcome;
    use crate::exam::StudentIdentity;
    use crate::violation::{Severity, ViolationCategory};
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn result(student_id: &str, exam_id: &str) -> ExamResult {
        ExamResult {
            attempt_id: "attempt-1".into(),
            student_id: student_id.into(),
            student_name: "Test Student".into(),
            exam_id: exam_id.into(),
            exam_title: "Mock Exam".into(),
            total_questions: 2,
            correct_answers: 2,
            score_percentage: 100.0,
            answers: HashMap::new(),
            flagged_questions: vec![],
            time_spent: 90,
            outcome: ExamOutcome::Submitted,
            cancellation_reason: None,
            submitted_at: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_jsonl_format() {
        let temp_dir = TempDir::new().unwrap();
        let gateway = JsonlGateway::new(temp_dir.path()).unwrap();

        let student = StudentIdentity::new("S1", "Test Student", "ADM-001");
        for i in 1..=3 {
            let record = ViolationRecord::new(
                "attempt-1",
                &student,
                "E1",
                "Mock Exam",
                ViolationCategory::TabSwitch,
                format!("Switched away from exam tab ({}/10)", i),
                Severity::Low,
                i,
            );
            gateway.append_violation(&record).await.unwrap();
        }

        // One JSON document per line
        let content = std::fs::read_to_string(gateway.current_file()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        for line in lines {
            assert!(serde_json::from_str::<AuditLine>(line).is_ok());
        }
    }

    #[tokio::test]
    async fn test_prior_attempt_scan() {
        let temp_dir = TempDir::new().unwrap();
        let gateway = JsonlGateway::new(temp_dir.path()).unwrap();

        gateway.save_result(&result("S1", "E1")).await.unwrap();
        gateway.save_result(&result("S2", "E1")).await.unwrap();

        let prior = gateway.find_prior_attempt("S1", "E1").await.unwrap();
        assert!(prior.is_some());
        assert_eq!(prior.unwrap().student_id, "S1");
        assert!(gateway.find_prior_attempt("S1", "E2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_mixed_lines_read_back() {
        let temp_dir = TempDir::new().unwrap();
        let gateway = JsonlGateway::new(temp_dir.path()).unwrap();

        gateway.save_result(&result("S1", "E1")).await.unwrap();
        gateway
            .save_cancellation(&CancellationNotice {
                attempt_id: "attempt-2".into(),
                student_id: "S2".into(),
                student_name: "Other Student".into(),
                exam_id: "E1".into(),
                exam_title: "Mock Exam".into(),
                reason: "Exceeded maximum allowed tab switches (10)".into(),
            })
            .await
            .unwrap();

        let lines = JsonlGateway::read_lines(&gateway.current_file()).unwrap();
        assert_eq!(lines.len(), 2);
        assert!(matches!(lines[0], AuditLine::Result(_)));
        assert!(matches!(lines[1], AuditLine::Cancellation(_)));
    }

    #[test]
    fn test_malformed_lines_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.jsonl");
        std::fs::write(&path, "not json\n{\"record\":\"bogus\"}\n").unwrap();
        let lines = JsonlGateway::read_lines(&path).unwrap();
        assert!(lines.is_empty());
    }
}
