use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;

use autodrive_shared::EpisodeRecord;

/// Sink for episode-end records. Simulation never depends on a sink being
/// attached or on writes succeeding.
pub trait EpisodeSink {
    fn log_episode_end(&mut self, record: &EpisodeRecord);
}

/// Sink that discards all records.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl EpisodeSink for NoopSink {
    fn log_episode_end(&mut self, _record: &EpisodeRecord) {}
}

/// Append-only CSV sink. The header row is written when the file does not
/// already exist. On a write failure the error is reported once and the
/// sink disables itself.
pub struct CsvSink {
    path: PathBuf,
    failed: bool,
}

impl CsvSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            failed: false,
        }
    }

    fn append(&self, record: &EpisodeRecord) -> io::Result<()> {
        let fresh = !self.path.exists();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        if fresh {
            writeln!(file, "episode,duration_secs,reward,reason")?;
        }
        writeln!(
            file,
            "{},{:.2},{:.4},{}",
            record.episode, record.duration_secs, record.reward, record.reason
        )
    }
}

impl EpisodeSink for CsvSink {
    fn log_episode_end(&mut self, record: &EpisodeRecord) {
        if self.failed {
            return;
        }
        if let Err(err) = self.append(record) {
            eprintln!(
                "episode log write failed ({}): {err}",
                self.path.display()
            );
            self.failed = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use autodrive_shared::TerminationReason;

    fn record(episode: u32) -> EpisodeRecord {
        EpisodeRecord {
            episode,
            duration_secs: 12.5,
            reward: -3.25,
            reason: TerminationReason::WallCollision,
        }
    }

    #[test]
    fn test_header_written_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("episodes.csv");
        let mut sink = CsvSink::new(&path);

        sink.log_episode_end(&record(1));
        sink.log_episode_end(&record(2));

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "episode,duration_secs,reward,reason");
        assert!(lines[1].starts_with("1,12.50,-3.2500,WallCollision"));
        assert!(lines[2].starts_with("2,"));
    }

    #[test]
    fn test_reopening_appends_without_second_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("episodes.csv");

        CsvSink::new(&path).log_episode_end(&record(1));
        CsvSink::new(&path).log_episode_end(&record(2));

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.matches("episode,duration_secs").count(), 1);
        assert_eq!(contents.lines().count(), 3);
    }

    #[test]
    fn test_failed_sink_disables_itself() {
        let mut sink = CsvSink::new("/nonexistent-dir/episodes.csv");
        sink.log_episode_end(&record(1));
        assert!(sink.failed);
        // Further calls are no-ops rather than repeated errors.
        sink.log_episode_end(&record(2));
    }
}
