//! Per-player record files

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::ScorePersistence;
use crate::error::{Error, Result};
use crate::settings::Mode;

pub const RECORD_HEADER: &str = "level;date;score;mode;cleared";
const RECORD_EXTENSION: &str = "csv";
const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One finished session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordRow {
    pub level: String,
    /// Local time, `YYYY-MM-DD HH:MM:SS`
    pub date: String,
    /// Whole seconds survived
    pub score: u64,
    pub mode: Mode,
    pub cleared: bool,
}

impl RecordRow {
    /// Row stamped with the current local time
    pub fn now(level: &str, score: u64, mode: Mode, cleared: bool) -> Self {
        Self {
            level: level.to_string(),
            date: chrono::Local::now().format(DATE_FORMAT).to_string(),
            score,
            mode,
            cleared,
        }
    }

    pub fn to_line(&self) -> String {
        format!(
            "{};{};{};{};{}",
            self.level,
            self.date,
            self.score,
            self.mode.as_str(),
            if self.cleared { "Yes" } else { "No" }
        )
    }
}

/// Column positions resolved from a file's header line
#[derive(Debug, Clone, Copy)]
struct Columns {
    level: usize,
    date: Option<usize>,
    score: usize,
    mode: usize,
    cleared: Option<usize>,
}

impl Columns {
    fn from_header(header: &str) -> Result<Self> {
        let names: Vec<&str> = header.split(';').map(str::trim).collect();
        let find = |name: &str| names.iter().position(|n| *n == name);
        let require = |name: &str| {
            find(name).ok_or_else(|| Error::malformed(1, format!("missing column {name:?}")))
        };

        Ok(Self {
            level: require("level")?,
            date: find("date"),
            score: require("score")?,
            mode: require("mode")?,
            cleared: find("cleared"),
        })
    }

    fn parse(&self, line: &str, line_no: usize) -> Result<RecordRow> {
        let fields: Vec<&str> = line.split(';').collect();
        let field = |idx: usize, name: &str| {
            fields
                .get(idx)
                .map(|f| f.trim())
                .ok_or_else(|| Error::malformed(line_no, format!("missing field {name:?}")))
        };

        let level = field(self.level, "level")?;
        if level.is_empty() {
            return Err(Error::malformed(line_no, "empty level"));
        }
        let score = field(self.score, "score")?
            .parse::<u64>()
            .map_err(|e| Error::malformed(line_no, format!("bad score: {e}")))?;
        let mode_str = field(self.mode, "mode")?;
        let mode = Mode::from_str(mode_str)
            .ok_or_else(|| Error::malformed(line_no, format!("unknown mode {mode_str:?}")))?;
        let date = match self.date {
            Some(idx) => field(idx, "date")?.to_string(),
            None => String::new(),
        };
        let cleared = match self.cleared {
            Some(idx) => matches!(field(idx, "cleared")?, "Yes" | "True"),
            None => false,
        };

        Ok(RecordRow {
            level: level.to_string(),
            date,
            score,
            mode,
            cleared,
        })
    }
}

/// Parse a whole record file. Each line is decoded on its own: rows that are
/// not UTF-8 or cannot be parsed are logged and skipped; a file whose header
/// is unreadable or lacks required columns is an error.
pub fn parse_records(contents: &[u8]) -> Result<Vec<RecordRow>> {
    let mut lines = contents
        .split(|&b| b == b'\n')
        .map(|l| l.strip_suffix(b"\r").unwrap_or(l))
        .enumerate()
        .filter(|(_, l)| !l.trim_ascii().is_empty());
    let Some((idx, header)) = lines.next() else {
        return Ok(Vec::new());
    };
    let header = std::str::from_utf8(header)
        .map_err(|_| Error::malformed(idx + 1, "header is not UTF-8"))?;
    let columns = Columns::from_header(header)?;

    let mut rows = Vec::new();
    for (idx, line) in lines {
        let parsed = std::str::from_utf8(line)
            .map_err(|_| Error::malformed(idx + 1, "not UTF-8"))
            .and_then(|line| columns.parse(line, idx + 1));
        match parsed {
            Ok(row) => rows.push(row),
            Err(e) => log::warn!("Skipping record row: {}", e),
        }
    }
    Ok(rows)
}

/// Directory of `<player>.csv` record files
#[derive(Debug, Clone)]
pub struct RecordStore {
    dir: PathBuf,
}

impl RecordStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Record file for `player`; names become file stems so they may not be
    /// empty or contain path separators
    pub fn path_for(&self, player: &str) -> Result<PathBuf> {
        let invalid = player.trim().is_empty()
            || player.contains(['/', '\\'])
            || player == "."
            || player == "..";
        if invalid {
            return Err(Error::InvalidPlayerName(player.to_string()));
        }
        Ok(self.dir.join(format!("{player}.{RECORD_EXTENSION}")))
    }

    pub fn append(&self, player: &str, row: &RecordRow) -> Result<()> {
        let path = self.path_for(player)?;
        fs::create_dir_all(&self.dir)?;

        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        if file.metadata()?.len() == 0 {
            writeln!(file, "{RECORD_HEADER}")?;
        }
        writeln!(file, "{}", row.to_line())?;

        log::info!("Saved {} for {} in {}", row.to_line(), player, path.display());
        Ok(())
    }

    /// All rows for `player`; empty when the player has no file yet
    pub fn read_player(&self, player: &str) -> Result<Vec<RecordRow>> {
        let path = self.path_for(player)?;
        match fs::read(&path) {
            Ok(contents) => parse_records(&contents),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::info!("No record file for {}", player);
                Ok(Vec::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Rows for `player`, or none when the file cannot be read. Best-score
    /// queries treat a broken file as no history.
    pub fn history(&self, player: &str) -> Vec<RecordRow> {
        self.read_player(player).unwrap_or_else(|e| {
            log::warn!("Error reading records for {}: {}", player, e);
            Vec::new()
        })
    }

    /// Player names with a record file, sorted
    pub fn players(&self) -> Result<Vec<String>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut players = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(RECORD_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                players.push(stem.to_string());
            }
        }
        players.sort();
        Ok(players)
    }

    /// Every readable row of every player. Unreadable files are logged and
    /// skipped.
    pub fn read_all(&self) -> Vec<(String, RecordRow)> {
        let players = match self.players() {
            Ok(players) => players,
            Err(e) => {
                log::warn!("Cannot list records in {}: {}", self.dir.display(), e);
                return Vec::new();
            }
        };

        let mut all = Vec::new();
        for player in players {
            match self.read_player(&player) {
                Ok(rows) => all.extend(rows.into_iter().map(|row| (player.clone(), row))),
                Err(e) => log::warn!("Error reading records for {}: {}", player, e),
            }
        }
        all
    }
}

impl ScorePersistence for RecordStore {
    fn record_result(
        &mut self,
        player: &str,
        level: &str,
        mode: Mode,
        score: u64,
        cleared: bool,
    ) -> Result<()> {
        self.append(player, &RecordRow::now(level, score, mode, cleared))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> (tempfile::TempDir, RecordStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path());
        (dir, store)
    }

    fn row(level: &str, score: u64, mode: Mode, cleared: bool) -> RecordRow {
        RecordRow {
            level: level.to_string(),
            date: "2024-05-01 12:00:00".to_string(),
            score,
            mode,
            cleared,
        }
    }

    #[test]
    fn test_line_format() {
        let r = row("Hard - Beat Saber", 42, Mode::Rhythm, false);
        assert_eq!(r.to_line(), "Hard - Beat Saber;2024-05-01 12:00:00;42;Rhythm;No");
        assert_eq!(RecordRow::now("x", 1, Mode::Normal, true).date.len(), 19);
    }

    #[test]
    fn test_parse_skips_malformed_rows() {
        let contents = "level;date;score;mode;cleared\n\
                        Easy - Next To You;2024-01-01 10:00:00;12;Normal;No\n\
                        Broken;2024-01-01 10:00:00\n\
                        Easy - Next To You;2024-01-01 10:00:00;abc;Normal;No\n\
                        GOD - Camelia;2024-01-02 10:00:00;95;Rythm;Yes\n";
        let rows = parse_records(contents.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].score, 12);
        assert_eq!(rows[1].mode, Mode::Rhythm);
        assert!(rows[1].cleared);
    }

    #[test]
    fn test_parse_reordered_columns() {
        let rows = parse_records(b"score;mode;level\n7;Normal;Tutorial - Lofi\n").unwrap();
        assert_eq!(rows[0].level, "Tutorial - Lofi");
        assert_eq!(rows[0].score, 7);
        assert!(!rows[0].cleared);
    }

    #[test]
    fn test_parse_bad_header() {
        assert!(parse_records(b"name;points\nbob;3\n").is_err());
        assert!(parse_records(b"").unwrap().is_empty());
    }

    #[test]
    fn test_append_and_read() {
        let (_dir, store) = temp_store();
        assert!(store.read_player("alice").unwrap().is_empty());
        assert!(store.players().unwrap().is_empty());

        store.append("alice", &row("Tutorial - Lofi", 10, Mode::Normal, false)).unwrap();
        store.append("alice", &row("Tutorial - Lofi", 25, Mode::Normal, true)).unwrap();

        let contents = fs::read_to_string(store.path_for("alice").unwrap()).unwrap();
        assert_eq!(contents.matches(RECORD_HEADER).count(), 1);

        let rows = store.read_player("alice").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].score, 25);
        assert!(rows[1].cleared);
        assert_eq!(store.players().unwrap(), vec!["alice".to_string()]);
    }

    #[test]
    fn test_record_result_trait() {
        let (_dir, mut store) = temp_store();
        store.record_result("bob", "GOD - Camelia", Mode::Rhythm, 17, false).unwrap();
        let all = store.read_all();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].0, "bob");
        assert_eq!(all[0].1.score, 17);
    }

    #[test]
    fn test_invalid_player_names() {
        let (_dir, store) = temp_store();
        assert!(matches!(store.path_for(""), Err(Error::InvalidPlayerName(_))));
        assert!(store.path_for("../evil").is_err());
        assert!(store.path_for("..").is_err());
        assert!(store.path_for("zoé").is_ok());
    }

    #[test]
    fn test_bad_bytes_skip_only_their_row() {
        let (_dir, store) = temp_store();
        let mut contents = b"level;date;score;mode;cleared\n".to_vec();
        contents.extend_from_slice(b"Tutorial - Lofi;2024-01-01 10:00:00;1\xff2;Normal;No\n");
        contents.extend_from_slice(b"Tutorial - Lofi;2024-01-01 10:05:00;7;Normal;No\n");
        fs::write(store.path_for("alice").unwrap(), contents).unwrap();

        let rows = store.read_player("alice").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].score, 7);
        assert_eq!(store.history("alice"), rows);
    }

    #[test]
    fn test_bad_header_is_no_history() {
        let (_dir, store) = temp_store();
        store.append("alice", &row("Tutorial - Lofi", 9, Mode::Normal, false)).unwrap();
        fs::write(
            store.path_for("bob").unwrap(),
            "date;score;mode;cleared\n2024-01-01 10:00:00;30;Normal;Yes\n",
        )
        .unwrap();

        assert!(store.read_player("bob").is_err());
        assert!(store.history("bob").is_empty());
        assert!(store.history("nobody").is_empty());

        let all = store.read_all();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].0, "alice");
        assert_eq!(all[0].1.score, 9);
    }

    #[test]
    fn test_crlf_lines() {
        let rows = parse_records(b"level;score;mode;cleared\r\nEasy;4;Normal;Yes\r\n").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].score, 4);
        assert!(rows[0].cleared);
    }
}
