//! Flat-text loaders and writers.
//!
//! All formats are CSV, one record per line, no header. Blank lines are
//! ignored, fields are trimmed and may be quoted, and a leading UTF-8 BOM
//! is skipped.
//!
//! | File | Fields |
//! |------|--------|
//! | processes | `PID,BurstTime,ArrivalTime,Priority` |
//! | resources | `Name,Capacity` |
//! | actions | `PID,ACTION,Resource,Cycle` |
//!
//! Loaders never fail on content: a malformed or duplicate line is
//! skipped and reported as a [`LineDiagnostic`]. Only failing to open or
//! read the file is an error.

use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};
use tracing::warn;

use crate::error::SimError;
use crate::models::{Action, ActionKind, Process, Resource, SyncBlock};
use crate::validation::{check_process, ValidationError, ValidationErrorKind};

/// Header of the per-process statistics report.
pub const REPORT_HEADER: [&str; 5] = [
    "PID",
    "StartTime",
    "CompletionTime",
    "WaitingTime",
    "TurnaroundTime",
];

/// Header of the contention timeline export.
pub const TIMELINE_HEADER: [&str; 6] = ["PID", "Resource", "Action", "Start", "Duration", "State"];

/// A skipped input line and the reason it was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineDiagnostic {
    /// 1-based line number.
    pub line: usize,
    /// Why the line was rejected.
    pub error: ValidationError,
}

/// Records parsed from a file plus diagnostics for skipped lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loaded<T> {
    /// Accepted records, in file order.
    pub records: Vec<T>,
    /// One entry per rejected line, in file order.
    pub diagnostics: Vec<LineDiagnostic>,
}

impl<T> Loaded<T> {
    fn new() -> Self {
        Self {
            records: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Whether every non-blank line was accepted.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    fn skip(&mut self, line: usize, kind: ValidationErrorKind, message: impl Into<String>) {
        let error = ValidationError::new(kind, message);
        warn!(line, %error, "input line skipped");
        self.diagnostics.push(LineDiagnostic { line, error });
    }
}

/// Non-blank records with the 1-based line they start on.
fn records(text: &str) -> impl Iterator<Item = (usize, Result<StringRecord, csv::Error>)> + '_ {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    ReaderBuilder::new()
        .has_headers(false)
        .trim(Trim::All)
        .flexible(true)
        .from_reader(text.as_bytes())
        .into_records()
        .map(|result| {
            let line = match &result {
                Ok(record) => record.position(),
                Err(err) => err.position(),
            }
            .map_or(0, |pos| pos.line() as usize);
            (line, result)
        })
        .filter(|(_, result)| !matches!(result, Ok(record) if record.iter().all(str::is_empty)))
}

fn field<T: std::str::FromStr>(value: &str, name: &str) -> Result<T, String> {
    value
        .parse()
        .map_err(|_| format!("{} '{}' is not a number", name, value))
}

fn process_record(pid: &str, burst: &str, arrival: &str, priority: &str) -> Result<Process, String> {
    Ok(Process::new(
        pid,
        field(burst, "burst time")?,
        field(arrival, "arrival time")?,
        field(priority, "priority")?,
    ))
}

/// Parses a process table.
///
/// Lines failing the process record checks (empty pid, non-positive
/// burst, negative arrival or priority) and repeated pids are skipped.
pub fn parse_processes(text: &str) -> Loaded<Process> {
    let kind = ValidationErrorKind::InvalidProcessRecord;
    let mut loaded = Loaded::new();
    let mut seen = HashSet::new();

    for (line, result) in records(text) {
        let record = match result {
            Ok(record) => record,
            Err(err) => {
                loaded.skip(line, kind, err.to_string());
                continue;
            }
        };
        let fields: Vec<&str> = record.iter().collect();
        let [pid, burst, arrival, priority] = fields.as_slice() else {
            loaded.skip(line, kind, format!("expected 4 fields, found {}", fields.len()));
            continue;
        };
        let process = match process_record(pid, burst, arrival, priority) {
            Ok(p) => p,
            Err(message) => {
                loaded.skip(line, kind, message);
                continue;
            }
        };

        let mut errors = Vec::new();
        check_process(&process, &mut errors);
        if let Some(error) = errors.into_iter().next() {
            loaded.skip(line, error.kind, error.message);
            continue;
        }
        if !seen.insert(process.pid.clone()) {
            loaded.skip(line, kind, format!("Duplicate PID: {}", process.pid));
            continue;
        }
        loaded.records.push(process);
    }
    loaded
}

/// Parses a resource table. Negative capacities and repeated names are
/// skipped.
pub fn parse_resources(text: &str) -> Loaded<Resource> {
    let kind = ValidationErrorKind::InvalidResourceRecord;
    let mut loaded = Loaded::new();
    let mut seen = HashSet::new();

    for (line, result) in records(text) {
        let record = match result {
            Ok(record) => record,
            Err(err) => {
                loaded.skip(line, kind, err.to_string());
                continue;
            }
        };
        let fields: Vec<&str> = record.iter().collect();
        let [name, capacity] = fields.as_slice() else {
            loaded.skip(line, kind, format!("expected 2 fields, found {}", fields.len()));
            continue;
        };
        if name.is_empty() {
            loaded.skip(line, kind, "Resource with empty name");
            continue;
        }
        let capacity: i64 = match field(capacity, "capacity") {
            Ok(c) if c >= 0 => c,
            Ok(c) => {
                loaded.skip(line, kind, format!("Resource '{}' has negative capacity {}", name, c));
                continue;
            }
            Err(message) => {
                loaded.skip(line, kind, message);
                continue;
            }
        };
        if !seen.insert(name.to_string()) {
            loaded.skip(line, kind, format!("Duplicate resource name: {}", name));
            continue;
        }
        loaded.records.push(Resource::new(*name, capacity));
    }
    loaded
}

/// Parses an action log.
///
/// When `resources` is given, actions naming a resource outside that
/// table are skipped. Exact repeats of an earlier action are skipped.
/// Pid and arrival checks are left to the simulator.
pub fn parse_actions(text: &str, resources: Option<&[Resource]>) -> Loaded<Action> {
    let kind = ValidationErrorKind::InvalidActionRecord;
    let known: Option<HashSet<&str>> =
        resources.map(|rs| rs.iter().map(|r| r.name.as_str()).collect());
    let mut loaded = Loaded::new();
    let mut seen = HashSet::new();

    for (line, result) in records(text) {
        let record = match result {
            Ok(record) => record,
            Err(err) => {
                loaded.skip(line, kind, err.to_string());
                continue;
            }
        };
        let fields: Vec<&str> = record.iter().collect();
        let [pid, action, resource, cycle] = fields.as_slice() else {
            loaded.skip(line, kind, format!("expected 4 fields, found {}", fields.len()));
            continue;
        };
        if pid.is_empty() {
            loaded.skip(line, kind, "Action with empty PID");
            continue;
        }
        if resource.is_empty() {
            loaded.skip(line, kind, "Action with empty resource");
            continue;
        }
        let action_kind: ActionKind = match action.parse() {
            Ok(k) => k,
            Err(err) => {
                loaded.skip(line, kind, err.to_string());
                continue;
            }
        };
        let cycle: i64 = match field(cycle, "cycle") {
            Ok(c) if c >= 0 => c,
            Ok(c) => {
                loaded.skip(line, kind, format!("negative cycle {}", c));
                continue;
            }
            Err(message) => {
                loaded.skip(line, kind, message);
                continue;
            }
        };
        if let Some(known) = &known {
            if !known.contains(resource) {
                loaded.skip(line, kind, format!("Resource {} not found", resource));
                continue;
            }
        }

        let record = Action::new(*pid, action_kind, *resource, cycle);
        if !seen.insert(record.clone()) {
            loaded.skip(
                line,
                kind,
                format!("Duplicate action: {} {} {} at {}", pid, action_kind, resource, cycle),
            );
            continue;
        }
        loaded.records.push(record);
    }
    loaded
}

fn read(path: &Path) -> Result<String, SimError> {
    fs::read_to_string(path).map_err(|e| SimError::io(path, e))
}

/// Reads and parses a process file.
pub fn load_processes(path: impl AsRef<Path>) -> Result<Loaded<Process>, SimError> {
    Ok(parse_processes(&read(path.as_ref())?))
}

/// Reads and parses a resource file.
pub fn load_resources(path: impl AsRef<Path>) -> Result<Loaded<Resource>, SimError> {
    Ok(parse_resources(&read(path.as_ref())?))
}

/// Reads and parses an action file.
pub fn load_actions(
    path: impl AsRef<Path>,
    resources: Option<&[Resource]>,
) -> Result<Loaded<Action>, SimError> {
    Ok(parse_actions(&read(path.as_ref())?, resources))
}

fn csv_writer<W: Write>(out: W) -> csv::Writer<W> {
    WriterBuilder::new().has_headers(false).from_writer(out)
}

/// Writes the per-process statistics report. Unset metrics are left empty.
pub fn write_report<W: Write>(out: W, processes: &[Process]) -> std::io::Result<()> {
    let mut writer = csv_writer(out);
    writer.write_record(REPORT_HEADER)?;
    for p in processes {
        writer.serialize((
            &p.pid,
            p.start_time,
            p.completion_time,
            p.waiting_time,
            p.turnaround_time,
        ))?;
    }
    writer.flush()
}

/// Writes processes in the format read by [`parse_processes`].
pub fn write_processes<W: Write>(out: W, processes: &[Process]) -> std::io::Result<()> {
    let mut writer = csv_writer(out);
    for p in processes {
        writer.serialize((&p.pid, p.burst_time, p.arrival_time, p.priority))?;
    }
    writer.flush()
}

/// Writes a contention timeline, one block per line.
pub fn write_sync_timeline<W: Write>(out: W, timeline: &[SyncBlock]) -> std::io::Result<()> {
    let mut writer = csv_writer(out);
    writer.write_record(TIMELINE_HEADER)?;
    for b in timeline {
        writer.serialize((
            &b.pid,
            &b.resource,
            b.kind.as_str(),
            b.start,
            b.duration,
            b.state_label(),
        ))?;
    }
    writer.flush()
}

/// Creates `path` and fills it with `write`.
pub fn save<F>(path: impl AsRef<Path>, write: F) -> Result<(), SimError>
where
    F: FnOnce(&mut std::io::BufWriter<fs::File>) -> std::io::Result<()>,
{
    let path = path.as_ref();
    let file = fs::File::create(path).map_err(|e| SimError::io(path, e))?;
    let mut out = std::io::BufWriter::new(file);
    write(&mut out)
        .and_then(|_| out.flush())
        .map_err(|e| SimError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_processes() {
        let text = "P1,5,0,1\n\n  P2 , 3 , 1 , 2 \nP3,4,2,1\n";
        let loaded = parse_processes(text);
        assert!(loaded.is_clean());
        assert_eq!(
            loaded.records,
            vec![
                Process::new("P1", 5, 0, 1),
                Process::new("P2", 3, 1, 2),
                Process::new("P3", 4, 2, 1),
            ]
        );
    }

    #[test]
    fn test_parse_processes_reports_line_numbers() {
        let text = "P1,5,0,1\nP2,x,1,2\nP3,4\n\nP4,0,0,0\nP1,2,2,2\nP5,1,0,0";
        let loaded = parse_processes(text);
        let pids: Vec<&str> = loaded.records.iter().map(|p| p.pid.as_str()).collect();
        assert_eq!(pids, vec!["P1", "P5"]);

        let lines: Vec<usize> = loaded.diagnostics.iter().map(|d| d.line).collect();
        assert_eq!(lines, vec![2, 3, 5, 6]);
        assert!(loaded.diagnostics[0].error.message.contains("burst time"));
        assert!(loaded.diagnostics[3].error.message.contains("Duplicate PID"));
        assert!(loaded
            .diagnostics
            .iter()
            .all(|d| d.error.kind == ValidationErrorKind::InvalidProcessRecord));
    }

    #[test]
    fn test_parse_processes_quoted_fields_and_bom() {
        let loaded = parse_processes("\u{feff}\"P1\",5,0,1\n\"P,2\",\"3\",1,2\n");
        assert!(loaded.is_clean());
        let pids: Vec<&str> = loaded.records.iter().map(|p| p.pid.as_str()).collect();
        assert_eq!(pids, vec!["P1", "P,2"]);
        assert_eq!(loaded.records[1].burst_time, 3);
    }

    #[test]
    fn test_whitespace_only_lines_are_blank() {
        let loaded = parse_processes("P1,5,0,1\n   \n\t\nP2,3,1,2\nP3\n");
        assert_eq!(loaded.records.len(), 2);
        assert_eq!(loaded.diagnostics.len(), 1);
        assert_eq!(loaded.diagnostics[0].line, 5);
    }

    #[test]
    fn test_parse_resources() {
        let loaded = parse_resources("R1,1\nR2,3\nR1,2\nR3,-1\nR4\n");
        assert_eq!(
            loaded.records,
            vec![Resource::mutex("R1"), Resource::semaphore("R2", 3)]
        );
        let lines: Vec<usize> = loaded.diagnostics.iter().map(|d| d.line).collect();
        assert_eq!(lines, vec![3, 4, 5]);
    }

    #[test]
    fn test_parse_actions() {
        let resources = vec![Resource::mutex("R1")];
        let text = "P1,read,R1,0\nP2,WRITE,R1,1\nP1,READ,R1,0\nP3,DELETE,R1,2\nP3,READ,R9,2\nP3,READ,R1,-4";
        let loaded = parse_actions(text, Some(&resources));
        assert_eq!(
            loaded.records,
            vec![Action::read("P1", "R1", 0), Action::write("P2", "R1", 1)]
        );
        let lines: Vec<usize> = loaded.diagnostics.iter().map(|d| d.line).collect();
        assert_eq!(lines, vec![3, 4, 5, 6]);
        assert!(loaded.diagnostics[1].error.message.contains("DELETE"));
        assert!(loaded.diagnostics[2].error.message.contains("R9"));
    }

    #[test]
    fn test_parse_actions_without_resource_table() {
        let loaded = parse_actions("P1,READ,ANY,3", None);
        assert!(loaded.is_clean());
        assert_eq!(loaded.records[0].resource, "ANY");
    }

    #[test]
    fn test_parse_actions_rejects_empty_resource() {
        let loaded = parse_actions("P1,READ,,0\nP1,READ,\"\",1\nP1,READ,R1,2\n", None);
        assert_eq!(loaded.records, vec![Action::read("P1", "R1", 2)]);
        let lines: Vec<usize> = loaded.diagnostics.iter().map(|d| d.line).collect();
        assert_eq!(lines, vec![1, 2]);
        assert!(loaded
            .diagnostics
            .iter()
            .all(|d| d.error.kind == ValidationErrorKind::InvalidActionRecord
                && d.error.message.contains("empty resource")));
    }

    #[test]
    fn test_write_report() {
        let mut p1 = Process::new("P1", 5, 0, 1);
        p1.record_run(0, 5);
        let p2 = Process::new("P2", 3, 1, 2);

        let mut out = Vec::new();
        write_report(&mut out, &[p1, p2]).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, format!("{}\nP1,0,5,0,5\nP2,,,,\n", REPORT_HEADER.join(",")));
    }

    #[test]
    fn test_write_sync_timeline() {
        let timeline = vec![
            SyncBlock::wait("P2", "R1", ActionKind::Read, 0, 1),
            SyncBlock::access("P2", "R1", ActionKind::Read, 1),
        ];
        let mut out = Vec::new();
        write_sync_timeline(&mut out, &timeline).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec![
                "PID,Resource,Action,Start,Duration,State",
                "P2,R1,READ,0,1,WAIT",
                "P2,R1,READ,1,1,ACCESS",
            ]);
    }

    #[test]
    fn test_written_pids_with_commas_load_back() {
        let processes = vec![Process::new("P,1", 4, 0, 0), Process::new("P2", 1, 2, 3)];
        let mut out = Vec::new();
        write_processes(&mut out, &processes).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "\"P,1\",4,0,0\nP2,1,2,3\n");
        assert_eq!(parse_processes(&text).records, processes);
    }

    #[test]
    fn test_save_and_load_processes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("processes.txt");
        let processes = vec![Process::new("A", 2, 0, 3), Process::new("B", 7, 4, 0)];

        save(&path, |out| write_processes(out, &processes)).unwrap();
        let loaded = load_processes(&path).unwrap();
        assert!(loaded.is_clean());
        assert_eq!(loaded.records, processes);
    }

    #[test]
    fn test_load_files() {
        let dir = tempfile::tempdir().unwrap();
        let resources_path = dir.path().join("resources.txt");
        let actions_path = dir.path().join("actions.txt");
        fs::write(&resources_path, "R1,1\n").unwrap();
        fs::write(&actions_path, "P1,READ,R1,0\nP2,READ,R2,0\n").unwrap();

        let resources = load_resources(&resources_path).unwrap().records;
        let actions = load_actions(&actions_path, Some(&resources)).unwrap();
        assert_eq!(actions.records.len(), 1);
        assert_eq!(actions.diagnostics[0].line, 2);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.txt");
        match load_processes(&path) {
            Err(SimError::Io { path: p, .. }) => assert_eq!(p, path),
            other => panic!("expected Io error, got {:?}", other),
        }
    }
}
