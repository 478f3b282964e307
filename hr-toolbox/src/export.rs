// CSV export of grouping results.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::NaiveDate;
use csv::{QuoteStyle, WriterBuilder};
use tracing::info;

use crate::config::ExportConfig;
use crate::session::grouping::Group;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";
const HEADER: &str = "Group Name,Member Name\n";

/// Write `groups` as CSV: a UTF-8 BOM (so spreadsheet apps pick the right
/// encoding), the header line, then one fully-quoted row per member.
pub fn write_groups_csv<W: Write>(mut writer: W, groups: &[Group]) -> anyhow::Result<()> {
    writer.write_all(UTF8_BOM)?;
    writer.write_all(HEADER.as_bytes())?;

    let mut csv = WriterBuilder::new()
        .has_headers(false)
        .quote_style(QuoteStyle::Always)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);
    for group in groups {
        for member in &group.members {
            csv.write_record([group.name.as_str(), member.name.as_str()])?;
        }
    }
    csv.flush()?;
    Ok(())
}

/// `groups_<YYYY-MM-DD>.csv`
pub fn export_filename(date: NaiveDate) -> String {
    format!("groups_{}.csv", date.format("%Y-%m-%d"))
}

/// Directory exports go to: the configured one, else the user's download
/// directory, else the current directory.
pub fn export_dir(config: &ExportConfig) -> PathBuf {
    if let Some(dir) = &config.directory {
        return dir.clone();
    }
    directories::UserDirs::new()
        .and_then(|dirs| dirs.download_dir().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Where an export landed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOutcome {
    pub path: PathBuf,
    /// An earlier export with the same dated filename was overwritten.
    pub replaced: bool,
}

/// Write the groups into `dir` under the dated filename.
pub fn export_groups(dir: &Path, groups: &[Group], date: NaiveDate) -> anyhow::Result<ExportOutcome> {
    if groups.is_empty() {
        anyhow::bail!("no groups to export");
    }
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create export directory {}", dir.display()))?;

    let path = dir.join(export_filename(date));
    let replaced = path.exists();
    let file =
        File::create(&path).with_context(|| format!("failed to create {}", path.display()))?;
    write_groups_csv(BufWriter::new(file), groups)
        .with_context(|| format!("failed to write {}", path.display()))?;

    let rows: usize = groups.iter().map(|g| g.members.len()).sum();
    info!(
        "Exported {} groups ({} rows) to {}{}",
        groups.len(),
        rows,
        path.display(),
        if replaced { ", replacing the earlier file" } else { "" }
    );
    Ok(ExportOutcome { path, replaced })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::roster::Participant;
    use uuid::Uuid;

    fn group(name: &str, members: &[&str]) -> Group {
        Group {
            id: Uuid::new_v4(),
            name: name.into(),
            members: members.iter().map(|m| Participant::new(*m)).collect(),
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 7).unwrap()
    }

    #[test]
    fn csv_has_bom_header_and_quoted_rows() {
        let groups = vec![group("Falcons", &["Ann", "Bob"]), group("Group 2", &["Cy"])];
        let mut buf = Vec::new();
        write_groups_csv(&mut buf, &groups).unwrap();

        assert!(buf.starts_with(UTF8_BOM));
        let text = std::str::from_utf8(&buf[UTF8_BOM.len()..]).unwrap();
        assert_eq!(
            text,
            "Group Name,Member Name\n\
             \"Falcons\",\"Ann\"\n\
             \"Falcons\",\"Bob\"\n\
             \"Group 2\",\"Cy\"\n"
        );
    }

    #[test]
    fn csv_escapes_embedded_quotes_and_commas() {
        let groups = vec![group("The \"A\" Team", &["Doe, Jane"])];
        let mut buf = Vec::new();
        write_groups_csv(&mut buf, &groups).unwrap();
        let text = std::str::from_utf8(&buf[UTF8_BOM.len()..]).unwrap();
        assert!(text.ends_with("\"The \"\"A\"\" Team\",\"Doe, Jane\"\n"));
    }

    #[test]
    fn filename_carries_iso_date() {
        assert_eq!(export_filename(date()), "groups_2024-03-07.csv");
    }

    #[test]
    fn configured_directory_wins() {
        let config = ExportConfig {
            directory: Some(PathBuf::from("/tmp/somewhere")),
        };
        assert_eq!(export_dir(&config), PathBuf::from("/tmp/somewhere"));
    }

    #[test]
    fn export_groups_writes_file() {
        let dir = std::env::temp_dir().join("hr_toolbox_export_writes");
        let _ = std::fs::remove_dir_all(&dir);

        let groups = vec![group("Owls", &["王小明", "李美玲"])];
        let outcome = export_groups(&dir, &groups, date()).unwrap();
        assert_eq!(outcome.path, dir.join("groups_2024-03-07.csv"));
        assert!(!outcome.replaced);
        let path = outcome.path;

        let bytes = std::fs::read(&path).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with('\u{feff}'));
        assert!(text.contains("\"Owls\",\"王小明\""));
        assert_eq!(text.lines().count(), 3);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn second_export_same_day_reports_replacement() {
        let dir = std::env::temp_dir().join("hr_toolbox_export_replaces");
        let _ = std::fs::remove_dir_all(&dir);

        export_groups(&dir, &[group("Owls", &["Ann", "Bob"])], date()).unwrap();
        let again = export_groups(&dir, &[group("Hawks", &["Ann"])], date()).unwrap();
        assert!(again.replaced);

        let text = std::fs::read_to_string(&again.path).unwrap();
        assert!(text.contains("\"Hawks\",\"Ann\""));
        assert!(!text.contains("Owls"));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn export_rejects_empty_groups() {
        let dir = std::env::temp_dir().join("hr_toolbox_export_empty");
        let err = export_groups(&dir, &[], date()).unwrap_err();
        assert!(err.to_string().contains("no groups"));
    }
}
