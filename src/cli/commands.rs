use crate::config::{AttributeSpec, ImporterConfig};
use crate::error::{ImportError, ImportResult};
use crate::excel::{RecordExporter, WorkbookImporter};
use crate::session::{ImportSession, ProcessOutcome};
use crate::types::{FileHandle, OutputRecord, Sheet};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};

/// Arguments of the import command
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    pub input: PathBuf,
    pub config: Option<PathBuf>,
    /// `key=Title` attribute definitions
    pub attributes: Vec<String>,
    /// `key=Title` image attribute definitions
    pub image_attributes: Vec<String>,
    pub no_header: bool,
    /// 1-based sheet index or sheet name
    pub sheet: Option<String>,
    /// `COLUMN=key` or `COLUMN=none`
    pub mappings: Vec<String>,
    /// `ROW:key=PATH` with 1-based rows
    pub images: Vec<String>,
    pub output: Option<PathBuf>,
    pub verbose: bool,
}

/// Execute the inspect command
pub fn inspect(file: PathBuf, no_header: bool) -> ImportResult<()> {
    println!("{}", "🔎 Sheetmap - Inspect".bold().green());
    println!("   File:   {}", file.display());
    println!(
        "   Header: {}\n",
        if no_header { "no" } else { "yes" }
    );

    let workbook = WorkbookImporter::new(&file).with_header(!no_header).import()?;
    if workbook.sheets.is_empty() {
        return Err(ImportError::InvalidFile(format!(
            "{} contains no sheets",
            file.display()
        )));
    }

    for (idx, sheet) in workbook.sheets.iter().enumerate() {
        print_sheet_summary(idx, sheet);
    }
    Ok(())
}

fn print_sheet_summary(idx: usize, sheet: &Sheet) {
    println!(
        "   📄 Sheet {}: {} ({} rows)",
        idx + 1,
        sheet.name.bright_blue().bold(),
        sheet.rows.len()
    );
    let columns = sheet.columns();
    if columns.is_empty() {
        println!("      {}", "(no columns)".dimmed());
    } else {
        println!("      Columns: {}", columns.join(", "));
    }
}

/// Execute the import command
pub fn import(options: ImportOptions) -> ImportResult<()> {
    // JSON goes to stdout when no output file is given, so status lines move to stderr
    let status_on_stdout = options.output.is_some();
    let say = |line: String| {
        if status_on_stdout {
            println!("{line}");
        } else {
            eprintln!("{line}");
        }
    };

    say(format!("{}", "📥 Sheetmap - Import".bold().green()));
    say(format!("   Input:  {}", options.input.display()));
    if let Some(output) = &options.output {
        say(format!("   Output: {}", output.display()));
    }
    say(String::new());

    let config = build_config(&options)?;
    let max_rows = config.max_vertical_rows_to_display;
    // Installed before construction so the language check can report through it
    let mut session = ImportSession::with_error_handler(
        config,
        Some(Box::new(|e: &ImportError| {
            if e.is_warning() {
                eprintln!("{} {}", "⚠️ ".yellow(), e);
            }
        })),
    )?;

    if options.verbose {
        say(format!("{}", "📖 Reading spreadsheet...".cyan()));
    }
    session.load_path(&options.input)?;

    if let Some(sheet) = &options.sheet {
        let index = resolve_sheet(session.sheets(), sheet)?;
        session.select_sheet(index)?;
    }

    for arg in &options.mappings {
        let (column, target) = parse_mapping_arg(arg)?;
        session.set_mapping(&column, target.as_deref())?;
    }

    if options.verbose {
        if let (Some(sheet), Some(table)) = (session.selected_sheet(), session.mapping_table()) {
            say(format!(
                "   Sheet {} ({} rows)",
                sheet.name.bright_blue(),
                sheet.rows.len()
            ));
            for column in table.columns() {
                let target = table.selection(column).unwrap_or("none");
                say(format!("      {} → {}", column, target.bright_yellow()));
            }
        }
        say(String::new());
    }

    for arg in &options.images {
        let (row, attribute, path) = parse_image_arg(arg)?;
        let file = FileHandle::from_path(&path)?;
        session.attach_image(row, &attribute, file)?;
    }

    let records = match session.process()? {
        ProcessOutcome::Emitted(records) => records,
        ProcessOutcome::ImagesPending { records } => {
            if options.verbose {
                say(format!("   🖼️  Attaching images to {} records", records));
            }
            match session.process()? {
                ProcessOutcome::Emitted(records) => records,
                ProcessOutcome::ImagesPending { .. } => return Err(ImportError::NoDataProcessed),
            }
        }
    };

    for line in preview_lines(&records, max_rows) {
        say(line);
    }
    say(String::new());

    match &options.output {
        Some(path) => {
            write_records(&records, path)?;
            say(format!("{}", "✅ Import Complete!".bold().green()));
            say(format!("   {} records written to {}\n", records.len(), path.display()));
        }
        None => {
            let json = serde_json::to_string_pretty(&records)
                .map_err(|e| ImportError::Export(format!("Failed to serialize records: {}", e)))?;
            println!("{json}");
        }
    }

    Ok(())
}

fn build_config(options: &ImportOptions) -> ImportResult<ImporterConfig> {
    let mut config = match &options.config {
        Some(path) => ImporterConfig::from_path(path)?,
        None => ImporterConfig::default(),
    };
    for spec in &options.attributes {
        config.attributes.push(AttributeSpec::parse_cli(spec, false)?);
    }
    for spec in &options.image_attributes {
        config.attributes.push(AttributeSpec::parse_cli(spec, true)?);
    }
    if options.no_header {
        config.has_header = false;
    }
    if config.attributes.is_empty() {
        return Err(ImportError::Config(
            "no attributes defined (use --config or --attribute)".to_string(),
        ));
    }
    Ok(config)
}

/// Resolve a 1-based sheet index or a sheet name
fn resolve_sheet(sheets: &[Sheet], wanted: &str) -> ImportResult<usize> {
    if let Some(idx) = sheets.iter().position(|sheet| sheet.name == wanted) {
        return Ok(idx);
    }
    match wanted.parse::<usize>() {
        Ok(n) if n >= 1 && n <= sheets.len() => Ok(n - 1),
        Ok(n) => Err(ImportError::IndexOutOfRange {
            index: n,
            len: sheets.len(),
        }),
        Err(_) => Err(ImportError::ElementNotFound(format!("sheet '{wanted}'"))),
    }
}

/// Parse `COLUMN=key`; `COLUMN=none` clears the column
fn parse_mapping_arg(arg: &str) -> ImportResult<(String, Option<String>)> {
    let (column, target) = arg
        .rsplit_once('=')
        .ok_or_else(|| ImportError::Config(format!("invalid mapping '{arg}' (expected COLUMN=key)")))?;
    if column.is_empty() {
        return Err(ImportError::Config(format!("invalid mapping '{arg}': empty column")));
    }
    let target = target.trim();
    let target = if target.is_empty() || target.eq_ignore_ascii_case("none") {
        None
    } else {
        Some(target.to_string())
    };
    Ok((column.to_string(), target))
}

/// Parse `ROW:key=PATH` into a 0-based row
fn parse_image_arg(arg: &str) -> ImportResult<(usize, String, PathBuf)> {
    let invalid = || ImportError::Config(format!("invalid image '{arg}' (expected ROW:key=PATH)"));
    let (row, rest) = arg.split_once(':').ok_or_else(invalid)?;
    let (key, path) = rest.split_once('=').ok_or_else(invalid)?;
    let row: usize = row.trim().parse().map_err(|_| invalid())?;
    if row == 0 || key.trim().is_empty() || path.is_empty() {
        return Err(invalid());
    }
    Ok((row - 1, key.trim().to_string(), PathBuf::from(path)))
}

fn preview_lines(records: &[OutputRecord], max_rows: usize) -> Vec<String> {
    let mut lines = vec![format!(
        "{}",
        format!("📋 {} records", records.len()).bold()
    )];
    for (idx, record) in records.iter().take(max_rows).enumerate() {
        let fields: Vec<String> = record
            .iter()
            .map(|(key, value)| format!("{}: {}", key.bright_blue(), value))
            .collect();
        lines.push(format!("   {:>4}  {}", idx + 1, fields.join(", ")));
    }
    if records.len() > max_rows {
        lines.push(format!(
            "   {}",
            format!("... {} more", records.len() - max_rows).dimmed()
        ));
    }
    lines
}

/// Write records as JSON, YAML or Excel, chosen by extension
fn write_records(records: &[OutputRecord], path: &Path) -> ImportResult<()> {
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "json" => {
            let json = serde_json::to_string_pretty(records)
                .map_err(|e| ImportError::Export(format!("Failed to serialize records: {}", e)))?;
            fs::write(path, json)?;
        }
        "yaml" | "yml" => {
            let yaml = serde_yaml::to_string(records)
                .map_err(|e| ImportError::Export(format!("Failed to serialize records: {}", e)))?;
            fs::write(path, yaml)?;
        }
        "xlsx" => RecordExporter::new(records).export(path)?,
        other => {
            return Err(ImportError::Config(format!(
                "unsupported output format '{}' (expected .json, .yaml, .yml or .xlsx)",
                other
            )))
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
