//! Real account and rep data loaded from CSV.
//!
//! Headers match case-insensitively, with inner whitespace folded to `_`,
//! so "Rep Name", "rep_name" and "REP_NAME" name the same column.
//! Row numbers are file lines: the header is row 1, the first record row 2.
//!
//! Loading runs in two stages:
//!   1. Parsing rejects malformed rows (missing fields, bad numbers, unknown segments).
//!   2. Validation rejects empty files and duplicate ids, and collects soft
//!      warnings for inconsistent location spellings and rep name mismatches.

use crate::{
    account::Account,
    error::{TerritoryError, TerritoryResult},
    roster::{Rep, Roster},
    segment::Segment,
    types::{AccountId, Location, RepId},
};
use serde::Serialize;
use std::{
    collections::{HashMap, HashSet},
    fmt, io,
    path::Path,
};

const REP_COLUMNS: [&str; 3] = ["Rep_Name", "Segment", "Location"];
const ACCOUNT_COLUMNS: [&str; 6] =
    ["Account_ID", "Account_Name", "Original_Rep", "ARR", "Num_Employees", "Location"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepRecord {
    pub name:     RepId,
    pub segment:  Segment,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountRecord {
    /// Identifier as written in the file.
    pub external_id: String,
    pub name:        String,
    /// `None` when the file leaves Risk_Score blank. The allocator sees 0.
    pub risk_score:  Option<u8>,
    /// `account.id` is the record's 0-based position in the file.
    pub account:     Account,
}

/// A problem that does not block allocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataWarning {
    pub row:     Option<usize>,
    pub column:  &'static str,
    pub message: String,
}

impl fmt::Display for DataWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.row {
            Some(row) => write!(f, "row {row}, {}: {}", self.column, self.message),
            None => write!(f, "{}: {}", self.column, self.message),
        }
    }
}

fn normalize_header(header: &str) -> String {
    header.split_whitespace().collect::<Vec<_>>().join("_").to_lowercase()
}

/// Column lookup for one file, keyed by normalized header.
struct Columns<'f> {
    file:  &'f str,
    index: HashMap<String, usize>,
}

impl<'f> Columns<'f> {
    fn read(file: &'f str, headers: &csv::StringRecord, required: &[&str]) -> TerritoryResult<Self> {
        let index: HashMap<String, usize> = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (normalize_header(h), i))
            .collect();
        let missing: Vec<String> = required
            .iter()
            .filter(|c| !index.contains_key(&normalize_header(c)))
            .map(|c| c.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(TerritoryError::MissingColumns { file: file.to_string(), columns: missing });
        }
        Ok(Self { file, index })
    }

    /// Trimmed cell text. Empty when the column or the cell is absent.
    fn get<'r>(&self, record: &'r csv::StringRecord, column: &str) -> &'r str {
        self.index
            .get(&normalize_header(column))
            .and_then(|&i| record.get(i))
            .map(str::trim)
            .unwrap_or("")
    }

    fn required<'r>(
        &self,
        record: &'r csv::StringRecord,
        row: usize,
        column: &str,
    ) -> TerritoryResult<&'r str> {
        let value = self.get(record, column);
        if value.is_empty() {
            return Err(self.invalid(row, column, format!("{column} is required and cannot be empty")));
        }
        Ok(value)
    }

    fn number(&self, record: &csv::StringRecord, row: usize, column: &str) -> TerritoryResult<f64> {
        let text = self.required(record, row, column)?;
        match text.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(value),
            _ => Err(self.invalid(row, column, format!("Invalid number format: \"{text}\""))),
        }
    }

    fn invalid(&self, row: usize, column: &str, message: String) -> TerritoryError {
        TerritoryError::InvalidRow {
            file: self.file.to_string(),
            row,
            column: column.to_string(),
            message,
        }
    }
}

/// Parse a reps file. `file` names the source in errors.
pub fn read_reps<R: io::Read>(file: &str, reader: R) -> TerritoryResult<Vec<RepRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let columns = Columns::read(file, csv_reader.headers()?, &REP_COLUMNS)?;

    let mut reps = Vec::new();
    for (i, result) in csv_reader.records().enumerate() {
        let record = result?;
        let row = i + 2;

        let name = columns.required(&record, row, "Rep_Name")?;
        let segment_text = columns.required(&record, row, "Segment")?;
        let segment = Segment::from_label(segment_text).ok_or_else(|| {
            columns.invalid(
                row,
                "Segment",
                format!("Invalid Segment value: \"{segment_text}\". Must be \"Enterprise\" or \"Mid Market\""),
            )
        })?;
        let location = columns.required(&record, row, "Location")?;

        reps.push(RepRecord {
            name: name.to_string(),
            segment,
            location: location.to_string(),
        });
    }
    Ok(reps)
}

/// Parse an accounts file. `file` names the source in errors.
pub fn read_accounts<R: io::Read>(file: &str, reader: R) -> TerritoryResult<Vec<AccountRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let columns = Columns::read(file, csv_reader.headers()?, &ACCOUNT_COLUMNS)?;

    let mut accounts = Vec::new();
    for (i, result) in csv_reader.records().enumerate() {
        let record = result?;
        let row = i + 2;

        let external_id = columns.required(&record, row, "Account_ID")?;
        let name = columns.required(&record, row, "Account_Name")?;
        let current_rep = columns.required(&record, row, "Original_Rep")?;
        let location = columns.required(&record, row, "Location")?;

        let arr = columns.number(&record, row, "ARR")?;
        if arr < 0.0 {
            return Err(columns.invalid(row, "ARR", format!("ARR must be positive: {arr}")));
        }

        let employees = columns.number(&record, row, "Num_Employees")?;
        if employees < 0.0 {
            return Err(columns.invalid(
                row,
                "Num_Employees",
                format!("Num_Employees must be positive: {employees}"),
            ));
        }
        if employees.fract() != 0.0 {
            return Err(columns.invalid(
                row,
                "Num_Employees",
                format!("Num_Employees must be a whole number: {employees}"),
            ));
        }

        let risk_score = if columns.get(&record, "Risk_Score").is_empty() {
            None
        } else {
            let risk = columns.number(&record, row, "Risk_Score")?;
            if !(0.0..=100.0).contains(&risk) {
                return Err(columns.invalid(
                    row,
                    "Risk_Score",
                    format!("Risk_Score must be between 0 and 100: {risk}"),
                ));
            }
            Some(risk.round() as u8)
        };

        accounts.push(AccountRecord {
            external_id: external_id.to_string(),
            name: name.to_string(),
            risk_score,
            account: Account {
                id: accounts.len() as AccountId,
                arr,
                employees: employees as u64,
                risk_score: risk_score.unwrap_or(0),
                location: location.to_string(),
                current_rep: current_rep.to_string(),
            },
        });
    }
    Ok(accounts)
}

/// Rep names must be unique ignoring case.
pub fn validate_reps(reps: &[RepRecord]) -> TerritoryResult<Vec<DataWarning>> {
    if reps.is_empty() {
        return Err(TerritoryError::EmptyDataset { what: "reps".into() });
    }
    let mut seen = HashSet::with_capacity(reps.len());
    for rep in reps {
        if !seen.insert(rep.name.to_lowercase()) {
            return Err(TerritoryError::DuplicateRep { rep: rep.name.clone() });
        }
    }
    Ok(location_warnings(reps.iter().map(|r| r.location.as_str())))
}

/// Account ids must be unique ignoring case. The first duplicated id in
/// file order is reported with every row it appears on.
pub fn validate_accounts(accounts: &[AccountRecord]) -> TerritoryResult<Vec<DataWarning>> {
    if accounts.is_empty() {
        return Err(TerritoryError::EmptyDataset { what: "accounts".into() });
    }
    let mut rows: HashMap<String, Vec<usize>> = HashMap::with_capacity(accounts.len());
    for (i, record) in accounts.iter().enumerate() {
        rows.entry(record.external_id.to_lowercase()).or_default().push(i + 2);
    }
    for record in accounts {
        if let Some(found) = rows.get(&record.external_id.to_lowercase()).filter(|r| r.len() > 1) {
            return Err(TerritoryError::DuplicateAccount {
                id:   record.external_id.clone(),
                rows: found.clone(),
            });
        }
    }
    Ok(location_warnings(accounts.iter().map(|a| a.account.location.as_str())))
}

/// Cross-file checks. Never fatal.
///
/// Flags accounts whose Original_Rep is not in the reps file, names that only
/// match up to case (the continuity bonus compares names exactly), and reps
/// no account currently belongs to.
pub fn check_consistency(reps: &[RepRecord], accounts: &[AccountRecord]) -> Vec<DataWarning> {
    let exact: HashSet<&str> = reps.iter().map(|r| r.name.as_str()).collect();
    let folded: HashSet<String> = reps.iter().map(|r| r.name.to_lowercase()).collect();
    let mut referenced: HashSet<String> = HashSet::new();
    let mut warnings = Vec::new();

    for (i, record) in accounts.iter().enumerate() {
        let current = &record.account.current_rep;
        let key = current.to_lowercase();
        if !folded.contains(&key) {
            warnings.push(DataWarning {
                row:     Some(i + 2),
                column:  "Original_Rep",
                message: format!(
                    "Account \"{}\" references Original_Rep \"{current}\", which is not in the reps file",
                    record.name
                ),
            });
        } else if !exact.contains(current.as_str()) {
            warnings.push(DataWarning {
                row:     Some(i + 2),
                column:  "Original_Rep",
                message: format!(
                    "Original_Rep \"{current}\" differs in case from the reps file; the continuity bonus will not apply"
                ),
            });
        }
        referenced.insert(key);
    }

    let orphans: Vec<&str> = reps
        .iter()
        .filter(|r| !referenced.contains(&r.name.to_lowercase()))
        .map(|r| r.name.as_str())
        .collect();
    if !orphans.is_empty() {
        warnings.push(DataWarning {
            row:     None,
            column:  "Rep_Name",
            message: format!(
                "{} rep(s) not referenced by any account: {}",
                orphans.len(),
                orphans.join(", ")
            ),
        });
    }
    warnings
}

// One warning per location written with more than one capitalization.
fn location_warnings<'a>(locations: impl Iterator<Item = &'a str>) -> Vec<DataWarning> {
    let mut spellings: Vec<(String, Vec<&'a str>)> = Vec::new();
    for location in locations {
        let key = location.to_lowercase();
        match spellings.iter_mut().find(|(k, _)| *k == key) {
            Some((_, seen)) => {
                if !seen.contains(&location) {
                    seen.push(location);
                }
            }
            None => spellings.push((key, vec![location])),
        }
    }
    spellings
        .into_iter()
        .filter(|(_, seen)| seen.len() > 1)
        .map(|(_, seen)| DataWarning {
            row:     None,
            column:  "Location",
            message: format!(
                "Inconsistent location format: {}. Geo matching compares codes exactly",
                seen.join(", ")
            ),
        })
        .collect()
}

/// Validated reps and accounts, plus every soft warning found.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    pub reps:     Vec<RepRecord>,
    pub accounts: Vec<AccountRecord>,
    pub warnings: Vec<DataWarning>,
}

impl Dataset {
    pub fn new(reps: Vec<RepRecord>, accounts: Vec<AccountRecord>) -> TerritoryResult<Self> {
        let mut warnings = validate_reps(&reps)?;
        warnings.extend(validate_accounts(&accounts)?);
        warnings.extend(check_consistency(&reps, &accounts));

        for warning in &warnings {
            log::warn!("dataset: {warning}");
        }
        log::info!(
            "dataset: {} accounts, {} reps, {} warnings",
            accounts.len(),
            reps.len(),
            warnings.len()
        );
        Ok(Self { reps, accounts, warnings })
    }

    pub fn from_readers<A: io::Read, R: io::Read>(accounts: A, reps: R) -> TerritoryResult<Self> {
        let reps = read_reps("reps file", reps)?;
        let accounts = read_accounts("accounts file", accounts)?;
        Self::new(reps, accounts)
    }

    /// Load and validate both files.
    pub fn load(accounts_path: &Path, reps_path: &Path) -> anyhow::Result<Self> {
        let open = |path: &Path| {
            std::fs::File::open(path)
                .map_err(|e| anyhow::anyhow!("Cannot read {}: {e}", path.display()))
        };
        let reps = read_reps(&reps_path.display().to_string(), open(reps_path)?)?;
        let accounts = read_accounts(&accounts_path.display().to_string(), open(accounts_path)?)?;
        Ok(Self::new(reps, accounts)?)
    }

    /// Allocator inputs, in file order.
    pub fn accounts(&self) -> Vec<Account> {
        self.accounts.iter().map(|r| r.account.clone()).collect()
    }

    pub fn record(&self, id: AccountId) -> Option<&AccountRecord> {
        self.accounts.get(id as usize).filter(|r| r.account.id == id)
    }

    /// Reps of one segment in file order, each homed at its location.
    pub fn roster(&self, segment: Segment) -> TerritoryResult<Roster> {
        Roster::new(
            self.reps
                .iter()
                .filter(|r| r.segment == segment)
                .map(|r| Rep::new(r.name.clone(), r.location.clone()))
                .collect(),
        )
    }
}
