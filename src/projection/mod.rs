//! # Field Projection
//!
//! Renders an operator-chosen set of columns over all frontends. Each
//! frontend contributes one row per selector, and data rows are sorted by
//! their `|`-joined text so output is stable regardless of the order the
//! registry returned records in.
//!
//! ```
//! use robinctl::projection::{parse_field_list, project};
//! use robinctl::domain::{FrontendRecord, FrontendSelectorRecord};
//! use std::collections::HashMap;
//!
//! let mut records = HashMap::new();
//! records.insert(
//!     "web".to_string(),
//!     FrontendRecord {
//!         service: "web".into(),
//!         selectors: vec![FrontendSelectorRecord {
//!             domain: "a.com".into(),
//!             path_prefix: "/".into(),
//!             service_port: 80,
//!             frontend_port: 443,
//!             ..Default::default()
//!         }],
//!         ..Default::default()
//!     },
//! );
//!
//! let columns = parse_field_list("id,port,domain,path-prefix,frontend-port").unwrap();
//! let lines = project(&records, &columns).lines();
//! assert_eq!(lines, vec!["ID|Port|Domain|Path-prefix|Frontend-port", "web|80|a.com|/|443"]);
//! ```

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::domain::{FrontendRecord, FrontendSelectorRecord};

/// Columns shown by `ls` when no `--fields` are given
pub const DEFAULT_FIELDS: &str = "id,port,domain,path-prefix,frontend-port";

/// Separator used when joining cells into a line (also the sort key)
pub const CELL_SEPARATOR: &str = "|";

const COLUMN_GLUE: &str = "  ";

/// A requested field id that has no extractor
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown field '{field}'")]
pub struct UnknownFieldError {
    pub field: String,
}

/// One (frontend, selector) pair being rendered as a row
#[derive(Debug, Clone, Copy)]
pub struct FieldData<'a> {
    pub id: &'a str,
    pub frontend: &'a FrontendRecord,
    pub selector: &'a FrontendSelectorRecord,
}

/// Every column the table can show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Id,
    Service,
    Port,
    Mode,
    Domain,
    PathPrefix,
    FrontendPort,
    Private,
    Weight,
    SslCert,
}

impl Field {
    pub const ALL: [Field; 10] = [
        Field::Id,
        Field::Service,
        Field::Port,
        Field::Mode,
        Field::Domain,
        Field::PathPrefix,
        Field::FrontendPort,
        Field::Private,
        Field::Weight,
        Field::SslCert,
    ];

    /// Name used in `--fields`
    pub fn id(&self) -> &'static str {
        match self {
            Field::Id => "id",
            Field::Service => "service",
            Field::Port => "port",
            Field::Mode => "mode",
            Field::Domain => "domain",
            Field::PathPrefix => "path-prefix",
            Field::FrontendPort => "frontend-port",
            Field::Private => "private",
            Field::Weight => "weight",
            Field::SslCert => "ssl-cert",
        }
    }

    /// Column title
    pub fn header(&self) -> &'static str {
        match self {
            Field::Id => "ID",
            Field::Service => "Service",
            Field::Port => "Port",
            Field::Mode => "Mode",
            Field::Domain => "Domain",
            Field::PathPrefix => "Path-prefix",
            Field::FrontendPort => "Frontend-port",
            Field::Private => "Private",
            Field::Weight => "Weight",
            Field::SslCert => "SSL cert",
        }
    }

    pub fn extract(&self, data: &FieldData<'_>) -> String {
        match self {
            Field::Id => data.id.to_string(),
            Field::Service => data.frontend.service.clone(),
            Field::Port => data.selector.service_port.to_string(),
            Field::Mode => data.frontend.effective_mode().to_string(),
            Field::Domain => data.selector.domain.clone(),
            Field::PathPrefix => data.selector.path_prefix.clone(),
            Field::FrontendPort => data.selector.frontend_port.to_string(),
            Field::Private => data.selector.private.to_string(),
            Field::Weight => data.selector.weight.to_string(),
            Field::SslCert => data.selector.ssl_cert.clone(),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Field {
    type Err = UnknownFieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "id" => Ok(Field::Id),
            "service" => Ok(Field::Service),
            "port" => Ok(Field::Port),
            "mode" => Ok(Field::Mode),
            "domain" => Ok(Field::Domain),
            "path-prefix" => Ok(Field::PathPrefix),
            "frontend-port" => Ok(Field::FrontendPort),
            "private" => Ok(Field::Private),
            "weight" => Ok(Field::Weight),
            "ssl-cert" => Ok(Field::SslCert),
            other => Err(UnknownFieldError { field: other.to_string() }),
        }
    }
}

/// All known field ids in alphabetical order
pub fn all_field_ids() -> Vec<&'static str> {
    let mut ids: Vec<&'static str> = Field::ALL.iter().map(Field::id).collect();
    ids.sort_unstable();
    ids
}

/// Map requested field ids to columns, failing on the first unknown id
pub fn resolve<S: AsRef<str>>(field_ids: &[S]) -> Result<Vec<Field>, UnknownFieldError> {
    field_ids.iter().map(|id| id.as_ref().parse()).collect()
}

/// Resolve a comma separated `--fields` value
pub fn parse_field_list(csv: &str) -> Result<Vec<Field>, UnknownFieldError> {
    let ids: Vec<&str> = csv.split(',').map(str::trim).collect();
    resolve(&ids)
}

/// Header plus sorted data rows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Header and rows with cells joined by `|`
    pub fn lines(&self) -> Vec<String> {
        std::iter::once(&self.header)
            .chain(self.rows.iter())
            .map(|cells| cells.join(CELL_SEPARATOR))
            .collect()
    }

    /// Text with every column padded to its widest cell
    pub fn render(&self) -> String {
        let mut widths = vec![0usize; self.header.len()];
        for cells in std::iter::once(&self.header).chain(self.rows.iter()) {
            for (i, cell) in cells.iter().enumerate() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }

        let mut out = String::new();
        for cells in std::iter::once(&self.header).chain(self.rows.iter()) {
            let mut line = String::new();
            for (i, cell) in cells.iter().enumerate() {
                if i > 0 {
                    line.push_str(COLUMN_GLUE);
                }
                line.push_str(cell);
                let pad = widths[i] - cell.chars().count();
                line.extend(std::iter::repeat(' ').take(pad));
            }
            out.push_str(line.trim_end());
            out.push('\n');
        }
        out
    }
}

/// Build the table for `columns` over every selector of every record
pub fn project(records: &HashMap<String, FrontendRecord>, columns: &[Field]) -> Table {
    let header = columns.iter().map(|f| f.header().to_string()).collect();

    let mut rows: Vec<Vec<String>> = records
        .iter()
        .flat_map(|(id, frontend)| {
            frontend.selectors.iter().map(move |selector| {
                let data = FieldData { id, frontend, selector };
                columns.iter().map(|f| f.extract(&data)).collect()
            })
        })
        .collect();

    rows.sort_by_cached_key(|cells| cells.join(CELL_SEPARATOR));

    Table { header, rows }
}
