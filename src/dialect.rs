//! Closed set of supported SQL dialects plus the per-dialect policy table
//! (bounding-clause syntax, date functions, index guidance) used when
//! assembling generation prompts.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Text2SqlError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    MySql,
    PostgreSql,
    Oracle,
    SqlServer,
}

/// Static policy entries keyed by dialect. Adding a dialect without filling
/// in its policy is a compile error, not a silent fallthrough.
pub struct DialectPolicy {
    pub current_date_fn: &'static str,
    pub current_timestamp_fn: &'static str,
    pub index_guidance: &'static str,
    pub identifier_quote: char,
}

impl Dialect {
    pub const ALL: [Dialect; 4] = [
        Dialect::MySql,
        Dialect::PostgreSql,
        Dialect::Oracle,
        Dialect::SqlServer,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Dialect::MySql => "MySQL",
            Dialect::PostgreSql => "PostgreSQL",
            Dialect::Oracle => "Oracle",
            Dialect::SqlServer => "SQL Server",
        }
    }

    /// Render the mandatory row-bounding clause for this dialect with a
    /// concrete row count.
    pub fn bounding_clause(&self, n: u32) -> String {
        match self {
            Dialect::MySql => format!("LIMIT {}", n),
            Dialect::PostgreSql => format!("FETCH FIRST {} ROWS ONLY", n),
            Dialect::Oracle => format!("ROWNUM <= {}", n),
            Dialect::SqlServer => format!("TOP {}", n),
        }
    }

    pub fn policy(&self) -> &'static DialectPolicy {
        match self {
            Dialect::MySql => &DialectPolicy {
                current_date_fn: "CURDATE()",
                current_timestamp_fn: "NOW()",
                index_guidance: "use a covering index so the query is satisfied from the index alone",
                identifier_quote: '`',
            },
            Dialect::PostgreSql => &DialectPolicy {
                current_date_fn: "CURRENT_DATE",
                current_timestamp_fn: "CURRENT_TIMESTAMP",
                index_guidance: "prefer an INCLUDE (covering) index over the projected columns",
                identifier_quote: '"',
            },
            Dialect::Oracle => &DialectPolicy {
                current_date_fn: "SYSDATE",
                current_timestamp_fn: "CURRENT_TIMESTAMP",
                index_guidance: "prefer index-organized table access paths",
                identifier_quote: '"',
            },
            Dialect::SqlServer => &DialectPolicy {
                current_date_fn: "GETDATE()",
                current_timestamp_fn: "CURRENT_TIMESTAMP",
                index_guidance: "prefer an index with included columns covering the projection",
                identifier_quote: '"',
            },
        }
    }
}

impl FromStr for Dialect {
    type Err = Text2SqlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mysql" | "mariadb" => Ok(Dialect::MySql),
            "postgresql" | "postgres" | "pg" => Ok(Dialect::PostgreSql),
            "oracle" => Ok(Dialect::Oracle),
            "sqlserver" | "mssql" | "sql server" => Ok(Dialect::SqlServer),
            other => Err(Text2SqlError::UnsupportedDialect(other.to_string())),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
