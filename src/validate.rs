//! Post-generation validation pass.
//!
//! The prompt asks the model for a single bounded SELECT over declared
//! tables, but prompts are advisory. This pass parses what came back and
//! enforces the rules programmatically: one statement, SELECT only, every
//! referenced table present in the schema, and a row-bounding construct
//! (LIMIT / FETCH / TOP, or a ROWNUM bound for Oracle).

use std::ops::ControlFlow;

use sqlparser::ast::{visit_relations, BinaryOperator, Expr, Query, Select, SetExpr, Statement};
use sqlparser::dialect::{GenericDialect, MsSqlDialect, MySqlDialect, PostgreSqlDialect};
use sqlparser::parser::Parser;
use thiserror::Error;
use tracing::debug;

use crate::dialect::Dialect;
use crate::schema::SchemaMap;

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("statement does not parse: {0}")]
    Parse(String),

    #[error("expected exactly one statement, found {0}")]
    NotSingleStatement(usize),

    #[error("statement is not a plain SELECT")]
    NotSelect,

    #[error("references table '{0}' which is not in the schema")]
    UnknownTable(String),

    #[error("no row-bounding clause (LIMIT / FETCH FIRST / TOP / ROWNUM) present")]
    MissingBoundingClause,
}

/// Validate one extracted SQL string against the schema it was generated
/// from. Empty input should be handled by the caller; this function assumes
/// there is a statement to check.
pub fn validate_statement(
    sql: &str,
    dialect: Dialect,
    schema: &SchemaMap,
) -> Result<(), ValidationError> {
    let statements = parse(sql, dialect)?;
    if statements.len() != 1 {
        return Err(ValidationError::NotSingleStatement(statements.len()));
    }

    let query = match &statements[0] {
        Statement::Query(query) => query,
        _ => return Err(ValidationError::NotSelect),
    };
    let select = match query.body.as_ref() {
        SetExpr::Select(select) => select,
        _ => return Err(ValidationError::NotSelect),
    };

    check_tables(&statements[0], schema)?;
    check_bounding(query, select, dialect)?;
    debug!("Statement passed validation for {}", dialect);
    Ok(())
}

fn parse(sql: &str, dialect: Dialect) -> Result<Vec<Statement>, ValidationError> {
    let result = match dialect {
        Dialect::MySql => Parser::parse_sql(&MySqlDialect {}, sql),
        Dialect::PostgreSql => Parser::parse_sql(&PostgreSqlDialect {}, sql),
        Dialect::SqlServer => Parser::parse_sql(&MsSqlDialect {}, sql),
        // sqlparser has no Oracle dialect; generic handles the subset we
        // emit (ROWNUM is just an identifier).
        Dialect::Oracle => Parser::parse_sql(&GenericDialect {}, sql),
    };
    result.map_err(|e| ValidationError::Parse(e.to_string()))
}

/// Every relation anywhere in the statement — FROM, joins, derived tables,
/// and subqueries in WHERE/HAVING/projection — must name a schema table.
fn check_tables(statement: &Statement, schema: &SchemaMap) -> Result<(), ValidationError> {
    let outcome = visit_relations(statement, |relation| {
        // Schema-qualified names keep only the trailing identifier.
        if let Some(ident) = relation.0.last() {
            let known = schema
                .keys()
                .any(|name| name.eq_ignore_ascii_case(&ident.value));
            if !known {
                return ControlFlow::Break(ident.value.clone());
            }
        }
        ControlFlow::Continue(())
    });
    match outcome {
        ControlFlow::Break(table) => Err(ValidationError::UnknownTable(table)),
        ControlFlow::Continue(()) => Ok(()),
    }
}

fn check_bounding(query: &Query, select: &Select, dialect: Dialect) -> Result<(), ValidationError> {
    if query.limit.is_some() || query.fetch.is_some() || select.top.is_some() {
        return Ok(());
    }
    if dialect == Dialect::Oracle {
        if let Some(selection) = &select.selection {
            if has_rownum_bound(selection) {
                return Ok(());
            }
        }
    }
    Err(ValidationError::MissingBoundingClause)
}

fn has_rownum_bound(expr: &Expr) -> bool {
    match expr {
        Expr::BinaryOp { left, op, right } => match op {
            BinaryOperator::And | BinaryOperator::Or => {
                has_rownum_bound(left) || has_rownum_bound(right)
            }
            BinaryOperator::Lt | BinaryOperator::LtEq => is_rownum(left),
            BinaryOperator::Gt | BinaryOperator::GtEq => is_rownum(right),
            _ => false,
        },
        Expr::Nested(inner) => has_rownum_bound(inner),
        _ => false,
    }
}

fn is_rownum(expr: &Expr) -> bool {
    match expr {
        Expr::Identifier(ident) => ident.value.eq_ignore_ascii_case("rownum"),
        Expr::Nested(inner) => is_rownum(inner),
        _ => false,
    }
}
