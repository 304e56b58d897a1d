// lakeseed-core/src/domain/compiler/relations.rs

// Which tables does a query read? Used to hold back semantic objects that sit
// on top of a table whose load failed.

use std::collections::BTreeSet;
use std::ops::ControlFlow;

use sqlparser::ast::{ObjectName, ObjectNamePart, Query, Visit, Visitor};
use sqlparser::dialect::GenericDialect;
use sqlparser::parser::Parser;

use crate::domain::namespace::RawNamespace;

/// Relations read by one query, as lower-cased name parts, plus the CTE
/// names it defines.
#[derive(Debug, Default)]
pub struct QueryRelations {
    pub relations: Vec<Vec<String>>,
    pub ctes: BTreeSet<String>,
}

impl Visitor for QueryRelations {
    type Break = ();

    fn pre_visit_query(&mut self, query: &Query) -> ControlFlow<Self::Break> {
        if let Some(with) = &query.with {
            for cte in &with.cte_tables {
                self.ctes.insert(cte.alias.name.value.to_lowercase());
            }
        }
        ControlFlow::Continue(())
    }

    fn pre_visit_relation(&mut self, relation: &ObjectName) -> ControlFlow<Self::Break> {
        let parts: Vec<String> = relation
            .0
            .iter()
            .filter_map(part_value)
            .map(str::to_lowercase)
            .collect();
        if !parts.is_empty() {
            self.relations.push(parts);
        }
        ControlFlow::Continue(())
    }
}

impl QueryRelations {
    /// Does the query read `table` from `namespace`? A bare name counts unless
    /// it is a CTE. A qualified name must carry the raw schema (and catalog,
    /// when both sides have one). Without a namespace only the last part is
    /// compared.
    pub fn reads(&self, table: &str, namespace: Option<&RawNamespace>) -> bool {
        let table = table.to_lowercase();
        self.relations.iter().any(|parts| match parts.as_slice() {
            [name] => *name == table && !self.ctes.contains(name),
            [qualifiers @ .., schema, name] if *name == table => {
                let Some(ns) = namespace else {
                    return true;
                };
                let catalog_matches = match (qualifiers.last(), &ns.catalog) {
                    (Some(catalog), Some(expected)) => catalog.eq_ignore_ascii_case(expected),
                    _ => true,
                };
                schema.eq_ignore_ascii_case(&ns.schema) && catalog_matches
            }
            _ => false,
        })
    }
}

pub struct RelationScanner;

impl RelationScanner {
    /// Every relation referenced by `sql`. `None` when the statement does not
    /// parse with the generic dialect.
    pub fn relations(sql: &str) -> Option<QueryRelations> {
        let statements = Parser::parse_sql(&GenericDialect {}, sql).ok()?;

        let mut collected = QueryRelations::default();
        let _ = statements.visit(&mut collected);
        Some(collected)
    }

    /// Subset of `tables` (all living in `namespace`) referenced by `sql`.
    /// Falls back to an identifier scan when the query uses syntax the generic
    /// parser does not know.
    pub fn referenced<'a, I>(sql: &str, namespace: Option<&RawNamespace>, tables: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        match Self::relations(sql) {
            Some(found) => tables
                .into_iter()
                .filter(|t| found.reads(t, namespace))
                .map(str::to_string)
                .collect(),
            None => {
                tracing::debug!("Query did not parse, scanning identifiers instead");
                let tokens: BTreeSet<String> = sql
                    .split(|c: char| !(c.is_alphanumeric() || c == '_'))
                    .filter(|t| !t.is_empty())
                    .map(str::to_lowercase)
                    .collect();
                tables
                    .into_iter()
                    .filter(|t| tokens.contains(&t.to_lowercase()))
                    .map(str::to_string)
                    .collect()
            }
        }
    }
}

fn part_value(part: &ObjectNamePart) -> Option<&str> {
    match part {
        ObjectNamePart::Identifier(ident) => Some(ident.value.as_str()),
        #[allow(unreachable_patterns)]
        _ => None,
    }
}
