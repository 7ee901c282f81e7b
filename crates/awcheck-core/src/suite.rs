//! The AdventureWorks2012 check catalogue.
//!
//! Each function returns the literal cases for one kind of check. The
//! integration tests and the `awcheck` runner both build from here, so a case
//! is only ever written down once.

use crate::checks::{
    CatalogCheck, ColumnTypes, LowerBound, Referential, Stage, TableExistence, TableStructure,
    ValueDomain,
};
use crate::error::Result;
use crate::ident::{ColumnRef, TableRef};

/// Owned, type-erased check.
pub type BoxedCheck = Box<dyn CatalogCheck>;

/// Tables that must exist.
pub fn existence_cases() -> Result<Vec<TableExistence>> {
    [
        ("production", "unitmeasure"),
        ("production", "document"),
        ("person", "address"),
    ]
    .into_iter()
    .map(|(schema, table)| Ok(TableExistence::new(TableRef::new(schema, table)?)))
    .collect()
}

/// Expected sorted column lists.
pub fn structure_cases() -> Result<Vec<TableStructure>> {
    let cases: [(&str, &str, &[&str]); 3] = [
        (
            "production",
            "unitmeasure",
            &["modifieddate", "name", "unitmeasurecode"],
        ),
        (
            "production",
            "document",
            &[
                "changenumber",
                "document",
                "documentlevel",
                "documentnode",
                "documentsummary",
                "fileextension",
                "filename",
                "folderflag",
                "modifieddate",
                "owner",
                "revision",
                "rowguid",
                "status",
                "title",
            ],
        ),
        (
            "person",
            "address",
            &[
                "addressid",
                "addressline1",
                "addressline2",
                "city",
                "modifieddate",
                "postalcode",
                "rowguid",
                "spatiallocation",
                "stateprovinceid",
            ],
        ),
    ];

    cases
        .into_iter()
        .map(|(schema, table, columns)| {
            Ok(TableStructure::new(
                TableRef::new(schema, table)?,
                columns.iter().copied(),
            ))
        })
        .collect()
}

/// Expected column types.
pub fn data_type_cases() -> Result<Vec<ColumnTypes>> {
    Ok(vec![ColumnTypes::new(
        TableRef::new("production", "unitmeasure")?,
        [
            ("modifieddate", "datetime"),
            ("name", "nvarchar"),
            ("unitmeasurecode", "nchar"),
        ],
    )])
}

// Data queries quote these names as written, so they keep the catalog's casing.

/// Columns with a closed set of permitted values.
pub fn domain_cases() -> Result<Vec<ValueDomain>> {
    [
        ("Production", "Document", "FolderFlag", "0, 1"),
        ("Production", "Document", "Status", "1, 2, 3"),
    ]
    .into_iter()
    .map(|(schema, table, column, values)| {
        Ok(ValueDomain::new(
            ColumnRef::new(schema, table, column)?,
            values.parse()?,
        ))
    })
    .collect()
}

/// `Production.Document.DocumentLevel` is never negative.
pub fn documentlevel_non_negative() -> Result<LowerBound> {
    Ok(LowerBound::new(
        ColumnRef::new("Production", "Document", "DocumentLevel")?,
        0,
    ))
}

/// Every `Purchasing.ProductVendor.UnitMeasureCode` exists in
/// `Production.UnitMeasure.UnitMeasureCode`.
pub fn unitmeasurecode_consistency() -> Result<Referential> {
    Ok(Referential::new(
        ColumnRef::new("Production", "UnitMeasure", "UnitMeasureCode")?,
        ColumnRef::new("Purchasing", "ProductVendor", "UnitMeasureCode")?,
    ))
}

fn boxed<C: CatalogCheck + 'static>(checks: Vec<C>) -> impl Iterator<Item = BoxedCheck> {
    checks.into_iter().map(|c| Box::new(c) as BoxedCheck)
}

/// Every case, ordered by stage.
pub fn catalogue() -> Result<Vec<BoxedCheck>> {
    let mut checks: Vec<BoxedCheck> = Vec::new();
    checks.extend(boxed(existence_cases()?));
    checks.extend(boxed(structure_cases()?));
    checks.extend(boxed(data_type_cases()?));
    checks.extend(boxed(domain_cases()?));
    checks.push(Box::new(documentlevel_non_negative()?));
    checks.push(Box::new(unitmeasurecode_consistency()?));
    Ok(checks)
}

/// The catalogue restricted to `stages` (all stages when empty).
pub fn catalogue_for(stages: &[Stage]) -> Result<Vec<BoxedCheck>> {
    Ok(catalogue()?
        .into_iter()
        .filter(|c| stages.is_empty() || stages.contains(&c.stage()))
        .collect())
}
