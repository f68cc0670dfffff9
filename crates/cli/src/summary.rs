//! Printable view of a checked program.

use cdc_core::{Access, Checker, CompositeKind};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub(crate) struct FieldSummary {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct CompositeSummary {
    pub name: String,
    pub kind: CompositeKind,
    pub access: Access,
    pub fields: Vec<FieldSummary>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ProgramSummary {
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_hash: Option<String>,
    pub imports: Vec<String>,
    pub composites: Vec<CompositeSummary>,
}

impl ProgramSummary {
    pub(crate) fn new(checker: &Checker, code_hash: Option<String>) -> Self {
        let elaboration = checker.elaboration();
        let mut composites: Vec<CompositeSummary> = elaboration
            .composites()
            .map(|composite| CompositeSummary {
                name: composite.qualified_identifier.clone(),
                kind: composite.kind,
                access: composite.access,
                fields: composite
                    .fields()
                    .map(|field| FieldSummary {
                        name: field.identifier.clone(),
                        ty: field.ty.to_string(),
                    })
                    .collect(),
            })
            .collect();
        composites.sort_by(|a, b| a.name.cmp(&b.name));

        ProgramSummary {
            location: checker.location().to_string(),
            code_hash,
            imports: elaboration
                .imports()
                .keys()
                .map(|location| location.to_string())
                .collect(),
            composites,
        }
    }

    pub(crate) fn print_text(&self) {
        println!("Checked {}", self.location);
        if let Some(hash) = &self.code_hash {
            println!("  code hash: {}", hash);
        }
        if !self.imports.is_empty() {
            println!("  imports: {}", self.imports.join(", "));
        }
        println!();
        for composite in &self.composites {
            let fields: Vec<String> = composite
                .fields
                .iter()
                .map(|f| format!("{}: {}", f.name, f.ty))
                .collect();
            let access = match composite.access.keyword() {
                "" => String::new(),
                keyword => format!("{} ", keyword),
            };
            println!(
                "  {}{} {}({})",
                access,
                composite.kind.keyword(),
                composite.name,
                fields.join(", ")
            );
        }
    }
}
