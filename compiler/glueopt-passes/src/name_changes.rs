// SPDX-License-Identifier: PMPL-1.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell

//! `applyImportAndExportNameChanges`: rename symbols crossing the JS↔wasm
//! seam according to `extraInfo.mapping`.

use glueopt_ast::helpers::set_literal_value;
use glueopt_ast::walk::full_walk;
use glueopt_ast::{Ast, LiteralValue, NodeKind};

use crate::graph::{export_use_name, property_key_name, wasm_imports_value};
use crate::{PassContext, PassError};

/// Rename `wasmImports` keys and `wasmExports['…']` property strings.
pub fn apply_import_and_export_name_changes(
    ast: &mut Ast,
    cx: &mut PassContext,
) -> Result<(), PassError> {
    let info = cx
        .extra_info
        .as_ref()
        .ok_or(PassError::MissingExtraInfo("applyImportAndExportNameChanges"))?;
    let mapping = info.mapping.clone();

    let root = ast.root;
    full_walk(ast, root, &mut |ast, node| {
        if let Some(object) = wasm_imports_value(ast, node) {
            let NodeKind::ObjectExpression { properties } = ast.kind(object) else {
                return;
            };
            for prop in properties.clone() {
                let NodeKind::Property { key, .. } = ast.kind(prop) else {
                    continue;
                };
                let key = *key;
                let Some(name) = property_key_name(ast, key) else {
                    continue;
                };
                if let Some(new_name) = mapping.get(name.as_str()) {
                    match ast.kind_mut(key) {
                        NodeKind::Identifier { name } => *name = new_name.as_str().into(),
                        NodeKind::Literal { .. } => {
                            set_literal_value(
                                ast,
                                key,
                                LiteralValue::Str(new_name.as_str().into()),
                            );
                        }
                        _ => {}
                    }
                }
            }
            return;
        }

        if export_use_name(ast, node).is_some() {
            let NodeKind::MemberExpression { property, .. } = ast.kind(node) else {
                return;
            };
            let property = *property;
            let Some(name) = export_use_name(ast, node) else {
                return;
            };
            if let Some(new_name) = mapping.get(name.as_str()) {
                set_literal_value(ast, property, LiteralValue::Str(new_name.as_str().into()));
            }
        }
    });
    Ok(())
}
