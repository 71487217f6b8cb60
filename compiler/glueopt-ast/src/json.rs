// SPDX-License-Identifier: PMPL-1.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell

//! ESTree-shaped JSON conversion, used by the `dump` pass.

use serde_json::{json, Value};

use crate::{Ast, LiteralValue, NodeId, NodeKind};

fn opt(ast: &Ast, id: Option<NodeId>) -> Value {
    match id {
        Some(id) => to_json(ast, id),
        None => Value::Null,
    }
}

fn list(ast: &Ast, ids: &[NodeId]) -> Value {
    Value::Array(ids.iter().map(|&id| to_json(ast, id)).collect())
}

fn holey_list(ast: &Ast, ids: &[Option<NodeId>]) -> Value {
    Value::Array(ids.iter().map(|&id| opt(ast, id)).collect())
}

/// Convert a subtree to its ESTree JSON shape.
pub fn to_json(ast: &Ast, id: NodeId) -> Value {
    let node = &ast[id];
    let ty = node.kind.type_name();
    match &node.kind {
        NodeKind::Program { body } => json!({"type": ty, "body": list(ast, body)}),
        NodeKind::EmptyStatement | NodeKind::ThisExpression => json!({"type": ty}),
        NodeKind::ExpressionStatement {
            expression,
            directive,
        } => {
            if *directive {
                json!({"type": ty, "expression": to_json(ast, *expression), "directive": true})
            } else {
                json!({"type": ty, "expression": to_json(ast, *expression)})
            }
        }
        NodeKind::BlockStatement { body } => json!({"type": ty, "body": list(ast, body)}),
        NodeKind::VariableDeclaration {
            kind,
            declarations,
        } => json!({
            "type": ty,
            "kind": kind.as_str(),
            "declarations": list(ast, declarations),
        }),
        NodeKind::VariableDeclarator { id, init } => json!({
            "type": ty,
            "id": to_json(ast, *id),
            "init": opt(ast, *init),
        }),
        NodeKind::FunctionDeclaration {
            id,
            params,
            body,
            is_async,
        } => json!({
            "type": ty,
            "id": to_json(ast, *id),
            "params": list(ast, params),
            "body": to_json(ast, *body),
            "async": is_async,
        }),
        NodeKind::FunctionExpression {
            id,
            params,
            body,
            is_async,
        } => json!({
            "type": ty,
            "id": opt(ast, *id),
            "params": list(ast, params),
            "body": to_json(ast, *body),
            "async": is_async,
        }),
        NodeKind::ArrowFunctionExpression {
            params,
            body,
            expression,
            is_async,
        } => json!({
            "type": ty,
            "params": list(ast, params),
            "body": to_json(ast, *body),
            "expression": expression,
            "async": is_async,
        }),
        NodeKind::Identifier { name } => json!({"type": ty, "name": name.as_str()}),
        NodeKind::Literal { value, raw } => {
            let v = match value {
                LiteralValue::Null => Value::Null,
                LiteralValue::Bool(b) => json!(b),
                LiteralValue::Number(n) => json!(n),
                LiteralValue::Str(s) => json!(s.as_str()),
                LiteralValue::Regex { pattern, flags } => {
                    return json!({
                        "type": ty,
                        "regex": {"pattern": pattern.as_str(), "flags": flags.as_str()},
                        "raw": raw.as_ref().map(|r| r.as_str()),
                    });
                }
            };
            json!({"type": ty, "value": v, "raw": raw.as_ref().map(|r| r.as_str())})
        }
        NodeKind::TemplateLiteral {
            quasis,
            expressions,
        } => json!({
            "type": ty,
            "quasis": list(ast, quasis),
            "expressions": list(ast, expressions),
        }),
        NodeKind::TemplateElement { cooked, raw, tail } => json!({
            "type": ty,
            "value": {"cooked": cooked.as_str(), "raw": raw.as_str()},
            "tail": tail,
        }),
        NodeKind::MemberExpression {
            object,
            property,
            computed,
        } => json!({
            "type": ty,
            "object": to_json(ast, *object),
            "property": to_json(ast, *property),
            "computed": computed,
        }),
        NodeKind::CallExpression { callee, arguments }
        | NodeKind::NewExpression { callee, arguments } => json!({
            "type": ty,
            "callee": to_json(ast, *callee),
            "arguments": list(ast, arguments),
        }),
        NodeKind::AssignmentExpression {
            operator,
            left,
            right,
        } => json!({
            "type": ty,
            "operator": operator.as_str(),
            "left": to_json(ast, *left),
            "right": to_json(ast, *right),
        }),
        NodeKind::BinaryExpression {
            operator,
            left,
            right,
        } => json!({
            "type": ty,
            "operator": operator.as_str(),
            "left": to_json(ast, *left),
            "right": to_json(ast, *right),
        }),
        NodeKind::LogicalExpression {
            operator,
            left,
            right,
        } => json!({
            "type": ty,
            "operator": operator.as_str(),
            "left": to_json(ast, *left),
            "right": to_json(ast, *right),
        }),
        NodeKind::UnaryExpression { operator, argument } => json!({
            "type": ty,
            "operator": operator.as_str(),
            "prefix": true,
            "argument": to_json(ast, *argument),
        }),
        NodeKind::UpdateExpression {
            operator,
            argument,
            prefix,
        } => json!({
            "type": ty,
            "operator": operator.as_str(),
            "prefix": prefix,
            "argument": to_json(ast, *argument),
        }),
        NodeKind::ConditionalExpression {
            test,
            consequent,
            alternate,
        } => json!({
            "type": ty,
            "test": to_json(ast, *test),
            "consequent": to_json(ast, *consequent),
            "alternate": to_json(ast, *alternate),
        }),
        NodeKind::SequenceExpression { expressions } => json!({
            "type": ty,
            "expressions": list(ast, expressions),
        }),
        NodeKind::ObjectExpression { properties } | NodeKind::ObjectPattern { properties } => {
            json!({"type": ty, "properties": list(ast, properties)})
        }
        NodeKind::Property {
            key,
            value,
            kind,
            computed,
            shorthand,
            method,
        } => json!({
            "type": ty,
            "key": to_json(ast, *key),
            "value": to_json(ast, *value),
            "kind": kind.as_str(),
            "computed": computed,
            "shorthand": shorthand,
            "method": method,
        }),
        NodeKind::SpreadElement { argument } | NodeKind::RestElement { argument } => {
            json!({"type": ty, "argument": to_json(ast, *argument)})
        }
        NodeKind::ArrayExpression { elements } | NodeKind::ArrayPattern { elements } => {
            json!({"type": ty, "elements": holey_list(ast, elements)})
        }
        NodeKind::AssignmentPattern { left, right } => json!({
            "type": ty,
            "left": to_json(ast, *left),
            "right": to_json(ast, *right),
        }),
        NodeKind::ReturnStatement { argument } => {
            json!({"type": ty, "argument": opt(ast, *argument)})
        }
        NodeKind::IfStatement {
            test,
            consequent,
            alternate,
        } => json!({
            "type": ty,
            "test": to_json(ast, *test),
            "consequent": to_json(ast, *consequent),
            "alternate": opt(ast, *alternate),
        }),
        NodeKind::ForStatement {
            init,
            test,
            update,
            body,
        } => json!({
            "type": ty,
            "init": opt(ast, *init),
            "test": opt(ast, *test),
            "update": opt(ast, *update),
            "body": to_json(ast, *body),
        }),
        NodeKind::ForInStatement { left, right, body }
        | NodeKind::ForOfStatement { left, right, body } => json!({
            "type": ty,
            "left": to_json(ast, *left),
            "right": to_json(ast, *right),
            "body": to_json(ast, *body),
        }),
        NodeKind::WhileStatement { test, body } => json!({
            "type": ty,
            "test": to_json(ast, *test),
            "body": to_json(ast, *body),
        }),
        NodeKind::DoWhileStatement { body, test } => json!({
            "type": ty,
            "body": to_json(ast, *body),
            "test": to_json(ast, *test),
        }),
        NodeKind::BreakStatement { label } | NodeKind::ContinueStatement { label } => {
            json!({"type": ty, "label": opt(ast, *label)})
        }
        NodeKind::LabeledStatement { label, body } => json!({
            "type": ty,
            "label": to_json(ast, *label),
            "body": to_json(ast, *body),
        }),
        NodeKind::SwitchStatement {
            discriminant,
            cases,
        } => json!({
            "type": ty,
            "discriminant": to_json(ast, *discriminant),
            "cases": list(ast, cases),
        }),
        NodeKind::SwitchCase { test, consequent } => json!({
            "type": ty,
            "test": opt(ast, *test),
            "consequent": list(ast, consequent),
        }),
        NodeKind::ThrowStatement { argument } => {
            json!({"type": ty, "argument": to_json(ast, *argument)})
        }
        NodeKind::TryStatement {
            block,
            handler,
            finalizer,
        } => json!({
            "type": ty,
            "block": to_json(ast, *block),
            "handler": opt(ast, *handler),
            "finalizer": opt(ast, *finalizer),
        }),
        NodeKind::CatchClause { param, body } => json!({
            "type": ty,
            "param": opt(ast, *param),
            "body": to_json(ast, *body),
        }),
        NodeKind::AwaitExpression { argument } => {
            json!({"type": ty, "argument": to_json(ast, *argument)})
        }
        NodeKind::ExportNamedDeclaration {
            declaration,
            specifiers,
        } => json!({
            "type": ty,
            "declaration": opt(ast, *declaration),
            "specifiers": list(ast, specifiers),
        }),
        NodeKind::ExportDefaultDeclaration { declaration } => {
            json!({"type": ty, "declaration": to_json(ast, *declaration)})
        }
        NodeKind::ExportSpecifier { local, exported } => json!({
            "type": ty,
            "local": to_json(ast, *local),
            "exported": to_json(ast, *exported),
        }),
        NodeKind::ImportDeclaration { specifiers, source } => json!({
            "type": ty,
            "specifiers": list(ast, specifiers),
            "source": to_json(ast, *source),
        }),
        NodeKind::ImportSpecifier { local, imported } => json!({
            "type": ty,
            "local": to_json(ast, *local),
            "imported": to_json(ast, *imported),
        }),
        NodeKind::ImportDefaultSpecifier { local }
        | NodeKind::ImportNamespaceSpecifier { local } => {
            json!({"type": ty, "local": to_json(ast, *local)})
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helpers::{make_ident, make_number};
    use crate::span::Span;
    use crate::Node;
    use la_arena::Arena;

    #[test]
    fn test_member_json_shape() {
        let mut nodes = Arena::new();
        let root = nodes.alloc(Node {
            span: Span::dummy(),
            kind: NodeKind::Program { body: vec![] },
        });
        let mut ast = Ast {
            nodes,
            root,
            comments: Vec::new(),
            module: false,
        };
        let obj = make_ident(&mut ast, "HEAP32");
        let idx = make_number(&mut ast, 2.0);
        let member = ast.alloc(
            Span::dummy(),
            NodeKind::MemberExpression {
                object: obj,
                property: idx,
                computed: true,
            },
        );
        let v = to_json(&ast, member);
        assert_eq!(v["type"], "MemberExpression");
        assert_eq!(v["computed"], true);
        assert_eq!(v["object"]["name"], "HEAP32");
        assert_eq!(v["property"]["value"], 2.0);
    }
}
