//! Test fixture generators for integration tests.
#![allow(dead_code)]

use code_cartographer::domain::node::ClassifierKind;
use code_cartographer::domain::semantic::{
    DefinitionNode, ImportBinding, MemberNode, Multiplicity, Ownership, ReferenceKind,
    ReferenceNode, SourceLocation, SourceUnit, SyntaxIndex, TypeRef,
};
use std::path::{Path, PathBuf};

pub fn unit(path: &str, definitions: Vec<DefinitionNode>) -> SourceUnit {
    SourceUnit {
        path: path.to_string(),
        language: "python".to_string(),
        definitions,
        ..Default::default()
    }
}

pub fn class(name: &str) -> DefinitionNode {
    DefinitionNode {
        name: name.to_string(),
        ..Default::default()
    }
}

pub fn subclass(name: &str, supertypes: &[&str]) -> DefinitionNode {
    DefinitionNode {
        supertypes: supertypes.iter().map(|s| s.to_string()).collect(),
        ..class(name)
    }
}

pub fn nested(name: &str, enclosing: &str, kind: ClassifierKind) -> DefinitionNode {
    DefinitionNode {
        kind,
        enclosing: Some(enclosing.to_string()),
        ..class(name)
    }
}

pub fn with_members(mut def: DefinitionNode, members: Vec<MemberNode>) -> DefinitionNode {
    def.members = members;
    def
}

pub fn member(name: &str, type_name: &str, multiplicity: Multiplicity, ownership: Ownership) -> MemberNode {
    MemberNode {
        name: name.to_string(),
        type_ref: Some(TypeRef {
            name: type_name.to_string(),
            multiplicity,
            ownership,
        }),
        location: SourceLocation::default(),
    }
}

pub fn reference(name: &str, enclosing: &str, line: u32) -> ReferenceNode {
    ReferenceNode {
        name: name.to_string(),
        enclosing: enclosing.to_string(),
        kind: ReferenceKind::TypeUsage,
        imports: Vec::new(),
        location: SourceLocation::new("", line, 4),
    }
}

/// The two-class project: `pkg.A` and `pkg.B(A)`.
pub fn two_class_project() -> Vec<SourceUnit> {
    vec![unit("pkg.py", vec![class("A"), subclass("B", &["A"])])]
}

/// A small shop with an init-file package class, nested types, relative imports,
/// members of every classification, code references and one third-party call.
///
/// Relationships it yields, in (source, target, type) order:
/// - `shop.models.Customer → shop.Entity` INHERITANCE
/// - `shop.models.Customer → shop.models.Order` COMPOSITION (owned collection, ambiguous)
/// - `shop.models.Order → shop.Entity` INHERITANCE
/// - `shop.models.Order → shop.models.Customer` ASSOCIATION
/// - `shop.models.Order → shop.models.Order.Status` COMPOSITION
/// - `shop.models.Order → shop.models.OrderLine` AGGREGATION
/// - `shop.services.billing.BillingService → shop.models.Order` DEPENDENCY
/// - `shop.services.billing.BillingService → shop.services.gateway.PaymentGateway` COMPOSITION
pub fn shop_project() -> Vec<SourceUnit> {
    let init = unit("shop/__init__.py", vec![class("Entity")]);

    let mut models = unit(
        "shop/models.py",
        vec![
            DefinitionNode {
                members: vec![member(
                    "orders",
                    "Order",
                    Multiplicity::Collection,
                    Ownership::Owned,
                )],
                ..subclass("Customer", &["Entity"])
            },
            DefinitionNode {
                members: vec![
                    member("customer", "Customer", Multiplicity::Single, Ownership::Shared),
                    member("lines", "OrderLine", Multiplicity::Collection, Ownership::Shared),
                    member("status", "Status", Multiplicity::Single, Ownership::Owned),
                ],
                ..subclass("Order", &["Entity"])
            },
            nested("Status", "Order", ClassifierKind::Enum),
            class("OrderLine"),
        ],
    );
    models.imports.push(ImportBinding::new("Entity", ".Entity"));

    let mut billing = unit(
        "shop/services/billing.py",
        vec![DefinitionNode {
            members: vec![member(
                "gateway",
                "PaymentGateway",
                Multiplicity::Single,
                Ownership::Owned,
            )],
            ..class("BillingService")
        }],
    );
    billing.imports.push(ImportBinding::new("models", "..models"));
    billing.references = vec![
        reference("models.Order", "BillingService.charge", 10),
        reference("PaymentGateway", "BillingService.charge", 11),
        reference("json.dumps", "BillingService.charge", 12),
        reference("models", "", 1),
    ];

    let gateway = unit(
        "shop/services/gateway.py",
        vec![DefinitionNode {
            kind: ClassifierKind::Interface,
            is_abstract: true,
            ..class("PaymentGateway")
        }],
    );

    vec![init, models, billing, gateway]
}

/// Write `units` as a single syntax index file inside `dir`.
pub fn write_index(dir: &Path, project_name: Option<&str>, units: Vec<SourceUnit>) -> PathBuf {
    let index = SyntaxIndex {
        project_name: project_name.map(String::from),
        units,
    };
    let path = dir.join("syntax_index.json");
    std::fs::write(&path, serde_json::to_string_pretty(&index).unwrap()).unwrap();
    path
}
