//! Solution fixtures for integration tests.
//!
//! Every fixture is a small `Demo` project whose code mixes base-runtime
//! types with types from a `Foreign` assembly.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use paketti::compile::StructuralCompiler;
use paketti::diagnostics::UsingAnalyzer;
use paketti::format::SourceFormatter;
use paketti::interweave::InterweavePolicy;
use paketti::builder::BuildServices;
use paketti::model::{
    Body, CompilationUnit, Expression, FieldDecl, MethodDecl, NamespaceDecl, Parameter, Project,
    ProjectBuilder, ProjectId, Solution, SymbolRef, TypeDecl, TypeSymbol, TypeSyntax,
};
use paketti::workspace::save_solution;

pub const FOREIGN_ASSEMBLY: &str = "Foreign";
pub const FOREIGN_NAMESPACE: &str = "Foreign.Lib";

/// A named type from the foreign assembly.
pub fn foreign(name: &str) -> TypeSymbol {
    TypeSymbol::named(FOREIGN_ASSEMBLY, FOREIGN_NAMESPACE, name)
}

/// Build services over the structural compiler.
pub fn services<'a>(
    formatter: &'a SourceFormatter,
    policy: &'a InterweavePolicy,
) -> BuildServices<'a> {
    BuildServices {
        compiler: &StructuralCompiler,
        formatter,
        diagnostics: &UsingAnalyzer,
        policy,
    }
}

fn demo_unit(types: Vec<TypeDecl>) -> CompilationUnit {
    let mut ns = NamespaceDecl::new("Demo");
    for ty in types {
        ns = ns.member(ty);
    }
    CompilationUnit::new()
        .using("System")
        .using(FOREIGN_NAMESPACE)
        .member(ns)
}

fn public_static() -> [&'static str; 2] {
    ["public", "static"]
}

/// `static class Foo { static int Bar(this int x) => SomeForeignType.Create(x); }`
pub fn extension_type(type_name: &str, method: &str) -> TypeDecl {
    TypeDecl::class(type_name).with_modifiers(public_static()).member(
        MethodDecl::new(method, TypeSyntax::int())
            .with_modifiers(public_static())
            .param(Parameter::this("x", TypeSyntax::int()))
            .body(
                Body::arrow("SomeForeignType.Create(x)")
                    .expr(Expression::typed("SomeForeignType", foreign("SomeForeignType")))
                    .expr(Expression::typed("SomeForeignType.Create(x)", TypeSymbol::system("Int32"))),
            ),
    )
}

/// A single extension method using one foreign type.
pub fn scenario_extension() -> Project {
    ProjectBuilder::new("Demo", "Demo")
        .document("Foo.cs", demo_unit(vec![extension_type("Foo", "Bar")]))
        .build()
}

/// `A.Method` uses only base types, `B.Method` uses a foreign `Widget`.
pub fn scenario_type_members() -> Project {
    let a = TypeDecl::class("A").with_modifiers(["public"]).member(
        MethodDecl::new("Method", TypeSyntax::int())
            .with_modifiers(["public"])
            .body(Body::arrow("1")),
    );
    let b = TypeDecl::class("B").with_modifiers(["public"]).member(
        MethodDecl::new("Method", TypeSyntax::of(foreign("Widget")))
            .with_modifiers(["public"])
            .body(Body::arrow("new Widget()").expr(Expression::typed("new Widget()", foreign("Widget")))),
    );
    ProjectBuilder::new("Demo", "Demo")
        .document("A.cs", demo_unit(vec![a]))
        .document("B.cs", demo_unit(vec![b]))
        .build()
}

/// A project referencing a type it never declares.
pub fn scenario_broken() -> Project {
    let foo = TypeDecl::class("Foo").with_modifiers(["public"]).member(
        FieldDecl::new(TypeSyntax::of(TypeSymbol::named("Demo", "Demo", "Missing")), "missing")
            .with_modifiers(["private"]),
    );
    ProjectBuilder::new("Demo", "Demo")
        .document("Foo.cs", demo_unit(vec![foo]))
        .build()
}

/// `A.Ping` and `B.Pong` call each other; each uses a different foreign type.
pub fn scenario_cycle() -> Project {
    let a = TypeDecl::class("A").with_modifiers(["public"]).member(
        MethodDecl::new("Ping", TypeSyntax::void())
            .with_modifiers(["public", "static"])
            .body(
                Body::block("{ var w = new Widget(); B.Pong(); }")
                    .expr(Expression::typed("new Widget()", foreign("Widget")))
                    .expr(Expression::call("B.Pong()", SymbolRef::member("B", "Pong"))),
            ),
    );
    let b = TypeDecl::class("B").with_modifiers(["public"]).member(
        MethodDecl::new("Pong", TypeSyntax::void())
            .with_modifiers(["public", "static"])
            .body(
                Body::block("{ var g = new Gadget(); A.Ping(); }")
                    .expr(Expression::typed("new Gadget()", foreign("Gadget")))
                    .expr(Expression::call("A.Ping()", SymbolRef::member("A", "Ping"))),
            ),
    );
    ProjectBuilder::new("Demo", "Demo")
        .document("Cycle.cs", demo_unit(vec![a, b]))
        .build()
}

/// A class whose members mix base and foreign dependencies.
pub fn scenario_mixed() -> Project {
    let shop = TypeDecl::class("Shop")
        .with_modifiers(["public"])
        .member(FieldDecl::new(TypeSyntax::int(), "count").with_modifiers(["private"]))
        .member(
            MethodDecl::new("Count", TypeSyntax::int())
                .with_modifiers(["public"])
                .body(Body::arrow("count").expr(Expression::typed("count", TypeSymbol::system("Int32")))),
        )
        .member(
            MethodDecl::new("Stock", TypeSyntax::of(foreign("Widget")))
                .with_modifiers(["public"])
                .param(Parameter::new("name", TypeSyntax::string()))
                .body(Body::arrow("new Widget(name)").expr(Expression::typed("new Widget(name)", foreign("Widget")))),
        )
        .member(
            MethodDecl::new("Ship", TypeSyntax::void())
                .with_modifiers(["public"])
                .param(Parameter::new("gadget", TypeSyntax::of(foreign("Gadget"))))
                .body(Body::block("{ }")),
        );
    let ext = extension_type("ShopExtensions", "Doubled");
    ProjectBuilder::new("Demo", "Demo")
        .document("Shop.cs", demo_unit(vec![shop, ext]))
        .build()
}

/// Two projects carrying the same interwoven extension method.
pub fn scenario_two_projects() -> Solution {
    let first = ProjectBuilder::new("First", "First")
        .id(ProjectId(1))
        .document("FirstExt.cs", demo_unit(vec![extension_type("FirstExt", "Bar")]))
        .build();
    let second = ProjectBuilder::new("Second", "Second")
        .id(ProjectId(2))
        .document("SecondExt.cs", demo_unit(vec![extension_type("SecondExt", "Baz")]))
        .build();
    Solution::new(vec![first, second])
}

pub fn single(project: Project) -> Solution {
    Solution::new(vec![project])
}

/// Save `solution` as `<name>.sln` inside `dir`.
pub fn write_solution(dir: &Path, name: &str, solution: &Solution) -> PathBuf {
    let path = dir.join(format!("{}.sln", name));
    save_solution(&path, solution).expect("save solution fixture");
    path
}
