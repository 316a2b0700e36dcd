//! End-to-end tests for the extraction pipeline.
//!
//! These tests drive the library builders over in-memory and on-disk
//! workspaces and check the packages and the stripped solutions they produce.

mod support;

use std::collections::BTreeSet;

use paketti::builder::{LibraryBuild, SolutionToLibraryBuilder};
use paketti::compile::{Compiler, StructuralCompiler};
use paketti::context::ProjectContext;
use paketti::error::{OutputErrorCode, PakettiError};
use paketti::format::SourceFormatter;
use paketti::interweave::InterweavePolicy;
use paketti::library::PackageKind;
use paketti::model::{MemberDecl, NodeId, Project, Solution};
use paketti::rewriters::{
    remove_declarations, EnsurePartial, ExtractInterwovenExtensionMethods,
    ExtractInterwovenTypeMembers,
};
use paketti::selector::ContentSelector;
use paketti::transaction::SolutionRewriter;
use paketti::walker::{DependencySet, DependencyWalker};
use paketti::workspace::{AdhocWorkspace, FileWorkspace, Workspace};
use tempfile::TempDir;

use support::fixtures::{self, services, single};
use support::workspaces::RejectingWorkspace;

fn build(solution: Solution) -> Result<LibraryBuild, PakettiError> {
    let formatter = SourceFormatter::default();
    let policy = InterweavePolicy::default();
    let workspace = AdhocWorkspace::from_solution(solution);
    let result =
        SolutionToLibraryBuilder::new(services(&formatter, &policy)).build_workspace(&workspace);
    result
}

fn member_names(project: &Project) -> BTreeSet<String> {
    let context = ProjectContext::new(project);
    context
        .declarations()
        .map(|info| info.qualified_name())
        .collect()
}

// ============================================================================
// Scenarios
// ============================================================================

mod scenarios {
    use super::*;

    #[test]
    fn interwoven_extension_method_is_packed() {
        let build = build(single(fixtures::scenario_extension())).unwrap();

        let interwoven: Vec<_> = build
            .library
            .of_kind(PackageKind::InterwovenExtensionMethods)
            .collect();
        assert_eq!(interwoven.len(), 1);
        let package = interwoven[0];
        assert_eq!(
            package.key(),
            "InterwovenExtensionMethods Foreign.Lib.SomeForeignType"
        );
        assert_eq!(
            package.content(),
            "public static int Bar(this int x) => SomeForeignType.Create(x);"
        );

        let foo = build.library.get("MemberContainer Class Demo.Foo`0").unwrap();
        assert!(!foo.content().contains("Bar"));
        assert_eq!(
            foo.container().unwrap().declaration,
            "public static partial class Foo"
        );
    }

    #[test]
    fn extension_is_gone_after_its_pass() {
        let formatter = SourceFormatter::default();
        let policy = InterweavePolicy::default();
        let project = fixtures::scenario_extension();
        let context = ProjectContext::new(&project);
        let mut walker = DependencyWalker::new(&context);
        let extracted = ExtractInterwovenExtensionMethods::new(ContentSelector::new(&policy), &formatter)
            .extract(&mut walker)
            .unwrap();

        assert_eq!(extracted.removed_count(), 1);
        let names = member_names(&extracted.project);
        assert!(names.contains("Demo.Foo"));
        assert!(!names.contains("Demo.Foo.Bar"));
        assert!(StructuralCompiler.compile(&extracted.project).is_ok());
    }

    #[test]
    fn interwoven_type_member_is_packed_under_its_owner() {
        let build = build(single(fixtures::scenario_type_members())).unwrap();

        let keys: Vec<&str> = build.library.keys().collect();
        assert_eq!(
            keys,
            vec![
                "InterwovenTypeMembers Demo.B Foreign.Lib.Widget",
                "MemberContainer Class Demo.A`0",
                "MemberContainer Class Demo.B`0",
            ]
        );
        let a = build.library.get("MemberContainer Class Demo.A`0").unwrap();
        assert_eq!(a.content(), "public int Method() => 1;");
        assert_eq!(a.container().unwrap().declaration, "public partial class A");
        let b = build.library.get("MemberContainer Class Demo.B`0").unwrap();
        assert!(b.content().is_empty());
        assert_eq!(
            build
                .library
                .get("InterwovenTypeMembers Demo.B Foreign.Lib.Widget")
                .unwrap()
                .owner(),
            Some("Demo.B")
        );
    }

    #[test]
    fn broken_project_fails_before_any_rewrite() {
        let err = build(single(fixtures::scenario_broken())).unwrap_err();
        assert!(matches!(err, PakettiError::PreconditionFailed { .. }));
        let message = err.to_string();
        assert!(message.starts_with("Project didn't compile before rewriting anything: "));
        assert!(message.contains("CS0246"));
        assert_eq!(OutputErrorCode::from(&err), OutputErrorCode::CompileFailed);
    }

    #[test]
    fn mixed_members_split_by_dependencies() {
        let build = build(single(fixtures::scenario_mixed())).unwrap();
        let keys: BTreeSet<&str> = build.library.keys().collect();
        let expected: BTreeSet<&str> = [
            "InterwovenExtensionMethods Foreign.Lib.SomeForeignType",
            "InterwovenTypeMembers Demo.Shop Foreign.Lib.Gadget",
            "InterwovenTypeMembers Demo.Shop Foreign.Lib.Widget",
            "MemberContainer Class Demo.Shop`0",
            "MemberContainer Class Demo.ShopExtensions`0",
        ]
        .into_iter()
        .collect();
        assert_eq!(keys, expected);

        let shop = build.library.get("MemberContainer Class Demo.Shop`0").unwrap();
        assert!(shop.content().contains("private int count;"));
        assert!(shop.content().contains("public int Count() => count;"));
        assert!(!shop.content().contains("Stock"));
        assert!(!shop.content().contains("Ship"));
        assert!(shop
            .container()
            .unwrap()
            .usings
            .contains("using Foreign.Lib;"));
    }
}

// ============================================================================
// Properties
// ============================================================================

mod properties {
    use super::*;

    #[test]
    fn cycles_terminate_with_shared_dependencies() {
        let project = fixtures::scenario_cycle();
        let context = ProjectContext::new(&project);
        let mut walker = DependencyWalker::new(&context);
        let members = context.type_members_excluding_extensions();
        assert_eq!(members.len(), 2);

        let ping = walker.dependencies(&members[0].declaration);
        let pong = walker.dependencies(&members[1].declaration);
        assert_eq!(ping, pong);
        let names: Vec<&str> = ping.iter().map(|t| t.open_name()).collect();
        assert!(names.contains(&"Foreign.Lib.Widget"));
        assert!(names.contains(&"Foreign.Lib.Gadget"));
    }

    #[test]
    fn cycle_members_are_extracted_together() {
        let build = build(single(fixtures::scenario_cycle())).unwrap();
        assert!(build
            .library
            .get("InterwovenTypeMembers Demo.A Foreign.Lib.Gadget,Foreign.Lib.Widget")
            .is_some());
        assert!(build
            .library
            .get("InterwovenTypeMembers Demo.B Foreign.Lib.Gadget,Foreign.Lib.Widget")
            .is_some());
    }

    #[test]
    fn type_dependencies_are_the_union_of_member_dependencies() {
        let project = fixtures::scenario_mixed();
        let context = ProjectContext::new(&project);
        let mut walker = DependencyWalker::new(&context);
        let shop = context
            .top_level_types()
            .into_iter()
            .find(|info| info.qualified_name() == "Demo.Shop")
            .unwrap();

        let mut union = DependencySet::new();
        for info in context.declarations() {
            if info.containing_type.map(|t| t.id) == Some(shop.id()) {
                union.extend(walker.dependencies(&info.declaration));
            }
        }
        let whole = walker.dependencies(&shop.declaration);
        assert!(!whole.is_empty());
        assert_eq!(whole, union);
    }

    #[test]
    fn nothing_interwoven_is_left_after_extraction() {
        let formatter = SourceFormatter::default();
        let policy = InterweavePolicy::default();
        let selector = ContentSelector::new(&policy);

        let project = fixtures::scenario_mixed();
        let after_extensions = {
            let context = ProjectContext::new(&project);
            let mut walker = DependencyWalker::new(&context);
            ExtractInterwovenExtensionMethods::new(selector, &formatter)
                .extract(&mut walker)
                .unwrap()
                .project
        };
        let after_members = {
            let context = ProjectContext::new(&after_extensions);
            let mut walker = DependencyWalker::new(&context);
            ExtractInterwovenTypeMembers::new(selector, &formatter)
                .extract(&mut walker)
                .unwrap()
                .project
        };

        let context = ProjectContext::new(&after_members);
        let mut walker = DependencyWalker::new(&context);
        assert!(selector.interwoven_extension_methods(&mut walker).is_empty());
        assert!(selector
            .interwoven_type_members_except_extensions(&mut walker)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn builds_are_deterministic() {
        let first = build(single(fixtures::scenario_mixed())).unwrap();
        let second = build(single(fixtures::scenario_mixed())).unwrap();
        assert_eq!(first.library.infos(), second.library.infos());
        assert_eq!(first.stripped, second.stripped);
    }

    #[test]
    fn stale_declaration_is_an_invariant_error() {
        let project = fixtures::scenario_extension();
        let err = remove_declarations(&project, &[NodeId(9_999)]).unwrap_err();
        assert!(matches!(err, PakettiError::Invariant { .. }));
        assert!(err
            .to_string()
            .contains("Every member should exist within a document."));
    }
}

// ============================================================================
// Solutions and workspaces
// ============================================================================

mod solutions {
    use super::*;

    #[test]
    fn equal_keys_merge_across_projects() {
        let build = build(fixtures::scenario_two_projects()).unwrap();
        let merged = build
            .library
            .get("InterwovenExtensionMethods Foreign.Lib.SomeForeignType")
            .unwrap();
        assert_eq!(
            merged.content(),
            "public static int Bar(this int x) => SomeForeignType.Create(x);\n\n\
             public static int Baz(this int x) => SomeForeignType.Create(x);"
        );
        assert!(build.library.get("MemberContainer Class Demo.FirstExt`0").is_some());
        assert!(build.library.get("MemberContainer Class Demo.SecondExt`0").is_some());
        assert_eq!(build.library.summary(build.stripped.projects.len()).projects, 2);
    }

    #[test]
    fn every_project_is_stripped() {
        let build = build(fixtures::scenario_two_projects()).unwrap();
        for project in &build.stripped.projects {
            let names = member_names(project);
            assert!(names.is_empty(), "{} kept {:?}", project.name, names);
            for document in &project.documents {
                assert!(document.root.usings.is_empty());
                let MemberDecl::Namespace(ns) = &document.root.members[0] else {
                    panic!("expected namespace");
                };
                assert!(ns.members.is_empty());
            }
        }
    }

    #[test]
    fn building_from_file_leaves_it_untouched() {
        let dir = TempDir::new().unwrap();
        let solution = single(fixtures::scenario_type_members());
        let path = fixtures::write_solution(dir.path(), "Demo", &solution);
        let before = std::fs::read_to_string(&path).unwrap();

        let formatter = SourceFormatter::default();
        let policy = InterweavePolicy::default();
        let build = SolutionToLibraryBuilder::new(services(&formatter, &policy))
            .build(&path)
            .unwrap();

        assert_eq!(build.library.len(), 3);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
        assert_eq!(build.snapshot_id, solution.snapshot_id().unwrap());
    }

    #[test]
    fn rejected_commit_surfaces_and_changes_nothing() {
        let solution = single(fixtures::scenario_extension());
        let mut workspace = RejectingWorkspace::new(solution.clone());
        let err = SolutionRewriter::new(&StructuralCompiler)
            .rewrite_solution(&mut workspace, &[&EnsurePartial])
            .unwrap_err();

        assert!(matches!(err, PakettiError::CommitRejected { .. }));
        assert!(err
            .to_string()
            .starts_with("Workspace.TryApplyChanges() failed: "));
        assert_eq!(workspace.attempts, 1);
        assert_eq!(workspace.current_solution(), solution);
    }

    #[test]
    fn stale_file_workspace_rejects_the_commit() {
        let dir = TempDir::new().unwrap();
        let path = fixtures::write_solution(
            dir.path(),
            "Demo",
            &single(fixtures::scenario_extension()),
        );
        let mut workspace = FileWorkspace::open(&path).unwrap();
        fixtures::write_solution(dir.path(), "Demo", &single(fixtures::scenario_mixed()));

        let err = SolutionRewriter::new(&StructuralCompiler)
            .rewrite_solution(&mut workspace, &[&EnsurePartial])
            .unwrap_err();
        assert_eq!(OutputErrorCode::from(&err), OutputErrorCode::CommitError);
    }

    #[test]
    fn file_workspace_commits_rewrites() {
        let dir = TempDir::new().unwrap();
        let path = fixtures::write_solution(
            dir.path(),
            "Demo",
            &single(fixtures::scenario_type_members()),
        );
        let mut workspace = FileWorkspace::open(&path).unwrap();
        let committed = SolutionRewriter::new(&StructuralCompiler)
            .rewrite_solution(&mut workspace, &[&EnsurePartial])
            .unwrap();

        let reopened = FileWorkspace::open(&path).unwrap();
        assert_eq!(reopened.current_solution(), committed);
    }
}
