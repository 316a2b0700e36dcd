//! Read-only analyses over a project.

use paketti_core::error::PakettiResult;
use paketti_core::format::Formatter;
use paketti_core::model::Project;
use tracing::debug;

use crate::context::ProjectContext;
use crate::interweave::InterweavePolicy;
use crate::library::{InterweaveDescriptions, Library, Package};
use crate::walker::DependencyWalker;

pub struct ProjectAnalyzer<'a> {
    policy: &'a InterweavePolicy,
    formatter: &'a dyn Formatter,
}

impl<'a> ProjectAnalyzer<'a> {
    pub fn new(policy: &'a InterweavePolicy, formatter: &'a dyn Formatter) -> Self {
        ProjectAnalyzer { policy, formatter }
    }

    /// Group every extension method by the non-runtime types it depends on.
    ///
    /// Extension methods that only use trusted runtime types share one group.
    /// The project is not modified.
    pub fn pack_extension_methods(&self, project: &Project) -> PakettiResult<Library> {
        let context = ProjectContext::new(project);
        let mut walker = DependencyWalker::new(&context);
        let mut library = Library::new();
        for info in context.extension_methods() {
            let dependencies = walker.dependencies(&info.declaration);
            let locals = InterweaveDescriptions::from_types(self.policy.only_local(&dependencies));
            let content = self.formatter.format_member(&info.declaration.to_member());
            library.add_or_merge(Package::extension_methods(content, locals))?;
        }
        debug!(project = %project.name, groups = library.len(), "extension methods packed");
        Ok(library)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paketti_core::format::SourceFormatter;
    use paketti_core::model::{
        Body, CompilationUnit, MethodDecl, Parameter, ProjectBuilder, TypeDecl, TypeSymbol,
        TypeSyntax,
    };

    fn extension(name: &str, ret: TypeSyntax, this: TypeSyntax) -> MethodDecl {
        MethodDecl::new(name, ret)
            .with_modifiers(["public", "static"])
            .param(Parameter::this("x", this))
            .body(Body::arrow("default"))
    }

    #[test]
    fn groups_by_non_runtime_dependencies() {
        let project = ProjectBuilder::new("Demo", "Demo")
            .document(
                "Ext.cs",
                CompilationUnit::new().member(
                    TypeDecl::class("Ext")
                        .with_modifiers(["public", "static"])
                        .member(extension("A", TypeSyntax::int(), TypeSyntax::int()))
                        .member(extension("B", TypeSyntax::int(), TypeSyntax::int()))
                        .member(extension("C", TypeSyntax::string(), TypeSyntax::int()))
                        .member(extension(
                            "D",
                            TypeSyntax::of(TypeSymbol::named("Foreign", "Foreign.Lib", "Widget")),
                            TypeSyntax::int(),
                        )),
                ),
            )
            .build();
        let policy = InterweavePolicy::default();
        let formatter = SourceFormatter::default();
        let library = ProjectAnalyzer::new(&policy, &formatter)
            .pack_extension_methods(&project)
            .unwrap();

        let keys: Vec<&str> = library.keys().collect();
        assert_eq!(
            keys,
            vec!["ExtensionMethods", "ExtensionMethods Foreign.Lib.Widget"]
        );
        let plain = library.get("ExtensionMethods").unwrap();
        assert!(plain.content().contains(" A(this int x)"));
        assert!(plain.content().contains(" B(this int x)"));
        assert!(plain.content().contains(" C(this int x)"));
        let widget = library.get("ExtensionMethods Foreign.Lib.Widget").unwrap();
        assert!(widget.content().contains(" D(this int x)"));
        assert_eq!(project.documents[0].root.members.len(), 1);
    }
}
