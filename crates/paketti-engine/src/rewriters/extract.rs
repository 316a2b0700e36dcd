//! Extraction passes: select, render into packages, then remove.
//!
//! Rendering always happens against the snapshot the selection was made on,
//! before anything is removed. Removal is one batch per document, folded into
//! the project in document order so each step starts from the previous result.

use std::collections::{BTreeSet, HashMap, HashSet};

use paketti_core::error::{PakettiError, PakettiResult};
use paketti_core::format::Formatter;
use paketti_core::model::{DocumentId, NodeId, Project, TriviaKind};
use tracing::{debug, debug_span};

use crate::context::{qualify, Declaration, DocumentContext};
use crate::library::{ContainerDetails, InterweaveDescriptions, Package};
use crate::selector::{ContentSelector, Selected};
use crate::walker::DependencyWalker;

/// Result of one extraction pass.
#[derive(Debug, Clone)]
pub struct Extracted {
    /// The project without the extracted declarations.
    pub project: Project,
    /// One package per extracted declaration, in selection order.
    pub packages: Vec<Package>,
}

impl Extracted {
    pub fn removed_count(&self) -> usize {
        self.packages.len()
    }
}

/// Remove the given declarations from `project`.
///
/// Every id must belong to some document of the project.
pub fn remove_declarations(project: &Project, ids: &[NodeId]) -> PakettiResult<Project> {
    let missing: Vec<String> = ids
        .iter()
        .filter(|id| !project.contains_node(**id))
        .map(ToString::to_string)
        .collect();
    if !missing.is_empty() {
        return Err(PakettiError::invariant(format!(
            "Every member should exist within a document. These did not: {}",
            missing.join(", ")
        )));
    }

    let mut by_document: HashMap<DocumentId, HashSet<NodeId>> = HashMap::new();
    for id in ids {
        if let Some(document) = project.document_containing(*id) {
            by_document.entry(document.id).or_default().insert(*id);
        }
    }

    let order: Vec<DocumentId> = project.documents.iter().map(|d| d.id).collect();
    let mut current = project.clone();
    for document_id in order {
        let Some(nodes) = by_document.get(&document_id) else {
            continue;
        };
        let Some(document) = current.document(document_id) else {
            continue;
        };
        let rewritten = document.with_root(document.root.remove_nodes(nodes));
        debug!(document = %document.name, removed = nodes.len(), "removed declarations");
        current = current.with_document(rewritten);
    }
    Ok(current)
}

fn remove_selected(project: &Project, selected: &[Selected<'_>]) -> PakettiResult<Project> {
    let ids: Vec<NodeId> = selected.iter().map(|s| s.info.id()).collect();
    remove_declarations(project, &ids)
}

// ============================================================================
// Interwoven extension methods
// ============================================================================

pub struct ExtractInterwovenExtensionMethods<'a> {
    selector: ContentSelector<'a>,
    formatter: &'a dyn Formatter,
}

impl<'a> ExtractInterwovenExtensionMethods<'a> {
    pub fn new(selector: ContentSelector<'a>, formatter: &'a dyn Formatter) -> Self {
        ExtractInterwovenExtensionMethods {
            selector,
            formatter,
        }
    }

    pub fn extract(&self, walker: &mut DependencyWalker<'_>) -> PakettiResult<Extracted> {
        let _span = debug_span!("extract_interwoven_extension_methods").entered();
        let project = walker.context().project();
        let selected = self.selector.interwoven_extension_methods(walker);
        let packages = selected
            .iter()
            .map(|s| {
                Package::interwoven_extension_methods(
                    self.formatter.format_member(&s.info.declaration.to_member()),
                    InterweaveDescriptions::of(self.selector.policy(), &s.dependencies),
                )
            })
            .collect();
        Ok(Extracted {
            project: remove_selected(project, &selected)?,
            packages,
        })
    }
}

// ============================================================================
// Interwoven type members
// ============================================================================

pub struct ExtractInterwovenTypeMembers<'a> {
    selector: ContentSelector<'a>,
    formatter: &'a dyn Formatter,
}

impl<'a> ExtractInterwovenTypeMembers<'a> {
    pub fn new(selector: ContentSelector<'a>, formatter: &'a dyn Formatter) -> Self {
        ExtractInterwovenTypeMembers {
            selector,
            formatter,
        }
    }

    pub fn extract(&self, walker: &mut DependencyWalker<'_>) -> PakettiResult<Extracted> {
        let _span = debug_span!("extract_interwoven_type_members").entered();
        let project = walker.context().project();
        let selected = self.selector.interwoven_type_members_except_extensions(walker)?;
        let mut packages = Vec::with_capacity(selected.len());
        for s in &selected {
            let owner = s.info.containing_type_open_name().ok_or_else(|| {
                PakettiError::invariant(format!(
                    "{} has no containing type",
                    s.info.qualified_name()
                ))
            })?;
            packages.push(Package::interwoven_type_members(
                owner,
                self.formatter.format_member(&s.info.declaration.to_member()),
                InterweaveDescriptions::of(self.selector.policy(), &s.dependencies),
            ));
        }
        Ok(Extracted {
            project: remove_selected(project, &selected)?,
            packages,
        })
    }
}

// ============================================================================
// Member containers
// ============================================================================

pub struct ExtractMemberContainers<'a> {
    selector: ContentSelector<'a>,
    formatter: &'a dyn Formatter,
}

impl<'a> ExtractMemberContainers<'a> {
    pub fn new(selector: ContentSelector<'a>, formatter: &'a dyn Formatter) -> Self {
        ExtractMemberContainers {
            selector,
            formatter,
        }
    }

    pub fn extract(&self, walker: &mut DependencyWalker<'_>) -> PakettiResult<Extracted> {
        let _span = debug_span!("extract_member_containers").entered();
        let project = walker.context().project();
        let selected = self.selector.member_containers(walker);
        let mut packages = Vec::with_capacity(selected.len());
        for s in &selected {
            let ty = match s.info.declaration {
                Declaration::Class(ty) | Declaration::Struct(ty) => ty,
                other => {
                    return Err(PakettiError::invariant(format!(
                        "{} {} is not a member container",
                        other.kind_name(),
                        s.info.qualified_name()
                    )))
                }
            };
            let document = project.document(s.info.document).ok_or_else(|| {
                PakettiError::invariant(format!("{} is not in the project", s.info.document))
            })?;
            let usings: BTreeSet<String> = DocumentContext::new(project, document)
                .usings_for(&s.info.namespace)
                .into_iter()
                .map(|u| self.formatter.format_using(u))
                .collect();

            let mut declaration: Vec<String> = ty
                .leading_trivia
                .iter()
                .filter(|t| t.kind == TriviaKind::Comment)
                .map(|t| t.text.trim_end().to_string())
                .collect();
            declaration.push(self.formatter.format_type_header(ty));

            let content: Vec<String> = ty
                .members
                .iter()
                .map(|m| self.formatter.format_member(m))
                .collect();

            let details = ContainerDetails {
                kind: ty.kind,
                name: qualify(&s.info.namespace, &ty.name),
                arity: ty.arity(),
                declaration: declaration.join("\n"),
                usings,
            };
            packages.push(Package::member_container(details, content.join("\n\n")));
        }
        Ok(Extracted {
            project: remove_selected(project, &selected)?,
            packages,
        })
    }
}
