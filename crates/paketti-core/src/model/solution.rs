//! Solutions, projects and documents.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::syntax::CompilationUnit;
use super::{DocumentId, NodeId, ProjectId};
use crate::error::PakettiResult;

/// Source kind as reported by the front-end.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Ordinary hand-written source.
    #[default]
    Regular,
    /// Interactive script.
    Script,
    /// Produced by a tool; never rewritten.
    Generated,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default)]
    pub kind: SourceKind,
    pub root: CompilationUnit,
}

impl Document {
    /// True for documents rewriters may touch.
    ///
    /// Non-regular documents and assembly attribute files pass through unchanged.
    pub fn is_rewritable(&self) -> bool {
        self.kind == SourceKind::Regular && !is_assembly_info(&self.name)
    }

    /// A copy of this document with a new root.
    pub fn with_root(&self, root: CompilationUnit) -> Document {
        Document {
            root,
            ..self.clone()
        }
    }
}

fn is_assembly_info(name: &str) -> bool {
    let file = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let lower = file.to_ascii_lowercase();
    lower == "assemblyinfo.cs" || lower.ends_with(".assemblyinfo.cs")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    /// Assembly the project compiles to; types from it are local.
    pub assembly_name: String,
    #[serde(default)]
    pub documents: Vec<Document>,
}

impl Project {
    pub fn document(&self, id: DocumentId) -> Option<&Document> {
        self.documents.iter().find(|d| d.id == id)
    }

    /// The document whose tree contains `node`.
    pub fn document_containing(&self, node: NodeId) -> Option<&Document> {
        self.documents.iter().find(|d| d.root.contains_node(node))
    }

    pub fn contains_node(&self, node: NodeId) -> bool {
        self.document_containing(node).is_some()
    }

    /// A copy of this project with `document` replacing the one with the same id.
    ///
    /// Unknown ids leave the project unchanged.
    pub fn with_document(&self, document: Document) -> Project {
        let documents = self
            .documents
            .iter()
            .map(|d| {
                if d.id == document.id {
                    document.clone()
                } else {
                    d.clone()
                }
            })
            .collect();
        Project {
            documents,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Solution {
    #[serde(default)]
    pub projects: Vec<Project>,
}

impl Solution {
    pub fn new(projects: Vec<Project>) -> Self {
        Solution { projects }
    }

    pub fn project(&self, id: ProjectId) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn project_ids(&self) -> Vec<ProjectId> {
        self.projects.iter().map(|p| p.id).collect()
    }

    /// A copy of this solution with `project` replacing the one with the same id.
    pub fn with_project(&self, project: Project) -> Solution {
        let projects = self
            .projects
            .iter()
            .map(|p| {
                if p.id == project.id {
                    project.clone()
                } else {
                    p.clone()
                }
            })
            .collect();
        Solution { projects }
    }

    /// Content hash of the whole solution.
    ///
    /// First 16 hex digits of the SHA-256 of its JSON form.
    pub fn snapshot_id(&self) -> PakettiResult<String> {
        let bytes = serde_json::to_vec(self)?;
        let digest = Sha256::digest(&bytes);
        Ok(hex::encode(&digest[..8]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: u32, name: &str, kind: SourceKind) -> Document {
        Document {
            id: DocumentId(id),
            name: name.to_string(),
            path: None,
            kind,
            root: CompilationUnit::new(),
        }
    }

    #[test]
    fn assembly_info_and_generated_documents_are_skipped() {
        assert!(doc(1, "Foo.cs", SourceKind::Regular).is_rewritable());
        assert!(!doc(2, "Properties/AssemblyInfo.cs", SourceKind::Regular).is_rewritable());
        assert!(!doc(3, "Demo.AssemblyInfo.cs", SourceKind::Regular).is_rewritable());
        assert!(!doc(4, "Gen.g.cs", SourceKind::Generated).is_rewritable());
        assert!(!doc(5, "Run.csx", SourceKind::Script).is_rewritable());
    }

    #[test]
    fn with_document_replaces_by_id() {
        let project = Project {
            id: ProjectId(1),
            name: "Demo".into(),
            assembly_name: "Demo".into(),
            documents: vec![doc(1, "A.cs", SourceKind::Regular), doc(2, "B.cs", SourceKind::Regular)],
        };
        let renamed = Document {
            name: "B2.cs".into(),
            ..doc(2, "B.cs", SourceKind::Regular)
        };
        let next = project.with_document(renamed);
        assert_eq!(next.documents[1].name, "B2.cs");
        assert_eq!(project.documents[1].name, "B.cs");
    }

    #[test]
    fn snapshot_id_tracks_content() {
        let a = Solution::new(vec![]);
        let b = Solution::new(vec![Project {
            id: ProjectId(1),
            name: "Demo".into(),
            assembly_name: "Demo".into(),
            documents: vec![],
        }]);
        assert_eq!(a.snapshot_id().unwrap(), a.snapshot_id().unwrap());
        assert_ne!(a.snapshot_id().unwrap(), b.snapshot_id().unwrap());
        assert_eq!(a.snapshot_id().unwrap().len(), 16);
    }
}
