//! Transitive type dependencies of declarations.
//!
//! The dependencies of a declaration are the types its signature and body
//! mention, expanded through generic arguments, plus the dependencies of every
//! in-project declaration it invokes or reads. Types of classes and structs are
//! the union over their members.
//!
//! Call graphs may be cyclic. Walking is depth first with an explicit stack
//! ([`Visited`]); re-entering a declaration already on the stack contributes
//! nothing. A result is cached only once it is complete: members of a cycle
//! share the same closure, so the whole cycle is cached when its first-entered
//! declaration finishes.

use std::collections::{BTreeSet, HashMap};

use paketti_core::model::{Body, MemberDecl, NodeId, Parameter, PropertyDecl, TypeSymbol};
use tracing::trace;

use crate::context::{Declaration, ProjectContext};
use crate::type_ref::TypeRef;

/// Deduplicated, deterministically ordered set of types.
pub type DependencySet = BTreeSet<TypeRef>;

/// Declarations currently being walked, with their stack depth.
#[derive(Debug, Default)]
pub struct Visited {
    depth: HashMap<NodeId, usize>,
    stack: Vec<NodeId>,
}

impl Visited {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.depth.contains_key(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }
}

/// Marker for "no back edge to an open declaration".
const CLOSED: usize = usize::MAX;

pub struct DependencyWalker<'a> {
    context: &'a ProjectContext<'a>,
    cache: HashMap<NodeId, DependencySet>,
}

impl<'a> DependencyWalker<'a> {
    pub fn new(context: &'a ProjectContext<'a>) -> Self {
        DependencyWalker {
            context,
            cache: HashMap::new(),
        }
    }

    pub fn context(&self) -> &'a ProjectContext<'a> {
        self.context
    }

    /// Number of declarations with a final cached result.
    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_cached(&self, id: NodeId) -> bool {
        self.cache.contains_key(&id)
    }

    pub fn dependencies(&mut self, declaration: &Declaration<'a>) -> DependencySet {
        let mut visited = Visited::new();
        self.dependencies_with(declaration, &mut visited)
    }

    /// Dependencies of the declaration with `id`, if the project declares it.
    pub fn dependencies_of(&mut self, id: NodeId) -> Option<DependencySet> {
        let declaration = self.context.declaration(id)?.declaration;
        Some(self.dependencies(&declaration))
    }

    /// Walk with a caller-supplied stack. A declaration already in `visited`
    /// yields the empty set.
    ///
    /// `visited` is returned as it was passed in. Declarations left open by a
    /// back edge into the caller's frames are popped without being cached.
    pub fn dependencies_with(
        &mut self,
        declaration: &Declaration<'a>,
        visited: &mut Visited,
    ) -> DependencySet {
        let entry = visited.stack.len();
        let deps = self.walk(*declaration, visited).0;
        while visited.stack.len() > entry {
            if let Some(open) = visited.stack.pop() {
                visited.depth.remove(&open);
            }
        }
        deps
    }

    /// A type plus, recursively, its generic arguments.
    pub fn type_dependencies(ty: &TypeRef) -> DependencySet {
        let mut out = DependencySet::new();
        collect_type(ty, &mut out);
        out
    }

    fn walk(&mut self, declaration: Declaration<'a>, visited: &mut Visited) -> (DependencySet, usize) {
        let id = declaration.id();
        if let Some(cached) = self.cache.get(&id) {
            return (cached.clone(), CLOSED);
        }
        if let Some(&depth) = visited.depth.get(&id) {
            trace!(%id, "cycle re-entry");
            return (DependencySet::new(), depth);
        }

        let depth = visited.stack.len();
        visited.stack.push(id);
        visited.depth.insert(id, depth);

        let edges = Edges::of(&declaration);
        let mut deps = DependencySet::new();
        for symbol in edges.types {
            // Unresolved types are the compiler's problem, not a dependency.
            if let Some(ty) = TypeRef::try_new(symbol) {
                collect_type(&ty, &mut deps);
            }
        }

        let mut low = depth;
        for callee in edges.callees {
            let Some(target) = self.context.declaration(callee) else {
                continue;
            };
            let target = target.declaration;
            if !declaration.is_type_container() && !target.is_callable() {
                continue;
            }
            let (sub, sub_low) = self.walk(target, visited);
            deps.extend(sub);
            low = low.min(sub_low);
        }

        if low < depth {
            // Part of a cycle opened further down the stack; stays open.
            return (deps, low);
        }

        while let Some(top) = visited.stack.pop() {
            visited.depth.remove(&top);
            self.cache.insert(top, deps.clone());
            if top == id {
                break;
            }
        }
        trace!(%id, count = deps.len(), "dependencies cached");
        (deps, CLOSED)
    }
}

impl Declaration<'_> {
    fn is_type_container(&self) -> bool {
        matches!(self, Declaration::Class(_) | Declaration::Struct(_))
    }
}

fn collect_type(ty: &TypeRef, out: &mut DependencySet) {
    for arg in ty.type_arguments() {
        collect_type(arg, out);
    }
    out.insert(ty.clone());
}

/// Types mentioned directly and declarations reached directly.
struct Edges<'p> {
    types: Vec<&'p TypeSymbol>,
    callees: Vec<NodeId>,
}

impl<'p> Edges<'p> {
    fn of(declaration: &Declaration<'p>) -> Self {
        let mut edges = Edges {
            types: Vec::new(),
            callees: Vec::new(),
        };
        match *declaration {
            Declaration::Class(t) | Declaration::Struct(t) => {
                edges.callees = t
                    .members
                    .iter()
                    .filter(|m| !matches!(m, MemberDecl::Namespace(_)))
                    .map(MemberDecl::id)
                    .collect();
            }
            Declaration::Delegate(d) => {
                edges.types.push(&d.return_type.symbol);
                edges.parameters(&d.parameters);
            }
            Declaration::Method(m) => {
                edges.types.push(&m.return_type.symbol);
                edges.parameters(&m.parameters);
                if let Some(body) = &m.body {
                    edges.body(body);
                }
            }
            Declaration::Property(p) => edges.property(p),
            Declaration::Constructor(c) => {
                edges.parameters(&c.parameters);
                if let Some(body) = &c.body {
                    edges.body(body);
                }
            }
            Declaration::Field(f) => {
                edges.types.push(&f.ty.symbol);
                for body in f.variables.iter().filter_map(|v| v.initializer.as_ref()) {
                    edges.body(body);
                }
            }
        }
        edges
    }

    fn parameters(&mut self, parameters: &'p [Parameter]) {
        self.types.extend(parameters.iter().map(|p| &p.ty.symbol));
    }

    fn property(&mut self, property: &'p PropertyDecl) {
        self.types.push(&property.ty.symbol);
        for body in property.bodies() {
            self.body(body);
        }
    }

    fn body(&mut self, body: &'p Body) {
        for expression in &body.expressions {
            if let Some(ty) = expression.type_of() {
                self.types.push(ty);
            }
            if let Some(callee) = expression.symbol.as_ref().and_then(|s| s.declaration) {
                self.callees.push(callee);
            }
        }
    }
}
