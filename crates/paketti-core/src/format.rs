//! Rendering syntax trees back to source text.
//!
//! A [`Formatter`] is an explicit value handed to whoever needs text: the
//! extraction passes (package content) and the command compiler (sandbox
//! files). There is no shared formatting state.

use crate::model::{
    Body, BodyKind, CompilationUnit, MemberDecl, Parameter, PropertyAccessors, Trivia, TriviaKind,
    TypeDecl, UsingDirective,
};

pub trait Formatter {
    /// Render one member declaration including its leading comments.
    fn format_member(&self, member: &MemberDecl) -> String;

    /// Render only the declaration line of a type, e.g. `public partial class Foo<T> : Bar`.
    fn format_type_header(&self, ty: &TypeDecl) -> String;

    fn format_using(&self, using: &UsingDirective) -> String;

    /// Render a whole document.
    fn format_unit(&self, unit: &CompilationUnit) -> String;
}

/// C#-style renderer.
#[derive(Debug, Clone)]
pub struct SourceFormatter {
    indent: String,
}

impl Default for SourceFormatter {
    fn default() -> Self {
        SourceFormatter {
            indent: "    ".to_string(),
        }
    }
}

impl SourceFormatter {
    pub fn new(indent: impl Into<String>) -> Self {
        SourceFormatter {
            indent: indent.into(),
        }
    }

    fn indented(&self, text: &str) -> String {
        text.lines()
            .map(|line| {
                if line.is_empty() {
                    String::new()
                } else {
                    format!("{}{}", self.indent, line)
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn block(&self, header: &str, inner: &[String], close_trivia: &[Trivia]) -> String {
        let mut out = format!("{}\n{{", header);
        let body = inner.join("\n\n");
        if !body.is_empty() {
            out.push('\n');
            out.push_str(&self.indented(&body));
        }
        let closing = render_trivia(close_trivia);
        if !closing.is_empty() {
            out.push('\n');
            out.push_str(&self.indented(closing.trim_end()));
        }
        out.push_str("\n}");
        out
    }
}

fn render_trivia(trivia: &[Trivia]) -> String {
    trivia
        .iter()
        .filter(|t| t.kind != TriviaKind::Whitespace)
        .map(|t| format!("{}\n", t.text.trim_end()))
        .collect()
}

fn modifiers_prefix(modifiers: &[String]) -> String {
    if modifiers.is_empty() {
        String::new()
    } else {
        format!("{} ", modifiers.join(" "))
    }
}

fn type_params(params: &[String]) -> String {
    if params.is_empty() {
        String::new()
    } else {
        format!("<{}>", params.join(", "))
    }
}

fn parameter_list(params: &[Parameter]) -> String {
    params
        .iter()
        .map(|p| {
            let this = if p.is_this { "this " } else { "" };
            format!("{}{} {}", this, p.ty.text, p.name)
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn with_body(header: String, body: Option<&Body>) -> String {
    match body {
        None => format!("{};", header),
        Some(b) if b.kind == BodyKind::Arrow => format!("{} => {};", header, b.text.trim()),
        Some(b) => format!("{}\n{}", header, b.text.trim()),
    }
}

fn accessor(keyword: &str, body: &Body) -> String {
    match body.kind {
        BodyKind::Arrow => format!("{} => {};", keyword, body.text.trim()),
        BodyKind::Block => format!("{} {}", keyword, body.text.trim()),
    }
}

impl Formatter for SourceFormatter {
    fn format_member(&self, member: &MemberDecl) -> String {
        let (leading, text) = match member {
            MemberDecl::Namespace(ns) => {
                let mut inner: Vec<String> = Vec::new();
                let usings: Vec<String> = ns.usings.iter().map(|u| self.format_using(u)).collect();
                if !usings.is_empty() {
                    inner.push(usings.join("\n"));
                }
                inner.extend(ns.members.iter().map(|m| self.format_member(m)));
                (
                    &ns.leading_trivia,
                    self.block(&format!("namespace {}", ns.name), &inner, &ns.close_trivia),
                )
            }
            MemberDecl::Type(ty) => {
                let inner: Vec<String> = ty.members.iter().map(|m| self.format_member(m)).collect();
                (
                    &ty.leading_trivia,
                    self.block(&self.format_type_header(ty), &inner, &ty.close_trivia),
                )
            }
            MemberDecl::Delegate(d) => (
                &d.leading_trivia,
                format!(
                    "{}delegate {} {}{}({});",
                    modifiers_prefix(&d.modifiers),
                    d.return_type.text,
                    d.name,
                    type_params(&d.type_parameters),
                    parameter_list(&d.parameters)
                ),
            ),
            MemberDecl::Method(m) => (
                &m.leading_trivia,
                with_body(
                    format!(
                        "{}{} {}{}({})",
                        modifiers_prefix(&m.modifiers),
                        m.return_type.text,
                        m.name,
                        type_params(&m.type_parameters),
                        parameter_list(&m.parameters)
                    ),
                    m.body.as_ref(),
                ),
            ),
            MemberDecl::Property(p) => {
                let header = format!("{}{} {}", modifiers_prefix(&p.modifiers), p.ty.text, p.name);
                let text = match &p.accessors {
                    PropertyAccessors::Auto { setter: true } => format!("{} {{ get; set; }}", header),
                    PropertyAccessors::Auto { setter: false } => format!("{} {{ get; }}", header),
                    PropertyAccessors::Arrow { body } => {
                        format!("{} => {};", header, body.text.trim())
                    }
                    PropertyAccessors::Explicit { getter, setter } => {
                        let mut parts = Vec::new();
                        if let Some(g) = getter {
                            parts.push(accessor("get", g));
                        }
                        if let Some(s) = setter {
                            parts.push(accessor("set", s));
                        }
                        self.block(&header, &parts, &[])
                    }
                };
                (&p.leading_trivia, text)
            }
            MemberDecl::Constructor(c) => (
                &c.leading_trivia,
                with_body(
                    format!(
                        "{}{}({})",
                        modifiers_prefix(&c.modifiers),
                        c.name,
                        parameter_list(&c.parameters)
                    ),
                    c.body.as_ref(),
                ),
            ),
            MemberDecl::Field(f) => {
                let vars = f
                    .variables
                    .iter()
                    .map(|v| match &v.initializer {
                        Some(init) => format!("{} = {}", v.name, init.text.trim()),
                        None => v.name.clone(),
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                (
                    &f.leading_trivia,
                    format!("{}{} {};", modifiers_prefix(&f.modifiers), f.ty.text, vars),
                )
            }
        };
        format!("{}{}", render_trivia(leading), text)
    }

    fn format_type_header(&self, ty: &TypeDecl) -> String {
        let bases = if ty.base_list.is_empty() {
            String::new()
        } else {
            let names: Vec<&str> = ty.base_list.iter().map(|b| b.text.as_str()).collect();
            format!(" : {}", names.join(", "))
        };
        format!(
            "{}{} {}{}{}",
            modifiers_prefix(&ty.modifiers),
            ty.kind.keyword(),
            ty.name,
            type_params(&ty.type_parameters),
            bases
        )
    }

    fn format_using(&self, using: &UsingDirective) -> String {
        let text = match (&using.alias, using.is_static) {
            (Some(alias), _) => format!("using {} = {};", alias, using.name),
            (None, true) => format!("using static {};", using.name),
            (None, false) => format!("using {};", using.name),
        };
        format!("{}{}", render_trivia(&using.leading_trivia), text)
    }

    fn format_unit(&self, unit: &CompilationUnit) -> String {
        let mut sections = Vec::new();
        if !unit.usings.is_empty() {
            let usings: Vec<String> = unit.usings.iter().map(|u| self.format_using(u)).collect();
            sections.push(usings.join("\n"));
        }
        sections.extend(unit.members.iter().map(|m| self.format_member(m)));
        let mut out = sections.join("\n\n");
        let end = render_trivia(&unit.end_trivia);
        if !end.is_empty() {
            out.push('\n');
            out.push_str(end.trim_end());
        }
        out.push('\n');
        out
    }
}
