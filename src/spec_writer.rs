//! Renders a [`Spec`] or an [`ExtractedProject`] back to the markdown
//! specification grammar the parser reads. The round trip is lossy for
//! free-text layout but preserves names and counts.

use crate::importer::ExtractedProject;
use crate::spec_model::{Field, Spec, TypeDefKind};

/// Render a spec as markdown in the section grammar.
pub fn render_spec(spec: &Spec) -> String {
    let mut out = String::new();
    out.push_str(&format!("# {}\n\n", spec.name));

    if !spec.description.is_empty() {
        out.push_str(&format!("{}\n\n", spec.description));
    }

    if !spec.version.is_empty() {
        out.push_str("## Meta\n\n");
        out.push_str(&format!("- version: {}\n\n", spec.version));
    }

    if !spec.target_languages.is_empty() {
        out.push_str("## Target Languages\n\n");
        for lang in &spec.target_languages {
            out.push_str(&format!("- {lang}\n"));
        }
        out.push('\n');
    }

    if !spec.types.is_empty() {
        out.push_str("## Types\n\n");
        for ty in &spec.types {
            out.push_str(&type_heading(&ty.name, ty.kind, ty.alias_of.as_deref()));
            if !ty.description.is_empty() {
                out.push_str(&format!("{}\n\n", ty.description));
            }
            render_fields(&mut out, &ty.fields);
        }
    }

    if !spec.functions.is_empty() {
        out.push_str("## Functions\n\n");
        for func in &spec.functions {
            out.push_str(&format!("### {}\n\n", func.name));
            if !func.accepts.is_empty() {
                out.push_str("**Accepts:**\n");
                for param in &func.accepts {
                    if param.description.is_empty() {
                        out.push_str(&format!("- `{}` ({})\n", param.name, param.param_type));
                    } else {
                        out.push_str(&format!(
                            "- `{}` ({}): {}\n",
                            param.name, param.param_type, param.description
                        ));
                    }
                }
                out.push('\n');
            }
            if let Some(returns) = &func.returns {
                out.push_str(&format!("**Returns:** {returns}\n\n"));
            }
            if !func.logic.is_empty() {
                out.push_str("**Logic:**\n```\n");
                out.push_str(&func.logic);
                out.push_str("\n```\n\n");
            }
            if !func.errors.is_empty() {
                out.push_str("**Errors:**\n");
                for err in &func.errors {
                    out.push_str(&format!("- {err}\n"));
                }
                out.push('\n');
            }
        }
    }

    if !spec.tests.is_empty() {
        out.push_str("## Tests\n\n");
        for case in &spec.tests {
            out.push_str(&format!("### {}\n\n", case.name));
            if case.function != case.name {
                out.push_str(&format!("- function: `{}`\n", case.function));
            }
            if let Some(given) = &case.given {
                out.push_str(&format!("- given: {}\n", render_value(given)));
            }
            if let Some(expect) = &case.expect {
                out.push_str(&format!("- expect: {}\n", render_value(expect)));
            }
            out.push('\n');
        }
    }

    render_named_list(&mut out, "Dependencies", &spec.dependencies);
    render_named_list(&mut out, "Configuration", &spec.configuration);

    out
}

/// Render an extracted project as a markdown spec — the reverse round-trip
/// target. The project's detected language becomes the sole target language.
pub fn render_project(project: &ExtractedProject) -> String {
    let mut out = String::new();
    out.push_str(&format!("# {}\n\n", project.name));

    if !project.description.is_empty() {
        out.push_str(&format!("{}\n\n", project.description));
    }

    if let Some(lang) = project.language {
        out.push_str("## Target Languages\n\n");
        out.push_str(&format!("- {lang}\n\n"));
    }

    if !project.types.is_empty() {
        out.push_str("## Types\n\n");
        for ty in &project.types {
            out.push_str(&type_heading(&ty.name, ty.kind, None));
            if !ty.description.is_empty() {
                out.push_str(&format!("{}\n\n", ty.description));
            }
            render_fields(&mut out, &ty.fields);
        }
    }

    if !project.functions.is_empty() {
        out.push_str("## Functions\n\n");
        for func in &project.functions {
            out.push_str(&format!("### {}\n\n", func.name));
            if !func.params.is_empty() {
                out.push_str("**Accepts:**\n");
                for param in &func.params {
                    out.push_str(&format!("- `{}` ({})\n", param.name, param.param_type));
                }
                out.push('\n');
            }
            if let Some(returns) = &func.returns {
                out.push_str(&format!("**Returns:** {returns}\n\n"));
            }
            if !func.description.is_empty() {
                out.push_str("**Logic:**\n```\n");
                out.push_str(&func.description);
                out.push_str("\n```\n\n");
            }
        }
    }

    if !project.tests.is_empty() {
        out.push_str("## Tests\n\n");
        for case in &project.tests {
            out.push_str(&format!("### {}\n\n", case.name));
            out.push_str(&format!("- function: `{}`\n\n", case.function));
        }
    }

    out
}

fn type_heading(name: &str, kind: TypeDefKind, alias_of: Option<&str>) -> String {
    match kind {
        TypeDefKind::Struct => format!("### {name}\n\n"),
        TypeDefKind::Enum => format!("### {name} (enum)\n\n"),
        TypeDefKind::Interface => format!("### {name} (interface)\n\n"),
        TypeDefKind::Alias => match alias_of {
            Some(target) => format!("### {name} (alias of {target})\n\n"),
            None => format!("### {name} (alias of Any)\n\n"),
        },
    }
}

fn render_fields(out: &mut String, fields: &[Field]) {
    for field in fields {
        let mut line = if field.field_type.is_empty() {
            format!("- `{}`", field.name)
        } else {
            format!("- `{}` ({})", field.name, field.field_type)
        };
        if !field.description.is_empty() {
            line.push_str(&format!(": {}", field.description));
        }
        if field.required {
            if field.description.is_empty() {
                line.push_str(": (required)");
            } else {
                line.push_str(" (required)");
            }
        }
        out.push_str(&line);
        out.push('\n');
    }
    if !fields.is_empty() {
        out.push('\n');
    }
}

fn render_named_list(out: &mut String, heading: &str, items: &[crate::spec_model::NamedItem]) {
    if items.is_empty() {
        return;
    }
    out.push_str(&format!("## {heading}\n\n"));
    for item in items {
        if item.description.is_empty() {
            out.push_str(&format!("- `{}`\n", item.name));
        } else {
            out.push_str(&format!("- `{}`: {}\n", item.name, item.description));
        }
    }
    out.push('\n');
}

fn render_value(value: &serde_json::Value) -> String {
    // Quoted JSON scalars parse back to the same typed value.
    value.to_string()
}
