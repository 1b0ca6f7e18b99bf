//! Human-readable text rendering
//!
//! CRDs, versions and paths are always printed in sorted order, so the
//! same report renders to the same text.

use console::Style;
use serde_json::Value;

use super::Indenter;
use super::Report;
use crate::compare::{ChangeSet, CrdDiff, CrdVersionDiff};
use crate::schemadiff::{EnumDiff, SchemaDiff, StringsDiff, SubschemasDiff, ValueDiff};

/// Options for [`render_text`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextRenderOptions {
    /// Emit ANSI colors
    pub color: bool,
    /// Only print CRDs and versions with breaking changes
    pub breaking_only: bool,
}

struct Palette {
    crd: Style,
    version: Style,
    breaking: Style,
    path: Style,
    property: Style,
    attribute: Style,
    add: Style,
    change: Style,
    remove: Style,
    old_value: Style,
    new_value: Style,
}

impl Palette {
    fn new(color: bool) -> Self {
        let style = |s: Style| s.force_styling(color);

        Self {
            crd: style(Style::new().cyan().bright()),
            version: style(Style::new().magenta().bright()),
            breaking: style(Style::new().red()),
            path: style(Style::new().yellow().bright()),
            property: style(Style::new().yellow().bright()),
            attribute: style(Style::new().green().bright()),
            add: style(Style::new().green()),
            change: style(Style::new().yellow()),
            remove: style(Style::new().red()),
            old_value: style(Style::new().green()),
            new_value: style(Style::new().green().bright()),
        }
    }
}

struct Renderer {
    palette: Palette,
    breaking_only: bool,
}

/// Render a report as indented text
pub fn render_text(report: &Report, options: &TextRenderOptions) -> String {
    let renderer = Renderer {
        palette: Palette::new(options.color),
        breaking_only: options.breaking_only,
    };

    let mut printer = Indenter::new();
    let mut printed = 0;

    for (identifier, diff) in &report.diffs {
        if !renderer.should_print(diff) {
            continue;
        }

        if printed > 0 {
            printer.add_line("");
        }
        printer.add(&renderer.crd(identifier, diff));
        printed += 1;
    }

    printer.to_string()
}

impl Renderer {
    fn should_print(&self, diff: &impl ChangeSet) -> bool {
        if self.breaking_only {
            diff.has_breaking_changes()
        } else {
            diff.has_changes()
        }
    }

    fn heading(&self, text: &str, underline: char, style: &Style) -> String {
        let line = underline.to_string().repeat(text.chars().count());
        format!("{}\n{}", style.apply_to(text), style.apply_to(line))
    }

    fn crd(&self, identifier: &str, diff: &CrdDiff) -> Indenter {
        let p = &self.palette;

        let mut printer = Indenter::new();
        printer.add_line(self.heading(identifier, '=', &p.crd));
        printer.indent();

        let mut general = Indenter::new();
        for change in &diff.general {
            general.add_line(format!("~ {}", change.description));
        }
        if !self.breaking_only {
            for version in &diff.added_versions {
                general.add_line(format!(
                    "+ {} {}",
                    p.add.apply_to("added"),
                    p.version.apply_to(version)
                ));
            }
        }
        for version in &diff.deleted_versions {
            general.add_line(format!(
                "- {} {}",
                p.remove.apply_to("removed"),
                p.version.apply_to(version)
            ));
        }

        if !general.is_empty() {
            printer.add_line("");
            printer.add(&general);
        }

        for (version, version_diff) in &diff.changed_versions {
            if !self.should_print(version_diff) {
                continue;
            }

            if let Some(rendered) = self.version(version, version_diff) {
                printer.add_line("");
                printer.add(&rendered);
            }
        }

        printer
    }

    fn version(&self, version: &str, diff: &CrdVersionDiff) -> Option<Indenter> {
        let p = &self.palette;
        let mut blocks = Vec::new();

        for (path, changes) in &diff.schema_changes {
            let mut lines = Indenter::new();

            if !self.breaking_only {
                for property in &changes.added_properties {
                    lines.add_line(format!(
                        "+ {} {}",
                        p.add.apply_to("added"),
                        p.property.apply_to(property)
                    ));
                }
            }
            for property in &changes.deleted_properties {
                lines.add_line(format!(
                    "- {} {}",
                    p.remove.apply_to("removed"),
                    p.property.apply_to(property)
                ));
            }
            if let Some(schema_diff) = &changes.diff {
                self.schema_diff(schema_diff, &mut lines);
            }

            if !lines.is_empty() {
                let mut block = Indenter::new();
                block.add_line(format!("{}:", p.path.apply_to(path)));
                block.indent();
                block.add(&lines);
                blocks.push(block);
            }
        }

        if !diff.breaking_changes.is_empty() {
            let mut block = Indenter::new();
            block.add_line(format!("{}:", p.breaking.apply_to("breaking changes")));
            block.indent();
            for change in &diff.breaking_changes {
                block.add_line(format!(
                    "! {}: {}",
                    p.breaking.apply_to(change.level),
                    change.details
                ));
            }
            blocks.push(block);
        }

        if blocks.is_empty() {
            return None;
        }

        let mut result = Indenter::new();
        result.add_line(self.heading(version, '-', &p.version));
        result.indent();
        for block in &blocks {
            result.add_line("");
            result.add(block);
        }

        Some(result)
    }

    fn schema_diff(&self, diff: &SchemaDiff, out: &mut Indenter) {
        if let Some(extensions) = &diff.extensions {
            for (name, value) in extensions {
                self.value(name, value, out);
            }
        }

        let compositions = [
            ("oneOf", &diff.one_of),
            ("anyOf", &diff.any_of),
            ("allOf", &diff.all_of),
        ];
        for (keyword, subschemas) in compositions {
            if let Some(subschemas) = subschemas {
                self.subschemas(keyword, subschemas, out);
            }
        }
        if diff.not.is_some() {
            self.action(out, "changed", "not");
        }

        let leading = [
            ("type", &diff.type_),
            ("title", &diff.title),
            ("format", &diff.format),
            ("description", &diff.description),
        ];
        for (attribute, value) in leading {
            if let Some(value) = value {
                self.value(attribute, value, out);
            }
        }

        if let Some(enum_) = &diff.enum_ {
            self.enum_values(enum_, out);
        }

        let trailing = [
            ("default value", &diff.default),
            ("example", &diff.example),
            ("external docs", &diff.external_docs),
            ("additional properties", &diff.additional_properties_allowed),
            ("unique items", &diff.unique_items),
            ("exclusive minimum", &diff.exclusive_minimum),
            ("exclusive maximum", &diff.exclusive_maximum),
            ("nullable", &diff.nullable),
            ("minimum allowed value", &diff.minimum),
            ("maximum allowed value", &diff.maximum),
            ("multiple of", &diff.multiple_of),
            ("minimum required length", &diff.min_length),
            ("maximum allowed length", &diff.max_length),
            ("pattern", &diff.pattern),
            ("minimum required items", &diff.min_items),
            ("maximum allowed items", &diff.max_items),
        ];
        for (attribute, value) in trailing {
            if let Some(value) = value {
                self.value(attribute, value, out);
            }
        }

        if let Some(required) = &diff.required {
            self.required(required, out);
        }

        let properties = [
            ("minimum required properties", &diff.min_properties),
            ("maximum allowed properties", &diff.max_properties),
        ];
        for (attribute, value) in properties {
            if let Some(value) = value {
                self.value(attribute, value, out);
            }
        }
    }

    fn value(&self, attribute: &str, diff: &ValueDiff, out: &mut Indenter) {
        let p = &self.palette;

        let line = match (&diff.from, &diff.to) {
            (Value::Null, to) => format!(
                "~ {} {} to {}",
                p.change.apply_to("set"),
                p.attribute.apply_to(attribute),
                p.new_value.apply_to(scalar(to))
            ),
            (_, Value::Null) => format!(
                "~ {} {}",
                p.change.apply_to("removed"),
                p.attribute.apply_to(attribute)
            ),
            (from, to) => format!(
                "~ {} {} from {} to {}",
                p.change.apply_to("changed"),
                p.attribute.apply_to(attribute),
                p.old_value.apply_to(scalar(from)),
                p.new_value.apply_to(scalar(to))
            ),
        };

        out.add_line(line);
    }

    fn action(&self, out: &mut Indenter, action: &str, attribute: &str) {
        let p = &self.palette;
        out.add_line(format!(
            "~ {} {}",
            p.change.apply_to(action),
            p.attribute.apply_to(attribute)
        ));
    }

    fn subschemas(&self, keyword: &str, diff: &SubschemasDiff, out: &mut Indenter) {
        let mut parts = Vec::new();
        if diff.added > 0 {
            parts.push(format!("{} added", diff.added));
        }
        if diff.deleted > 0 {
            parts.push(format!("{} removed", diff.deleted));
        }
        if !diff.modified.is_empty() {
            parts.push(format!("{} modified", diff.modified.len()));
        }

        let p = &self.palette;
        out.add_line(format!(
            "~ {} {} ({})",
            p.change.apply_to("changed"),
            p.attribute.apply_to(keyword),
            parts.join(", ")
        ));
    }

    fn enum_values(&self, diff: &EnumDiff, out: &mut Indenter) {
        let p = &self.palette;

        if diff.enum_deleted {
            self.action(out, "removed", "enum");
            return;
        }

        if diff.enum_added {
            out.add_line(format!(
                "~ {} {} to {}",
                p.change.apply_to("set"),
                p.attribute.apply_to("enum"),
                p.new_value.apply_to(list(&diff.added))
            ));
            return;
        }

        if !diff.added.is_empty() {
            out.add_line(format!(
                "~ {} {} {}",
                p.change.apply_to("added"),
                p.attribute.apply_to("enum values"),
                p.new_value.apply_to(list(&diff.added))
            ));
        }
        if !diff.deleted.is_empty() {
            out.add_line(format!(
                "~ {} {} {}",
                p.change.apply_to("removed"),
                p.attribute.apply_to("enum values"),
                p.old_value.apply_to(list(&diff.deleted))
            ));
        }
    }

    fn required(&self, diff: &StringsDiff, out: &mut Indenter) {
        let p = &self.palette;
        let names = |set: &std::collections::BTreeSet<String>| {
            format!("[{}]", set.iter().cloned().collect::<Vec<_>>().join(" "))
        };

        if !diff.added.is_empty() {
            out.add_line(format!(
                "~ {} {}",
                p.change.apply_to("requires"),
                p.property.apply_to(names(&diff.added))
            ));
        }
        if !diff.deleted.is_empty() {
            out.add_line(format!(
                "~ {} {}",
                p.change.apply_to("unrequires"),
                p.property.apply_to(names(&diff.deleted))
            ));
        }
    }
}

fn plain(value: &Value) -> String {
    crate::compare::plain(value)
}

/// A present value; empty strings are quoted so they stay visible
fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) if s.is_empty() => "\"\"".to_string(),
        other => plain(other),
    }
}

fn list(values: &[Value]) -> String {
    format!(
        "[{}]",
        values.iter().map(plain).collect::<Vec<_>>().join(", ")
    )
}
