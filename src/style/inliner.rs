//! Copies stylesheet declarations into `style` attributes
//!
//! There is no cascade here. Rules apply in sheet order, then source order;
//! a later matching rule overwrites an earlier one property by property,
//! specificity notwithstanding. Whatever an element declared inline before
//! inlining always keeps its value.

use std::collections::HashSet;

use kuchiki::Selectors;
use log::{debug, info};

use super::declaration::DeclarationBlock;
use super::stylesheet::{compound_classes, subject_compound, StyleRule, Stylesheet};
use crate::html::Fragment;

/// What an inlining pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InlineReport {
    /// Elements whose `style` attribute was written
    pub styled_elements: usize,
    /// Class tokens dropped because their style was inlined
    pub removed_classes: usize,
    /// Selector list entries that could not be compiled
    pub skipped_selectors: usize,
}

/// One compiled entry of a rule's selector list.
struct CompiledEntry {
    selectors: Selectors,
    classes: Vec<String>,
}

fn compile_rule(rule: &StyleRule, sheet: &str, report: &mut InlineReport) -> Vec<CompiledEntry> {
    rule.selectors()
        .into_iter()
        .filter_map(|text| match Selectors::compile(text) {
            Ok(selectors) => Some(CompiledEntry {
                selectors,
                classes: compound_classes(subject_compound(text)),
            }),
            Err(()) => {
                debug!("Stylesheet '{}': skipping selector '{}'", sheet, text);
                report.skipped_selectors += 1;
                None
            }
        })
        .collect()
}

/// Inline `sheets` into the container of `fragment` and every element below.
///
/// With `remove_inlined`, classes named in the subject of a matching
/// selector are removed from elements that took at least one value from
/// that rule, and a `class` attribute left empty is dropped.
pub fn inline_styles(
    fragment: &mut Fragment,
    sheets: &[Stylesheet],
    remove_inlined: bool,
) -> InlineReport {
    let mut report = InlineReport::default();
    let elements = fragment.elements();

    let baselines: Vec<DeclarationBlock> = elements
        .iter()
        .map(|element| {
            element
                .attributes
                .borrow()
                .get("style")
                .map(DeclarationBlock::parse)
                .unwrap_or_default()
        })
        .collect();
    let mut styles = baselines.clone();
    let mut touched = vec![false; elements.len()];
    let mut inlined_classes: Vec<HashSet<String>> = vec![HashSet::new(); elements.len()];

    for sheet in sheets {
        for rule in &sheet.rules {
            if rule.declarations.is_empty() {
                continue;
            }
            let entries = compile_rule(rule, &sheet.name, &mut report);

            for (i, element) in elements.iter().enumerate() {
                let matching: Vec<&CompiledEntry> = entries
                    .iter()
                    .filter(|entry| entry.selectors.matches(element))
                    .collect();
                if matching.is_empty() {
                    continue;
                }

                let mut applied = false;
                for declaration in &rule.declarations {
                    let value = match baselines[i].get(&declaration.property) {
                        Some(baseline) => baseline.value.clone(),
                        None => {
                            applied = true;
                            declaration.value.clone()
                        }
                    };
                    styles[i].set(declaration.property.clone(), value, declaration.important);
                }
                touched[i] = true;

                // A class goes only once its rule supplied at least one value
                if remove_inlined && applied {
                    for entry in matching {
                        inlined_classes[i].extend(entry.classes.iter().cloned());
                    }
                }
            }
        }
    }

    for (i, element) in elements.iter().enumerate() {
        let mut attrs = element.attributes.borrow_mut();

        if touched[i] {
            attrs.insert("style", styles[i].to_css());
            report.styled_elements += 1;
        }

        if inlined_classes[i].is_empty() {
            continue;
        }
        let Some(class) = attrs.get("class").map(String::from) else {
            continue;
        };
        let before = class.split_whitespace().count();
        let kept: Vec<&str> = class
            .split_whitespace()
            .filter(|name| !inlined_classes[i].contains(*name))
            .collect();
        report.removed_classes += before - kept.len();
        if kept.is_empty() {
            attrs.remove("class");
        } else {
            attrs.insert("class", kept.join(" "));
        }
    }

    info!(
        "Inlined {} stylesheets into {} elements",
        sheets.len(),
        report.styled_elements
    );
    report
}
