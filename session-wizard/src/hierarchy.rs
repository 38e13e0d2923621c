//! Flattening of the unit → module → course tree.
//!
//! A unit selection reaches every course of every module in it. A module selection only ever
//! refers to an independent module; modules nested in a unit are covered by selecting the unit.
//! References that are not in the snapshot resolve to nothing, which callers treat as "nothing
//! selected yet".

use exam_model::{ContentFilters, Course, CourseId, ModuleId, SelectOption, Selection, UnitId};
use indexmap::IndexSet;

pub fn unit_options(filters: &ContentFilters) -> Vec<SelectOption<UnitId>> {
    filters
        .unites
        .iter()
        .map(|unit| SelectOption {
            value: unit.id,
            label: unit.name.clone(),
        })
        .collect()
}

pub fn module_options(filters: &ContentFilters) -> Vec<SelectOption<ModuleId>> {
    filters
        .independent_modules
        .iter()
        .map(|module| SelectOption {
            value: module.id,
            label: module.name.clone(),
        })
        .collect()
}

fn courses<'a>(
    filters: &'a ContentFilters,
    selection: Selection,
) -> Box<dyn Iterator<Item = &'a Course> + 'a> {
    match selection {
        Selection::None => Box::new(std::iter::empty()),
        Selection::Unit(id) => match filters.unit(id) {
            Some(unit) => Box::new(
                unit.modules
                    .iter()
                    .flat_map(|module| module.courses.iter()),
            ),
            None => Box::new(std::iter::empty()),
        },
        Selection::Module(id) => match filters.independent_module(id) {
            Some(module) => Box::new(module.courses.iter()),
            None => Box::new(std::iter::empty()),
        },
    }
}

/// Deduplicated course IDs reachable from `selection`, in first-seen order.
pub fn resolve_course_ids(filters: &ContentFilters, selection: Selection) -> IndexSet<CourseId> {
    courses(filters, selection).map(|course| course.id).collect()
}

pub fn course_names(filters: &ContentFilters, selection: Selection) -> Vec<&str> {
    let mut seen = IndexSet::new();
    courses(filters, selection)
        .filter(|course| seen.insert(course.id))
        .map(|course| course.name.as_str())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::content_filters;

    fn ids(raw: &[u64]) -> IndexSet<CourseId> {
        raw.iter().copied().map(CourseId).collect()
    }

    #[test]
    fn unit_resolves_to_union_of_its_modules() {
        let filters = content_filters();
        assert_eq!(
            resolve_course_ids(&filters, Selection::Unit(UnitId(1))),
            ids(&[1, 2, 3])
        );
    }

    #[test]
    fn unit_courses_are_deduplicated() {
        // Unit 2 lists course 4 under two modules.
        let filters = content_filters();
        let resolved = resolve_course_ids(&filters, Selection::Unit(UnitId(2)));
        assert_eq!(resolved, ids(&[4, 5]));
        assert_eq!(
            course_names(&filters, Selection::Unit(UnitId(2))),
            vec!["Renal physiology", "Dialysis"]
        );
    }

    #[test]
    fn independent_module_resolves_directly() {
        let filters = content_filters();
        assert_eq!(
            resolve_course_ids(&filters, Selection::Module(ModuleId(30))),
            ids(&[7, 8])
        );
    }

    #[test]
    fn nested_module_cannot_be_selected_directly() {
        let filters = content_filters();
        assert!(resolve_course_ids(&filters, Selection::Module(ModuleId(10))).is_empty());
    }

    #[test]
    fn missing_references_resolve_to_nothing() {
        let filters = content_filters();
        assert!(resolve_course_ids(&filters, Selection::None).is_empty());
        assert!(resolve_course_ids(&filters, Selection::Unit(UnitId(404))).is_empty());
        assert!(resolve_course_ids(&filters, Selection::Module(ModuleId(404))).is_empty());
    }

    #[test]
    fn option_lists() {
        let filters = content_filters();
        let units = unit_options(&filters);
        assert_eq!(units.len(), 2);
        assert_eq!(units[0].label, "Unit A");
        let modules = module_options(&filters);
        assert_eq!(
            modules,
            vec![SelectOption {
                value: ModuleId(30),
                label: "Pharmacology".to_string()
            }]
        );
    }
}
