//! Model invariants over generated declarations

use proptest::prelude::*;
use reqtrace_catalog::CatalogStore;
use reqtrace_core::prelude::*;
use reqtrace_extract::RequirementExtractor;
use reqtrace_model::{EntitiesSpec, EntitySpec, FieldSpec, RequirementSet};
use reqtrace_test_utils::{builtin_catalog, row};

const FIELD_POOL: &[&str] = &[
    "firstName",
    "lastName",
    "middleName",
    "dateOfBirth",
    "gender",
    "city",
    "phoneNumber",
    "meta_createdBy",
    "CWID",
    "favoriteColor",
    "bannerId",
];

const REQUIREMENTS: &[(&str, &str)] = &[
    ("FR-1", "Support bulk loading of records"),
    ("FR-2", "Keep records current across systems"),
    ("FR-3", "Expose the data to reporting"),
    ("DQR-1", "Reject records failing quality checks"),
];

fn requirements() -> RequirementSet {
    let rows: Vec<_> = REQUIREMENTS.iter().map(|(id, text)| row(id, text)).collect();
    RequirementExtractor::new().extract(&rows).unwrap()
}

fn declaration() -> impl Strategy<Value = EntitiesSpec> {
    let ids: Vec<&str> = REQUIREMENTS.iter().map(|(id, _)| *id).collect();
    prop::sample::subsequence(FIELD_POOL.to_vec(), 1..=FIELD_POOL.len())
        .prop_flat_map(move |names| {
            let links = prop::collection::vec(prop::sample::subsequence(ids.clone(), 0..=ids.len()), names.len());
            (Just(names), links)
        })
        .prop_map(|(names, links)| {
            let mut person = EntitySpec::business("Person");
            for (name, linked) in names.into_iter().zip(links) {
                person = person.with_field(FieldSpec::new(name).linked_to(linked));
            }
            EntitiesSpec::new().with_entity(person)
        })
}

fn assemble(catalog: &CatalogStore, spec: &EntitiesSpec, reqs: &RequirementSet) -> reqtrace_model::DataModel {
    DataModelAssembler::new(catalog).unwrap().assemble(spec, reqs).unwrap()
}

proptest! {
    #[test]
    fn custom_flag_follows_catalog(spec in declaration()) {
        let catalog = builtin_catalog();
        let model = assemble(&catalog, &spec, &requirements());

        for (entity, field) in model.fields() {
            prop_assert_eq!(field.is_custom(), !catalog.contains(entity.name(), field.name()));
        }
    }

    #[test]
    fn traceability_stays_aligned(spec in declaration()) {
        let catalog = builtin_catalog();
        let model = assemble(&catalog, &spec, &requirements());

        for (_, field) in model.fields() {
            prop_assert!(field.is_traceability_aligned());
            prop_assert_eq!(field.requirement_ids().len(), field.field_reasoning().len());
            for reasoning in field.field_reasoning().values() {
                prop_assert!(!reasoning.trim().is_empty());
            }
        }
    }

    #[test]
    fn assembly_is_idempotent(spec in declaration()) {
        let catalog = builtin_catalog();
        let reqs = requirements();

        let first = assemble(&catalog, &spec, &reqs);
        let second = assemble(&catalog, &spec, &reqs);

        prop_assert_eq!(first.to_json_pretty().unwrap(), second.to_json_pretty().unwrap());
        prop_assert_eq!(first.digest().unwrap(), second.digest().unwrap());

        let report = TraceabilityAnalyzer::new(&reqs).analyze(&first);
        prop_assert_eq!(report.total_fields, spec.entities[0].fields.len());
        prop_assert_eq!(report.weak_match_count, report.weak_matches.len());
    }
}
