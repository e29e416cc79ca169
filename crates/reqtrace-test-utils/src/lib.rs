//! Testing utilities for the reqtrace workspace
//!
//! Shared fixtures: a small catalog, a sample requirements document, the
//! matching entity declaration and a sample engine configuration.

#![allow(missing_docs)]

use reqtrace_catalog::CatalogStore;
use reqtrace_extract::{DocumentRow, RequirementExtractor};
use reqtrace_model::{
    DataType, EntitiesSpec, EntitySpec, FieldSpec, Relationship, RelationshipType, RequirementSet,
};

pub const REQUIREMENTS_SHEET: &str = "Functional Requirements";

/// Small catalog; `type` exists in two field groups on purpose
pub const SAMPLE_CATALOG: &str = "\
# sample catalog
Entity: Person
- First Name (firstName) [TextField] aka: given name
- Last Name (lastName) [TextField] aka: surname
- Date of Birth (dateOfBirth) [DateField] aka: birth date
- Gender (gender) [LookupField -> Gender]
Field Group: PostalAddress
- City (city) [TextField]
- State (state) [TextField]
- Address Id (addressId) [TextField]
- Type (type) [LookupField -> AddressType]
Field Group: Phone
- Phone Number (phoneNumber) [TextField]
- Phone Id (phoneId) [TextField]
- Type (type) [LookupField -> PhoneType]
Field Group: _meta
meta_createdBy [TextField]
meta_sourceSystem [TextField]
";

/// Engine configuration carrying the FR-10 justifications of the sample document
pub const USF_CONFIG_TOML: &str = r#"
[[overrides]]
requirement = "FR-10"
field = "constituentId"
text = "FR-10 explicitly mentions a unique identifier returned back to Slate from Banner; {field} cross-references the record between Slate, Banner and the hub."

[[overrides]]
requirement = "FR-10"
field = "firstName"
text = "FR-10 loads student application information from Slate; {field} identifies the prospect when the master record is created."

[[overrides]]
requirement = "FR-10"
field = "lastName"
text = "FR-10 loads student application information from Slate; {field} identifies the prospect when the master record is created."

[[overrides]]
requirement = "FR-10"
field = "state"
text = "FR-10 reports registrations vs acceptance by time, state and race, which requires {field}."

[synonyms]
constituentId = ["unique identifier", "unique id"]
"#;

pub fn sample_catalog() -> CatalogStore {
    CatalogStore::parse(SAMPLE_CATALOG).unwrap()
}

pub fn builtin_catalog() -> CatalogStore {
    CatalogStore::builtin().unwrap()
}

pub fn row(id: &str, description: &str) -> DocumentRow {
    DocumentRow::new(REQUIREMENTS_SHEET, id, description)
}

/// Sample document: one overview sheet, a header row, a wrapped FR-10 and
/// the CWID/PIDM requirement with no declared field
pub fn sample_rows() -> Vec<DocumentRow> {
    vec![
        DocumentRow::new("Overview", "Scope", "Constituent master data for admissions"),
        row("Req #", "Description"),
        row("FR-1", "System shall capture the person's first name"),
        row("FR-2", "Record the date of birth for every person").with_comment("MM/DD/YYYY"),
        row("FR-3", "Capture gender as a coded value"),
        row("FR-10", "Student application information is loaded from Slate."),
        row(
            "",
            "A unique identifier is returned back to Slate from Banner; reporting covers registrations vs acceptance by time, state and race.",
        ),
        row("FR-24", "Display CWID replacing PIDM in the UI"),
    ]
}

pub fn sample_requirements() -> RequirementSet {
    RequirementExtractor::new().extract(&sample_rows()).unwrap()
}

/// Declaration matching [`sample_rows`]; CWID and PIDM are left out
pub fn sample_spec() -> EntitiesSpec {
    EntitiesSpec::new()
        .with_entity(
            EntitySpec::business("Person")
                .with_description("Constituent master record")
                .with_field(FieldSpec::new("firstName").required().linked_to(["FR-1", "FR-10"]))
                .with_field(FieldSpec::new("lastName").linked_to(["FR-10"]))
                .with_field(FieldSpec::new("dateOfBirth").linked_to(["FR-2"]))
                .with_field(FieldSpec::new("gender").lookup("Gender").linked_to(["FR-3"]))
                .with_field(FieldSpec::new("state").in_group("PostalAddress").linked_to(["FR-10"]))
                .with_field(
                    FieldSpec::new("constituentId")
                        .with_data_type(DataType::TextField)
                        .required()
                        .linked_to(["FR-10"]),
                )
                .with_field(FieldSpec::new("meta_createdBy").in_group("_meta").linked_to(["STANDARD"])),
        )
        .with_entity(EntitySpec::reference("Gender").with_description("Gender codes"))
        .with_relationship(Relationship::new("Person", "Gender", RelationshipType::HasOne, "coded gender"))
}

/// Install a test subscriber honouring `RUST_LOG`; repeated calls are no-ops
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
