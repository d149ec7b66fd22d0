//! End-to-end trimming against a TripPin-style EDMX document.

use std::path::{Path, PathBuf};

use edmx_trimmer::{
    CountingReporter, Document, EdmxTrimmer, NullReporter, PruneOutcome, SchemaNamespace,
    TrimError, TrimOptions, run,
};
use rstest::{fixture, rstest};
use tempfile::TempDir;

const TRIPPIN: &str = include_str!("fixtures/trippin.xml");

/// Every element here is reachable from the two entity sets.
const REACHABLE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<edmx:Edmx Version="4.0" xmlns:edmx="http://docs.oasis-open.org/odata/ns/edmx">
  <edmx:DataServices>
    <Schema Namespace="Shop.Model" Alias="shop" xmlns="http://docs.oasis-open.org/odata/ns/edm">
      <EnumType Name="AXType"/>
      <EnumType Name="OrderStatus"/>
      <EntityType Name="Customer">
        <NavigationProperty Name="Orders" Type="Collection(shop.Order)"/>
      </EntityType>
      <EntityType Name="Order">
        <Property Name="Status" Type="Shop.Model.OrderStatus"/>
        <NavigationProperty Name="Customer" Type="Shop.Model.Customer"/>
      </EntityType>
      <Action Name="Cancel" IsBound="true">
        <Parameter Name="order" Type="shop.Order"/>
      </Action>
      <EntityContainer Name="Container">
        <EntitySet Name="Customers" EntityType="shop.Customer">
          <NavigationPropertyBinding Path="Orders" Target="Orders"/>
        </EntitySet>
        <EntitySet Name="Orders" EntityType="Shop.Model.Order">
          <NavigationPropertyBinding Path="Customer" Target="Customers"/>
        </EntitySet>
        <ActionImport Name="Cancel" Action="shop.Cancel"/>
      </EntityContainer>
    </Schema>
  </edmx:DataServices>
</edmx:Edmx>
"#;

#[fixture]
fn workspace() -> TempDir {
    tempfile::tempdir().unwrap()
}

fn write_source(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("Metadata.edmx");
    std::fs::write(&path, content).unwrap();
    path
}

fn trim(source: &str, options: TrimOptions) -> (Document, PruneOutcome) {
    let mut document = Document::parse(source).unwrap();
    let outcome = EdmxTrimmer::new(options)
        .trim_document(&mut document)
        .unwrap();
    (document, outcome)
}

/// Reparse the rendered output, so assertions see exactly what was written.
fn trim_and_reparse(source: &str, options: TrimOptions) -> Document {
    let (document, _) = trim(source, options);
    Document::parse(document.render()).unwrap()
}

fn names(document: &Document, tag: &str) -> Vec<String> {
    document
        .elements_by_tag(tag)
        .filter_map(|id| document.attribute(id, "Name").map(str::to_owned))
        .collect()
}

// ============================================================================
// SCENARIOS
// ============================================================================

#[test]
fn test_exclude_applies_after_keep() {
    let output = trim_and_reparse(
        TRIPPIN,
        TrimOptions::new()
            .with_entities_to_keep(["Photos", "People"])
            .with_entities_to_exclude(["People"]),
    );
    assert_eq!(names(&output, "EntitySet"), vec!["Photos"]);
    assert_eq!(names(&output, "EntityType"), vec!["Photo"]);
    assert!(names(&output, "Action").is_empty());
    assert!(names(&output, "ActionImport").is_empty());
}

#[test]
fn test_wildcard_keeps_airlines_and_airports() {
    let output = trim_and_reparse(TRIPPIN, TrimOptions::new().with_entities_to_keep(["Air*"]));
    assert_eq!(names(&output, "EntitySet"), vec!["Airlines", "Airports"]);
    assert_eq!(names(&output, "EntityType"), vec!["Airline", "Airport"]);
    assert_eq!(names(&output, "Action"), vec!["RateAirline"]);
    assert_eq!(names(&output, "ActionImport"), vec!["RateAirline"]);
    assert_eq!(names(&output, "Function"), vec!["GetNearestAirport"]);
    assert_eq!(names(&output, "FunctionImport"), vec!["GetNearestAirport"]);
}

#[test]
fn test_regular_expressions_keep_and_exclude() {
    let output = trim_and_reparse(
        TRIPPIN,
        TrimOptions::new()
            .with_regular_expressions(true)
            .with_entities_to_keep([r"\b\w+s\b"])
            .with_entities_to_exclude([r"P\w+"]),
    );
    assert_eq!(names(&output, "EntitySet"), vec!["Airlines", "Airports"]);
}

#[test]
fn test_keep_people_cascades_through_the_graph() {
    let output = trim_and_reparse(TRIPPIN, TrimOptions::new().with_entities_to_keep(["People"]));

    assert_eq!(names(&output, "EntitySet"), vec!["People"]);
    assert_eq!(names(&output, "EntityType"), vec!["Person"]);
    assert_eq!(names(&output, "NavigationProperty"), vec!["Friends"]);
    assert_eq!(names(&output, "Action"), vec!["ShareTrip"]);
    assert!(names(&output, "ActionImport").is_empty());
    // `GetNearestAirport` returns an Airport and its import exposes Airports.
    assert!(names(&output, "Function").is_empty());
    assert!(names(&output, "FunctionImport").is_empty());

    let targets: Vec<_> = output
        .elements_by_tag("NavigationPropertyBinding")
        .filter_map(|id| output.attribute(id, "Target"))
        .collect();
    assert_eq!(targets, vec!["People"]);
}

#[rstest]
#[case::keep_people(TrimOptions::new().with_entities_to_keep(["People"]))]
#[case::keep_photos_airports(TrimOptions::new().with_entities_to_keep(["Photos", "Airports"]))]
#[case::exclude_airports(TrimOptions::new().with_entities_to_exclude(["Airports"]))]
#[case::keep_air(TrimOptions::new().with_entities_to_keep(["Air*"]))]
fn test_surviving_references_point_at_surviving_definitions(#[case] options: TrimOptions) {
    let output = trim_and_reparse(TRIPPIN, options);
    let namespace = SchemaNamespace::resolve(&output).unwrap();
    let defined: Vec<String> = ["EntityType", "EnumType", "ComplexType"]
        .into_iter()
        .flat_map(|tag| names(&output, tag))
        .collect();
    let sets = names(&output, "EntitySet");

    for tag in ["Property", "NavigationProperty", "Parameter", "ReturnType"] {
        for id in output.elements_by_tag(tag) {
            let Some(type_ref) = output.attribute(id, "Type") else {
                continue;
            };
            if let Some(name) = namespace.referenced_name(type_ref) {
                assert!(defined.iter().any(|d| d == name), "{tag} {type_ref} dangles");
            }
        }
    }
    for tag in ["FunctionImport", "ActionImport"] {
        for id in output.elements_by_tag(tag) {
            if let Some(set) = output.attribute(id, "EntitySet") {
                assert!(sets.iter().any(|s| s == set), "{tag} exposes removed set {set}");
            }
        }
    }
}

#[test]
fn test_removed_elements_leave_no_blank_lines() {
    let (document, _) = trim(TRIPPIN, TrimOptions::new().with_entities_to_keep(["Photos"]));
    let rendered = String::from_utf8(document.render()).unwrap();
    assert!(
        rendered.lines().all(|line| !line.trim().is_empty()),
        "{rendered}"
    );
}

// ============================================================================
// PROPERTIES
// ============================================================================

#[test]
fn test_no_patterns_and_no_flags_is_byte_identical() {
    let (document, outcome) = trim(TRIPPIN, TrimOptions::new());
    assert_eq!(outcome.removed.total(), 0);
    assert_eq!(document.render(), TRIPPIN.as_bytes());
}

#[test]
fn test_keeping_every_set_is_identity_when_all_is_reachable() {
    let (document, outcome) = trim(
        REACHABLE,
        TrimOptions::new().with_entities_to_keep(["Customers", "Orders"]),
    );
    assert_eq!(outcome.removed.total(), 0);
    assert_eq!(document.render(), REACHABLE.as_bytes());
}

#[rstest]
#[case::keep_people(TrimOptions::new().with_entities_to_keep(["People"]))]
#[case::keep_photos(TrimOptions::new().with_entities_to_keep(["Photos"]))]
#[case::exclude_air(TrimOptions::new().with_entities_to_exclude(["Air*"]))]
#[case::keep_airlines_people(TrimOptions::new().with_entities_to_keep(["Airlines", "People"]))]
fn test_navigation_properties_follow_surviving_types(#[case] options: TrimOptions) {
    let input = Document::parse(TRIPPIN).unwrap();
    let output = trim_and_reparse(TRIPPIN, options);
    let namespace = SchemaNamespace::resolve(&input).unwrap();
    let surviving = names(&output, "EntityType");
    let references_survivor = |document: &Document, id| {
        document
            .attribute(id, "Type")
            .and_then(|t| namespace.referenced_name(t))
            .is_some_and(|name| surviving.iter().any(|s| s == name))
    };

    for id in output.elements_by_tag("NavigationProperty") {
        assert!(references_survivor(&output, id));
    }

    for (before, after) in input
        .elements_by_tag("EntityType")
        .filter(|&id| {
            let name = input.attribute(id, "Name").unwrap();
            surviving.iter().any(|s| s == name)
        })
        .zip(output.elements_by_tag("EntityType"))
    {
        let expected: Vec<_> = input
            .children_by_tag(before, "NavigationProperty")
            .filter(|&nav| references_survivor(&input, nav))
            .filter_map(|nav| input.attribute(nav, "Name"))
            .collect();
        let actual: Vec<_> = output
            .children_by_tag(after, "NavigationProperty")
            .filter_map(|nav| output.attribute(nav, "Name"))
            .collect();
        assert_eq!(actual, expected);
    }
}

#[rstest]
#[case::keep_people(TrimOptions::new().with_entities_to_keep(["People"]), &["AXType", "PersonGender", "Feature"])]
#[case::keep_air(TrimOptions::new().with_entities_to_keep(["Air*"]), &["AXType", "Feature", "AirportKind"])]
#[case::keep_photos(TrimOptions::new().with_entities_to_keep(["Photos"]), &["AXType"])]
#[case::exclude_all(TrimOptions::new().with_entities_to_exclude(["*"]), &["AXType"])]
fn test_enum_types_survive_only_when_referenced(
    #[case] options: TrimOptions,
    #[case] expected: &[&str],
) {
    let output = trim_and_reparse(TRIPPIN, options);
    assert_eq!(names(&output, "EnumType"), expected);
}

#[rstest]
#[case(&["*"], &["People"])]
#[case(&["Air*", "Photos"], &["Airports"])]
#[case(&["People"], &["Photos"])]
#[case(&["P*"], &["*s"])]
fn test_exclude_never_grows_the_selection(#[case] keep: &[&str], #[case] exclude: &[&str]) {
    let keep_only = TrimOptions::new().with_entities_to_keep(keep.iter().copied());
    let both = keep_only
        .clone()
        .with_entities_to_exclude(exclude.iter().copied());

    let (_, keep_outcome) = trim(TRIPPIN, keep_only);
    let (_, both_outcome) = trim(TRIPPIN, both);
    assert!(both_outcome.entity_sets_after <= keep_outcome.entity_sets_after);
}

// ============================================================================
// FLAT STRIPS
// ============================================================================

#[rstest]
#[case::unfiltered(TrimOptions::new())]
#[case::filtered(TrimOptions::new().with_entities_to_keep(["Air*"]))]
fn test_remove_action_imports_drops_all_of_them(#[case] options: TrimOptions) {
    let output = trim_and_reparse(TRIPPIN, options.with_remove_action_imports(true));
    assert_eq!(output.count("ActionImport"), 0);
}

#[test]
fn test_remove_primary_annotations_keeps_foreign_targets() {
    let output = trim_and_reparse(
        TRIPPIN,
        TrimOptions::new().with_remove_primary_annotations(true),
    );
    let targets: Vec<_> = output
        .elements_by_tag("Annotations")
        .filter_map(|id| output.attribute(id, "Target"))
        .collect();
    assert_eq!(targets, vec!["Org.OData.Capabilities.V1.SearchRestrictions"]);
    assert_eq!(output.count("EntitySet"), 4);
}

#[test]
fn test_remove_function_imports_and_complex_types() {
    let output = trim_and_reparse(
        TRIPPIN,
        TrimOptions::new()
            .with_remove_function_imports(true)
            .with_remove_complex_types(true),
    );
    assert_eq!(output.count("FunctionImport"), 0);
    assert_eq!(output.count("ComplexType"), 0);
    assert_eq!(output.count("Function"), 1);
}

// ============================================================================
// FILES AND ERRORS
// ============================================================================

#[rstest]
fn test_run_overwrites_destination(workspace: TempDir) {
    let source = write_source(workspace.path(), TRIPPIN);
    let destination = workspace.path().join("Output.edmx");
    std::fs::write(&destination, "stale").unwrap();

    let summary = run(
        &source,
        &destination,
        &TrimOptions::new().with_entities_to_keep(["Photos"]),
    )
    .unwrap();

    assert_eq!(summary.destination, destination);
    assert_eq!(summary.outcome.entity_sets_before, 4);
    assert_eq!(summary.outcome.entity_sets_after, 1);
    let written = Document::load(&destination).unwrap();
    assert_eq!(names(&written, "EntitySet"), vec!["Photos"]);
}

#[rstest]
fn test_verbose_reports_before_and_after(workspace: TempDir) {
    let source = write_source(workspace.path(), TRIPPIN);
    let mut reporter = CountingReporter::default();
    EdmxTrimmer::new(
        TrimOptions::new()
            .with_entities_to_keep(["Air*"])
            .with_verbose(true),
    )
    .trim_file(&source, workspace.path().join("out.edmx"), &mut reporter)
    .unwrap();

    assert_eq!(reporter.before, Some(4));
    assert_eq!(reporter.after, Some(2));
}

#[rstest]
fn test_missing_source_writes_nothing(workspace: TempDir) {
    let destination = workspace.path().join("Output.edmx");
    let err = run(
        workspace.path().join("absent.edmx"),
        &destination,
        &TrimOptions::new(),
    )
    .unwrap_err();

    assert!(matches!(err, TrimError::Io { .. }));
    assert!(!destination.exists());
}

#[rstest]
fn test_invalid_regex_writes_nothing(workspace: TempDir) {
    let source = write_source(workspace.path(), TRIPPIN);
    let destination = workspace.path().join("Output.edmx");
    let options = TrimOptions::new()
        .with_regular_expressions(true)
        .with_entities_to_keep(["Photos", "[People"]);

    let err = EdmxTrimmer::new(options)
        .trim_file(&source, &destination, &mut NullReporter)
        .unwrap_err();

    assert!(matches!(err, TrimError::InvalidPattern { .. }));
    assert!(!destination.exists());
}

#[rstest]
#[case::no_schema("<Edmx><DataServices/></Edmx>")]
#[case::malformed("<Edmx><DataServices></Edmx>")]
#[case::no_namespace(r#"<Edmx><Schema Alias="x"/></Edmx>"#)]
fn test_unusable_source_writes_nothing(workspace: TempDir, #[case] content: &str) {
    let source = write_source(workspace.path(), content);
    let destination = workspace.path().join("Output.edmx");
    assert!(run(&source, &destination, &TrimOptions::new()).is_err());
    assert!(!destination.exists());
}
