use collet_core::requirements_file::RequirementsFile;

#[test]
fn parse_short_and_detailed_entries() {
    let file = RequirementsFile::parse_toml(
        r#"
[collections]
"community.general" = ">=7.0.0,<9.0.0"
"ansible.utils" = { version = "2.10.0", source = "galaxy", signed = true }
"ansible.netcommon" = {}
"#,
    )
    .unwrap();
    let reqs = file.requirements().unwrap();
    assert_eq!(reqs.len(), 3);

    // BTreeMap order: ansible.netcommon, ansible.utils, community.general
    assert_eq!(reqs[0].name.to_string(), "ansible.netcommon");
    assert!(reqs[0].spec.is_any());

    assert_eq!(reqs[1].name.to_string(), "ansible.utils");
    assert!(reqs[1].spec.is_pinned());
    assert_eq!(reqs[1].source.as_deref(), Some("galaxy"));
    assert!(reqs[1].signed);

    assert_eq!(reqs[2].spec.to_string(), ">=7.0.0,<9.0.0");
    assert!(!reqs[2].signed);
}

#[test]
fn empty_file_has_no_requirements() {
    let file = RequirementsFile::parse_toml("").unwrap();
    assert!(file.requirements().unwrap().is_empty());
}

#[test]
fn bad_name_is_reported() {
    let file = RequirementsFile::parse_toml(
        r#"
[collections]
"general" = "*"
"#,
    )
    .unwrap();
    let err = file.requirements().unwrap_err();
    assert!(err.to_string().contains("Requirement error"), "got: {err}");
}

#[test]
fn bad_spec_is_reported_with_name() {
    let file = RequirementsFile::parse_toml(
        r#"
[collections]
"ns.coll" = ">=one"
"#,
    )
    .unwrap();
    let err = file.requirements().unwrap_err();
    assert!(err.to_string().contains("ns.coll"), "got: {err}");
}

#[test]
fn invalid_toml_is_an_error() {
    assert!(RequirementsFile::parse_toml("[collections\n").is_err());
}

#[test]
fn from_path_reads_file() {
    let tmp = tempfile::TempDir::new().unwrap();
    let path = tmp.path().join("collections.toml");
    std::fs::write(&path, "[collections]\n\"ns.coll\" = \"1.0.0\"\n").unwrap();
    let file = RequirementsFile::from_path(&path).unwrap();
    assert_eq!(file.requirements().unwrap().len(), 1);
}
