use collet_util::hash::{sha256_bytes, sha256_matches};

#[test]
fn sha256_of_empty_input() {
    assert_eq!(
        sha256_bytes(b""),
        "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
    );
}

#[test]
fn sha256_of_known_input() {
    assert_eq!(
        sha256_bytes(b"hello"),
        "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
    );
}

#[test]
fn sha256_matches_ignores_case_and_whitespace() {
    assert!(sha256_matches(
        b"hello",
        " 2CF24DBA5FB0A30E26E83B2AC5B9E29E1B161E5C1FA7425E73043362938B9824\n"
    ));
    assert!(!sha256_matches(b"hello", "deadbeef"));
}
