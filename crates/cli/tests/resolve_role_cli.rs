use std::io::Write;
use std::process::{Command, Output, Stdio};

use serde_json::{Value, json};

const BIN: &str = env!("CARGO_BIN_EXE_resolve-role");

fn run(args: &[&str], envs: &[(&str, &str)], stdin: Option<&str>) -> Output {
    let mut cmd = Command::new(BIN);
    cmd.args(args)
        .env_remove("MEDSTAFF_ROLE_MAP")
        .env_remove("MEDSTAFF_DEFAULT_ROLE")
        .env("RUST_LOG", "off")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    for (k, v) in envs {
        cmd.env(k, v);
    }

    let mut child = cmd.spawn().expect("failed to spawn resolve-role");
    {
        let mut child_stdin = child.stdin.take().expect("stdin is piped");
        if let Some(input) = stdin {
            child_stdin
                .write_all(input.as_bytes())
                .expect("failed to write stdin");
        }
    }
    child.wait_with_output().expect("resolve-role did not finish")
}

fn lines(output: &Output) -> Vec<Value> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|l| serde_json::from_str(l).expect("each stdout line is json"))
        .collect()
}

#[test]
fn resolves_arguments_with_builtin_map() {
    let output = run(&["Super_Admin", "Institution ", "docter", "janitor"], &[], None);
    assert!(output.status.success());

    let lines = lines(&output);
    assert_eq!(lines.len(), 4);
    assert_eq!(
        lines[0],
        json!({ "input": "Super_Admin", "role": "admin", "tier": "exact", "variant": "super_admin" })
    );
    assert_eq!(lines[1]["role"], "institute");
    assert_eq!(
        lines[2],
        json!({ "input": "docter", "role": "professional", "tier": "fuzzy", "variant": "doctor", "distance": 1 })
    );
    assert_eq!(
        lines[3],
        json!({ "input": "janitor", "role": "professional", "tier": "default", "reason": "no_match" })
    );
}

#[test]
fn reads_stdin_when_no_arguments() {
    let output = run(&[], &[], Some("admin\n\nnurse\n"));
    assert!(output.status.success());

    let roles: Vec<Value> = lines(&output).into_iter().map(|l| l["role"].clone()).collect();
    assert_eq!(roles, vec![json!("admin"), json!("professional"), json!("professional")]);
}

#[test]
fn custom_map_and_default_role_from_env() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{ "institute": ["clinic"], "admin": ["admin", "administrator"], "professional": ["pro"] }}"#
    )
    .unwrap();
    let path = file.path().to_str().unwrap().to_string();

    let output = run(
        &["Clinic", "xyzxyz"],
        &[("MEDSTAFF_ROLE_MAP", path.as_str()), ("MEDSTAFF_DEFAULT_ROLE", "admin")],
        None,
    );
    assert!(output.status.success());

    let lines = lines(&output);
    assert_eq!(lines[0]["role"], "institute");
    assert_eq!(lines[1]["role"], "admin");
    assert_eq!(lines[1]["tier"], "default");
}

#[test]
fn invalid_configuration_fails_startup() {
    let output = run(&["admin"], &[("MEDSTAFF_DEFAULT_ROLE", "guest")], None);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("MEDSTAFF_DEFAULT_ROLE"));

    let output = run(&["admin"], &[("MEDSTAFF_ROLE_MAP", "/no/such/roles.json")], None);
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
}
