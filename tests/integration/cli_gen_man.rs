use test_support::{BIN, cmd_bin};

#[test]
fn cli_generates_man_page() {
  let out = cmd_bin(BIN).args(["--gen-man"]).output().unwrap();
  assert!(out.status.success());
  let s = String::from_utf8_lossy(&out.stdout);
  // clap_mangen emits a roff manpage starting with .TH and mentions the binary name
  assert!(s.contains(".TH"));
  assert!(s.contains("jira\\-worklog\\-report") || s.contains("jira-worklog-report"));
}

#[test]
fn gen_man_needs_no_configuration() {
  let td = test_support::tempdir();
  cmd_bin(BIN)
    .current_dir(td.path())
    .env_remove("JIRA_USERNAME")
    .env_remove("JIRA_API_TOKEN")
    .env_remove("JIRA_SERVER")
    .arg("--gen-man")
    .assert()
    .success();
}
