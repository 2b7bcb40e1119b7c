use assert_cmd::Command;
use predicates::prelude::*;

fn cli() -> Command {
    let mut cmd = Command::cargo_bin("texterify-mcp-test-client").expect("binary exists");
    cmd.env_clear();
    cmd
}

#[test]
fn help_lists_every_subcommand() {
    cli().arg("--help").assert().success().stdout(
        predicate::str::contains("list-tools")
            .and(predicate::str::contains("call-tool"))
            .and(predicate::str::contains("watch"))
            .and(predicate::str::contains("info")),
    );
}

#[test]
fn missing_server_command_is_reported() {
    cli()
        .args(["info", "--cmd", "texterify-mcp-not-installed"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "command 'texterify-mcp-not-installed' not found in PATH",
        ));
}

#[test]
fn malformed_env_pair_is_rejected_by_the_parser() {
    cli()
        .args(["call-tool", "--name", "list_projects", "--env", "TEXTERIFY_AUTH_EMAIL"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid KEY=VALUE pair"));
}
