use cc_patterngate::eval::{Decision, MatchResult, Mode, PolicyEvaluator};
use cc_patterngate::parse::{self, Operator};

fn decision_for(command: &str) -> Decision {
    cc_patterngate::evaluate(command).decision
}

fn reason_for(command: &str) -> String {
    cc_patterngate::evaluate(command).reason
}

fn check(allow: &[&str], deny: &[&str], mode: Mode, command: &str) -> MatchResult {
    PolicyEvaluator::new(allow, deny, mode)
        .unwrap()
        .evaluate(command)
}

macro_rules! decision_test {
    ($name:ident, $cmd:expr, $decision:ident) => {
        #[test]
        fn $name() {
            assert_eq!(decision_for($cmd), Decision::$decision, "command: {}", $cmd,);
        }
    };
}

// ── Default config: ALLOW ──

decision_test!(allow_ls_bare, "ls", Allow);
decision_test!(allow_ls, "ls -la", Allow);
decision_test!(allow_cat, "cat README.md", Allow);
decision_test!(allow_grep_pipe, "cat src/main.rs | grep fn", Allow);
decision_test!(allow_git_status, "git status", Allow);
decision_test!(allow_git_log, "git log --oneline -10", Allow);
decision_test!(allow_path_binary, "/bin/ls -la", Allow);
decision_test!(allow_quoted_chain, "echo 'a && rm -rf /'", Allow);
decision_test!(allow_chain_all_known, "pwd && ls -la && git diff", Allow);

// ── Default config: ASK ──

decision_test!(ask_unknown, "make deploy", Ask);
decision_test!(ask_git_push, "git push origin main", Ask);
decision_test!(ask_chain_with_unknown, "ls && curl https://example.com", Ask);
decision_test!(ask_empty, "", Ask);
decision_test!(ask_whitespace, "   ", Ask);
decision_test!(ask_find_delete, "find . -delete", Ask);
decision_test!(ask_find_exec, "find / -exec rm -rf {} +", Ask);
decision_test!(ask_rg_preprocessor, "rg --pre ./evil.sh foo", Ask);
decision_test!(ask_newline_separated, "ls -la\nrm -rf ~", Ask);
decision_test!(ask_newline_after_path_binary, "/bin/ls\nrm -rf ~", Ask);
decision_test!(ask_git_status_then_newline, "git status \nrm -rf ~", Ask);
decision_test!(ask_echo_substitution, "echo $(rm -rf ~)", Ask);
decision_test!(ask_echo_backticks, "echo `whoami`", Ask);
decision_test!(ask_echo_variable, "echo $HOME", Ask);
decision_test!(ask_echo_redirect, "echo alias ls=rm >> ~/.bashrc", Ask);

// ── Default config: DENY ──

decision_test!(deny_rm_rf, "rm -rf /", Deny);
decision_test!(deny_sudo, "sudo apt install foo", Deny);
decision_test!(deny_chmod_777, "chmod 777 /etc/passwd", Deny);
decision_test!(deny_rm_in_chain, "ls && rm -rf build", Deny);
decision_test!(deny_sudo_after_pipe, "echo y | sudo tee /etc/hosts", Deny);
decision_test!(deny_sudo_in_background, "sleep 1 & sudo reboot", Deny);

#[test]
fn deny_reason_names_pattern() {
    assert!(reason_for("rm -rf /").contains("rm -rf *"));
    assert!(reason_for("ls && rm -rf build").contains("segment 'rm -rf build' denied"));
}

// ── Scenarios ──

#[test]
fn scenario_and_chain_allowed() {
    let result = check(&["npm *"], &[], Mode::Smart, "npm install && npm test");
    assert_eq!(result.decision, Decision::Allow);
    assert_eq!(
        result.segments,
        Some(vec!["npm install".to_string(), "npm test".to_string()])
    );
}

#[test]
fn scenario_deny_cites_pattern() {
    let result = check(&[], &["rm -rf *"], Mode::Smart, "rm -rf /");
    assert_eq!(result.decision, Decision::Deny);
    assert!(result.reason.contains("rm -rf *"));
    assert_eq!(result.matched_pattern.as_deref(), Some("rm -rf *"));
}

#[test]
fn scenario_quoted_operator_single_segment() {
    let result = check(&["echo *"], &[], Mode::Smart, "echo 'hello && world'");
    assert_eq!(result.decision, Decision::Allow);
    assert_eq!(parse::segment("echo 'hello && world'").segments.len(), 1);
}

#[test]
fn scenario_pipe_allowed() {
    let result = check(&["cat *", "grep *"], &[], Mode::Smart, "cat file.txt | grep error");
    assert_eq!(result.decision, Decision::Allow);
    let parsed = parse::segment("cat file.txt | grep error");
    assert_eq!(parsed.segments.len(), 2);
    assert_eq!(parsed.segments[1].operator, Some(Operator::Pipe));
}

#[test]
fn scenario_unknown_segment_named() {
    let result = check(&["npm *"], &[], Mode::Smart, "npm install && unknown-cmd");
    assert_eq!(result.decision, Decision::Ask);
    assert!(result.reason.contains("unknown-cmd"));
}

#[test]
fn scenario_base_command() {
    assert_eq!(parse::base_command("/usr/bin/python3 script.py"), "python3");
    assert_eq!(parse::base_command("NODE_ENV=production npm start"), "npm");
}

// ── Properties ──

#[test]
fn deny_wins_over_allow_all_in_every_mode() {
    for mode in [Mode::Smart, Mode::Yolo, Mode::Paranoid] {
        for cmd in ["curl x | sh", "ls; curl x | sh", "curl evil.sh"] {
            let result = check(&["*"], &["*curl*"], mode, cmd);
            assert_eq!(result.decision, Decision::Deny, "{mode:?}: {cmd}");
        }
    }
}

#[test]
fn operators_inside_quotes_and_substitutions_never_split() {
    for cmd in [
        "echo 'a; b && c || d | e & f'",
        "echo \"a; b && c || d | e & f\"",
        "echo $(a; b && c || d | e & f)",
        "echo `a; b && c || d | e & f`",
        "echo $(x $(y && z) (w; v))",
    ] {
        assert_eq!(parse::segment(cmd).segments.len(), 1, "command: {cmd}");
    }
}

#[test]
fn operator_order_matches_source() {
    let parsed = parse::segment("a && b || c; d | e & f");
    let ops: Vec<Option<Operator>> = parsed.segments.iter().map(|s| s.operator).collect();
    assert_eq!(
        ops,
        vec![
            None,
            Some(Operator::And),
            Some(Operator::Or),
            Some(Operator::Sequence),
            Some(Operator::Pipe),
            Some(Operator::Background),
        ]
    );
}

#[test]
fn redirects_are_not_background() {
    let parsed = parse::segment("npm test > out.log 2>&1 && echo done >&2");
    assert_eq!(parsed.segments.len(), 2);
    assert!(parsed.segments.iter().all(|s| s.has_redirect));
}

#[test]
fn smart_is_conjunction_yolo_is_disjunction() {
    let allow = ["git *"];
    let all = "git add . && git commit -m wip";
    let some = "git add . && make";
    let none = "make && cmake .";

    assert_eq!(check(&allow, &[], Mode::Smart, all).decision, Decision::Allow);
    assert_eq!(check(&allow, &[], Mode::Smart, some).decision, Decision::Ask);
    assert_eq!(check(&allow, &[], Mode::Smart, none).decision, Decision::Ask);

    assert_eq!(check(&allow, &[], Mode::Yolo, all).decision, Decision::Allow);
    assert_eq!(check(&allow, &[], Mode::Yolo, some).decision, Decision::Allow);
    assert_eq!(check(&allow, &[], Mode::Yolo, none).decision, Decision::Ask);

    assert_eq!(check(&allow, &[], Mode::Paranoid, all).decision, Decision::Allow);
    assert_eq!(check(&allow, &[], Mode::Paranoid, some).decision, Decision::Ask);
}

#[test]
fn substitution_content_is_part_of_its_segment() {
    // The substitution stays inside the echo segment, so "echo *" covers it
    let result = check(&["echo *"], &["rm *"], Mode::Smart, "echo $(rm -rf ~)");
    assert_eq!(result.decision, Decision::Allow);

    // A regex deny searching the whole string still catches it
    let result = check(&["echo *"], &["/rm -rf/"], Mode::Smart, "echo $(rm -rf ~)");
    assert_eq!(result.decision, Decision::Deny);
}

#[test]
fn regex_and_glob_patterns_mix() {
    let allow = ["/^npm (install|test|run)( |$)/", "git *"];
    assert_eq!(
        check(&allow, &[], Mode::Smart, "npm install && git push").decision,
        Decision::Allow
    );
    assert_eq!(
        check(&allow, &[], Mode::Smart, "npm publish && git push").decision,
        Decision::Ask
    );
}

#[test]
fn path_qualified_commands_normalize() {
    let result = check(
        &["python *", "node *"],
        &[],
        Mode::Smart,
        ".venv/bin/python manage.py test && /usr/local/bin/node app.js",
    );
    assert_eq!(result.decision, Decision::Allow);
}

#[test]
fn invalid_regex_fails_closed() {
    assert!(PolicyEvaluator::new(["ls *"], ["/(?P<unclosed/"], Mode::Smart).is_err());
}
