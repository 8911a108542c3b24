use std::process::{Command, Output};

fn run_wikispider(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_wikispider"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute wikispider")
}

#[test]
fn test_help_lists_subcommands() {
    let output = run_wikispider(&["--help"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("search"), "help should list search: {stdout}");
    assert!(stdout.contains("links"), "help should list links: {stdout}");
}

#[test]
fn test_search_requires_target() {
    let output = run_wikispider(&["search", "Rust"]);
    assert!(!output.status.success());
}

#[test]
fn test_search_rejects_namespaced_article() {
    let output = run_wikispider(&["search", "File:Rust_logo.svg", "Graph_theory"]);
    assert_eq!(output.status.code(), Some(1));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Error during search"),
        "should report the bad article: {stderr}"
    );
}

#[test]
fn test_search_rejects_zero_workers() {
    let output = run_wikispider(&["search", "Rust", "Graph_theory", "-j", "0"]);
    assert_eq!(output.status.code(), Some(1));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("worker"), "should mention the worker count: {stderr}");
}

#[test]
fn test_links_rejects_empty_page() {
    let output = run_wikispider(&["links", "/"]);
    assert_eq!(output.status.code(), Some(1));
}
