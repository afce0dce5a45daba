//! Integration tests for the line-oriented edit session.

use std::io::Cursor;

use rstest::{fixture, rstest};

use orgtree::application::HierarchyService;
use orgtree::cli::shell::{run_session, SessionOptions};
use orgtree::domain::{EmployeeRecord, TreeBuilder};

const SCRIPT: &str = "\
# build a small org
place 1
place 2 1
place 3 2
place 1 3
promote 2
toggle 1
table
quit
place 4 1
";

#[fixture]
fn svc() -> HierarchyService {
    let records = vec![
        EmployeeRecord::new("1", "Hari").with_title("CEO"),
        EmployeeRecord::new("2", "Nitin").with_title("AVP"),
        EmployeeRecord::new("3", "Asha").with_title("Lead"),
        EmployeeRecord::new("4", "Bala").with_title("Engineer"),
    ];
    HierarchyService::from_records(records, TreeBuilder::default()).unwrap()
}

fn options(echo: bool) -> SessionOptions {
    SessionOptions {
        indent_width: 2,
        prompt: false,
        echo,
    }
}

#[rstest]
fn given_script_when_echoing_then_acks_errors_and_views_printed(mut svc: HierarchyService) {
    // Arrange
    let mut out = Vec::new();

    // Act
    let failures = run_session(&mut svc, Cursor::new(SCRIPT), &mut out, options(true)).unwrap();

    // Assert
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("placed 1 as root"));
    assert!(text.contains("placed 3 under 2"));
    assert!(text.contains("error: placing 1 under 3 would form a cycle"));
    assert!(text.contains("expanded 1"));
    assert!(text.contains("Direct Reports"));
    assert!(text.contains("└─ Asha"));
    assert_eq!(
        failures.iter().map(|f| f.line).collect::<Vec<_>>(),
        vec![5, 6]
    );
}

#[rstest]
fn given_quit_when_running_then_later_lines_ignored(mut svc: HierarchyService) {
    let mut out = Vec::new();

    run_session(&mut svc, Cursor::new(SCRIPT), &mut out, options(true)).unwrap();

    assert!(!svc.store().contains("4"));
    assert_eq!(svc.store().len(), 3);
    assert!(svc.is_expanded("1"));
}

#[rstest]
fn given_quiet_mode_when_running_then_only_views_written(mut svc: HierarchyService) {
    // Arrange
    let mut out = Vec::new();

    // Act
    let failures = run_session(&mut svc, Cursor::new(SCRIPT), &mut out, options(false)).unwrap();

    // Assert
    let text = String::from_utf8(out).unwrap();
    assert!(text.starts_with("Level"));
    assert!(!text.contains("placed"));
    assert!(!text.contains("error"));
    assert_eq!(failures.len(), 2);
}

#[rstest]
fn given_remove_and_chart_when_running_then_subtree_gone(mut svc: HierarchyService) {
    // Arrange
    let script = "place 1\nplace 2 1\nplace 3 2\nremove 2\nexpand-all\nchart\nunplaced\n";
    let mut out = Vec::new();

    // Act
    run_session(&mut svc, Cursor::new(script), &mut out, options(true)).unwrap();

    // Assert
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("removed 2, 3"));
    assert!(text.contains("• Hari #1 · CEO"));
    assert!(text.contains("#2 Nitin"));
    assert!(text.contains("#4 Bala"));
}

#[rstest]
fn given_seed_command_when_roster_declares_managers_then_placed() {
    // Arrange
    let records = vec![
        EmployeeRecord::new("1", "Hari"),
        EmployeeRecord::new("2", "Nitin").with_manager("1"),
    ];
    let mut svc = HierarchyService::from_records(records, TreeBuilder::default()).unwrap();
    let mut out = Vec::new();

    // Act
    run_session(&mut svc, Cursor::new("seed\n"), &mut out, options(true)).unwrap();

    // Assert
    assert!(String::from_utf8(out).unwrap().contains("seeded 2, skipped 0"));
    assert_eq!(svc.store().manager_of("2"), Some("1"));
}

#[rstest]
fn given_prompt_when_running_then_prompt_written_per_read(mut svc: HierarchyService) {
    let mut out = Vec::new();
    let opts = SessionOptions {
        prompt: true,
        ..options(true)
    };

    run_session(&mut svc, Cursor::new("place 1\n"), &mut out, opts).unwrap();

    let text = String::from_utf8(out).unwrap();
    assert_eq!(text.matches("orgtree> ").count(), 2);
}
